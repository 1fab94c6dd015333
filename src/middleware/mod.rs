//! # 미들웨어 / Extractor 모듈
//!
//! - `auth`: `X-User-Id` 헤더로 사용자를 식별하는 `ChatUser` Extractor와
//!   교사 비밀번호(Argon2) 해싱/검증

pub mod auth;
