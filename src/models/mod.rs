//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `drill`: 플래시카드, 채팅 메시지(Prompt) 관련 구조체
//! - `progress`: 학습 진도, 가중치 단어, 라이브러리 권한
//! - `user`: 사용자 세션(역할, 레벨)
//! - `word`: 단어와 단어 생성/수정 요청
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Word`처럼 짧게 쓸 수 있습니다.

pub mod drill;
pub mod progress;
pub mod user;
pub mod word;

pub use drill::*;
pub use progress::*;
pub use user::*;
pub use word::*;
