//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `TEACHER_PASSWORD_HASH`: 교사 비밀번호의 Argon2 PHC 해시 문자열
//! - `TEACHER_PASS`: 평문 교사 비밀번호 (해시가 없을 때 시작 시 해싱)
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호

use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/dori.db")
    pub database_url: String,
    /// 교사 비밀번호의 Argon2 해시. 설정되어 있으면 `teacher_pass`보다 우선합니다.
    pub teacher_password_hash: Option<String>,
    /// 평문 교사 비밀번호. 해시가 없을 때만 사용합니다.
    pub teacher_pass: Option<String>,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 교사 비밀번호 설정 두 가지 중 하나가 있는지는 시작 시
    /// `middleware::auth::resolve_teacher_hash()`가 확인합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            // .ok(): 변수가 없으면 None. 빈 문자열도 설정하지 않은 것으로 봅니다.
            teacher_password_hash: env::var("TEACHER_PASSWORD_HASH")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            teacher_pass: env::var("TEACHER_PASS").ok().filter(|v| !v.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }
}
