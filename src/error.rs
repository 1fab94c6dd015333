//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError`: HTTP 경계에서 쓰는 에러. `IntoResponse`로 JSON 에러 응답이 됩니다.
//! - `DrillError`: 드릴 엔진 내부 에러 분류. 대부분은 세션 단위에서 복구되고,
//!   저장소 실패(`Persistence`)만 `AppError`로 바뀌어 호출자에게 전파됩니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: `?`로 sqlx::Error를 바로 AppError::Database로 변환합니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 신원 확인 실패 또는 잘못된 교사 비밀번호 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 없음 (HTTP 403). 예: 학생이 교사 전용 API를 호출
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// 드릴 엔진의 에러 분류
///
/// | variant | 복구 방식 |
/// |---------|-----------|
/// | `EmptyCandidateSet` | 사용자에게 알리고 IDLE로 복귀 |
/// | `MalformedReply` | 다시 입력을 요청, 상태 유지 |
/// | `SessionStateCorruption` | 드릴 상태를 지우고 일반 오류 안내 후 IDLE |
/// | `Persistence` | 호출자에게 전파 (`AppError`로 변환) |
#[derive(Debug, Error)]
pub enum DrillError {
    /// 모듈 필터에 맞는 단어가 하나도 없음
    #[error("no words found for module filter {filter:?}")]
    EmptyCandidateSet { filter: Option<String> },

    /// 현재 상태에서 해석할 수 없는 응답
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// 저장된 드릴 상태가 불변식을 깨뜨림 (예: AWAITING_ANSWER인데 current_card가 없음)
    #[error("drill session state is corrupted: {0}")]
    SessionStateCorruption(String),

    /// 단어 저장소 또는 진도 장부 작업 실패
    #[error("persistence failure: {0}")]
    Persistence(#[source] AppError),
}

// db 계층 함수는 AppError를 반환하므로, 엔진 안에서 `?`를 쓰면
// 저장소 실패로 분류됩니다.
impl From<AppError> for DrillError {
    fn from(err: AppError) -> Self {
        DrillError::Persistence(err)
    }
}

impl From<sqlx::Error> for DrillError {
    fn from(err: sqlx::Error) -> Self {
        DrillError::Persistence(AppError::Database(err))
    }
}

impl From<DrillError> for AppError {
    fn from(err: DrillError) -> Self {
        match err {
            DrillError::Persistence(inner) => inner,
            DrillError::EmptyCandidateSet { .. } => AppError::NotFound,
            DrillError::MalformedReply(msg) => AppError::BadRequest(msg),
            DrillError::SessionStateCorruption(msg) => AppError::Internal(msg),
        }
    }
}
