//! # 채팅 라우트 핸들러
//!
//! 채팅 전송 계층(봇 게이트웨이 등)이 사용자 메시지를 그대로 전달하는 엔드포인트입니다.
//!
//! ## 엔드포인트
//! - `POST /api/v1/chat/messages` → `{ "replies": [Prompt, ...] }`
//!
//! 발신자는 `X-User-Id` 헤더로 식별합니다 (`ChatUser` Extractor).

use crate::{
    db,
    error::AppError,
    middleware::auth::ChatUser,
    models::*,
    routes::words::AppState,
    services::chat,
};
use axum::{extract::State, Json};
use rand::{rngs::StdRng, SeedableRng};

/// `POST /chat/messages`: 메시지 한 건을 처리하고 보낼 답장들을 반환합니다.
///
/// 같은 사용자의 메시지는 사용자별 잠금으로 도착 순서대로 하나씩 처리됩니다.
/// guard는 함수가 끝날 때 drop되면서 잠금이 풀립니다.
///
/// Extractor가 읽은 세션은 잠금을 얻기 전의 값이므로, 잠금을 잡은 뒤 다시 읽습니다.
/// 바로 앞 메시지가 `/role`로 역할을 바꿨을 수 있습니다.
pub async fn post_message(
    State(state): State<AppState>,
    user: ChatUser,
    Json(req): Json<ChatMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let _guard = state.user_locks.lock(user.id()).await;
    let session = db::users::find_by_id(&state.pool, user.id())
        .await?
        .ok_or(AppError::NotFound)?;

    // ThreadRng는 Send가 아니므로 await를 넘나드는 곳에서는 StdRng를 씁니다.
    let mut rng = StdRng::from_entropy();
    let replies = chat::handle_message(
        &state.pool,
        &state.teacher_password_hash,
        &session,
        &req.text,
        &mut rng,
    )
    .await?;

    Ok(Json(ChatResponse { replies }))
}
