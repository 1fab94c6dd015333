use crate::{
    db,
    db::users as db_users,
    error::AppError,
    middleware::auth::ChatUser,
    models::*,
    routes::words::{require_teacher, AppState},
};
use axum::{extract::State, http::StatusCode, Json};

/// `POST /library/grants`: shares a word with a user. Teacher only.
pub async fn grant_word(
    State(state): State<AppState>,
    user: ChatUser,
    Json(req): Json<GrantRequest>,
) -> Result<(StatusCode, Json<LibraryGrant>), AppError> {
    require_teacher(&user)?;

    db::get_word(&state.pool, req.word_id)
        .await?
        .ok_or(AppError::NotFound)?;
    db_users::find_by_id(&state.pool, &req.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let grant = db::grant(
        &state.pool,
        &req.user_id,
        req.word_id,
        req.can_edit.unwrap_or(true),
    )
    .await?;
    tracing::info!(
        granted_by = user.id(),
        user_id = %grant.user_id,
        word_id = grant.word_id,
        can_edit = grant.can_edit,
        "library grant"
    );

    Ok((StatusCode::CREATED, Json(grant)))
}
