//! # 내 정보(Me) 라우트 핸들러
//!
//! 요청한 사용자 자신의 세션, 개인 사전, 진도, 드릴 상태를 다룹니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/me`                        → 내 세션 (역할, 레벨)
//! - `PUT    /api/v1/me/role`                   → 역할 선택
//! - `GET    /api/v1/me/words`                  → 개인 사전
//! - `POST   /api/v1/me/words`                  → 개인 단어 추가
//! - `DELETE /api/v1/me/words/{id}`             → 개인 단어 삭제
//! - `GET    /api/v1/me/library`                → 편집 권한을 받은 단어
//! - `GET    /api/v1/me/progress`               → 진도 기록
//! - `GET    /api/v1/me/progress/{word_id}`     → 단어 하나의 진도 기록
//! - `GET    /api/v1/me/weighted-words?module=` → 가중치가 붙은 단어
//! - `GET    /api/v1/me/suggestion?module=`     → 가중치 추첨으로 고른 단어 하나
//! - `GET    /api/v1/me/drill`                  → 드릴 진행 상황

use crate::{
    db,
    error::AppError,
    middleware::auth::ChatUser,
    models::*,
    routes::words::AppState,
    services::{drill, roles, weighting},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /me`
pub async fn me(user: ChatUser) -> Json<UserSession> {
    Json(user.user)
}

/// `PUT /me/role`: 교사는 비밀번호, 학생은 레벨이 필요합니다.
pub async fn select_role(
    State(state): State<AppState>,
    user: ChatUser,
    Json(req): Json<SelectRoleRequest>,
) -> Result<Json<UserSession>, AppError> {
    let role: Role = req.role.parse()?;
    let session = roles::select_role(
        &state.pool,
        &state.teacher_password_hash,
        user.id(),
        role,
        req.password.as_deref(),
        req.level.as_deref(),
    )
    .await?;
    Ok(Json(session))
}

/// `GET /me/words`: 내가 만든 학생 단어
pub async fn list_my_words(
    State(state): State<AppState>,
    user: ChatUser,
) -> Result<Json<Value>, AppError> {
    let words = db::list_personal_words(&state.pool, user.id()).await?;
    Ok(Json(json!({ "words": words })))
}

/// `POST /me/words`: 개인 사전에 단어를 추가합니다. 나에게만 보입니다.
pub async fn add_my_word(
    State(state): State<AppState>,
    user: ChatUser,
    Json(req): Json<CreateWordRequest>,
) -> Result<(StatusCode, Json<Word>), AppError> {
    let mut new_word = NewWord::from_request(&req)?;
    if new_word.level.is_none() {
        new_word.level = Some(user.user.level);
    }

    let word = db::create_word(&state.pool, user.id(), Author::Student, &new_word).await?;
    Ok((StatusCode::CREATED, Json(word)))
}

/// `DELETE /me/words/{id}`: 내가 만든 학생 단어만 지울 수 있습니다.
pub async fn delete_my_word(
    State(state): State<AppState>,
    user: ChatUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let word = db::get_word(&state.pool, id)
        .await?
        .filter(|w| w.added_by == Author::Student && w.is_owned_by(user.id()))
        .ok_or(AppError::NotFound)?;

    db::delete_word(&state.pool, word.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /me/library`
pub async fn list_my_library(
    State(state): State<AppState>,
    user: ChatUser,
) -> Result<Json<Value>, AppError> {
    let words = db::list_editable_words(&state.pool, user.id()).await?;
    Ok(Json(json!({ "words": words })))
}

/// `GET /me/progress`
pub async fn list_my_progress(
    State(state): State<AppState>,
    user: ChatUser,
) -> Result<Json<Value>, AppError> {
    let progress = db::list_progress(&state.pool, user.id()).await?;
    Ok(Json(json!({ "progress": progress })))
}

/// `GET /me/progress/{word_id}`: 아직 채점된 적 없는 단어는 404
pub async fn get_my_progress(
    State(state): State<AppState>,
    user: ChatUser,
    Path(word_id): Path<i64>,
) -> Result<Json<ProgressRecord>, AppError> {
    let record = db::get_progress(&state.pool, user.id(), word_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(record))
}

/// `GET /me/weighted-words?module=`
pub async fn list_weighted_words(
    State(state): State<AppState>,
    user: ChatUser,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = module_filter(query.module.as_deref());
    let words = db::get_weights(&state.pool, user.id(), filter.as_deref()).await?;
    Ok(Json(json!({ "words": words })))
}

/// `GET /me/suggestion?module=`: 자주 틀린 단어일수록 잘 뽑힙니다.
///
/// 후보가 하나도 없으면 404입니다.
pub async fn suggest_word(
    State(state): State<AppState>,
    user: ChatUser,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<WeightedWord>, AppError> {
    let filter = module_filter(query.module.as_deref());
    let pool: Vec<(WeightedWord, u64)> = db::get_weights(&state.pool, user.id(), filter.as_deref())
        .await?
        .into_iter()
        .map(|w| {
            let weight = w.weight;
            (w, weight)
        })
        .collect();

    let picked = weighting::pick_weighted(&pool, &mut rand::thread_rng())
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(Json(picked))
}

/// `GET /me/drill`
pub async fn drill_snapshot(
    State(state): State<AppState>,
    user: ChatUser,
) -> Result<Json<DrillSnapshot>, AppError> {
    let snapshot = drill::snapshot(&state.pool, user.id()).await?;
    Ok(Json(snapshot))
}
