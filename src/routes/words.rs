//! # 단어(Word) 라우트 핸들러
//!
//! 어휘 카탈로그의 조회/생성/수정/삭제를 처리합니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/words?module=`         → 보이는 단어 목록
//! - `POST   /api/v1/words`                 → 교사 단어 생성 (교사 전용)
//! - `POST   /api/v1/words/batch`           → 여러 줄 일괄 등록 (교사 전용)
//! - `GET    /api/v1/words/{id}`            → 단일 단어 조회
//! - `PATCH  /api/v1/words/{id}`            → 단어 수정 (부분 업데이트)
//! - `DELETE /api/v1/words/{id}`            → 단어 삭제
//! - `PUT    /api/v1/words/{id}/synonyms`   → 동의어 교체
//! - `GET    /api/v1/modules`               → 보이는 모듈 이름 목록
//!
//! ## 권한
//! - 수정: 소유자, 편집 권한(라이브러리)을 받은 사용자, 또는 교사 단어에 대한 교사
//! - 삭제: 소유자 또는 편집 권한을 받은 사용자
//! - 보이지 않는 단어는 존재하지 않는 것처럼 404를 반환합니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::ChatUser,
    models::*,
    services::user_locks::UserLocks,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// 교사 비밀번호의 Argon2 해시 (시작 시 한 번 결정)
    pub teacher_password_hash: String,
    /// 사용자별 채팅 메시지 직렬화용 잠금
    pub user_locks: Arc<UserLocks>,
}

/// 교사 역할이 아니면 403
pub(crate) fn require_teacher(user: &ChatUser) -> Result<(), AppError> {
    if user.user.is_teacher() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Teacher role required".to_string()))
    }
}

/// 사용자에게 보이는 단어를 가져옵니다. 없거나 보이지 않으면 404.
async fn visible_word(pool: &SqlitePool, user: &ChatUser, id: i64) -> Result<Word, AppError> {
    let word = db::get_word(pool, id).await?.ok_or(AppError::NotFound)?;
    let visible = word.added_by == Author::Teacher
        || word.is_owned_by(user.id())
        || db::has_grant(pool, user.id(), id).await?;

    if visible {
        Ok(word)
    } else {
        Err(AppError::NotFound)
    }
}

async fn ensure_can_edit(pool: &SqlitePool, user: &ChatUser, word: &Word) -> Result<(), AppError> {
    let allowed = word.is_owned_by(user.id())
        || (word.added_by == Author::Teacher && user.user.is_teacher())
        || db::can_user_edit_word(pool, user.id(), word.id).await?;

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden("You cannot edit this word".to_string()))
    }
}

/// `GET /words?module=`: 보이는 단어 목록. `module=all`은 필터 없음입니다.
pub async fn list_words(
    State(state): State<AppState>,
    user: ChatUser,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = module_filter(query.module.as_deref());
    let words = db::list_visible_words(&state.pool, user.id(), filter.as_deref()).await?;
    Ok(Json(json!({ "words": words })))
}

/// `GET /words/{id}`
pub async fn get_word(
    State(state): State<AppState>,
    user: ChatUser,
    Path(id): Path<i64>,
) -> Result<Json<Word>, AppError> {
    let word = visible_word(&state.pool, &user, id).await?;
    Ok(Json(word))
}

/// `POST /words`: 교사 단어를 만듭니다. 작성자는 그 단어의 편집 권한도 받습니다.
pub async fn create_word(
    State(state): State<AppState>,
    user: ChatUser,
    Json(req): Json<CreateWordRequest>,
) -> Result<(StatusCode, Json<Word>), AppError> {
    require_teacher(&user)?;
    let new_word = NewWord::from_request(&req)?;

    let word = db::create_word(&state.pool, user.id(), Author::Teacher, &new_word).await?;
    db::grant(&state.pool, user.id(), word.id, true).await?;
    tracing::info!(user_id = user.id(), word_id = word.id, "teacher word created");

    Ok((StatusCode::CREATED, Json(word)))
}

/// `POST /words/batch`: 한 줄에 `단어 - 번역 - 동의어 - 모듈` 형식으로 일괄 등록합니다.
///
/// 빈 줄은 건너뛰고, 형식이 틀린 줄은 `failed`에 모아서 돌려줍니다.
/// 한 줄이 실패해도 나머지 줄은 등록됩니다.
pub async fn batch_create_words(
    State(state): State<AppState>,
    user: ChatUser,
    Json(req): Json<BatchUploadRequest>,
) -> Result<Json<BatchUploadResponse>, AppError> {
    require_teacher(&user)?;

    let mut added = 0;
    let mut failed = Vec::new();
    for line in req.text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match NewWord::from_batch_line(line) {
            Ok(new_word) => {
                let word =
                    db::create_word(&state.pool, user.id(), Author::Teacher, &new_word).await?;
                db::grant(&state.pool, user.id(), word.id, true).await?;
                added += 1;
            }
            Err(_) => failed.push(line.to_string()),
        }
    }
    tracing::info!(user_id = user.id(), added, failed = failed.len(), "batch upload");

    Ok(Json(BatchUploadResponse { added, failed }))
}

/// `PATCH /words/{id}`: 보낸 필드만 수정합니다.
pub async fn update_word(
    State(state): State<AppState>,
    user: ChatUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWordRequest>,
) -> Result<Json<Word>, AppError> {
    let word = visible_word(&state.pool, &user, id).await?;
    ensure_can_edit(&state.pool, &user, &word).await?;

    let word = db::update_word(&state.pool, id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(word))
}

/// `PUT /words/{id}/synonyms`: 동의어 목록을 교체합니다. `"-"`는 전부 지웁니다.
pub async fn set_synonyms(
    State(state): State<AppState>,
    user: ChatUser,
    Path(id): Path<i64>,
    Json(req): Json<SynonymsRequest>,
) -> Result<Json<Word>, AppError> {
    let word = visible_word(&state.pool, &user, id).await?;
    ensure_can_edit(&state.pool, &user, &word).await?;

    let synonyms = normalize_synonyms(Some(&req.synonyms));
    let word = db::set_synonyms(&state.pool, id, synonyms.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(word))
}

/// `DELETE /words/{id}`: 소유자나 편집 권한이 있는 사용자만 삭제할 수 있습니다.
pub async fn delete_word(
    State(state): State<AppState>,
    user: ChatUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let word = visible_word(&state.pool, &user, id).await?;
    let allowed =
        word.is_owned_by(user.id()) || db::can_user_edit_word(&state.pool, user.id(), id).await?;
    if !allowed {
        return Err(AppError::Forbidden("You cannot delete this word".to_string()));
    }

    if !db::delete_word(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(user_id = user.id(), word_id = id, "word deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /modules`: 사용자에게 보이는 단어들의 모듈 이름
pub async fn list_modules(
    State(state): State<AppState>,
    user: ChatUser,
) -> Result<Json<Value>, AppError> {
    let modules = db::list_modules(&state.pool, user.id()).await?;
    Ok(Json(json!({ "modules": modules, "all": ALL_MODULES })))
}
