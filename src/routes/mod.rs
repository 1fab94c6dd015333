//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `chat`: 채팅 메시지 수신 (명령어, 드릴 응답)
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `library`: 라이브러리 권한 부여
//! - `me`: 내 세션, 개인 사전, 진도, 드릴 상태
//! - `words`: 단어 CRUD, 모듈 목록, 공유 상태(`AppState`)

pub mod chat;
pub mod health;
pub mod library;
pub mod me;
pub mod words;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub use words::AppState;

/// `/api/v1` 아래에 중첩될 API 라우터를 만듭니다.
///
/// 경로 파라미터는 axum 0.8 문법(`{id}`)을 씁니다.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // 채팅 어댑터
        .route("/chat/messages", post(chat::post_message))
        // 어휘 카탈로그
        .route("/words", get(words::list_words).post(words::create_word))
        .route("/words/batch", post(words::batch_create_words))
        .route(
            "/words/{id}",
            get(words::get_word)
                .patch(words::update_word)
                .delete(words::delete_word),
        )
        .route("/words/{id}/synonyms", put(words::set_synonyms))
        .route("/modules", get(words::list_modules))
        // 라이브러리 권한
        .route("/library/grants", post(library::grant_word))
        // 내 정보
        .route("/me", get(me::me))
        .route("/me/role", put(me::select_role))
        .route("/me/words", get(me::list_my_words).post(me::add_my_word))
        .route("/me/words/{id}", delete(me::delete_my_word))
        .route("/me/library", get(me::list_my_library))
        .route("/me/progress", get(me::list_my_progress))
        .route("/me/progress/{word_id}", get(me::get_my_progress))
        .route("/me/weighted-words", get(me::list_weighted_words))
        .route("/me/suggestion", get(me::suggest_word))
        .route("/me/drill", get(me::drill_snapshot))
        // 헬스체크
        .route("/health", get(health::health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;
    use crate::middleware::auth::hash_password;
    use crate::services::user_locks::UserLocks;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        AppState {
            pool: test_pool().await,
            teacher_password_hash: hash_password("teach").unwrap(),
            user_locks: Arc::new(UserLocks::new()),
        }
    }

    async fn create_test_app() -> Router {
        Router::new().nest("/api/v1", api_router(test_state().await))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn chat(app: &Router, user: &str, text: &str) -> Vec<Value> {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/v1/chat/messages",
            Some(user),
            Some(json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["replies"].as_array().cloned().unwrap_or_default()
    }

    async fn become_teacher(app: &Router, user: &str) {
        let (status, body) = call(
            app,
            Method::PUT,
            "/api/v1/me/role",
            Some(user),
            Some(json!({ "role": "teacher", "password": "teach" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    async fn create_word(app: &Router, user: &str, body: Value) -> i64 {
        let (status, body) = call(app, Method::POST, "/api/v1/words", Some(user), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_needs_no_identity() {
        let app = create_test_app().await;
        let (status, body) = call(&app, Method::GET, "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn chat_requires_user_header() {
        let app = create_test_app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/chat/messages",
            None,
            Some(json!({ "text": "/start" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn wrong_teacher_password_is_rejected() {
        let app = create_test_app().await;
        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/v1/me/role",
            Some("t1"),
            Some(json!({ "role": "teacher", "password": "guess" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, me) = call(&app, Method::GET, "/api/v1/me", Some("t1"), None).await;
        assert_eq!(me["role"], Value::Null);
    }

    #[tokio::test]
    async fn students_cannot_create_teacher_words() {
        let app = create_test_app().await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/words",
            Some("s1"),
            Some(json!({ "text": "cat", "translation": "кот" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn teacher_word_drilled_over_chat() {
        let app = create_test_app().await;
        become_teacher(&app, "t1").await;
        create_word(&app, "t1", json!({ "text": "bird", "translation": "птица", "module": "1" })).await;

        chat(&app, "s1", "/flashcards").await;
        let replies = chat(&app, "s1", "all").await;
        assert!(replies
            .iter()
            .any(|r| r["kind"] == "card" && r["text"] == "птица" && r["is_question"] == true));

        let (_, snapshot) = call(&app, Method::GET, "/api/v1/me/drill", Some("s1"), None).await;
        assert_eq!(snapshot["phase"], "awaiting_answer");
        assert_eq!(snapshot["current_translation"], "птица");

        let replies = chat(&app, "s1", "Bird").await;
        assert_eq!(replies[0]["kind"], "text");
        assert!(replies[0]["text"].as_str().unwrap().starts_with("✅"));

        let (_, progress) = call(&app, Method::GET, "/api/v1/me/progress", Some("s1"), None).await;
        assert_eq!(progress["progress"][0]["correct_count"], 1);
        let word_id = progress["progress"][0]["word_id"].as_i64().unwrap();
        let (status, record) =
            call(&app, Method::GET, &format!("/api/v1/me/progress/{word_id}"), Some("s1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["incorrect_count"], 0);
        let (_, snapshot) = call(&app, Method::GET, "/api/v1/me/drill", Some("s1"), None).await;
        assert_eq!(snapshot["phase"], "idle");
    }

    #[tokio::test]
    async fn batch_upload_reports_failed_lines() {
        let app = create_test_app().await;
        become_teacher(&app, "t1").await;

        let text = "cat - кот - feline, kitty - 4\n\nbroken line\ndog - собака -  - all\nsun - солнце -  - 2";
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/words/batch",
            Some("t1"),
            Some(json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["added"], 2);
        assert_eq!(body["failed"], json!(["broken line", "dog - собака -  - all"]));

        let (_, modules) = call(&app, Method::GET, "/api/v1/modules", Some("s1"), None).await;
        assert_eq!(modules["modules"], json!(["2", "4"]));
    }

    #[tokio::test]
    async fn personal_words_stay_private() {
        let app = create_test_app().await;
        let (status, word) = call(
            &app,
            Method::POST,
            "/api/v1/me/words",
            Some("s1"),
            Some(json!({ "text": "apple", "translation": "яблоко" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = word["id"].as_i64().unwrap();

        let uri = format!("/api/v1/words/{id}");
        let (status, _) = call(&app, Method::GET, &uri, Some("s2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::GET, &uri, Some("s1"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/me/words/{id}"), Some("s1"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn edit_and_delete_follow_grants() {
        let app = create_test_app().await;
        become_teacher(&app, "t1").await;
        let id = create_word(&app, "t1", json!({ "text": "cat", "translation": "кот" })).await;
        let uri = format!("/api/v1/words/{id}");

        // 학생은 교사 단어를 볼 수 있지만 수정/삭제는 못 합니다.
        let (status, _) = call(&app, Method::PATCH, &uri, Some("s1"), Some(json!({ "translation": "кошка" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app, Method::DELETE, &uri, Some("s1"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/library/grants",
            Some("t1"),
            Some(json!({ "user_id": "s1", "word_id": id, "can_edit": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, word) = call(&app, Method::PATCH, &uri, Some("s1"), Some(json!({ "translation": "кошка" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(word["translation"], "кошка");

        let (_, library) = call(&app, Method::GET, "/api/v1/me/library", Some("s1"), None).await;
        assert_eq!(library["words"][0]["id"], id);

        let (status, _) = call(&app, Method::DELETE, &uri, Some("s1"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn synonyms_can_be_set_and_cleared() {
        let app = create_test_app().await;
        become_teacher(&app, "t1").await;
        let id = create_word(&app, "t1", json!({ "text": "cat", "translation": "кот" })).await;
        let uri = format!("/api/v1/words/{id}/synonyms");

        let (_, word) = call(&app, Method::PUT, &uri, Some("t1"), Some(json!({ "synonyms": "kitty ,feline" }))).await;
        assert_eq!(word["synonyms"], "kitty, feline");

        let (_, word) = call(&app, Method::PUT, &uri, Some("t1"), Some(json!({ "synonyms": "-" }))).await;
        assert_eq!(word["synonyms"], Value::Null);
    }

    #[tokio::test]
    async fn suggestion_is_404_without_words() {
        let app = create_test_app().await;
        let (status, _) = call(&app, Method::GET, "/api/v1/me/suggestion", Some("s1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        become_teacher(&app, "t1").await;
        let id = create_word(&app, "t1", json!({ "text": "cat", "translation": "кот", "module": "A" })).await;
        let (status, body) = call(&app, Method::GET, "/api/v1/me/suggestion?module=a", Some("s1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["word"]["id"], id);
        assert_eq!(body["weight"], 1);
    }

    #[tokio::test]
    async fn module_named_all_is_rejected() {
        let app = create_test_app().await;
        become_teacher(&app, "t1").await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/words",
            Some("t1"),
            Some(json!({ "text": "cat", "translation": "кот", "module": "All" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn queued_message_sees_role_changed_while_waiting() {
        let state = test_state().await;
        let app = Router::new().nest("/api/v1", api_router(state.clone()));
        chat(&app, "carol", "/start").await;

        // 앞선 메시지가 처리 중인 것처럼 잠금을 잡아 둡니다.
        let guard = state.user_locks.lock("carol").await;
        let pending = tokio::spawn({
            let app = app.clone();
            async move { chat(&app, "carol", "/help").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        crate::db::users::set_role(&state.pool, "carol", crate::models::Role::Teacher, None)
            .await
            .unwrap();
        drop(guard);

        let replies = pending.await.unwrap();
        assert!(replies[0]["text"].as_str().unwrap().contains("Teacher tools"));
    }
}
