//! # Dori 웹 서버 진입점
//!
//! 교사가 어휘를 관리하고 학생이 플래시카드 드릴로 연습하는 서비스의 **시작점(entry point)**입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 교사 비밀번호 해시 결정
//! 4. SQLite 데이터베이스 연결 풀 생성
//! 5. 데이터베이스 마이그레이션 실행
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작

// ── 모듈 선언 ──
// Rust에서는 파일 시스템 구조가 곧 모듈 구조입니다.
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use anyhow::Result; // main에서만 쓰는 범용 Result 타입
use axum::Router;
use config::Config;
use routes::AppState;
use services::user_locks::UserLocks;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer}, // CORS(Cross-Origin Resource Sharing) 설정
    trace::TraceLayer,      // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 dori, tower_http, axum 모듈을 debug 레벨로 봅니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dori=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Dori server on {}:{}", config.host, config.port);

    // 평문 비밀번호(TEACHER_PASS)는 여기서 한 번 해싱하고 버립니다.
    let teacher_password_hash = middleware::auth::resolve_teacher_hash(&config)?;

    // ── 4단계: SQLite 연결 풀 생성 ──
    // create_if_missing: DB 파일이 없으면 새로 만듭니다.
    // foreign_keys: 단어 삭제 시 진도/권한 행이 함께 지워지도록 외래키를 켭니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 애플리케이션 상태(State) 생성 ──
    // SqlitePool과 Arc는 clone해도 같은 대상을 가리킵니다.
    let state = AppState {
        pool,
        teacher_password_hash,
        user_locks: Arc::new(UserLocks::new()),
    };

    // ── 7단계: 라우터와 미들웨어 ──
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // 예: /chat/messages → /api/v1/chat/messages
        .nest("/api/v1", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
