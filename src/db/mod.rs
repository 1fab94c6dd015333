//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 서비스(services/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `drills`: 사용자별 드릴 상태 저장소
//! - `library`: 라이브러리(편집 권한) 쿼리
//! - `progress`: 학습 진도 장부와 가중치 조회
//! - `users`: 사용자 세션(역할/레벨) 쿼리
//! - `words`: 단어 CRUD와 가시성 규칙

pub mod drills;
pub mod library;
pub mod progress;
pub mod users;
pub mod words;

// `crate::db::list_visible_words`처럼 바로 접근할 수 있게 재공개합니다.
// users는 이름이 겹치지 않도록 `db::users::...`로 씁니다.
pub use drills::*;
pub use library::*;
pub use progress::*;
pub use words::*;

#[cfg(test)]
pub mod testing {
    //! 테스트용 인메모리 SQLite 풀

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    /// 실제 마이그레이션을 적용한 인메모리 DB를 만듭니다.
    ///
    /// 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정하고,
    /// 그 연결이 닫히지 않도록 idle/lifetime 제한을 끕니다.
    pub async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations apply");
        pool
    }
}
