//! # 드릴 상태 저장소
//!
//! 사용자별 드릴 상태를 JSON 문자열로 `drill_sessions` 테이블에 보관합니다.
//! 행이 없으면 그 사용자는 IDLE 상태입니다.
//!
//! 프로세스가 재시작되어도 같은 행을 다시 읽으므로 드릴이 그대로 이어집니다.
//! JSON 해석은 `services::session_queue::DrillState`가 담당합니다.

use crate::error::AppError;
use sqlx::{Executor, Sqlite, SqlitePool};

/// 저장된 드릴 상태(JSON)를 읽습니다. 없으면 None (IDLE).
pub async fn get_drill_state(pool: &SqlitePool, user_id: &str) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT state FROM drill_sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(state,)| state))
}

/// 드릴 상태를 저장(덮어쓰기)합니다.
///
/// 풀(`&SqlitePool`)이나 트랜잭션(`&mut *tx`) 어느 쪽이든 받습니다.
pub async fn save_drill_state<'e, E>(executor: E, user_id: &str, state: &str) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO drill_sessions (user_id, state)
        VALUES (?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            state = excluded.state,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(user_id)
    .bind(state)
    .execute(executor)
    .await?;

    Ok(())
}

/// 드릴 상태를 지웁니다 (완료, 중단, 손상 복구). 지운 행이 있었으면 true.
pub async fn clear_drill_state<'e, E>(executor: E, user_id: &str) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM drill_sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
