use crate::error::AppError;
use crate::models::user::{Role, UserRow, UserSession};
use crate::models::word::Level;
use sqlx::SqlitePool;

/// Returns the user's session, creating it on first contact.
pub async fn get_or_create_user(pool: &SqlitePool, id: &str) -> Result<UserSession, AppError> {
    sqlx::query("INSERT OR IGNORE INTO users (id) VALUES (?)")
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<UserSession>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, role, level, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(UserSession::try_from).transpose()
}

pub async fn set_role(
    pool: &SqlitePool,
    id: &str,
    role: Role,
    level: Option<Level>,
) -> Result<UserSession, AppError> {
    match level {
        Some(level) => {
            sqlx::query(
                r#"
                UPDATE users
                SET role = ?, level = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ?
                "#,
            )
            .bind(role.as_str())
            .bind(level.as_str())
            .bind(id)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                UPDATE users
                SET role = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ?
                "#,
            )
            .bind(role.as_str())
            .bind(id)
            .execute(pool)
            .await?;
        }
    }

    find_by_id(pool, id).await?.ok_or(AppError::NotFound)
}
