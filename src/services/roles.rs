use sqlx::SqlitePool;

use crate::db::users as db_users;
use crate::error::AppError;
use crate::middleware::auth::verify_password;
use crate::models::user::{Role, UserSession};
use crate::models::word::Level;

/// Sets the user's role.
///
/// - teacher: `password` must match the configured teacher hash. A wrong
///   password leaves the stored role untouched.
/// - student: `level` (A1, A2 or B1) is required and stored with the role.
pub async fn select_role(
    pool: &SqlitePool,
    teacher_hash: &str,
    user_id: &str,
    role: Role,
    password: Option<&str>,
    level: Option<&str>,
) -> Result<UserSession, AppError> {
    match role {
        Role::Teacher => {
            let password = password
                .filter(|p| !p.is_empty())
                .ok_or(AppError::BadRequest("Teacher password is required".to_string()))?;
            if !verify_password(password, teacher_hash)? {
                tracing::warn!(user_id, "rejected teacher password");
                return Err(AppError::Unauthorized("Wrong teacher password".to_string()));
            }
            let user = db_users::set_role(pool, user_id, Role::Teacher, None).await?;
            tracing::info!(user_id, "role set to teacher");
            Ok(user)
        }
        Role::Student => {
            let level: Level = level
                .ok_or(AppError::BadRequest(
                    "Level is required for students (A1, A2, B1)".to_string(),
                ))?
                .parse()?;
            let user = db_users::set_role(pool, user_id, Role::Student, Some(level)).await?;
            tracing::info!(user_id, %level, "role set to student");
            Ok(user)
        }
    }
}
