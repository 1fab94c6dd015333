use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rand_core::OsRng;

use crate::config::Config;
use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::user::UserSession;
use crate::routes::words::AppState;

/// Header the chat transport uses to forward the sender's identity.
pub const USER_ID_HEADER: &str = "x-user-id";

const MAX_USER_ID_LEN: usize = 128;

/// The user behind the current request. Created on first contact.
#[derive(Debug, Clone)]
pub struct ChatUser {
    pub user: UserSession,
}

impl ChatUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }
}

impl FromRequestParts<AppState> for ChatUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::Unauthorized(format!(
                "`{USER_ID_HEADER}` header is required"
            )))?;

        if user_id.len() > MAX_USER_ID_LEN {
            return Err(AppError::BadRequest("User id is too long".to_string()));
        }

        let user = db_users::get_or_create_user(&state.pool, user_id).await?;
        Ok(ChatUser { user })
    }
}

/// Hashes a password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Picks the teacher password hash at start-up.
///
/// `TEACHER_PASSWORD_HASH` wins; otherwise `TEACHER_PASS` is hashed once here
/// so the plain text never lives in `AppState`.
pub fn resolve_teacher_hash(config: &Config) -> Result<String, AppError> {
    if let Some(hash) = &config.teacher_password_hash {
        PasswordHash::new(hash).map_err(|e| {
            AppError::Internal(format!("TEACHER_PASSWORD_HASH is not a valid PHC string: {}", e))
        })?;
        return Ok(hash.clone());
    }

    match &config.teacher_pass {
        Some(pass) => hash_password(pass),
        None => Err(AppError::Internal(
            "TEACHER_PASSWORD_HASH or TEACHER_PASS must be set".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(hash: Option<&str>, pass: Option<&str>) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            teacher_password_hash: hash.map(str::to_string),
            teacher_pass: pass.map(str::to_string),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    #[test]
    fn verifies_only_the_right_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("S3cret", &hash).unwrap());
    }

    #[test]
    fn stored_hash_takes_precedence() {
        let hash = hash_password("from-hash").unwrap();
        let resolved = resolve_teacher_hash(&config(Some(&hash), Some("from-plain"))).unwrap();
        assert!(verify_password("from-hash", &resolved).unwrap());
        assert!(!verify_password("from-plain", &resolved).unwrap());
    }

    #[test]
    fn plain_password_is_hashed() {
        let resolved = resolve_teacher_hash(&config(None, Some("plain"))).unwrap();
        assert_ne!(resolved, "plain");
        assert!(verify_password("plain", &resolved).unwrap());
    }

    #[test]
    fn missing_or_invalid_settings_are_rejected() {
        assert!(resolve_teacher_hash(&config(None, None)).is_err());
        assert!(resolve_teacher_hash(&config(Some("not-a-hash"), None)).is_err());
    }
}
