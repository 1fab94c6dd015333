use crate::error::AppError;
use crate::models::word::Level;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            _ => Err(AppError::BadRequest(
                "Role must be `teacher` or `student`".to_string(),
            )),
        }
    }
}

/// One record per chat identity. `role` stays `None` until the user picks one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSession {
    pub id: String,
    pub role: Option<Role>,
    pub level: Level,
    pub created_at: String,
    pub updated_at: String,
}

impl UserSession {
    pub fn is_teacher(&self) -> bool {
        self.role == Some(Role::Teacher)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub role: Option<String>,
    pub level: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<UserRow> for UserSession {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .as_deref()
            .map(Role::from_str)
            .transpose()
            .map_err(|_| AppError::Internal(format!("User {} has an invalid role", row.id)))?;
        let level = row
            .level
            .parse()
            .map_err(|_| AppError::Internal(format!("User {} has an invalid level", row.id)))?;

        Ok(UserSession {
            id: row.id,
            role,
            level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectRoleRequest {
    pub role: String,
    /// Required for `teacher`.
    pub password: Option<String>,
    /// Required for `student`.
    pub level: Option<String>,
}
