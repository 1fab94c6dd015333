//! # 단어(Word) 모델 정의
//!
//! 어휘 카탈로그의 데이터 구조체들입니다.
//!
//! ## 구조체 역할
//! - `WordRow`: DB의 `words` 테이블 한 행을 그대로 받는 구조체 (문자열 그대로)
//! - `Word`: 검증을 거친 도메인 엔티티. 작성자 구분과 레벨이 열거형으로 바뀝니다.
//! - `NewWord`: 생성 직전의 검증된 입력. 생성자에서 불변식(빈 문자열 금지 등)을 검사합니다.
//! - `CreateWordRequest` / `UpdateWordRequest` / `SynonymsRequest` / `BatchUploadRequest`:
//!   클라이언트가 보내는 JSON 본문

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// "모든 모듈"을 뜻하는 모듈 필터 토큰.
///
/// 실제 모듈 이름으로는 쓸 수 없습니다 (`validate_module`이 거부).
pub const ALL_MODULES: &str = "all";

/// 단어를 누가 만들었는지: 가시성 규칙을 결정합니다.
///
/// - `Teacher`: 모든 사용자에게 보임
/// - `Student`: 작성한 학생(또는 권한을 받은 사용자)에게만 보임
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    Teacher,
    Student,
}

impl Author {
    /// DB에 저장되는 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::Teacher => "teacher",
            Author::Student => "student",
        }
    }
}

impl FromStr for Author {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Author::Teacher),
            "student" => Ok(Author::Student),
            other => Err(AppError::Internal(format!("Unknown word author: {other}"))),
        }
    }
}

/// 난이도 레벨. 허용값은 A1, A2, B1 세 가지뿐입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Level {
    #[default]
    A1,
    A2,
    B1,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = AppError;

    /// 대소문자와 앞뒤 공백을 무시합니다. ("a2 " → A2)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            _ => Err(AppError::BadRequest(
                "Level must be one of A1, A2, B1".to_string(),
            )),
        }
    }
}

/// 단어 엔티티: 검증된 `words` 테이블 한 행
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// 단어 고유 식별자 (INTEGER AUTOINCREMENT)
    pub id: i64,
    /// 학습 대상 원문 (예: "cat"). 드릴에서는 정답이 됩니다.
    pub text: String,
    /// 번역 (예: "кот"). 드릴에서는 문제로 보여집니다.
    pub translation: String,
    pub part_of_speech: Option<String>,
    /// 쉼표로 구분된 동의어 목록 (예: "feline, kitty")
    pub synonyms: Option<String>,
    pub added_by: Author,
    /// 단어를 만든 사용자 ID
    pub owner_id: String,
    pub module: Option<String>,
    pub level: Option<Level>,
    pub created_at: String,
    pub updated_at: String,
}

impl Word {
    /// 동의어 필드를 쉼표로 나눠 앞뒤 공백을 제거한 목록으로 반환합니다.
    /// 빈 항목은 버립니다.
    pub fn synonym_list(&self) -> Vec<String> {
        split_synonyms(self.synonyms.as_deref())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// 모듈 필터와 대소문자 구분 없이 일치하는지 확인합니다.
    ///
    /// SQLite의 `LOWER()`는 ASCII만 처리하므로 (키릴 문자 모듈명 등)
    /// 비교는 Rust 쪽에서 합니다.
    pub fn in_module(&self, filter: &str) -> bool {
        self.module
            .as_deref()
            .map(|m| m.trim().to_lowercase() == filter.trim().to_lowercase())
            .unwrap_or(false)
    }
}

/// 쉼표로 구분된 동의어 문자열을 목록으로 나눕니다.
pub fn split_synonyms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// DB `words` 테이블의 원시 행: `sqlx::FromRow`로 자동 매핑됩니다.
///
/// 열거형 컬럼(added_by, level)은 문자열로 받은 뒤
/// `TryFrom<WordRow> for Word`에서 검증합니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WordRow {
    pub id: i64,
    pub text: String,
    pub translation: String,
    pub part_of_speech: Option<String>,
    pub synonyms: Option<String>,
    pub added_by: String,
    pub owner_id: String,
    pub module: Option<String>,
    pub level: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<WordRow> for Word {
    type Error = AppError;

    fn try_from(row: WordRow) -> Result<Self, Self::Error> {
        if row.text.trim().is_empty() || row.translation.trim().is_empty() {
            return Err(AppError::Internal(format!(
                "Word {} has an empty text or translation",
                row.id
            )));
        }

        // .transpose(): Option<Result<T, E>> → Result<Option<T>, E>
        let level = row
            .level
            .as_deref()
            .map(Level::from_str)
            .transpose()
            .map_err(|_| AppError::Internal(format!("Word {} has an invalid level", row.id)))?;

        Ok(Word {
            id: row.id,
            text: row.text,
            translation: row.translation,
            part_of_speech: row.part_of_speech,
            synonyms: row.synonyms,
            added_by: row.added_by.parse()?,
            owner_id: row.owner_id,
            module: row.module,
            level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 검증을 통과한 새 단어 입력
///
/// 생성자(`new`, `from_request`, `from_batch_line`)만으로 만들 수 있으므로
/// `NewWord`가 존재한다는 것 자체가 불변식이 지켜졌다는 뜻입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWord {
    pub text: String,
    pub translation: String,
    pub part_of_speech: Option<String>,
    pub synonyms: Option<String>,
    pub module: Option<String>,
    pub level: Option<Level>,
}

impl NewWord {
    /// 원문과 번역만으로 단어를 만듭니다. 둘 다 비어 있으면 안 됩니다.
    pub fn new(text: &str, translation: &str) -> Result<Self, AppError> {
        let text = text.trim();
        let translation = translation.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Word text must not be empty".to_string()));
        }
        if translation.is_empty() {
            return Err(AppError::BadRequest(
                "Translation must not be empty".to_string(),
            ));
        }

        Ok(Self {
            text: text.to_string(),
            translation: translation.to_string(),
            part_of_speech: None,
            synonyms: None,
            module: None,
            level: None,
        })
    }

    pub fn from_request(req: &CreateWordRequest) -> Result<Self, AppError> {
        let mut word = Self::new(&req.text, &req.translation)?;
        word.part_of_speech = non_blank(req.part_of_speech.as_deref());
        word.synonyms = normalize_synonyms(req.synonyms.as_deref());
        word.module = validate_module(req.module.as_deref())?;
        word.level = req.level.as_deref().map(Level::from_str).transpose()?;
        Ok(word)
    }

    /// 일괄 등록 형식의 한 줄을 파싱합니다.
    ///
    /// 형식: `단어 - 번역 - 동의어 - 모듈`
    /// 예: `cat - кот - feline, kitty - 4`
    ///
    /// 칸 구분자는 공백으로 둘러싼 ` - `이므로 `check-in` 같은 하이픈 단어도 그대로 둡니다.
    /// 동의어 칸은 비워 둘 수 있지만(`cat - кот -  - 4`), 네 칸이 모두 있어야 하고
    /// 모듈은 비면 안 됩니다.
    /// 레벨은 A1로 등록됩니다.
    pub fn from_batch_line(line: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = line.split(" - ").map(str::trim).collect();
        if parts.len() != 4 {
            return Err(AppError::BadRequest(format!(
                "Expected `word - translation - synonyms - module`, got: {line}"
            )));
        }

        let mut word = Self::new(parts[0], parts[1])?;
        word.synonyms = normalize_synonyms(Some(parts[2]));
        word.module = validate_module(Some(parts[3]))?;
        if word.module.is_none() {
            return Err(AppError::BadRequest(format!("Missing module in line: {line}")));
        }
        word.level = Some(Level::A1);
        Ok(word)
    }
}

/// 공백뿐인 문자열은 None으로 취급합니다.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 동의어 입력을 `a, b, c` 형태로 정리합니다. `-`나 빈 값은 "동의어 없음"입니다.
pub fn normalize_synonyms(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        None | Some("") | Some("-") => None,
        Some(list) => {
            let items = split_synonyms(Some(list));
            if items.is_empty() {
                None
            } else {
                Some(items.join(", "))
            }
        }
    }
}

/// 모듈 이름을 정리하고, "모든 모듈" 토큰과 겹치는 이름을 거부합니다.
pub fn validate_module(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match non_blank(raw) {
        Some(module) if module.eq_ignore_ascii_case(ALL_MODULES) => Err(AppError::BadRequest(
            format!("`{ALL_MODULES}` is reserved and cannot be used as a module name"),
        )),
        other => Ok(other),
    }
}

/// 모듈 필터 문자열을 해석합니다. "all"(대소문자 무관)이나 빈 값은 필터 없음(None)입니다.
pub fn module_filter(raw: Option<&str>) -> Option<String> {
    non_blank(raw).filter(|m| !m.eq_ignore_ascii_case(ALL_MODULES))
}

/// 단어 생성 요청: `POST /api/v1/words`, `POST /api/v1/me/words`의 본문
#[derive(Debug, Deserialize)]
pub struct CreateWordRequest {
    pub text: String,
    pub translation: String,
    pub part_of_speech: Option<String>,
    pub synonyms: Option<String>,
    pub module: Option<String>,
    pub level: Option<String>,
}

/// 단어 수정 요청: `PATCH /api/v1/words/{id}`
///
/// PATCH이므로 모든 필드가 Option입니다. 빠진 필드는 그대로 유지됩니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWordRequest {
    pub text: Option<String>,
    pub translation: Option<String>,
    pub part_of_speech: Option<String>,
    pub module: Option<String>,
    pub level: Option<String>,
}

/// 동의어 교체 요청: `PUT /api/v1/words/{id}/synonyms`. `"-"`는 동의어 삭제입니다.
#[derive(Debug, Deserialize)]
pub struct SynonymsRequest {
    pub synonyms: String,
}

/// 일괄 등록 요청: 한 줄에 한 단어
#[derive(Debug, Deserialize)]
pub struct BatchUploadRequest {
    pub text: String,
}

/// 일괄 등록 결과
#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    pub added: usize,
    /// 형식이 잘못되어 건너뛴 줄들
    pub failed: Vec<String>,
}

/// `?module=` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct ModuleQuery {
    pub module: Option<String>,
}
