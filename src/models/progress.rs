//! # 학습 진도 모델 정의
//!
//! - `ProgressRecord`: `practice_progress` 테이블 한 행. (user, word)마다 하나.
//! - `WeightedWord`: 진도 카운터를 가중치 함수에 통과시킨 결과
//! - `LibraryGrant`: 소유권 외의 편집 권한 (`library_words` 테이블)

use crate::models::word::{Word, WordRow};
use serde::{Deserialize, Serialize};

/// 학습 진도 레코드
///
/// 처음 채점될 때 생성되고, 이후 카운터는 증가만 합니다 (감소/삭제 없음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProgressRecord {
    pub user_id: String,
    pub word_id: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    /// 마지막 채점 시각 (ISO 8601, UTC)
    pub last_practiced: String,
}

/// 가중치가 붙은 단어: `GET /api/v1/me/weighted-words`의 항목
#[derive(Debug, Clone, Serialize)]
pub struct WeightedWord {
    pub word: Word,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub weight: u64,
}

/// 단어 행 + 해당 사용자의 카운터 (진도가 없으면 0)
///
/// `#[sqlx(flatten)]`: 단어 컬럼들을 `WordRow`로 묶어 매핑합니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WordWithCountsRow {
    #[sqlx(flatten)]
    pub word: WordRow,
    pub correct_count: i64,
    pub incorrect_count: i64,
}

/// 라이브러리 권한: 사용자가 편집할 수 있는 단어
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LibraryGrant {
    pub user_id: String,
    pub word_id: i64,
    pub can_edit: bool,
    pub added_at: String,
}

/// 권한 부여 요청: `POST /api/v1/library/grants`
#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: String,
    pub word_id: i64,
    /// 생략하면 편집 가능(true)으로 부여합니다.
    pub can_edit: Option<bool>,
}
