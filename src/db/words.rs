//! # 단어 데이터베이스 쿼리 모듈
//!
//! 어휘 카탈로그(`words` 테이블)의 CRUD와 가시성 규칙을 담당합니다.
//!
//! ## 가시성 규칙
//! 사용자 U에게 보이는 단어는 다음 중 하나입니다.
//! - 교사가 만든 단어 (`added_by = 'teacher'`)
//! - U가 직접 만든 단어 (`owner_id = U`)
//! - U가 라이브러리 권한을 받은 단어 (`library_words`)

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// `words w` 별칭 기준으로 `WordRow`에 매핑되는 컬럼 목록
const WORD_COLUMNS: &str = "w.id, w.text, w.translation, w.part_of_speech, w.synonyms, \
     w.added_by, w.owner_id, w.module, w.level, w.created_at, w.updated_at";

/// 원시 행들을 검증된 `Word` 목록으로 바꿉니다.
/// 한 행이라도 검증에 실패하면 전체가 에러입니다.
fn into_words(rows: Vec<WordRow>) -> Result<Vec<Word>, AppError> {
    rows.into_iter().map(Word::try_from).collect()
}

/// 사용자에게 보이는 단어를 조회합니다. `module`이 있으면 대소문자 구분 없이 거릅니다.
///
/// 모듈 비교는 `Word::in_module()`에서 Rust로 합니다 (유니코드 대소문자 처리).
pub async fn list_visible_words(
    pool: &SqlitePool,
    user_id: &str,
    module: Option<&str>,
) -> Result<Vec<Word>, AppError> {
    let sql = format!(
        r#"
        SELECT {WORD_COLUMNS}
        FROM words w
        WHERE w.added_by = 'teacher'
           OR w.owner_id = ?
           OR EXISTS (
                SELECT 1 FROM library_words lw
                WHERE lw.word_id = w.id AND lw.user_id = ?
           )
        ORDER BY w.id
        "#
    );

    let rows = sqlx::query_as::<_, WordRow>(&sql)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    let words = into_words(rows)?;
    Ok(match module {
        Some(filter) => words.into_iter().filter(|w| w.in_module(filter)).collect(),
        None => words,
    })
}

/// 학생 개인 사전: 본인이 만든 학생 단어만
pub async fn list_personal_words(pool: &SqlitePool, user_id: &str) -> Result<Vec<Word>, AppError> {
    let sql = format!(
        r#"
        SELECT {WORD_COLUMNS}
        FROM words w
        WHERE w.added_by = 'student' AND w.owner_id = ?
        ORDER BY w.id
        "#
    );
    let rows = sqlx::query_as::<_, WordRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    into_words(rows)
}

/// ID로 단어 하나를 조회합니다.
pub async fn get_word(pool: &SqlitePool, id: i64) -> Result<Option<Word>, AppError> {
    let sql = format!("SELECT {WORD_COLUMNS} FROM words w WHERE w.id = ?");
    let row = sqlx::query_as::<_, WordRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Word::try_from).transpose()
}

/// 새 단어를 저장하고 저장된 단어를 반환합니다.
///
/// `NewWord`는 생성자에서 이미 검증되었으므로 여기서는 그대로 INSERT 합니다.
pub async fn create_word(
    pool: &SqlitePool,
    owner_id: &str,
    author: Author,
    word: &NewWord,
) -> Result<Word, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO words (text, translation, part_of_speech, synonyms, added_by, owner_id, module, level)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&word.text)
    .bind(&word.translation)
    .bind(&word.part_of_speech)
    .bind(&word.synonyms)
    .bind(author.as_str())
    .bind(owner_id)
    .bind(&word.module)
    .bind(word.level.map(|l| l.as_str()))
    .execute(pool)
    .await?;

    // last_insert_rowid(): AUTOINCREMENT로 방금 부여된 ID
    let id = result.last_insert_rowid();
    get_word(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created word".to_string()))
}

/// 단어를 부분 업데이트합니다 (PATCH).
///
/// 먼저 모든 필드를 검증한 뒤 한 번의 UPDATE로 반영합니다.
/// `COALESCE(?, column)`: 바인딩 값이 NULL이면 기존 값을 유지합니다.
///
/// ## 반환값
/// - `Ok(Some(Word))`: 업데이트된 단어
/// - `Ok(None)`: 해당 ID의 단어가 없음
pub async fn update_word(
    pool: &SqlitePool,
    id: i64,
    req: &UpdateWordRequest,
) -> Result<Option<Word>, AppError> {
    let text = match req.text.as_deref() {
        Some(t) => Some(non_blank(Some(t)).ok_or_else(|| {
            AppError::BadRequest("Word text must not be empty".to_string())
        })?),
        None => None,
    };
    let translation = match req.translation.as_deref() {
        Some(t) => Some(non_blank(Some(t)).ok_or_else(|| {
            AppError::BadRequest("Translation must not be empty".to_string())
        })?),
        None => None,
    };
    let module = validate_module(req.module.as_deref())?;
    let level = req
        .level
        .as_deref()
        .map(str::parse::<Level>)
        .transpose()?;
    let part_of_speech = non_blank(req.part_of_speech.as_deref());

    let result = sqlx::query(
        r#"
        UPDATE words
        SET text = COALESCE(?, text),
            translation = COALESCE(?, translation),
            part_of_speech = COALESCE(?, part_of_speech),
            module = COALESCE(?, module),
            level = COALESCE(?, level),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(text)
    .bind(translation)
    .bind(part_of_speech)
    .bind(module)
    .bind(level.map(|l| l.as_str()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_word(pool, id).await
}

/// 동의어 목록을 교체합니다. `None`이면 동의어를 지웁니다.
pub async fn set_synonyms(
    pool: &SqlitePool,
    id: i64,
    synonyms: Option<&str>,
) -> Result<Option<Word>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE words
        SET synonyms = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(synonyms)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_word(pool, id).await
}

/// 단어를 삭제합니다. 권한 검사는 호출하는 쪽(라우트)에서 합니다.
///
/// `ON DELETE CASCADE`로 진도 기록과 라이브러리 권한도 함께 지워집니다.
pub async fn delete_word(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM words WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 사용자에게 보이는 단어들의 모듈 이름 목록 (중복 제거, 정렬)
pub async fn list_modules(pool: &SqlitePool, user_id: &str) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT TRIM(w.module)
        FROM words w
        WHERE w.module IS NOT NULL AND TRIM(w.module) != ''
          AND (w.added_by = 'teacher'
               OR w.owner_id = ?
               OR EXISTS (
                    SELECT 1 FROM library_words lw
                    WHERE lw.word_id = w.id AND lw.user_id = ?
               ))
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(m,)| m).collect())
}
