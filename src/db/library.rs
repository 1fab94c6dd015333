use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// Grants `user_id` access to a word. Re-granting updates `can_edit`.
pub async fn grant(
    pool: &SqlitePool,
    user_id: &str,
    word_id: i64,
    can_edit: bool,
) -> Result<LibraryGrant, AppError> {
    sqlx::query(
        r#"
        INSERT INTO library_words (user_id, word_id, can_edit)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, word_id) DO UPDATE SET can_edit = excluded.can_edit
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .bind(can_edit)
    .execute(pool)
    .await?;

    let grant = sqlx::query_as::<_, LibraryGrant>(
        r#"
        SELECT user_id, word_id, can_edit, added_at
        FROM library_words
        WHERE user_id = ? AND word_id = ?
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .fetch_one(pool)
    .await?;

    Ok(grant)
}

pub async fn can_user_edit_word(
    pool: &SqlitePool,
    user_id: &str,
    word_id: i64,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM library_words WHERE user_id = ? AND word_id = ? AND can_edit = 1",
    )
    .bind(user_id)
    .bind(word_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Any grant, editable or not, makes the word visible to the user.
pub async fn has_grant(pool: &SqlitePool, user_id: &str, word_id: i64) -> Result<bool, AppError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM library_words WHERE user_id = ? AND word_id = ?")
            .bind(user_id)
            .bind(word_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// Words the user may edit through a grant.
pub async fn list_editable_words(pool: &SqlitePool, user_id: &str) -> Result<Vec<Word>, AppError> {
    let rows = sqlx::query_as::<_, WordRow>(
        r#"
        SELECT w.id, w.text, w.translation, w.part_of_speech, w.synonyms,
               w.added_by, w.owner_id, w.module, w.level, w.created_at, w.updated_at
        FROM library_words lw
        JOIN words w ON w.id = lw.word_id
        WHERE lw.user_id = ? AND lw.can_edit = 1
        ORDER BY w.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Word::try_from).collect()
}
