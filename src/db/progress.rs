//! # 학습 진도 장부(Progress Ledger) 쿼리 모듈
//!
//! `practice_progress` 테이블은 (user_id, word_id) 복합키로 한 행씩 가집니다.
//! 모든 쓰기는 이 키로 범위가 정해지므로 서로 다른 사용자의 드릴이 섞이지 않습니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::weighting;
use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

/// 채점 결과를 기록합니다.
///
/// 한 번의 UPSERT 문으로 처리하므로 원자적입니다:
/// - 행이 없으면 (정답이면 1/0, 오답이면 0/1)로 생성
/// - 행이 있으면 해당 카운터 하나만 +1
/// - 어느 쪽이든 `last_practiced`를 현재 시각으로 갱신
///
/// 단어가 이미 삭제되었다면 외래키 제약으로 실패합니다.
/// 드릴 엔진은 드릴 상태 저장과 같은 트랜잭션 안에서 호출합니다.
pub async fn record_outcome<'e, E>(
    executor: E,
    user_id: &str,
    word_id: i64,
    is_correct: bool,
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (correct, incorrect): (i64, i64) = if is_correct { (1, 0) } else { (0, 1) };
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

    sqlx::query(
        r#"
        INSERT INTO practice_progress (user_id, word_id, correct_count, incorrect_count, last_practiced)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, word_id) DO UPDATE SET
            correct_count = correct_count + excluded.correct_count,
            incorrect_count = incorrect_count + excluded.incorrect_count,
            last_practiced = excluded.last_practiced
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .bind(correct)
    .bind(incorrect)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// (user, word) 한 쌍의 진도 기록
pub async fn get_progress(
    pool: &SqlitePool,
    user_id: &str,
    word_id: i64,
) -> Result<Option<ProgressRecord>, AppError> {
    let record = sqlx::query_as::<_, ProgressRecord>(
        r#"
        SELECT user_id, word_id, correct_count, incorrect_count, last_practiced
        FROM practice_progress
        WHERE user_id = ? AND word_id = ?
        "#,
    )
    .bind(user_id)
    .bind(word_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// 사용자의 모든 진도 기록 (최근 학습순)
pub async fn list_progress(pool: &SqlitePool, user_id: &str) -> Result<Vec<ProgressRecord>, AppError> {
    let records = sqlx::query_as::<_, ProgressRecord>(
        r#"
        SELECT user_id, word_id, correct_count, incorrect_count, last_practiced
        FROM practice_progress
        WHERE user_id = ?
        ORDER BY last_practiced DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// 사용자에게 보이는 단어마다 누적 카운터를 가중치로 바꿔 반환합니다.
///
/// 진도 기록이 없는 단어는 `LEFT JOIN` + `IFNULL`로 0/0 → 가중치 1이 됩니다.
pub async fn get_weights(
    pool: &SqlitePool,
    user_id: &str,
    module: Option<&str>,
) -> Result<Vec<WeightedWord>, AppError> {
    let rows = sqlx::query_as::<_, WordWithCountsRow>(
        r#"
        SELECT w.id, w.text, w.translation, w.part_of_speech, w.synonyms,
               w.added_by, w.owner_id, w.module, w.level, w.created_at, w.updated_at,
               IFNULL(p.correct_count, 0) AS correct_count,
               IFNULL(p.incorrect_count, 0) AS incorrect_count
        FROM words w
        LEFT JOIN practice_progress p ON p.word_id = w.id AND p.user_id = ?
        WHERE w.added_by = 'teacher'
           OR w.owner_id = ?
           OR EXISTS (
                SELECT 1 FROM library_words lw
                WHERE lw.word_id = w.id AND lw.user_id = ?
           )
        ORDER BY w.id
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut weighted = Vec::with_capacity(rows.len());
    for row in rows {
        let word = Word::try_from(row.word)?;
        if let Some(filter) = module {
            if !word.in_module(filter) {
                continue;
            }
        }
        weighted.push(WeightedWord {
            weight: weighting::word_weight(row.correct_count, row.incorrect_count),
            correct_count: row.correct_count,
            incorrect_count: row.incorrect_count,
            word,
        });
    }

    Ok(weighted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;
    use crate::db::{create_word, users};

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        users::get_or_create_user(pool, "teacher").await.unwrap();
        users::get_or_create_user(pool, "alice").await.unwrap();
        let mut cat = NewWord::new("cat", "кот").unwrap();
        cat.module = Some("Animals".to_string());
        let mut red = NewWord::new("red", "красный").unwrap();
        red.module = Some("Colors".to_string());
        let cat = create_word(pool, "teacher", Author::Teacher, &cat).await.unwrap();
        let red = create_word(pool, "teacher", Author::Teacher, &red).await.unwrap();
        (cat.id, red.id)
    }

    #[tokio::test]
    async fn outcomes_increment_exactly_one_counter() {
        let pool = test_pool().await;
        let (cat, _) = seed(&pool).await;

        record_outcome(&pool, "alice", cat, true).await.unwrap();
        let first = get_progress(&pool, "alice", cat).await.unwrap().unwrap();
        assert_eq!((first.correct_count, first.incorrect_count), (1, 0));

        record_outcome(&pool, "alice", cat, false).await.unwrap();
        record_outcome(&pool, "alice", cat, false).await.unwrap();
        let record = get_progress(&pool, "alice", cat).await.unwrap().unwrap();
        assert_eq!((record.correct_count, record.incorrect_count), (1, 2));
        assert!(record.last_practiced >= first.last_practiced);
    }

    #[tokio::test]
    async fn weights_follow_the_counters() {
        let pool = test_pool().await;
        let (cat, red) = seed(&pool).await;
        for _ in 0..3 {
            record_outcome(&pool, "alice", cat, false).await.unwrap();
        }
        record_outcome(&pool, "alice", red, true).await.unwrap();

        let weights = get_weights(&pool, "alice", None).await.unwrap();
        let weight_of = |id: i64| weights.iter().find(|w| w.word.id == id).unwrap().weight;
        assert_eq!(weight_of(cat), 4);
        assert_eq!(weight_of(red), 1);

        // 다른 사용자의 기록은 섞이지 않습니다.
        let fresh = get_weights(&pool, "bob", None).await.unwrap();
        assert!(fresh.iter().all(|w| w.weight == 1 && w.incorrect_count == 0));
    }

    #[tokio::test]
    async fn weights_respect_module_filter() {
        let pool = test_pool().await;
        let (cat, _) = seed(&pool).await;

        let weights = get_weights(&pool, "alice", Some("animals")).await.unwrap();
        assert_eq!(weights.len(), 1);
        assert_eq!(weights[0].word.id, cat);
    }
}
