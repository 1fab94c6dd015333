//! # 드릴 엔진
//!
//! 사용자 한 명의 플래시카드 드릴을 상태 기계로 진행합니다.
//!
//! ## 상태 전이
//! - `start_drill`: IDLE(또는 진행 중) → SELECTING_MODULE, 모듈 필터를 묻습니다.
//! - `select_module`: SELECTING_MODULE → AWAITING_ANSWER. 후보 단어가 없으면 IDLE.
//! - `answer`: AWAITING_ANSWER에서 채점 → 다음 카드 또는 완료(IDLE)
//! - `stop`: 어느 상태에서든 IDLE
//!
//! ## 에러 처리
//! `DrillError` 중 세 가지는 여기서 복구하고 사용자에게 안내 메시지를 보냅니다.
//! 저장소 실패(`Persistence`)만 `AppError`로 호출자에게 전파됩니다.
//!
//! 예외: 채점 후 진도 기록이 실패해도 채점 결과는 그대로 보여주고,
//! 실패는 `tracing::error!`로 따로 남깁니다. 드릴은 계속됩니다.
//!
//! 응답 하나의 진도 기록과 드릴 상태 저장은 한 트랜잭션으로 커밋됩니다.
//!
//! 같은 사용자의 응답은 호출하는 쪽(`services::chat`)에서 사용자별 잠금으로 직렬화합니다.

use crate::db;
use crate::error::{AppError, DrillError};
use crate::models::drill::{Card, DrillSnapshot, Prompt};
use crate::models::word::{module_filter, ALL_MODULES};
use crate::services::grading::{self, Verdict};
use crate::services::session_queue::{DrillSession, DrillState};
use rand::Rng;
use sqlx::{Connection, Executor, Sqlite, SqlitePool};

/// 카드 한 장을 문제로 보여줍니다 (번역만 공개).
pub fn present(card: &Card) -> Vec<Prompt> {
    vec![
        Prompt::question_card(card.translation.clone()),
        Prompt::text(format!(
            "Translate into English: {}\n(/stopcard to stop)",
            card.translation
        )),
    ]
}

/// 드릴을 시작합니다. 진행 중인 드릴이 있으면 버리고 새로 시작합니다.
pub async fn start_drill(pool: &SqlitePool, user_id: &str) -> Result<Vec<Prompt>, AppError> {
    save(pool, user_id, &DrillState::SelectingModule).await?;
    tracing::info!(user_id, "drill started, waiting for module filter");

    Ok(vec![Prompt::text(format!(
        "Which module do you want to practice? Send a module number/name or `{ALL_MODULES}` for every word."
    ))])
}

/// 모듈 필터 응답을 받아 카드 큐를 만듭니다.
///
/// `rng`는 큐를 섞는 데만 씁니다. 테스트에서는 시드를 고정한 RNG를 넘깁니다.
pub async fn select_module<R>(
    pool: &SqlitePool,
    user_id: &str,
    reply: &str,
    rng: &mut R,
) -> Result<Vec<Prompt>, AppError>
where
    R: Rng + Send + ?Sized,
{
    let result = load_session(pool, user_id, reply, rng).await;
    match result {
        Ok(session) => {
            tracing::info!(
                user_id,
                drill_id = %session.drill_id,
                module = session.module.as_deref().unwrap_or(ALL_MODULES),
                cards = session.remaining(),
                "drill loaded"
            );
            let mut prompts = Vec::new();
            if let Some(card) = &session.current_card {
                prompts.push(Prompt::text(format!(
                    "Let's go! {} card(s) in this drill.",
                    session.remaining()
                )));
                prompts.extend(present(card));
            }
            save(pool, user_id, &DrillState::AwaitingAnswer(session)).await?;
            Ok(prompts)
        }
        Err(err) => recover(pool, user_id, err).await,
    }
}

async fn load_session<R>(
    pool: &SqlitePool,
    user_id: &str,
    reply: &str,
    rng: &mut R,
) -> Result<DrillSession, DrillError>
where
    R: Rng + Send + ?Sized,
{
    if reply.trim().is_empty() {
        return Err(DrillError::MalformedReply(
            "empty module filter".to_string(),
        ));
    }
    let filter = module_filter(Some(reply));
    let words = db::list_visible_words(pool, user_id, filter.as_deref()).await?;
    DrillSession::load(words, filter, rng)
}

/// 현재 카드에 대한 답을 채점하고 드릴을 한 단계 진행합니다.
pub async fn answer(
    pool: &SqlitePool,
    user_id: &str,
    mut session: DrillSession,
    reply: &str,
) -> Result<Vec<Prompt>, AppError> {
    let card = match session.take_current() {
        Ok(card) => card,
        Err(err) => return recover(pool, user_id, err).await,
    };

    let verdict = match grading::grade(reply, &card) {
        Ok(verdict) => verdict,
        Err(DrillError::MalformedReply(reason)) => {
            // 상태는 저장하지 않으므로 그대로 유지됩니다.
            tracing::debug!(user_id, drill_id = %session.drill_id, %reason, "re-prompting");
            let mut prompts = vec![Prompt::text("Please type your answer.")];
            prompts.extend(present(&card));
            return Ok(prompts);
        }
        Err(err) => return recover(pool, user_id, err).await,
    };
    tracing::debug!(
        user_id,
        drill_id = %session.drill_id,
        word_id = card.word_id,
        ?verdict,
        "graded"
    );

    let mut prompts = vec![grading::feedback(&card, verdict)];

    // 진도 기록과 드릴 상태 저장은 한 트랜잭션으로 커밋합니다.
    // 상태 저장이 실패하면 진도 기록도 함께 롤백되어 같은 카드가 두 번 집계되지 않습니다.
    let mut tx = pool.begin().await?;

    // 진도 기록은 세이브포인트 안에서 씁니다. 실패하면 그 부분만 되돌리고 드릴은 계속합니다.
    let mut ledger = Connection::begin(&mut *tx).await?;
    match db::record_outcome(&mut *ledger, user_id, card.word_id, verdict.is_correct()).await {
        Ok(()) => ledger.commit().await?,
        Err(err) => {
            ledger.rollback().await?;
            tracing::error!(
                user_id,
                drill_id = %session.drill_id,
                word_id = card.word_id,
                error = %err,
                "failed to record drill outcome"
            );
            prompts.push(Prompt::text(
                "⚠️ Your result could not be saved, but the drill continues.",
            ));
        }
    }

    if verdict == Verdict::Miss {
        session.requeue(card);
    }

    let drill_id = session.drill_id;
    let next = session.advance().cloned();
    if next.is_some() {
        save(&mut *tx, user_id, &DrillState::AwaitingAnswer(session)).await?;
    } else {
        db::clear_drill_state(&mut *tx, user_id).await?;
    }
    tx.commit().await?;

    match next {
        Some(next) => prompts.extend(present(&next)),
        None => {
            tracing::info!(user_id, %drill_id, "drill complete");
            prompts.push(Prompt::text(
                "🎉 Drill complete! Send /flashcards to practice again.",
            ));
        }
    }

    Ok(prompts)
}

/// 드릴을 중단합니다. 진행 중인 드릴이 없어도 안내 메시지를 보냅니다.
pub async fn stop(pool: &SqlitePool, user_id: &str) -> Result<Vec<Prompt>, AppError> {
    if db::clear_drill_state(pool, user_id).await? {
        tracing::info!(user_id, "drill stopped");
        Ok(vec![Prompt::text("🛑 Drill stopped.")])
    } else {
        Ok(vec![Prompt::text("There is no active drill.")])
    }
}

/// 드릴 중인 사용자의 일반 텍스트를 처리합니다.
///
/// ## 반환값
/// - `Ok(Some(prompts))`: 드릴이 응답을 처리함
/// - `Ok(None)`: 진행 중인 드릴이 없음 (IDLE). 호출자가 다른 안내를 합니다.
pub async fn handle_reply<R>(
    pool: &SqlitePool,
    user_id: &str,
    text: &str,
    rng: &mut R,
) -> Result<Option<Vec<Prompt>>, AppError>
where
    R: Rng + Send + ?Sized,
{
    let state = match load_state(pool, user_id).await {
        Ok(Some(state)) => state,
        Ok(None) => return Ok(None),
        Err(err) => return recover(pool, user_id, err).await.map(Some),
    };

    let prompts = match state {
        DrillState::SelectingModule => select_module(pool, user_id, text, rng).await?,
        DrillState::AwaitingAnswer(session) => answer(pool, user_id, session, text).await?,
    };
    Ok(Some(prompts))
}

/// 현재 드릴 진행 상황. 저장된 상태를 해석할 수 없으면 에러를 반환합니다.
pub async fn snapshot(pool: &SqlitePool, user_id: &str) -> Result<DrillSnapshot, AppError> {
    let snapshot = match load_state(pool, user_id).await? {
        None => DrillSnapshot {
            phase: "idle",
            drill_id: None,
            current_translation: None,
            pending: 0,
        },
        Some(state) => {
            let phase = state.phase();
            match state {
                DrillState::SelectingModule => DrillSnapshot {
                    phase,
                    drill_id: None,
                    current_translation: None,
                    pending: 0,
                },
                DrillState::AwaitingAnswer(session) => DrillSnapshot {
                    phase,
                    drill_id: Some(session.drill_id.to_string()),
                    current_translation: session.current_card.map(|c| c.translation),
                    pending: session.pending_queue.len(),
                },
            }
        }
    };

    Ok(snapshot)
}

async fn load_state(pool: &SqlitePool, user_id: &str) -> Result<Option<DrillState>, DrillError> {
    db::get_drill_state(pool, user_id)
        .await?
        .as_deref()
        .map(DrillState::decode)
        .transpose()
}

async fn save<'e, E>(executor: E, user_id: &str, state: &DrillState) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let raw = state.encode()?;
    db::save_drill_state(executor, user_id, &raw).await
}

/// 복구 가능한 드릴 에러를 사용자 안내로 바꿉니다.
async fn recover(pool: &SqlitePool, user_id: &str, err: DrillError) -> Result<Vec<Prompt>, AppError> {
    match err {
        DrillError::EmptyCandidateSet { filter } => {
            db::clear_drill_state(pool, user_id).await?;
            tracing::info!(user_id, ?filter, "no words for module filter");
            let message = match filter {
                Some(module) => format!("No words found for module `{module}`."),
                None => "No words found.".to_string(),
            };
            Ok(vec![Prompt::text(message)])
        }
        DrillError::MalformedReply(reason) => {
            tracing::debug!(user_id, %reason, "re-prompting for module filter");
            Ok(vec![Prompt::text(format!(
                "Please send a module number/name or `{ALL_MODULES}`."
            ))])
        }
        DrillError::SessionStateCorruption(reason) => {
            tracing::warn!(user_id, %reason, "resetting corrupted drill state");
            db::clear_drill_state(pool, user_id).await?;
            Ok(vec![Prompt::text(
                "Something went wrong with your drill, so it was reset. Send /flashcards to start again.",
            )])
        }
        DrillError::Persistence(err) => Err(err),
    }
}
