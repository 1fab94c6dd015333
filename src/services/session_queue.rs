//! # 드릴 세션 상태
//!
//! 사용자별 드릴 상태를 태그가 붙은 enum으로 표현합니다.
//! 이 값이 그대로 JSON으로 직렬화되어 `drill_sessions` 테이블에 저장됩니다.
//!
//! ```text
//! (행 없음 = IDLE) ──start──▶ SelectingModule ──module──▶ AwaitingAnswer ─┐
//!        ▲                                                      │  ▲       │
//!        └──────────── 완료 / 중단 / 손상 ◀──────────────────────┘  └─answer┘
//! ```
//!
//! 큐 순서는 로드할 때 한 번만 섞고, 이후에는 FIFO입니다.
//! 오답 카드만 큐의 맨 뒤에 다시 붙습니다.

use crate::error::DrillError;
use crate::models::drill::Card;
use crate::models::word::Word;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// 진행 중인 드릴 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSession {
    pub drill_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// 선택한 모듈 필터. None이면 전체 ("all")
    pub module: Option<String>,
    /// 지금 답을 기다리는 카드. AWAITING_ANSWER에서는 항상 Some이어야 합니다.
    pub current_card: Option<Card>,
    pub pending_queue: VecDeque<Card>,
}

impl DrillSession {
    /// 후보 단어들을 섞어서 새 드릴을 만듭니다.
    ///
    /// 첫 카드는 `current_card`로, 나머지는 `pending_queue`로 갑니다.
    pub fn load<R>(words: Vec<Word>, module: Option<String>, rng: &mut R) -> Result<Self, DrillError>
    where
        R: Rng + ?Sized,
    {
        let mut cards: Vec<Card> = words.into_iter().map(Card::from).collect();
        if cards.is_empty() {
            return Err(DrillError::EmptyCandidateSet { filter: module });
        }
        cards.shuffle(rng);

        let mut pending_queue: VecDeque<Card> = cards.into();
        let current_card = pending_queue.pop_front();

        Ok(Self {
            drill_id: Uuid::now_v7(),
            started_at: Utc::now(),
            module,
            current_card,
            pending_queue,
        })
    }

    /// 채점할 카드를 꺼냅니다. 카드가 없으면 상태가 손상된 것입니다.
    pub fn take_current(&mut self) -> Result<Card, DrillError> {
        self.current_card.take().ok_or_else(|| {
            DrillError::SessionStateCorruption(format!(
                "drill {} is awaiting an answer without a current card",
                self.drill_id
            ))
        })
    }

    /// 오답 카드를 큐 맨 뒤에 붙입니다.
    pub fn requeue(&mut self, card: Card) {
        self.pending_queue.push_back(card);
    }

    /// 큐 맨 앞의 카드를 현재 카드로 올립니다. 큐가 비었으면 None (드릴 완료).
    pub fn advance(&mut self) -> Option<&Card> {
        self.current_card = self.pending_queue.pop_front();
        self.current_card.as_ref()
    }

    /// 현재 카드를 포함해 남은 카드 수
    pub fn remaining(&self) -> usize {
        self.pending_queue.len() + usize::from(self.current_card.is_some())
    }
}

/// 저장되는 드릴 상태
///
/// IDLE은 저장하지 않습니다 (행이 없으면 IDLE).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DrillState {
    SelectingModule,
    AwaitingAnswer(DrillSession),
}

impl DrillState {
    pub fn phase(&self) -> &'static str {
        match self {
            DrillState::SelectingModule => "selecting_module",
            DrillState::AwaitingAnswer(_) => "awaiting_answer",
        }
    }

    pub fn encode(&self) -> Result<String, DrillError> {
        serde_json::to_string(self)
            .map_err(|e| DrillError::SessionStateCorruption(format!("cannot encode drill state: {e}")))
    }

    /// 저장된 JSON을 해석합니다. 해석할 수 없는 값은 손상된 상태로 봅니다.
    pub fn decode(raw: &str) -> Result<Self, DrillError> {
        serde_json::from_str(raw)
            .map_err(|e| DrillError::SessionStateCorruption(format!("cannot decode drill state: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::word::Author;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn word(id: i64, text: &str, translation: &str) -> Word {
        Word {
            id,
            text: text.to_string(),
            translation: translation.to_string(),
            part_of_speech: None,
            synonyms: None,
            added_by: Author::Teacher,
            owner_id: "teacher-1".to_string(),
            module: Some("1".to_string()),
            level: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn load_sets_current_and_queues_the_rest() {
        let mut rng = StdRng::seed_from_u64(1);
        let words = vec![word(1, "dog", "собака"), word(2, "cat", "кот"), word(3, "bird", "птица")];
        let session = DrillSession::load(words, None, &mut rng).unwrap();

        assert!(session.current_card.is_some());
        assert_eq!(session.pending_queue.len(), 2);
        assert_eq!(session.remaining(), 3);

        let mut ids: Vec<i64> = session.pending_queue.iter().map(|c| c.word_id).collect();
        ids.push(session.current_card.as_ref().unwrap().word_id);
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn load_with_no_words_is_an_empty_candidate_set() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = DrillSession::load(Vec::new(), Some("7".to_string()), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            DrillError::EmptyCandidateSet { filter: Some(ref f) } if f == "7"
        ));
    }

    #[test]
    fn take_current_without_card_is_corruption() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = DrillSession::load(vec![word(1, "dog", "собака")], None, &mut rng).unwrap();
        session.take_current().unwrap();
        assert!(matches!(
            session.take_current(),
            Err(DrillError::SessionStateCorruption(_))
        ));
    }

    #[test]
    fn requeued_card_comes_back_after_the_rest() {
        let mut rng = StdRng::seed_from_u64(3);
        let words = vec![word(1, "dog", "собака"), word(2, "cat", "кот")];
        let mut session = DrillSession::load(words, None, &mut rng).unwrap();

        let missed = session.take_current().unwrap();
        session.requeue(missed.clone());
        let next = session.advance().cloned().unwrap();
        assert_ne!(next.word_id, missed.word_id);

        session.take_current().unwrap();
        assert_eq!(session.advance(), Some(&missed));
        session.take_current().unwrap();
        assert_eq!(session.advance(), None);
    }

    #[test]
    fn state_survives_a_json_round_trip() {
        let mut rng = StdRng::seed_from_u64(9);
        let session = DrillSession::load(vec![word(1, "bird", "птица")], Some("2".to_string()), &mut rng).unwrap();
        let state = DrillState::AwaitingAnswer(session);

        let raw = state.encode().unwrap();
        assert!(raw.contains("\"phase\":\"awaiting_answer\""));
        assert_eq!(DrillState::decode(&raw).unwrap(), state);

        let raw = DrillState::SelectingModule.encode().unwrap();
        assert_eq!(DrillState::decode(&raw).unwrap(), DrillState::SelectingModule);
    }

    #[test]
    fn garbage_state_is_corruption() {
        assert!(matches!(
            DrillState::decode("{\"phase\":\"dancing\"}"),
            Err(DrillError::SessionStateCorruption(_))
        ));
        assert!(matches!(
            DrillState::decode("not json"),
            Err(DrillError::SessionStateCorruption(_))
        ));
    }
}
