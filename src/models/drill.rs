//! # 드릴/채팅 모델 정의
//!
//! - `Card`: 드릴에 쓰이는 단어 스냅샷. 드릴 도중 단어가 수정되어도 카드는 그대로입니다.
//! - `Prompt`: 사용자에게 보낼 메시지 한 건 (텍스트 또는 카드 이미지용 데이터)
//! - `ChatMessageRequest` / `ChatResponse`: `POST /api/v1/chat/messages`의 본문과 응답
//! - `DrillSnapshot`: `GET /api/v1/me/drill` 응답

use crate::models::word::Word;
use serde::{Deserialize, Serialize};

/// 플래시카드: 번역을 보여주고 원문을 맞히게 합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub word_id: i64,
    /// 정답 (사용자에게는 채점 후에만 공개)
    pub text: String,
    /// 문제로 보여주는 번역
    pub translation: String,
    pub part_of_speech: Option<String>,
    /// 정답으로 인정하는 동의어 (원래 표기 그대로)
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl From<Word> for Card {
    fn from(word: Word) -> Self {
        let synonyms = word.synonym_list();
        Self {
            word_id: word.id,
            text: word.text,
            translation: word.translation,
            part_of_speech: word.part_of_speech,
            synonyms,
        }
    }
}

/// 사용자에게 전달할 메시지 한 건
///
/// `Card` variant는 외부 렌더러가 이미지로 그릴 수 있도록
/// 표시할 문자열과 "문제 면인지" 여부만 담습니다.
///
/// JSON 예:
/// - `{ "kind": "text", "text": "Correct!" }`
/// - `{ "kind": "card", "text": "кот", "is_question": true }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prompt {
    Text { text: String },
    Card { text: String, is_question: bool },
}

impl Prompt {
    // impl Into<String>: &str과 String 모두 받을 수 있게 합니다.
    pub fn text(text: impl Into<String>) -> Self {
        Prompt::Text { text: text.into() }
    }

    pub fn question_card(text: impl Into<String>) -> Self {
        Prompt::Card {
            text: text.into(),
            is_question: true,
        }
    }

    /// 텍스트 메시지라면 내용을, 카드라면 None을 반환합니다.
    #[cfg(test)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Prompt::Text { text } => Some(text),
            Prompt::Card { .. } => None,
        }
    }
}

/// 채팅 메시지 수신 요청
#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub text: String,
}

/// 채팅 응답: 보낼 메시지들을 순서대로 담습니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub replies: Vec<Prompt>,
}

/// 현재 드릴 진행 상황
#[derive(Debug, Serialize)]
pub struct DrillSnapshot {
    /// "idle" | "selecting_module" | "awaiting_answer"
    pub phase: &'static str,
    pub drill_id: Option<String>,
    /// 지금 풀고 있는 카드의 번역 (원문은 공개하지 않음)
    pub current_translation: Option<String>,
    pub pending: usize,
}
