//! # 채점
//!
//! 사용자의 답과 카드의 원문/동의어를 비교합니다.
//! 비교는 앞뒤 공백을 없애고 소문자로 바꾼 형태로 합니다.

use crate::error::DrillError;
use crate::models::drill::{Card, Prompt};

/// 채점 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 원문과 정확히 일치
    Exact,
    /// 원문은 아니지만 동의어 중 하나와 일치
    Synonym,
    /// 오답
    Miss,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        !matches!(self, Verdict::Miss)
    }
}

/// 비교용 정규화: 앞뒤 공백 제거 + 소문자
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 카드를 채점합니다.
///
/// 빈 답(공백뿐)은 해석할 수 없는 응답으로 보고 `MalformedReply`를 반환합니다.
/// 빈 동의어 항목과 우연히 일치하는 일을 막기 위해서이기도 합니다.
pub fn grade(reply: &str, card: &Card) -> Result<Verdict, DrillError> {
    let answer = normalize(reply);
    if answer.is_empty() {
        return Err(DrillError::MalformedReply(
            "empty answer to a flash card".to_string(),
        ));
    }

    if answer == normalize(&card.text) {
        return Ok(Verdict::Exact);
    }
    let is_synonym = card
        .synonyms
        .iter()
        .map(|s| normalize(s))
        .any(|s| !s.is_empty() && s == answer);

    Ok(if is_synonym { Verdict::Synonym } else { Verdict::Miss })
}

/// 채점 결과를 사용자에게 보낼 메시지로 만듭니다.
///
/// 오답이면 정답 원문과 동의어 목록(있으면 품사도)을 함께 보여줍니다.
pub fn feedback(card: &Card, verdict: Verdict) -> Prompt {
    match verdict {
        Verdict::Exact => Prompt::text("✅ Correct!"),
        Verdict::Synonym => Prompt::text(format!(
            "✅ Correct (synonym)! The main answer is: {}",
            card.text
        )),
        Verdict::Miss => {
            let synonyms = if card.synonyms.is_empty() {
                "none".to_string()
            } else {
                card.synonyms.join(", ")
            };
            let mut text = format!(
                "❌ Wrong.\nCorrect answer: {}\nTranslation: {}\nSynonyms: {}",
                card.text, card.translation, synonyms
            );
            if let Some(pos) = &card.part_of_speech {
                text.push_str(&format!("\nPart of speech: {pos}"));
            }
            Prompt::text(text)
        }
    }
}
