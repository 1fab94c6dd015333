//! # 가중치 함수
//!
//! 진도 카운터를 추첨 가중치로 바꾸고, 가중치에 비례해 하나를 뽑습니다.
//! 자주 틀린 단어일수록 더 자주 뽑히고, 모든 단어는 최소 1의 가중치를 가집니다.

use rand::Rng;

/// `max(1, 1 + incorrect - correct)`
///
/// 카운터는 음수가 아니어야 하지만, 혹시 음수가 들어와도 결과는 1 이상입니다.
/// 극단적인 값에서도 넘치지 않도록 포화 연산을 씁니다.
pub fn word_weight(correct: i64, incorrect: i64) -> u64 {
    let raw = 1i64
        .saturating_add(incorrect.max(0))
        .saturating_sub(correct.max(0));
    raw.max(1) as u64
}

/// 가중치에 비례해 항목 하나를 뽑습니다.
///
/// `[0, 총합)`에서 실수 하나를 균등하게 뽑고, 누적 가중치가 처음으로
/// 그 값 이상이 되는 항목을 반환합니다.
///
/// 빈 입력은 호출하면 안 되는 경우이므로 `None`을 반환합니다.
/// 항목이 하나면 뽑힌 값과 상관없이 그 항목입니다.
pub fn pick_weighted<'a, T, R>(items: &'a [(T, u64)], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    // 가중치는 최대 i64::MAX까지 올 수 있으므로 합은 포화시킵니다.
    let total = items.iter().fold(0u64, |acc, (_, w)| acc.saturating_add(*w));
    if total == 0 {
        // 가중치가 전부 0이면 균등 추첨과 같게 봅니다.
        return items.get(rng.gen_range(0..items.len())).map(|(item, _)| item);
    }

    let draw: f64 = rng.gen_range(0.0..total as f64);
    let mut cumulative = 0u64;
    for (item, weight) in items {
        cumulative = cumulative.saturating_add(*weight);
        if cumulative as f64 >= draw {
            return Some(item);
        }
    }

    // 부동소수점 오차로 끝까지 못 찾은 경우 마지막 항목
    items.last().map(|(item, _)| item)
}
