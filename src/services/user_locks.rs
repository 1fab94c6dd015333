//! # 사용자별 응답 잠금
//!
//! 같은 사용자가 보낸 메시지는 도착 순서대로 하나씩 처리해야 합니다.
//! (드릴 상태를 읽고-채점하고-저장하는 과정이 겹치면 카드가 두 번 채점될 수 있음)
//! 서로 다른 사용자끼리는 막지 않습니다.
//!
//! tokio의 `Mutex`는 공정(FIFO)하므로 먼저 기다린 요청이 먼저 잠금을 얻습니다.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 이 개수를 넘으면 아무도 쓰지 않는 잠금을 정리합니다.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자의 잠금을 얻습니다. 반환된 guard가 drop될 때 풀립니다.
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() > PRUNE_THRESHOLD {
                // 맵만 참조하고 있는 잠금 = 대기자도 보유자도 없음
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_user_waits_for_the_first_guard() {
        let locks = Arc::new(UserLocks::new());
        let guard = locks.lock("alice").await;

        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("alice").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .expect("second lock acquired after release")
            .unwrap();
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let locks = UserLocks::new();
        let _alice = locks.lock("alice").await;
        let bob = tokio::time::timeout(Duration::from_secs(1), locks.lock("bob")).await;
        assert!(bob.is_ok());
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn idle_locks_are_pruned() {
        let locks = UserLocks::new();
        for i in 0..=PRUNE_THRESHOLD {
            drop(locks.lock(&format!("user-{i}")).await);
        }
        let _held = locks.lock("last").await;
        assert_eq!(locks.len().await, 1);
    }
}
