use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per subject key.
///
/// Holders of the guard for a key run one at a time; different keys never
/// wait on each other. Entries nobody holds or waits on are dropped on the
/// next `lock` call.
#[derive(Debug, Default)]
pub struct SubjectLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = Arc::new(SubjectLocks::new());
        let guard = locks.lock("character:1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("character:1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_keys_do_not_wait() {
        let locks = SubjectLocks::new();
        let _a = locks.lock("character:1").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock("character:2"))
            .await
            .unwrap();
        assert_eq!(locks.locks.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_released_keys_are_pruned() {
        let locks = SubjectLocks::new();
        drop(locks.lock("player:0xa").await);
        let _held = locks.lock("player:0xb").await;
        assert_eq!(locks.locks.lock().await.len(), 1);
    }
}
