// ==========================================
// 商品目录后台 - 商品级进程内锁
// ==========================================
// 同一 sku 的请购对账串行执行，不同 sku 互不阻塞
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Debug, Default)]
pub struct ProductLockRegistry {
    locks: Arc<Mutex<LockMap>>,
}

impl ProductLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定 key 的锁（持有期间同 key 的其他调用方等待）
    pub async fn acquire(&self, key: &str) -> ProductLockGuard {
        let lock = lock_map(&self.locks)
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        ProductLockGuard {
            guard: Some(guard),
            key: key.to_string(),
            locks: self.locks.clone(),
        }
    }

    /// 已登记的 key 数量
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// 中毒的注册表仍可安全使用（值只是锁句柄）
fn lock_map(locks: &Mutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 商品锁守卫
///
/// 释放时若已无其他持有者或等待者，同时注销该 key
#[derive(Debug)]
pub struct ProductLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for ProductLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        // 等待者在注册表锁内克隆句柄，计数为 1 说明只剩注册表自身
        let mut locks = lock_map(&self.locks);
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let registry = Arc::new(ProductLockRegistry::new());
        let guard = registry.acquire("A-1").await;

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move {
                let _guard = registry.acquire("A-1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let registry = ProductLockRegistry::new();
        let _a = registry.acquire("A-1").await;
        let _b = registry.acquire("B-2").await;
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_released_keys_are_removed() {
        let registry = ProductLockRegistry::new();
        for i in 0..100 {
            let _guard = registry.acquire(&format!("SKU-{i}")).await;
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_key_kept_while_waiter_pending() {
        let registry = Arc::new(ProductLockRegistry::new());
        let guard = registry.acquire("A-1").await;

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move {
                let _guard = registry.acquire("A-1").await;
                registry.len()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);
        assert_eq!(registry.len(), 1);

        // 等待者持锁期间 key 仍在，释放后注销
        assert_eq!(waiter.await.unwrap(), 1);
        assert!(registry.is_empty());
    }
}
