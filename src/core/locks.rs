//! Write serialization per aggregate key.
//!
//! Writes that recompute derived state (group balances, budget alerts) hold
//! the lock of the aggregate they touch. Unrelated aggregates never contend.

use crate::core::models::budget::Period;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub fn group_key(group_id: &str) -> String {
    format!("group:{}", group_id)
}

pub fn budget_key(user_id: &str, category: &str, period: Period) -> String {
    format!("budget:{}:{}:{}", user_id, category, period)
}

pub fn alert_setting_key(user_id: &str, category: &str) -> String {
    format!("alert_setting:{}:{}", user_id, category)
}

#[derive(Clone, Default)]
pub struct AggregateLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AggregateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`. Released when the guard drops.
    pub async fn acquire(&self, key: String) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Nobody holds or waits on an entry whose only owner is the map.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        lock.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
