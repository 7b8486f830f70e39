use crate::constants::OUTBOX_CAPACITY;
use crate::core::errors::SpendwiseError;
use crate::infrastructure::notify::{AlertNotification, AlertNotifier};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Keeps dispatched notifications in memory instead of delivering them.
/// Only the most recent `capacity` messages are retained.
#[derive(Clone)]
pub struct OutboxNotifier {
    sent: Arc<RwLock<VecDeque<AlertNotification>>>,
    capacity: usize,
}

impl Default for OutboxNotifier {
    fn default() -> Self {
        Self::with_capacity(OUTBOX_CAPACITY)
    }
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        OutboxNotifier {
            sent: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    /// Queued notifications, oldest first.
    pub async fn sent(&self) -> Vec<AlertNotification> {
        self.sent.read().await.iter().cloned().collect()
    }

    /// Empties the outbox and hands back what it held.
    pub async fn drain(&self) -> Vec<AlertNotification> {
        let mut sent = self.sent.write().await;
        sent.drain(..).collect()
    }
}

#[async_trait]
impl AlertNotifier for OutboxNotifier {
    async fn send(&self, notification: AlertNotification) -> Result<(), SpendwiseError> {
        info!(
            "Queued alert '{}' for {}",
            notification.subject, notification.recipient
        );
        let mut sent = self.sent.write().await;
        if sent.len() >= self.capacity {
            if let Some(dropped) = sent.pop_front() {
                debug!("Outbox full, dropping alert for {}", dropped.recipient);
            }
        }
        sent.push_back(notification);
        Ok(())
    }
}
