//! In-memory per-user usage counters. Reset on restart.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Kind of successful action that is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageAction {
    ImageRequest,
    WikiRequest,
}

/// Counts for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageRecord {
    pub image_requests: u64,
    pub wiki_requests: u64,
}

/// Shared counter store; clones share the same map.
#[derive(Clone, Default)]
pub struct UsageStore {
    records: Arc<RwLock<HashMap<i64, UsageRecord>>>,
}

impl UsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter for `action`, creating a zero record for unseen users.
    pub async fn record(&self, user_id: i64, action: UsageAction) {
        let mut records = self.records.write().await;
        let record = records.entry(user_id).or_default();
        match action {
            UsageAction::ImageRequest => record.image_requests += 1,
            UsageAction::WikiRequest => record.wiki_requests += 1,
        }
        debug!(user_id, action = ?action, record = ?record, "Usage recorded");
    }

    /// Current counts, zeros for users that never acted.
    pub async fn get(&self, user_id: i64) -> UsageRecord {
        self.records
            .read()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }
}
