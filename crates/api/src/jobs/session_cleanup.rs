//! Table session cleanup background job.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_table_sessions;
use crate::sessions::SessionStore;

/// Background job to prune idle table sessions.
pub struct SessionCleanupJob {
    store: Arc<SessionStore>,
    idle_ttl: Duration,
    interval_mins: u64,
}

impl SessionCleanupJob {
    /// Create a new cleanup job.
    ///
    /// # Arguments
    /// * `store` - The shared session store
    /// * `idle_ttl` - Sessions idle longer than this are dropped
    /// * `interval_mins` - Minutes between runs
    pub fn new(store: Arc<SessionStore>, idle_ttl: Duration, interval_mins: u64) -> Self {
        Self {
            store,
            idle_ttl,
            interval_mins,
        }
    }
}

#[async_trait::async_trait]
impl Job for SessionCleanupJob {
    fn name(&self) -> &'static str {
        "session_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_mins.max(1))
    }

    async fn execute(&self) -> Result<(), String> {
        let pruned = self.store.prune_idle(self.idle_ttl);
        let remaining = self.store.len();
        record_table_sessions(remaining);

        if pruned > 0 {
            info!(pruned, remaining, "Pruned idle table sessions");
        }

        Ok(())
    }
}
