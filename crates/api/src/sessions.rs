//! Table session store.
//!
//! Each (panel session, event) pair owns one [`TableController`].
//! Controllers are created on first touch and pruned by a background
//! job once idle past the configured TTL. The controller mutex is only
//! ever held for synchronous state transitions, never across a backend
//! call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

use domain::table::TableController;

/// Key for one table session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub session: Uuid,
    pub event: i64,
}

struct SessionEntry {
    controller: Arc<Mutex<TableController>>,
    last_touched: Instant,
}

/// Shared store of live table sessions.
pub struct SessionStore {
    entries: RwLock<HashMap<SessionKey, SessionEntry>>,
    page_size: usize,
}

impl SessionStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            page_size,
        }
    }

    /// Fetch the controller for a key, creating it on first touch.
    pub fn get_or_create(&self, key: SessionKey) -> Arc<Mutex<TableController>> {
        // Fast path under the read lock.
        {
            let entries = self.entries.read().unwrap();
            if let Some(entry) = entries.get(&key) {
                let controller = entry.controller.clone();
                drop(entries);
                self.touch(key);
                return controller;
            }
        }

        let mut entries = self.entries.write().unwrap();
        // Double-check in case another request created it.
        if let Some(entry) = entries.get_mut(&key) {
            entry.last_touched = Instant::now();
            return entry.controller.clone();
        }

        let controller = Arc::new(Mutex::new(TableController::new(self.page_size)));
        entries.insert(
            key,
            SessionEntry {
                controller: controller.clone(),
                last_touched: Instant::now(),
            },
        );
        controller
    }

    fn touch(&self, key: SessionKey) {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get_mut(&key) {
            entry.last_touched = Instant::now();
        }
    }

    /// Drop one session's state.
    pub fn remove(&self, key: SessionKey) {
        self.entries.write().unwrap().remove(&key);
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were
    /// pruned.
    pub fn prune_idle(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.last_touched.elapsed() < ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}
