//! In-process `SharedStore`.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::path::{get_at, segments, set_at, touches};
use super::{Guard, PathMap, SharedStore, Subscription};
use crate::core::StoreError;

struct Subscriber {
    id: u64,
    path: Vec<String>,
    tx: mpsc::UnboundedSender<Option<Value>>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    subscribers: Vec<Subscriber>,
    next_id: u64,
    failures_remaining: usize,
    writes: u64,
}

impl Inner {
    fn apply(&mut self, updates: PathMap) -> Result<(), StoreError> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(StoreError::Rejected("injected failure".into()));
        }

        let mut written: Vec<Vec<String>> = Vec::with_capacity(updates.len());
        for (path, value) in updates {
            let segs = segments(&path)?;
            set_at(&mut self.root, &segs, value);
            written.push(segs.into_iter().map(String::from).collect());
        }
        self.writes += 1;
        self.notify(&written);
        Ok(())
    }

    fn value_at(&self, path: &[String]) -> Option<Value> {
        let segs: Vec<&str> = path.iter().map(String::as_str).collect();
        get_at(&self.root, &segs).cloned()
    }

    fn notify(&mut self, written: &[Vec<String>]) {
        let root = &self.root;
        self.subscribers.retain(|sub| {
            if !written.iter().any(|w| touches(w, &sub.path)) {
                return true;
            }
            let segs: Vec<&str> = sub.path.iter().map(String::as_str).collect();
            sub.tx.send(get_at(root, &segs).cloned()).is_ok()
        });
    }

    fn validate(updates: &PathMap) -> Result<(), StoreError> {
        updates.keys().try_for_each(|p| segments(p).map(|_| ()))
    }
}

/// In-memory store shared by cloning.
///
/// All clones see the same tree. Every write notifies matching
/// subscribers before it returns, so notifications from one store are
/// delivered in write order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` writes (conditional or not) fail with
    /// `StoreError::Rejected`.
    pub fn fail_next_writes(&self, n: usize) {
        self.inner.lock().failures_remaining = n;
    }

    /// Number of writes applied so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.inner.lock().writes
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    fn unsubscribe(inner: &Weak<Mutex<Inner>>, id: u64) {
        if let Some(inner) = inner.upgrade() {
            inner.lock().subscribers.retain(|s| s.id != id);
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("writes", &inner.writes)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segs = segments(path)?;
        Ok(get_at(&self.inner.lock().root, &segs).cloned())
    }

    async fn write(&self, updates: PathMap) -> Result<(), StoreError> {
        Inner::validate(&updates)?;
        trace!(paths = updates.len(), "store write");
        self.inner.lock().apply(updates)
    }

    async fn write_if(&self, guards: &[Guard], updates: PathMap) -> Result<bool, StoreError> {
        Inner::validate(&updates)?;
        let mut inner = self.inner.lock();

        for guard in guards {
            let segs = segments(&guard.path)?;
            if !guard.matches(get_at(&inner.root, &segs)) {
                debug!(path = %guard.path, expected = %guard.expected, "conditional write rejected");
                return Ok(false);
            }
        }

        inner.apply(updates)?;
        Ok(true)
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let path: Vec<String> = segments(path)?.into_iter().map(String::from).collect();
        let (tx, rx) = mpsc::unbounded_channel();

        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            // The receiver is alive, so the initial send cannot fail.
            let _ = tx.send(inner.value_at(&path));
            inner.subscribers.push(Subscriber { id, path, tx });
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Ok(Subscription::new(rx, move || Self::unsubscribe(&weak, id)))
    }
}
