//! Shared store: the only channel between clients.
//!
//! ## Model
//!
//! A path-addressed JSON tree. Writes are partial (a `PathMap` of
//! path → value, applied together), subscriptions push the value at a path
//! after every write that touches it. There is no cross-writer ordering
//! guarantee beyond what a single conditional write gives.
//!
//! ## Conditional Writes
//!
//! `write_if` applies a `PathMap` only if every `Guard` still matches. Each
//! orchestrator transition is exactly one such write, guarded on the phase
//! and round it was computed from, so two clients racing on the same
//! transition cannot both apply it.
//!
//! ## Implementations
//!
//! - `MemoryStore`: in-process tree behind a `parking_lot` mutex, used by
//!   tests and local play. Supports failure injection.

pub mod memory;
pub mod path;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::core::StoreError;

pub use memory::MemoryStore;
pub use path::match_path;

/// Partial update: path → new value. `Null` deletes.
pub type PathMap = BTreeMap<String, Value>;

/// Expected value at a path. An absent path matches `Null`.
#[derive(Clone, Debug, PartialEq)]
pub struct Guard {
    pub path: String,
    pub expected: Value,
}

impl Guard {
    #[must_use]
    pub fn new(path: impl Into<String>, expected: Value) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }

    /// Guard that the path holds nothing.
    #[must_use]
    pub fn absent(path: impl Into<String>) -> Self {
        Self::new(path, Value::Null)
    }

    #[must_use]
    pub fn matches(&self, current: Option<&Value>) -> bool {
        current.unwrap_or(&Value::Null) == &self.expected
    }
}

/// Builder for writes under one record.
///
/// ```
/// use trumps_engine::store::Patch;
///
/// let (guards, updates) = Patch::new("games/r1")
///     .require("gamePhase", "selecting")
///     .set("gamePhase", "revealing")
///     .build();
///
/// assert_eq!(guards[0].path, "games/r1/gamePhase");
/// assert!(updates.contains_key("games/r1/gamePhase"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Patch {
    base: String,
    guards: Vec<Guard>,
    updates: PathMap,
}

impl Patch {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    fn path(&self, field: &str) -> String {
        format!("{}/{}", self.base, field)
    }

    /// Require `field` to currently hold `value`.
    #[must_use]
    pub fn require(mut self, field: &str, value: impl Serialize) -> Self {
        let path = self.path(field);
        self.guards.push(Guard::new(path, to_value(value)));
        self
    }

    /// Require `field` to be absent.
    #[must_use]
    pub fn require_absent(mut self, field: &str) -> Self {
        let path = self.path(field);
        self.guards.push(Guard::absent(path));
        self
    }

    /// Replace the whole record.
    #[must_use]
    pub fn replace(mut self, value: impl Serialize) -> Self {
        let path = self.base.clone();
        self.updates.insert(path, to_value(value));
        self
    }

    #[must_use]
    pub fn set(mut self, field: &str, value: impl Serialize) -> Self {
        let path = self.path(field);
        self.updates.insert(path, to_value(value));
        self
    }

    #[must_use]
    pub fn clear(mut self, field: &str) -> Self {
        let path = self.path(field);
        self.updates.insert(path, Value::Null);
        self
    }

    #[must_use]
    pub fn build(self) -> (Vec<Guard>, PathMap) {
        (self.guards, self.updates)
    }
}

// Values written here are engine types with string keys and finite
// numbers, which always serialize.
fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Stream of values at a subscribed path.
///
/// The first item is the value at subscription time. `None` items mean the
/// path is empty. Dropping the subscription unsubscribes.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Option<Value>>,
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    #[must_use]
    pub fn new(
        rx: mpsc::UnboundedReceiver<Option<Value>>,
        on_drop: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            rx,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Next value. Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Option<Value>> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.on_drop.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Path-addressed store shared by every client of a room.
#[async_trait]
pub trait SharedStore: Send + Sync + 'static {
    /// Value at `path`, or `None` if nothing is stored there.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Apply all updates together.
    async fn write(&self, updates: PathMap) -> Result<(), StoreError>;

    /// Apply all updates together if every guard matches.
    ///
    /// Returns `Ok(false)` without writing anything when a guard fails.
    async fn write_if(&self, guards: &[Guard], updates: PathMap) -> Result<bool, StoreError>;

    /// Subscribe to the value at `path`.
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;
}
