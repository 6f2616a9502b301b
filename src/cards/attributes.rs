//! Card attributes and how they compare.
//!
//! Every card maps attribute names ("speed", "population", ...) to numeric
//! values. A deck exposes the attributes that may be nominated, each with a
//! `ComparisonRule` saying whether higher or lower values win.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Key for accessing card attributes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    /// Create a new attribute key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttributeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AttributeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Attribute values of one card.
pub type Attributes = FxHashMap<AttributeKey, f64>;

/// Which end of the scale wins a comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonRule {
    #[default]
    HigherWins,
    LowerWins,
}

impl ComparisonRule {
    /// Order two values so that `Greater` means `a` beats `b`.
    #[must_use]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            ComparisonRule::HigherWins => a.total_cmp(&b),
            ComparisonRule::LowerWins => b.total_cmp(&a),
        }
    }

    /// Check if `a` strictly beats `b`.
    #[must_use]
    pub fn beats(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
}

/// An attribute the deck lets the lead nominate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub key: AttributeKey,

    #[serde(default)]
    pub rule: ComparisonRule,
}

impl AttributeSpec {
    /// Attribute where higher values win.
    pub fn higher(key: impl Into<AttributeKey>) -> Self {
        Self {
            key: key.into(),
            rule: ComparisonRule::HigherWins,
        }
    }

    /// Attribute where lower values win.
    pub fn lower(key: impl Into<AttributeKey>) -> Self {
        Self {
            key: key.into(),
            rule: ComparisonRule::LowerWins,
        }
    }
}
