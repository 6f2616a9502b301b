//! Card definitions - static card data.
//!
//! A `Card` never changes during a match. Hands and plays refer to cards by
//! `CardId` only; values are looked up in the `Deck` when a round resolves.

use serde::{Deserialize, Serialize};

use super::attributes::{AttributeKey, Attributes};

/// Unique identifier for a card within its deck.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use trumps_engine::cards::Card;
///
/// let tiger = Card::new("tiger", "Tiger")
///     .with_attr("speed", 65.0)
///     .with_attr("weight", 220.0);
///
/// assert_eq!(tiger.value("speed"), Some(65.0));
/// assert_eq!(tiger.value("wingspan"), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,

    /// Card name (for display).
    pub name: String,

    #[serde(default)]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Card {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CardId::new(id),
            name: name.into(),
            attributes: Attributes::default(),
            description: None,
            image: None,
        }
    }

    /// Add an attribute (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<AttributeKey>, value: f64) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<f64> {
        self.attributes.get(&AttributeKey::new(key)).copied()
    }

    #[must_use]
    pub fn value_of(&self, key: &AttributeKey) -> Option<f64> {
        self.attributes.get(key).copied()
    }
}
