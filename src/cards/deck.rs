//! Themed decks and deck lookup.
//!
//! A `Deck` is validated once when built and is immutable afterwards. The
//! `DeckLibrary` maps deck ids to shared decks so a match record only needs
//! to carry the deck id: every client resolves the same cards from it.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attributes::{AttributeKey, AttributeSpec, ComparisonRule};
use super::definition::{Card, CardId};

/// Deck validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck `{0}` has no cards")]
    Empty(String),

    #[error("deck `{0}` exposes no attributes")]
    NoAttributes(String),

    #[error("card `{0}` appears more than once")]
    DuplicateCard(CardId),

    #[error("attribute `{0}` is exposed more than once")]
    DuplicateAttribute(AttributeKey),

    /// Stored records carry played values as JSON numbers.
    #[error("card `{card}` has a non-finite `{attribute}`")]
    NonFiniteValue { card: CardId, attribute: AttributeKey },

    #[error("deck `{0}` is already registered")]
    DuplicateDeck(String),

    #[error("malformed deck: {0}")]
    Parse(String),
}

/// Serialized deck layout, validated into a `Deck`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct DeckData {
    id: String,
    name: String,
    attributes: Vec<AttributeSpec>,
    cards: Vec<Card>,
}

/// A validated, immutable deck.
///
/// ## Example
///
/// ```
/// use trumps_engine::cards::{AttributeSpec, Card, Deck};
///
/// let deck = Deck::builder("cars", "Supercars")
///     .attribute(AttributeSpec::higher("top_speed"))
///     .attribute(AttributeSpec::lower("zero_to_sixty"))
///     .card(Card::new("c1", "Veyron").with_attr("top_speed", 407.0).with_attr("zero_to_sixty", 2.5))
///     .card(Card::new("c2", "F40").with_attr("top_speed", 324.0).with_attr("zero_to_sixty", 3.8))
///     .build()
///     .unwrap();
///
/// assert_eq!(deck.len(), 2);
/// assert!(deck.get(&"c2".into()).is_some());
/// ```
#[derive(Clone, Debug)]
pub struct Deck {
    id: String,
    name: String,
    attributes: Vec<AttributeSpec>,
    cards: Vec<Card>,
    index: FxHashMap<CardId, usize>,
}

impl Deck {
    /// Start building a deck.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> DeckBuilder {
        DeckBuilder {
            data: DeckData {
                id: id.into(),
                name: name.into(),
                attributes: Vec::new(),
                cards: Vec::new(),
            },
        }
    }

    /// Parse and validate a deck from JSON.
    pub fn from_json(json: &str) -> Result<Self, DeckError> {
        let data: DeckData =
            serde_json::from_str(json).map_err(|e| DeckError::Parse(e.to_string()))?;
        Self::validate(data)
    }

    fn validate(data: DeckData) -> Result<Self, DeckError> {
        if data.cards.is_empty() {
            return Err(DeckError::Empty(data.id));
        }
        if data.attributes.is_empty() {
            return Err(DeckError::NoAttributes(data.id));
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for spec in &data.attributes {
            if !seen.insert(&spec.key) {
                return Err(DeckError::DuplicateAttribute(spec.key.clone()));
            }
        }

        let mut index = FxHashMap::default();
        for (i, card) in data.cards.iter().enumerate() {
            if index.insert(card.id.clone(), i).is_some() {
                return Err(DeckError::DuplicateCard(card.id.clone()));
            }
            if let Some((key, _)) = card.attributes.iter().find(|(_, v)| !v.is_finite()) {
                return Err(DeckError::NonFiniteValue {
                    card: card.id.clone(),
                    attribute: key.clone(),
                });
            }
        }

        Ok(Self {
            id: data.id,
            name: data.name,
            attributes: data.attributes,
            cards: data.cards,
            index,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All cards, in definition order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.index.get(id).map(|&i| &self.cards[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    // === Attributes ===

    /// Attributes that may be nominated.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, key: &AttributeKey) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| &a.key == key)
    }

    #[must_use]
    pub fn exposes(&self, key: &AttributeKey) -> bool {
        self.attribute(key).is_some()
    }

    /// Comparison rule for an attribute. Unknown attributes compare higher-wins.
    #[must_use]
    pub fn rule(&self, key: &AttributeKey) -> ComparisonRule {
        self.attribute(key).map(|a| a.rule).unwrap_or_default()
    }

    /// Values of one attribute across the deck, skipping cards without it.
    pub fn values_of<'a>(&'a self, key: &'a AttributeKey) -> impl Iterator<Item = f64> + 'a {
        self.cards.iter().filter_map(move |c| c.value_of(key))
    }
}

/// Builder for a `Deck`.
pub struct DeckBuilder {
    data: DeckData,
}

impl DeckBuilder {
    #[must_use]
    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        self.data.attributes.push(spec);
        self
    }

    #[must_use]
    pub fn card(mut self, card: Card) -> Self {
        self.data.cards.push(card);
        self
    }

    #[must_use]
    pub fn cards(mut self, cards: impl IntoIterator<Item = Card>) -> Self {
        self.data.cards.extend(cards);
        self
    }

    /// Validate and build the deck.
    pub fn build(self) -> Result<Deck, DeckError> {
        Deck::validate(self.data)
    }
}

/// Registry of decks by id.
#[derive(Clone, Debug, Default)]
pub struct DeckLibrary {
    decks: FxHashMap<String, Arc<Deck>>,
}

impl DeckLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deck. Deck ids are unique.
    pub fn register(&mut self, deck: Deck) -> Result<Arc<Deck>, DeckError> {
        if self.decks.contains_key(deck.id()) {
            return Err(DeckError::DuplicateDeck(deck.id().to_string()));
        }
        let deck = Arc::new(deck);
        self.decks.insert(deck.id().to_string(), Arc::clone(&deck));
        Ok(deck)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Deck>> {
        self.decks.get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.decks.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.decks.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }
}
