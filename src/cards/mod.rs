//! Card system: definitions, decks and dealing.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for a card within its deck
//! - `Card`: Static card data with numeric attributes
//! - `AttributeSpec`: A nominatable attribute and its `ComparisonRule`
//! - `Deck`: Validated, immutable card collection
//! - `DeckLibrary`: Deck lookup by id
//!
//! Dealing lives in [`dealing`]: `shuffle`, `deal` and `pick_lead`.

pub mod attributes;
pub mod dealing;
pub mod deck;
pub mod definition;

pub use attributes::{AttributeKey, AttributeSpec, Attributes, ComparisonRule};
pub use dealing::{deal, pick_lead, shuffle, DealError};
pub use deck::{Deck, DeckBuilder, DeckError, DeckLibrary};
pub use definition::{Card, CardId};
