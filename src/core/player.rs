//! Player identification and seat data.
//!
//! ## PlayerId
//!
//! Players are identified by nickname. The nickname doubles as the key
//! under which hands and plays are stored in the shared record, so it must
//! be stable for the lifetime of a match.
//!
//! ## Seat
//!
//! A room slot held by a human or a bot. Seat order is the canonical
//! iteration order for dealing and tie-breaking; every client sees the same
//! order because it is persisted with the match.

use serde::{Deserialize, Serialize};

/// Player identifier (the seat's nickname).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(nickname: impl Into<String>) -> Self {
        Self(nickname.into())
    }

    /// Get the nickname.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a seat is still in the match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[default]
    Active,
    Eliminated,
}

/// Bot skill level. Selects the decision strategy and thinking delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A seat in the room.
///
/// ## Example
///
/// ```
/// use trumps_engine::core::{Difficulty, Seat};
///
/// let host = Seat::human("alice").host();
/// let bot = Seat::bot("robo", Difficulty::Hard);
///
/// assert!(host.is_host);
/// assert!(bot.is_bot);
/// assert!(bot.is_active());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    /// Nickname, also the player's identity.
    pub nickname: PlayerId,

    pub is_host: bool,

    pub is_bot: bool,

    /// Only meaningful when `is_bot` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    #[serde(default)]
    pub status: PlayerStatus,

    #[serde(default)]
    pub is_ready: bool,
}

impl Seat {
    /// Create a human seat.
    #[must_use]
    pub fn human(nickname: impl Into<String>) -> Self {
        Self {
            nickname: PlayerId::new(nickname),
            is_host: false,
            is_bot: false,
            difficulty: None,
            status: PlayerStatus::Active,
            is_ready: false,
        }
    }

    /// Create a bot seat. Bots are always ready.
    #[must_use]
    pub fn bot(nickname: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            nickname: PlayerId::new(nickname),
            is_host: false,
            is_bot: true,
            difficulty: Some(difficulty),
            status: PlayerStatus::Active,
            is_ready: true,
        }
    }

    /// Mark this seat as the room host (builder pattern).
    #[must_use]
    pub fn host(mut self) -> Self {
        self.is_host = true;
        self
    }

    /// Mark this seat as ready (builder pattern).
    #[must_use]
    pub fn ready(mut self) -> Self {
        self.is_ready = true;
        self
    }

    /// Check if the seat is still in the match.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    /// Bot difficulty, defaulting to medium for bots without one.
    #[must_use]
    pub fn bot_difficulty(&self) -> Option<Difficulty> {
        self.is_bot.then(|| self.difficulty.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let id = PlayerId::new("alice");
        assert_eq!(id.as_str(), "alice");
        assert_eq!(format!("{}", id), "alice");

        let from: PlayerId = "alice".into();
        assert_eq!(id, from);
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("bob")).unwrap();
        assert_eq!(json, "\"bob\"");
    }

    #[test]
    fn test_seat_builders() {
        let seat = Seat::human("alice").host().ready();
        assert!(seat.is_host);
        assert!(seat.is_ready);
        assert!(!seat.is_bot);
        assert_eq!(seat.bot_difficulty(), None);

        let bot = Seat::bot("robo", Difficulty::Easy);
        assert!(bot.is_ready);
        assert_eq!(bot.bot_difficulty(), Some(Difficulty::Easy));
    }

    #[test]
    fn test_bot_without_difficulty_defaults_to_medium() {
        let mut bot = Seat::bot("robo", Difficulty::Hard);
        bot.difficulty = None;
        assert_eq!(bot.bot_difficulty(), Some(Difficulty::Medium));
    }

    #[test]
    fn test_seat_serialization_shape() {
        let seat = Seat::bot("robo", Difficulty::Hard);
        let json = serde_json::to_value(&seat).unwrap();

        assert_eq!(json["nickname"], "robo");
        assert_eq!(json["isBot"], true);
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["status"], "active");

        let back: Seat = serde_json::from_value(json).unwrap();
        assert_eq!(back, seat);
    }
}
