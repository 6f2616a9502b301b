//! Match state: the per-room record shared through the store.
//!
//! ## Shape
//!
//! `MatchState` serializes to the camelCase record kept at
//! `games/{roomId}`. Played cards stay in their owner's hand until the
//! round outcome is applied, so the multiset union of all hands is always
//! the full deck.
//!
//! ## Persistent Data Structures
//!
//! Hands, plays and history use `im` collections. Every store notification
//! produces a fresh snapshot that is fanned out to the presentation layer
//! and the bot engine; structural sharing keeps those clones cheap.

use std::collections::BTreeMap;

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::phase::GamePhase;
use super::player::{PlayerId, Seat};
use crate::cards::{AttributeKey, CardId};

/// A player's ordered hand. Index 0 is the top.
pub type Hand = Vector<CardId>;

/// One player's contribution to a resolved round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedCard {
    pub card_id: CardId,
    pub value: f64,
}

/// Append-only record of a resolved round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round_number: u32,
    pub attribute: AttributeKey,
    pub per_player: BTreeMap<PlayerId, PlayedCard>,
    /// `None` only when no play was comparable.
    pub winner: Option<PlayerId>,
    /// RFC 3339.
    pub timestamp: String,
}

/// Rounds in which a bot's actions were claimed by some client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotClaim {
    #[serde(default)]
    pub card: Option<u32>,
    #[serde(default)]
    pub attribute: Option<u32>,
}

/// Per-room match record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    /// Minted at match start. Distinguishes a rematch in the same room.
    #[serde(default)]
    pub match_id: String,

    pub deck_id: String,

    /// Seats in canonical order.
    pub players: Vec<Seat>,

    /// Starts at 1.
    pub current_round: u32,

    /// The round's lead, who nominates the attribute.
    pub current_player: PlayerId,

    pub game_phase: GamePhase,

    #[serde(default)]
    pub player_hands: OrdMap<PlayerId, Hand>,

    #[serde(default)]
    pub current_round_plays: OrdMap<PlayerId, CardId>,

    #[serde(default)]
    pub selected_attribute: Option<AttributeKey>,

    #[serde(default)]
    pub round_winner: Option<PlayerId>,

    #[serde(default)]
    pub round_history: Vector<RoundRecord>,

    #[serde(default)]
    pub match_winner: Option<PlayerId>,

    #[serde(default)]
    pub bot_claims: OrdMap<PlayerId, BotClaim>,
}

impl MatchState {
    /// Create the record for a freshly dealt match, in `spinning`.
    #[must_use]
    pub fn new(
        deck_id: impl Into<String>,
        players: Vec<Seat>,
        player_hands: OrdMap<PlayerId, Hand>,
        lead: PlayerId,
    ) -> Self {
        Self {
            match_id: Ulid::new().to_string(),
            deck_id: deck_id.into(),
            players,
            current_round: 1,
            current_player: lead,
            game_phase: GamePhase::Spinning,
            player_hands,
            current_round_plays: OrdMap::new(),
            selected_attribute: None,
            round_winner: None,
            round_history: Vector::new(),
            match_winner: None,
            bot_claims: OrdMap::new(),
        }
    }

    // === Seats ===

    #[must_use]
    pub fn seat(&self, player: &PlayerId) -> Option<&Seat> {
        self.players.iter().find(|s| &s.nickname == player)
    }

    /// Active seats in seat order.
    pub fn active_players(&self) -> impl Iterator<Item = &Seat> {
        self.players.iter().filter(|s| s.is_active())
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    #[must_use]
    pub fn is_active(&self, player: &PlayerId) -> bool {
        self.seat(player).is_some_and(Seat::is_active)
    }

    /// Nicknames in seat order.
    #[must_use]
    pub fn seat_order(&self) -> Vec<PlayerId> {
        self.players.iter().map(|s| s.nickname.clone()).collect()
    }

    // === Hands ===

    #[must_use]
    pub fn hand(&self, player: &PlayerId) -> Option<&Hand> {
        self.player_hands.get(player)
    }

    #[must_use]
    pub fn card_count(&self, player: &PlayerId) -> usize {
        self.hand(player).map_or(0, Vector::len)
    }

    #[must_use]
    pub fn holds_card(&self, player: &PlayerId, card: &CardId) -> bool {
        self.hand(player).is_some_and(|h| h.contains(card))
    }

    /// Total cards across all hands. Constant for the whole match.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.player_hands.values().map(Vector::len).sum()
    }

    /// `(player, card count)` in seat order.
    #[must_use]
    pub fn standings(&self) -> Vec<(PlayerId, usize)> {
        self.players
            .iter()
            .map(|s| (s.nickname.clone(), self.card_count(&s.nickname)))
            .collect()
    }

    // === Round Progress ===

    #[must_use]
    pub fn has_played(&self, player: &PlayerId) -> bool {
        self.current_round_plays.contains_key(player)
    }

    #[must_use]
    pub fn lead_has_played(&self) -> bool {
        self.has_played(&self.current_player)
    }

    /// Every active player has submitted a card this round.
    #[must_use]
    pub fn all_submitted(&self) -> bool {
        self.active_players().all(|s| self.has_played(&s.nickname))
    }

    /// All cards are in and the lead has nominated the attribute.
    #[must_use]
    pub fn ready_to_reveal(&self) -> bool {
        self.game_phase == GamePhase::Selecting
            && self.selected_attribute.is_some()
            && self.all_submitted()
    }

    #[must_use]
    pub fn bot_claim(&self, player: &PlayerId) -> BotClaim {
        self.bot_claims.get(player).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Difficulty, PlayerStatus};

    fn hand(ids: &[&str]) -> Hand {
        ids.iter().map(|id| CardId::new(*id)).collect()
    }

    fn sample() -> MatchState {
        let players = vec![
            Seat::human("alice").host(),
            Seat::human("bob"),
            Seat::bot("robo", Difficulty::Easy),
        ];
        let mut hands = OrdMap::new();
        hands.insert(PlayerId::new("alice"), hand(&["a1", "a2"]));
        hands.insert(PlayerId::new("bob"), hand(&["b1", "b2"]));
        hands.insert(PlayerId::new("robo"), hand(&["r1", "r2"]));
        MatchState::new("animals", players, hands, PlayerId::new("bob"))
    }

    #[test]
    fn test_new_match_defaults() {
        let state = sample();
        assert_eq!(state.current_round, 1);
        assert_eq!(state.game_phase, GamePhase::Spinning);
        assert_eq!(state.current_player, PlayerId::new("bob"));
        assert_eq!(state.total_cards(), 6);
        assert!(state.current_round_plays.is_empty());
        assert!(state.match_winner.is_none());
        assert_ne!(state.match_id, sample().match_id);
    }

    #[test]
    fn test_submission_tracking() {
        let mut state = sample();
        state.game_phase = GamePhase::Selecting;

        state.current_round_plays.insert(PlayerId::new("alice"), CardId::new("a1"));
        state.current_round_plays.insert(PlayerId::new("bob"), CardId::new("b2"));
        assert!(state.lead_has_played());
        assert!(!state.all_submitted());

        state.current_round_plays.insert(PlayerId::new("robo"), CardId::new("r1"));
        assert!(state.all_submitted());
        assert!(!state.ready_to_reveal());

        state.selected_attribute = Some(AttributeKey::new("speed"));
        assert!(state.ready_to_reveal());
    }

    #[test]
    fn test_eliminated_players_do_not_block_reveal() {
        let mut state = sample();
        state.game_phase = GamePhase::Selecting;
        state.players[2].status = PlayerStatus::Eliminated;
        state.player_hands.insert(PlayerId::new("robo"), Hand::new());

        state.current_round_plays.insert(PlayerId::new("alice"), CardId::new("a1"));
        state.current_round_plays.insert(PlayerId::new("bob"), CardId::new("b1"));
        state.selected_attribute = Some(AttributeKey::new("speed"));

        assert_eq!(state.active_count(), 2);
        assert!(state.ready_to_reveal());
    }

    #[test]
    fn test_record_shape_is_camel_case() {
        let state = sample();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["matchId"], state.match_id.as_str());
        assert_eq!(json["currentRound"], 1);
        assert_eq!(json["gamePhase"], "spinning");
        assert_eq!(json["currentPlayer"], "bob");
        assert_eq!(json["playerHands"]["alice"][0], "a1");
        assert!(json["selectedAttribute"].is_null());
    }

    #[test]
    fn test_absent_optional_fields_decode() {
        let json = serde_json::json!({
            "deckId": "animals",
            "players": [{ "nickname": "alice", "isHost": true, "isBot": false }],
            "currentRound": 4,
            "currentPlayer": "alice",
            "gamePhase": "selecting",
        });
        let state: MatchState = serde_json::from_value(json).unwrap();
        assert_eq!(state.current_round, 4);
        assert!(state.player_hands.is_empty());
        assert!(state.round_history.is_empty());
        assert_eq!(state.bot_claim(&PlayerId::new("alice")), BotClaim::default());
    }

    #[test]
    fn test_standings_follow_seat_order() {
        let state = sample();
        let names: Vec<_> = state.standings().into_iter().map(|(p, _)| p.0).collect();
        assert_eq!(names, vec!["alice", "bob", "robo"]);
    }
}
