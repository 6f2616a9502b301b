//! Shuffling, dealing and picking the first lead.

use im::OrdMap;
use thiserror::Error;

use super::definition::CardId;
use crate::core::{GameRng, Hand, PlayerId};

/// Invalid input to `deal`. The match never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("need at least 2 players, got {0}")]
    NotEnoughPlayers(usize),

    #[error("deck is empty")]
    EmptyDeck,

    /// Every seat needs at least one card to take part in the first round.
    #[error("{cards} cards cannot be dealt to {players} players")]
    NotEnoughCards { cards: usize, players: usize },

    #[error("player `{0}` is seated twice")]
    DuplicatePlayer(PlayerId),

    /// Nicknames key store paths, so they must be non-empty and slash-free.
    #[error("nickname `{0}` cannot be used as a player key")]
    InvalidNickname(PlayerId),
}

/// Return a uniformly shuffled copy of `cards`.
#[must_use]
pub fn shuffle<T: Clone>(cards: &[T], rng: &mut GameRng) -> Vec<T> {
    let mut out = cards.to_vec();
    rng.shuffle(&mut out);
    out
}

/// Partition `cards` across `players`.
///
/// Each player first receives a contiguous chunk of
/// `cards.len() / players.len()` cards, in player order. The remainder is
/// then handed out one card at a time starting from player 0, so no card is
/// dropped and hand sizes differ by at most one.
pub fn deal(cards: &[CardId], players: &[PlayerId]) -> Result<OrdMap<PlayerId, Hand>, DealError> {
    if players.len() < 2 {
        return Err(DealError::NotEnoughPlayers(players.len()));
    }
    if cards.is_empty() {
        return Err(DealError::EmptyDeck);
    }
    if cards.len() < players.len() {
        return Err(DealError::NotEnoughCards {
            cards: cards.len(),
            players: players.len(),
        });
    }
    for (i, player) in players.iter().enumerate() {
        if player.as_str().is_empty() || player.as_str().contains('/') {
            return Err(DealError::InvalidNickname(player.clone()));
        }
        if players[..i].contains(player) {
            return Err(DealError::DuplicatePlayer(player.clone()));
        }
    }

    let chunk = cards.len() / players.len();
    let mut hands: Vec<Hand> = players
        .iter()
        .enumerate()
        .map(|(i, _)| cards[i * chunk..(i + 1) * chunk].iter().cloned().collect())
        .collect();

    let dealt = chunk * players.len();
    for (offset, card) in cards[dealt..].iter().enumerate() {
        hands[offset % players.len()].push_back(card.clone());
    }

    Ok(players.iter().cloned().zip(hands).collect())
}

/// Pick the first lead uniformly at random.
#[must_use]
pub fn pick_lead(players: &[PlayerId], rng: &mut GameRng) -> Option<PlayerId> {
    rng.choose(players).cloned()
}
