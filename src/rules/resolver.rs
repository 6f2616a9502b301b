//! Round resolution: compare the submitted cards, collect, eliminate.
//!
//! Everything here is a pure function of its inputs (plus the RNG used to
//! reshuffle the won cards), so any client can compute the same outcome
//! from the same snapshot.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::cards::{AttributeKey, CardId, Deck};
use crate::core::{GamePhase, GameRng, MatchState, PlayedCard, PlayerId, PlayerStatus, RoundRecord, Seat};

/// A comparable play: the card and its value under the round's attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerValue {
    pub player: PlayerId,
    pub card_id: CardId,
    pub value: f64,
}

/// Outcome of comparing one round's plays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub attribute: AttributeKey,

    /// Best play under the attribute's rule; ties go to the earliest seat.
    pub winner: Option<PlayerId>,

    /// Comparable plays in seat order.
    pub per_player: SmallVec<[PlayerValue; 8]>,

    /// Every submitted play in seat order, comparable or not.
    pub plays: SmallVec<[(PlayerId, CardId); 8]>,
}

impl RoundResult {
    #[must_use]
    pub fn value_of(&self, player: &PlayerId) -> Option<f64> {
        self.per_player
            .iter()
            .find(|pv| &pv.player == player)
            .map(|pv| pv.value)
    }
}

/// Compare a round's plays under `attribute`.
///
/// Plays are visited in `seat_order`; plays by players missing from it come
/// after, in key order. A play whose card is unknown to the deck, or lacks
/// the attribute, is excluded from winner consideration but still counted
/// among the played cards.
pub fn compare_round<'a>(
    plays: impl IntoIterator<Item = (&'a PlayerId, &'a CardId)>,
    attribute: &AttributeKey,
    deck: &Deck,
    seat_order: &[PlayerId],
) -> RoundResult {
    let mut ordered: SmallVec<[(PlayerId, CardId); 8]> = plays
        .into_iter()
        .map(|(p, c)| (p.clone(), c.clone()))
        .collect();
    ordered.sort_by_key(|(p, _)| seat_order.iter().position(|s| s == p).unwrap_or(usize::MAX));

    let rule = deck.rule(attribute);
    let mut per_player: SmallVec<[PlayerValue; 8]> = SmallVec::new();
    let mut winner: Option<(PlayerId, f64)> = None;

    for (player, card_id) in &ordered {
        let Some(card) = deck.get(card_id) else {
            warn!(%player, card = %card_id, "played card not in deck, excluding from comparison");
            continue;
        };
        let Some(value) = card.value_of(attribute) else {
            warn!(%player, card = %card_id, %attribute, "card lacks attribute, excluding from comparison");
            continue;
        };

        per_player.push(PlayerValue {
            player: player.clone(),
            card_id: card_id.clone(),
            value,
        });

        match &winner {
            Some((_, best)) if !rule.beats(value, *best) => {}
            _ => winner = Some((player.clone(), value)),
        }
    }

    RoundResult {
        attribute: attribute.clone(),
        winner: winner.map(|(p, _)| p),
        per_player,
        plays: ordered,
    }
}

/// The sole remaining active player, if exactly one remains.
#[must_use]
pub fn check_game_end(players: &[Seat]) -> Option<PlayerId> {
    let mut active = players.iter().filter(|s| s.is_active());
    match (active.next(), active.next()) {
        (Some(last), None) => Some(last.nickname.clone()),
        _ => None,
    }
}

/// Apply a resolved round to the match.
///
/// Played cards leave their owners' hands and go, reshuffled, to the bottom
/// of the winner's hand. Without a winner each card returns to the bottom
/// of its owner's hand and the lead is kept. Players left with no cards are
/// eliminated. The winner leads the next round.
#[must_use]
pub fn collect_and_advance(state: &MatchState, result: &RoundResult, rng: &mut GameRng) -> MatchState {
    let mut next = state.clone();

    let mut collected: Vec<(PlayerId, CardId)> = Vec::with_capacity(result.plays.len());
    for (player, card) in &result.plays {
        let Some(hand) = next.player_hands.get_mut(player) else {
            continue;
        };
        if let Some(idx) = hand.index_of(card) {
            collected.push((player.clone(), hand.remove(idx)));
        }
    }

    match &result.winner {
        Some(winner) => {
            let mut cards: Vec<CardId> = collected.into_iter().map(|(_, c)| c).collect();
            rng.shuffle(&mut cards);
            let hand = next.player_hands.entry(winner.clone()).or_default();
            hand.extend(cards);
            next.current_player = winner.clone();
        }
        None => {
            for (owner, card) in collected {
                next.player_hands.entry(owner).or_default().push_back(card);
            }
        }
    }

    for seat in &mut next.players {
        if seat.is_active() && next.player_hands.get(&seat.nickname).map_or(true, |h| h.is_empty()) {
            seat.status = PlayerStatus::Eliminated;
        }
    }

    if !next.is_active(&next.current_player) {
        let first = next.active_players().next().map(|s| s.nickname.clone());
        if let Some(first) = first {
            next.current_player = first;
        }
    }

    next.match_winner = check_game_end(&next.players);
    next.current_round += 1;
    next.current_round_plays.clear();
    next.selected_attribute = None;
    next.round_winner = None;
    next.game_phase = if next.match_winner.is_some() {
        GamePhase::Finished
    } else {
        GamePhase::Selecting
    };
    next
}

/// History record for a resolved round, stamped with the current UTC time.
#[must_use]
pub fn round_record(round_number: u32, result: &RoundResult) -> RoundRecord {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    RoundRecord {
        round_number,
        attribute: result.attribute.clone(),
        per_player: result
            .per_player
            .iter()
            .map(|pv| {
                (
                    pv.player.clone(),
                    PlayedCard {
                        card_id: pv.card_id.clone(),
                        value: pv.value,
                    },
                )
            })
            .collect(),
        winner: result.winner.clone(),
        timestamp,
    }
}
