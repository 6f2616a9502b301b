//! Bot decision strategies, one per difficulty.
//!
//! Every strategy plays a uniformly random card. They differ in how the
//! attribute is nominated when the bot leads:
//!
//! - `RandomStrategy` (easy): any attribute the card has
//! - `MaxValueStrategy` (medium): the attribute with the largest raw value
//! - `RelativeStrategy` (hard): the attribute where the card beats the
//!   largest share of the deck, honouring each attribute's comparison rule
//!
//! Only attributes the deck exposes are ever nominated. If the card has
//! none of them, a random exposed attribute is chosen.

use crate::cards::{AttributeKey, Card, CardId, Deck};
use crate::core::{Difficulty, GameRng, Hand};

/// Decision logic for a bot seat.
pub trait BotStrategy: Send + Sync {
    /// Stable name, for logs.
    fn name(&self) -> &'static str;

    /// Pick a card to play from `hand`.
    fn choose_card(&self, hand: &Hand, _deck: &Deck, rng: &mut GameRng) -> Option<CardId> {
        if hand.is_empty() {
            return None;
        }
        hand.get(rng.gen_range_usize(0..hand.len())).cloned()
    }

    /// Pick the attribute to nominate, given the card the bot played.
    fn choose_attribute(&self, card: &Card, deck: &Deck, rng: &mut GameRng) -> Option<AttributeKey>;
}

/// Exposed attributes the card has a value for, in deck order.
fn candidates<'a>(card: &Card, deck: &'a Deck) -> Vec<(&'a AttributeKey, f64)> {
    deck.attributes()
        .iter()
        .filter_map(|spec| card.value_of(&spec.key).map(|v| (&spec.key, v)))
        .collect()
}

fn any_exposed(deck: &Deck, rng: &mut GameRng) -> Option<AttributeKey> {
    rng.choose(deck.attributes()).map(|spec| spec.key.clone())
}

/// Highest score wins; ties go to the earlier attribute.
fn best_by(scored: impl IntoIterator<Item = (AttributeKey, f64)>) -> Option<AttributeKey> {
    let mut best: Option<(AttributeKey, f64)> = None;
    for (key, score) in scored {
        match &best {
            Some((_, top)) if score.total_cmp(top).is_le() => {}
            _ => best = Some((key, score)),
        }
    }
    best.map(|(key, _)| key)
}

/// Easy: random card, random attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomStrategy;

impl RandomStrategy {
    pub const NAME: &'static str = "random";
}

impl BotStrategy for RandomStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_attribute(&self, card: &Card, deck: &Deck, rng: &mut GameRng) -> Option<AttributeKey> {
        let options = candidates(card, deck);
        match rng.choose(&options) {
            Some((key, _)) => Some((*key).clone()),
            None => any_exposed(deck, rng),
        }
    }
}

/// Medium: random card, the attribute with the maximum raw value.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxValueStrategy;

impl MaxValueStrategy {
    pub const NAME: &'static str = "max-value";
}

impl BotStrategy for MaxValueStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_attribute(&self, card: &Card, deck: &Deck, rng: &mut GameRng) -> Option<AttributeKey> {
        best_by(candidates(card, deck).into_iter().map(|(k, v)| (k.clone(), v)))
            .or_else(|| any_exposed(deck, rng))
    }
}

/// Hard: random card, the attribute where the card ranks best in the deck.
#[derive(Clone, Copy, Debug, Default)]
pub struct RelativeStrategy;

impl RelativeStrategy {
    pub const NAME: &'static str = "relative";

    /// Share of the deck's values for `key` that `value` strictly beats.
    #[must_use]
    pub fn rank(deck: &Deck, key: &AttributeKey, value: f64) -> f64 {
        let rule = deck.rule(key);
        let (beaten, total) = deck
            .values_of(key)
            .fold((0usize, 0usize), |(b, t), other| (b + usize::from(rule.beats(value, other)), t + 1));
        if total == 0 {
            0.0
        } else {
            beaten as f64 / total as f64
        }
    }
}

impl BotStrategy for RelativeStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_attribute(&self, card: &Card, deck: &Deck, rng: &mut GameRng) -> Option<AttributeKey> {
        best_by(
            candidates(card, deck)
                .into_iter()
                .map(|(k, v)| (k.clone(), Self::rank(deck, k, v))),
        )
        .or_else(|| any_exposed(deck, rng))
    }
}

static RANDOM: RandomStrategy = RandomStrategy;
static MAX_VALUE: MaxValueStrategy = MaxValueStrategy;
static RELATIVE: RelativeStrategy = RelativeStrategy;

/// The strategy bots of `difficulty` play with.
#[must_use]
pub fn strategy_for(difficulty: Difficulty) -> &'static dyn BotStrategy {
    match difficulty {
        Difficulty::Easy => &RANDOM,
        Difficulty::Medium => &MAX_VALUE,
        Difficulty::Hard => &RELATIVE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::AttributeSpec;

    fn deck() -> Deck {
        Deck::builder("animals", "Animals")
            .attribute(AttributeSpec::higher("speed"))
            .attribute(AttributeSpec::higher("weight"))
            .attribute(AttributeSpec::lower("lifespan"))
            .card(Card::new("cheetah", "Cheetah").with_attr("speed", 110.0).with_attr("weight", 50.0).with_attr("lifespan", 12.0))
            .card(Card::new("elephant", "Elephant").with_attr("speed", 40.0).with_attr("weight", 6000.0).with_attr("lifespan", 70.0))
            .card(Card::new("mouse", "Mouse").with_attr("speed", 13.0).with_attr("weight", 0.02).with_attr("lifespan", 2.0))
            .card(Card::new("horse", "Horse").with_attr("speed", 88.0).with_attr("weight", 500.0).with_attr("lifespan", 30.0))
            .build()
            .unwrap()
    }

    fn card<'a>(deck: &'a Deck, id: &str) -> &'a Card {
        deck.get(&CardId::new(id)).unwrap()
    }

    #[test]
    fn test_strategy_for_difficulty() {
        assert_eq!(strategy_for(Difficulty::Easy).name(), RandomStrategy::NAME);
        assert_eq!(strategy_for(Difficulty::Medium).name(), MaxValueStrategy::NAME);
        assert_eq!(strategy_for(Difficulty::Hard).name(), RelativeStrategy::NAME);
    }

    #[test]
    fn test_choose_card_from_hand() {
        let deck = deck();
        let mut rng = GameRng::new(3);
        let hand: Hand = ["cheetah", "mouse"].iter().map(|id| CardId::new(*id)).collect();

        for _ in 0..20 {
            let choice = RandomStrategy.choose_card(&hand, &deck, &mut rng).unwrap();
            assert!(hand.contains(&choice));
        }
        assert_eq!(RandomStrategy.choose_card(&Hand::new(), &deck, &mut rng), None);
    }

    #[test]
    fn test_random_picks_exposed_attribute() {
        let deck = deck();
        let mut rng = GameRng::new(9);
        for _ in 0..20 {
            let key = RandomStrategy.choose_attribute(card(&deck, "horse"), &deck, &mut rng).unwrap();
            assert!(deck.exposes(&key));
        }
    }

    #[test]
    fn test_max_value_picks_largest_raw_value() {
        let deck = deck();
        let mut rng = GameRng::new(1);
        let key = MaxValueStrategy.choose_attribute(card(&deck, "elephant"), &deck, &mut rng);
        assert_eq!(key, Some(AttributeKey::new("weight")));

        let key = MaxValueStrategy.choose_attribute(card(&deck, "cheetah"), &deck, &mut rng);
        assert_eq!(key, Some(AttributeKey::new("speed")));
    }

    #[test]
    fn test_relative_respects_comparison_rule() {
        let deck = deck();
        let mut rng = GameRng::new(1);

        // The mouse is slowest and lightest but has the shortest lifespan,
        // which wins under lower-wins.
        let key = RelativeStrategy.choose_attribute(card(&deck, "mouse"), &deck, &mut rng);
        assert_eq!(key, Some(AttributeKey::new("lifespan")));
        // Max-value would have picked the largest number instead.
        let key = MaxValueStrategy.choose_attribute(card(&deck, "mouse"), &deck, &mut rng);
        assert_eq!(key, Some(AttributeKey::new("speed")));
    }

    #[test]
    fn test_rank() {
        let deck = deck();
        let speed = AttributeKey::new("speed");
        assert_eq!(RelativeStrategy::rank(&deck, &speed, 110.0), 0.75);
        assert_eq!(RelativeStrategy::rank(&deck, &speed, 13.0), 0.0);
        assert_eq!(RelativeStrategy::rank(&deck, &AttributeKey::new("unknown"), 1.0), 0.0);
    }

    #[test]
    fn test_card_without_exposed_attributes_falls_back() {
        let deck = deck();
        let mut rng = GameRng::new(4);
        let blank = Card::new("ghost", "Ghost").with_attr("opacity", 0.1);

        for strategy in [strategy_for(Difficulty::Easy), strategy_for(Difficulty::Medium), strategy_for(Difficulty::Hard)] {
            let key = strategy.choose_attribute(&blank, &deck, &mut rng).unwrap();
            assert!(deck.exposes(&key));
        }
    }
}
