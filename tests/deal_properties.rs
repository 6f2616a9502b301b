//! Property tests for dealing, shuffling and round comparison.

use std::collections::HashMap;

use proptest::prelude::*;

use trumps_engine::cards::{deal, shuffle, AttributeSpec, Card, CardId, Deck};
use trumps_engine::core::{GameRng, PlayerId};
use trumps_engine::rules::compare_round;

fn card_ids(n: usize) -> Vec<CardId> {
    (0..n).map(|i| CardId::new(format!("c{i}"))).collect()
}

fn players(n: usize) -> Vec<PlayerId> {
    (0..n).map(|i| PlayerId::new(format!("p{i}"))).collect()
}

proptest! {
    #[test]
    fn prop_deal_partitions_the_deck(
        (seats, cards) in (2usize..9).prop_flat_map(|seats| (Just(seats), seats..80)),
        seed in any::<u64>(),
    ) {
        let mut rng = GameRng::new(seed);
        let deck = shuffle(&card_ids(cards), &mut rng);
        let hands = deal(&deck, &players(seats)).unwrap();

        prop_assert_eq!(hands.len(), seats);

        let mut seen: HashMap<&CardId, usize> = HashMap::new();
        for hand in hands.values() {
            for card in hand {
                *seen.entry(card).or_default() += 1;
            }
        }
        prop_assert_eq!(seen.len(), cards);
        prop_assert!(seen.values().all(|&n| n == 1));

        let sizes: Vec<usize> = hands.values().map(|h| h.len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn prop_shuffle_is_a_permutation(cards in 0usize..60, seed in any::<u64>()) {
        let ids = card_ids(cards);
        let mut shuffled = shuffle(&ids, &mut GameRng::new(seed));
        shuffled.sort();
        let mut sorted = ids.clone();
        sorted.sort();
        prop_assert_eq!(shuffled, sorted);
    }

    #[test]
    fn prop_winner_holds_the_best_value(values in prop::collection::vec(0u32..20, 2..8)) {
        let deck = Deck::builder("nums", "Numbers")
            .attribute(AttributeSpec::higher("n"))
            .cards(values.iter().enumerate().map(|(i, v)| Card::new(format!("c{i}"), "n").with_attr("n", f64::from(*v))))
            .build()
            .unwrap();
        let seats = players(values.len());
        let plays: Vec<(PlayerId, CardId)> = seats.iter().cloned().zip(card_ids(values.len())).collect();

        let result = compare_round(plays.iter().map(|(p, c)| (p, c)), &"n".into(), &deck, &seats);

        let best = *values.iter().max().unwrap();
        let first_best = values.iter().position(|v| *v == best).unwrap();
        prop_assert_eq!(result.winner, Some(seats[first_best].clone()));
        prop_assert_eq!(result.per_player.len(), values.len());
    }
}

/// Each ordering of three cards comes up about equally often.
#[test]
fn test_shuffle_is_roughly_uniform() {
    let ids = card_ids(3);
    let mut rng = GameRng::new(2024);
    let mut counts: HashMap<Vec<CardId>, usize> = HashMap::new();

    const TRIALS: usize = 6000;
    for _ in 0..TRIALS {
        *counts.entry(shuffle(&ids, &mut rng)).or_default() += 1;
    }

    assert_eq!(counts.len(), 6, "every permutation is reachable");
    for (order, n) in &counts {
        assert!((800..=1200).contains(n), "{order:?} drawn {n} times out of {TRIALS}");
    }
}
