use std::collections::HashSet;

use proptest::prelude::*;
use proptest::sample::{select, subsequence};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::deal::{follow_violation, must_follow_suit, Deal};
use crate::deck::{Deck, DECK_SIZE};
use crate::game::{Game, Settings};
use crate::model::{Card, Suit};

fn assert_conserved(deal: &Deal) {
    let cards = deal.all_cards();
    assert_eq!(cards.len(), DECK_SIZE);
    let distinct: HashSet<Card> = cards.into_iter().collect();
    assert_eq!(distinct.len(), DECK_SIZE);
}

fn legal_slots(game: &Game) -> Vec<usize> {
    let player = game.player_in_turn();
    (0..game.deal().hand(player).len())
        .filter(|&slot| game.deal().validate_play(player, slot).is_ok())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_matches_never_lose_a_card(seed in any::<u64>()) {
        let mut game = Game::new(Settings { seed: Some(seed), ..Settings::default() })
            .expect("fresh deck");
        let mut moves = StdRng::seed_from_u64(seed.rotate_left(17));

        for _ in 0..2_000 {
            if game.winner().is_some() {
                break;
            }
            assert_conserved(game.deal());
            let player = game.player_in_turn();
            match moves.gen_range(0..20) {
                0 => {
                    let _ = game.close(player);
                }
                1 => {
                    let _ = game.exchange(player);
                }
                2 => {
                    let _ = game.stop(player);
                }
                _ => {
                    let slots = legal_slots(&game);
                    prop_assert!(!slots.is_empty(), "{} has no legal card", player);
                    let slot = slots[moves.gen_range(0..slots.len())];
                    game.play(player, slot).expect("validated slot");
                }
            }
        }
        prop_assert!(game.winner().is_some());
    }

    #[test]
    fn some_reply_is_always_legal(
        cards in subsequence(Deck::new().stock().to_vec(), 2..=7),
        trump in select(Suit::ALL.to_vec()),
    ) {
        let lead = cards[0];
        let hand: Vec<Option<Card>> = cards[1..].iter().copied().map(Some).collect();
        let legal = cards[1..]
            .iter()
            .filter(|&&card| follow_violation(&hand, lead, card, trump).is_none())
            .count();
        prop_assert!(legal > 0);
    }

    #[test]
    fn holding_the_led_suit_forces_it(
        cards in subsequence(Deck::new().stock().to_vec(), 2..=7),
        trump in select(Suit::ALL.to_vec()),
    ) {
        let lead = cards[0];
        let hand: Vec<Option<Card>> = cards[1..].iter().copied().map(Some).collect();
        let holds_suit = cards[1..].iter().any(|c| c.suit == lead.suit);
        for &card in &cards[1..] {
            if holds_suit && card.suit != lead.suit {
                prop_assert!(must_follow_suit(&hand, lead, card));
                prop_assert!(follow_violation(&hand, lead, card, trump).is_some());
            }
        }
    }
}
