//! Hand-built deals for tests.
use crate::deal::{Deal, Hand};
use crate::deck::Deck;
use crate::model::{Card, PlayerId};

pub(crate) fn card(token: &str) -> Card {
    token.parse().expect("valid card token")
}

pub(crate) fn cards(tokens: &str) -> Vec<Card> {
    tokens.split_whitespace().map(card).collect()
}

pub(crate) fn hand(tokens: &str) -> Hand {
    cards(tokens).into_iter().map(Some).collect()
}

/// A deal in which `leader` is about to lead, with the given hands and
/// stock. `trump` names the trump card; it still lies face up unless the
/// stock is empty.
pub(crate) fn deal(leader: PlayerId, one: &str, two: &str, stock: &str, trump: &str) -> Deal {
    let stock = cards(stock);
    let trump = card(trump);
    let face_up = if stock.is_empty() { None } else { Some(trump) };
    Deal {
        deck: Deck::stacked(stock),
        hands: [hand(one), hand(two)],
        trump_suit: trump.suit,
        face_up,
        trick: [None, None],
        leader,
        closed_by: None,
        has_trick_won: [false, false],
        marriage_pot: [0, 0],
        score: [0, 0],
        player_in_turn: leader,
        last_trick_winner: None,
        discard: Vec::new(),
    }
}
