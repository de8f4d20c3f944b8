use rand::seq::SliceRandom;
use rand::Rng;
use snafu::{ensure, OptionExt};

use crate::error::{Error, InsufficientStockSnafu};
use crate::model::{Card, Rank, Suit};

/// The number of cards in a Sixty-six deck: nine through ace in four suits.
pub const DECK_SIZE: usize = 24;

/// A shuffled order of all the cards, of which the undrawn suffix is the
/// stock.
#[derive(Debug, Clone)]
pub struct Deck {
    order: Vec<Card>,
    drawn: usize,
}

impl Deck {
    /// Create an unshuffled deck, suits grouped by rank.
    pub fn new() -> Self {
        let order = Rank::ALL
            .iter()
            .flat_map(|&rank| Suit::ALL.iter().map(move |&suit| Card::new(rank, suit)))
            .collect();
        Deck { order, drawn: 0 }
    }

    /// Produce a fresh uniform permutation and refill the stock with it.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.sort();
        self.order.shuffle(rng);
        self.drawn = 0;
    }

    /// Take the top `n` cards of the stock, or none of them if there are
    /// fewer than `n` left.
    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, Error> {
        let remaining = self.remaining();
        ensure!(
            n <= remaining,
            InsufficientStockSnafu {
                requested: n,
                remaining
            }
        );
        let cards = self.order[self.drawn..self.drawn + n].to_vec();
        self.drawn += n;
        Ok(cards)
    }

    pub fn draw_one(&mut self) -> Result<Card, Error> {
        let card = self
            .order
            .get(self.drawn)
            .copied()
            .context(InsufficientStockSnafu {
                requested: 1usize,
                remaining: 0usize,
            })?;
        self.drawn += 1;
        Ok(card)
    }

    pub fn remaining(&self) -> usize {
        self.order.len() - self.drawn
    }

    pub fn stock(&self) -> &[Card] {
        &self.order[self.drawn..]
    }

    /// A deck whose stock is exactly `cards`, top first.
    #[cfg(test)]
    pub(crate) fn stacked(cards: Vec<Card>) -> Self {
        Deck {
            order: cards,
            drawn: 0,
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}
