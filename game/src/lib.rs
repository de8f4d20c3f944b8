//! Rules of the two-player card game Sixty-six: the deck, a single deal and
//! a match played over several deals, plus the text protocol used to play
//! it over a line-based connection.
#![warn(rust_2018_idioms)]

pub mod deal;
pub mod deck;
pub mod error;
pub mod game;
pub mod model;
pub mod protocol;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod tests_props;

pub use deal::Deal;
pub use error::{Error, Violation};
pub use game::{DealEnd, Game, PlayOutcome, Settings};
pub use model::{Card, PlayerId, Rank, Suit};
pub use protocol::{Command, Notice, TurnInfo};
