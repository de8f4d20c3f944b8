use snafu::Snafu;

/// Why a card may not be played from a given slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Violation {
    /// The slot index is beyond the end of the hand.
    NoSuchSlot,
    /// The slot exists but holds no card until the next draw.
    EmptySlot,
    /// The follower holds a card of the led suit but played another suit.
    MustFollowSuit,
    /// The follower is void in the led suit, holds a trump, and played neither.
    MustTrump,
    /// The follower followed suit under the lead while holding a card that beats it.
    MustOvertrump,
}

/// Every way a rule-engine call can be refused.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("cannot draw {requested} cards from a stock of {remaining}"))]
    InsufficientStock { requested: usize, remaining: usize },

    #[snafu(display("it is the other player's turn"))]
    OutOfTurn,

    #[snafu(display("illegal play: {violation:?}"))]
    IllegalPlay { violation: Violation },

    #[snafu(display("{command} is not possible now"))]
    IllegalCommand { command: &'static str },

    #[snafu(display("the trick is not complete"))]
    TrickIncomplete,

    #[snafu(display("the game is over"))]
    GameOver,
}

impl Error {
    /// Errors that no sequence of client input can provoke.
    pub fn is_invariant_breach(&self) -> bool {
        matches!(self, Error::InsufficientStock { .. } | Error::TrickIncomplete)
    }
}
