use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, Snafu};

/// One of the two seats at the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const BOTH: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => f.write_str("player 1"),
            PlayerId::Two => f.write_str("player 2"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
        }
    }

    fn from_symbol(c: char) -> Option<Suit> {
        Suit::ALL.iter().copied().find(|s| s.symbol() == c)
    }
}

/// Ranks in ascending trick-taking order, which is also the order of their
/// point values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub enum Rank {
    Nine,
    Jack,
    Queen,
    King,
    Ten,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Nine,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ten,
        Rank::Ace,
    ];

    /// Card points collected by whoever takes a trick containing this rank.
    pub fn points(self) -> u32 {
        match self {
            Rank::Nine => 0,
            Rank::Jack => 2,
            Rank::Queen => 3,
            Rank::King => 4,
            Rank::Ten => 10,
            Rank::Ace => 11,
        }
    }

    /// Single-character wire symbol; the ten travels as `X`.
    pub fn symbol(self) -> char {
        match self {
            Rank::Nine => '9',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ten => 'X',
            Rank::Ace => 'A',
        }
    }

    fn from_symbol(c: char) -> Option<Rank> {
        Rank::ALL.iter().copied().find(|r| r.symbol() == c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn points(self) -> u32 {
        self.rank.points()
    }

    /// The two-symbol form used on the wire, e.g. `X♥` for the ten of hearts.
    pub fn token(self) -> String {
        let mut s = String::with_capacity(4);
        s.push(self.rank.symbol());
        s.push(self.suit.symbol());
        s
    }
}

/// Human-facing form, with the ten spelled out.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            Rank::Ten => write!(f, "10{}", self.suit.symbol()),
            rank => write!(f, "{}{}", rank.symbol(), self.suit.symbol()),
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("{token:?} is not a card token"))]
pub struct CardParseError {
    token: String,
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(s).context(CardParseSnafu { token: s })
    }
}

fn parse_token(s: &str) -> Option<Card> {
    let mut chars = s.chars();
    let rank = Rank::from_symbol(chars.next()?)?;
    let suit = Suit::from_symbol(chars.next()?)?;
    match chars.next() {
        None => Some(Card::new(rank, suit)),
        Some(_) => None,
    }
}

pub fn same_suit(a: Card, b: Card) -> bool {
    a.suit == b.suit
}
