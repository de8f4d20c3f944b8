//! The line-oriented text protocol spoken between clients and the server.
use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

use crate::deal::HAND_SIZE;
use crate::game::Game;
use crate::model::{Card, PlayerId, Suit};

/// Every line a client may send.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// The handshake that must open every connection.
    Connect,
    /// Play the card in the given slot, counting from zero. On the wire the
    /// slot is a single digit counting from one.
    Card(usize),
    Exchange,
    Close,
    Stop,
    Help,
    Quit,
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("unknown command {input:?}"))]
pub struct ParseError {
    input: String,
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let [digit @ b'1'..=b'9'] = s.as_bytes() {
            let slot = usize::from(digit - b'1');
            if slot < HAND_SIZE {
                return Ok(Command::Card(slot));
            }
        }
        match s.to_ascii_lowercase().as_str() {
            "connect" => Ok(Command::Connect),
            "exchange" => Ok(Command::Exchange),
            "close" => Ok(Command::Close),
            "stop" => Ok(Command::Stop),
            "help" => Ok(Command::Help),
            "quit" => Ok(Command::Quit),
            _ => ParseSnafu { input: s }.fail(),
        }
    }
}

/// Everything a player needs to see before choosing a move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TurnInfo {
    pub hand: Vec<Option<Card>>,
    pub trump_suit: Suit,
    pub face_up: Option<Card>,
    /// Cards still to be drawn, the face-up trump included.
    pub stock: usize,
    pub closed: bool,
    pub deal_points: u32,
    pub match_points: u32,
    pub opponent_match_points: u32,
}

impl TurnInfo {
    pub fn new(game: &Game, player: PlayerId) -> Self {
        let deal = game.deal();
        TurnInfo {
            hand: deal.hand(player).to_vec(),
            trump_suit: deal.trump_suit(),
            face_up: deal.face_up(),
            stock: deal.remaining() + usize::from(deal.face_up().is_some()),
            closed: deal.is_closed(),
            deal_points: deal.score(player),
            match_points: game.score(player),
            opponent_match_points: game.score(player.opponent()),
        }
    }
}

impl fmt::Display for TurnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Your hand:")?;
        for (i, slot) in self.hand.iter().enumerate() {
            match slot {
                Some(card) => write!(f, " {}){}", i + 1, card)?,
                None => write!(f, " {})--", i + 1)?,
            }
        }
        f.write_str("\nTrump: ")?;
        match self.face_up {
            Some(card) => write!(f, "{}", card)?,
            None => write!(f, "{}", self.trump_suit.symbol())?,
        }
        write!(
            f,
            " | Stock: {} | Closed: {}\nYour points: {} | Game: {} - {}",
            self.stock,
            if self.closed { "yes" } else { "no" },
            self.deal_points,
            self.match_points,
            self.opponent_match_points
        )
    }
}

/// Every message the server sends.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Notice {
    Waiting,
    EnoughPlayers,
    Start,
    YourTurn,
    NotYourTurn,
    TurnInfo(TurnInfo),
    YourCard { card: Card, marriage: Option<u32> },
    OpponentCard { card: Card, marriage: Option<u32> },
    YouClosed,
    OpponentClosed,
    YouExchanged { card: Card },
    OpponentExchanged,
    Trick { won: bool },
    Deal { won: bool, points: u32 },
    Game { won: bool },
    OpponentLeft,
    NotPossible,
    WrongInput,
    Help,
}

const HELP: &str = "\
Commands:
  1-6       play the card in that position of your hand
  exchange  swap the nine of trumps for the face-up trump
  close     close the stock; no more cards are drawn this deal
  stop      end the deal, claiming 66 points
  help      show this list
  quit      leave the game";

fn write_card(f: &mut fmt::Formatter<'_>, card: &Card, marriage: &Option<u32>) -> fmt::Result {
    write!(f, "{}", card)?;
    match marriage {
        Some(points) => write!(f, " Marriage: {}", points),
        None => Ok(()),
    }
}

fn won_or_lost(won: bool) -> &'static str {
    if won {
        "won"
    } else {
        "lost"
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Waiting => f.write_str("Waiting for the other player to connect."),
            Notice::EnoughPlayers => f.write_str("Already enough players."),
            Notice::Start => f.write_str("The game starts now."),
            Notice::YourTurn => f.write_str("It's your turn, pick a card number or write a command."),
            Notice::NotYourTurn => f.write_str("It's your opponent's turn, please wait."),
            Notice::TurnInfo(info) => write!(f, "{}", info),
            Notice::YourCard { card, marriage } => {
                f.write_str("Your card: ")?;
                write_card(f, card, marriage)
            }
            Notice::OpponentCard { card, marriage } => {
                f.write_str("Opponent's card: ")?;
                write_card(f, card, marriage)
            }
            Notice::YouClosed => f.write_str("You closed the stock."),
            Notice::OpponentClosed => f.write_str("Opponent closed."),
            Notice::YouExchanged { card } => write!(f, "You exchanged the trump, you took {}.", card),
            Notice::OpponentExchanged => f.write_str("Opponent exchanged the trump."),
            Notice::Trick { won } => write!(f, "You {} this trick.", won_or_lost(*won)),
            Notice::Deal { won, points } => {
                write!(f, "You {} this deal. Points: {}", won_or_lost(*won), points)
            }
            Notice::Game { won } => write!(
                f,
                "YOU {} THE GAME.",
                won_or_lost(*won).to_ascii_uppercase()
            ),
            Notice::OpponentLeft => f.write_str("Opponent left."),
            Notice::NotPossible => f.write_str("Operation not possible, try again."),
            Notice::WrongInput => f.write_str("Wrong input, try again."),
            Notice::Help => f.write_str(HELP),
        }
    }
}
