//! A match: the running score across deals, up to the match target.
use std::default::Default;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use snafu::ensure;

use crate::deal::{Deal, DealResult, Played, TrickResult};
use crate::error::{Error, GameOverSnafu, IllegalCommandSnafu, OutOfTurnSnafu};
use crate::model::{Card, PlayerId};

/// Match points needed to win the match.
pub const MATCH_TARGET: u32 = 11;

/// The first to connect deals the first hand, so the second leads.
pub const FIRST_LEADER: PlayerId = PlayerId::Two;

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub match_target: u32,
    /// Fixed shuffle seed, for reproducible matches.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            match_target: MATCH_TARGET,
            seed: None,
        }
    }
}

/// What a single card play led to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlayOutcome {
    pub played: Played,
    /// Set when the card completed a trick.
    pub trick: Option<TrickResult>,
    /// Set when that trick was the last of the deal.
    pub deal_end: Option<DealEnd>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DealEnd {
    pub winner: PlayerId,
    pub points: u32,
    pub match_over: bool,
}

pub struct Game {
    settings: Settings,
    rng: StdRng,
    deal: Deal,
    score: [u32; 2],
    winner: Option<PlayerId>,
}

impl Game {
    /// Start a match with its first deal.
    pub fn new(settings: Settings) -> Result<Self, Error> {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let deal = Deal::start(FIRST_LEADER, &mut rng)?;
        Ok(Game {
            settings,
            rng,
            deal,
            score: [0, 0],
            winner: None,
        })
    }

    pub fn deal(&self) -> &Deal {
        &self.deal
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.score[player.index()]
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn player_in_turn(&self) -> PlayerId {
        self.deal.player_in_turn()
    }

    /// Play the card in `slot`, resolving the trick and the deal as far as
    /// that card completes them.
    pub fn play(&mut self, player: PlayerId, slot: usize) -> Result<PlayOutcome, Error> {
        ensure!(self.winner.is_none(), GameOverSnafu);
        let played = self.deal.play_card(player, slot)?;
        if !self.deal.trick_complete() {
            return Ok(PlayOutcome {
                played,
                trick: None,
                deal_end: None,
            });
        }
        let trick = self.deal.resolve_trick()?;
        let deal_end = if self.deal.is_over() {
            Some(self.end_deal(None)?)
        } else {
            None
        };
        Ok(PlayOutcome {
            played,
            trick: Some(trick),
            deal_end,
        })
    }

    pub fn close(&mut self, player: PlayerId) -> Result<(), Error> {
        ensure!(self.winner.is_none(), GameOverSnafu);
        self.deal.close(player)
    }

    pub fn exchange(&mut self, player: PlayerId) -> Result<Card, Error> {
        ensure!(self.winner.is_none(), GameOverSnafu);
        self.deal.exchange(player)
    }

    /// End the deal on `player`'s claim. Any score may be claimed; a claim
    /// short of 66 simply loses the deal.
    pub fn stop(&mut self, player: PlayerId) -> Result<DealEnd, Error> {
        ensure!(self.winner.is_none(), GameOverSnafu);
        ensure!(self.deal.player_in_turn() == player, OutOfTurnSnafu);
        ensure!(
            self.deal.trick_card(player.opponent()).is_none(),
            IllegalCommandSnafu { command: "stop" }
        );
        self.end_deal(Some(player))
    }

    /// Score the current deal into the match, then either finish the match
    /// or deal again with the loser leading.
    pub fn end_deal(&mut self, claimant: Option<PlayerId>) -> Result<DealEnd, Error> {
        let DealResult { winner, points } = self.deal.settle(claimant);
        self.score[winner.index()] += points;
        info!(
            "{} wins the deal for {} (match {} - {})",
            winner, points, self.score[0], self.score[1]
        );
        let match_over = self.score[winner.index()] >= self.settings.match_target;
        if match_over {
            info!("{} wins the match", winner);
            self.winner = Some(winner);
        } else {
            self.deal = Deal::start(winner.opponent(), &mut self.rng)?;
        }
        Ok(DealEnd {
            winner,
            points,
            match_over,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_deal(settings: Settings, deal: Deal, score: [u32; 2]) -> Self {
        Game {
            settings,
            rng: StdRng::seed_from_u64(0),
            deal,
            score,
            winner: None,
        }
    }
}
