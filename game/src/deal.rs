//! The rules of a single deal: dealing, legal plays, tricks, marriages,
//! closing the stock, the nine-of-trumps exchange and deal-end scoring.
use std::cmp::Ordering;

use log::debug;
use rand::Rng;
use snafu::ensure;

use crate::deck::Deck;
use crate::error::{
    Error, IllegalCommandSnafu, IllegalPlaySnafu, OutOfTurnSnafu, TrickIncompleteSnafu, Violation,
};
use crate::model::{same_suit, Card, PlayerId, Rank, Suit};

/// Cards held by each player while the stock is open.
pub const HAND_SIZE: usize = 6;
/// Deal points needed to win a deal.
pub const WINNING_SCORE: u32 = 66;
/// Below this many deal points the loser pays double.
pub const HALF_SCORE: u32 = 33;
/// Awarded to the taker of the final trick when the stock ran out unclosed.
pub const LAST_TRICK_BONUS: u32 = 10;
pub const TRUMP_MARRIAGE: u32 = 40;
pub const PLAIN_MARRIAGE: u32 = 20;

/// A hand is a row of slots. While the stock is open a played card leaves
/// its slot empty until the next draw; once the stock is shut, slots are
/// removed as soon as they are played.
pub type Hand = Vec<Option<Card>>;

/// A card that was just put on the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Played {
    pub card: Card,
    /// Points declared for a marriage, if the play announced one.
    pub marriage: Option<u32>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TrickResult {
    pub winner: PlayerId,
    /// Card points of both cards in the trick.
    pub points: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DealResult {
    pub winner: PlayerId,
    /// Match points won, between one and three.
    pub points: u32,
}

#[derive(Debug, Clone)]
pub struct Deal {
    pub(crate) deck: Deck,
    pub(crate) hands: [Hand; 2],
    pub(crate) trump_suit: Suit,
    /// The trump card lying face up under the stock, until it is drawn.
    pub(crate) face_up: Option<Card>,
    pub(crate) trick: [Option<Card>; 2],
    /// Who led, or is to lead, the current trick.
    pub(crate) leader: PlayerId,
    pub(crate) closed_by: Option<PlayerId>,
    pub(crate) has_trick_won: [bool; 2],
    /// Marriage points declared but not yet credited.
    pub(crate) marriage_pot: [u32; 2],
    pub(crate) score: [u32; 2],
    pub(crate) player_in_turn: PlayerId,
    pub(crate) last_trick_winner: Option<PlayerId>,
    pub(crate) discard: Vec<Card>,
}

impl Deal {
    /// Shuffle a fresh deck and deal it, with `leader` to play first.
    pub fn start<R: Rng + ?Sized>(leader: PlayerId, rng: &mut R) -> Result<Self, Error> {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        Deal::deal_from(leader, deck)
    }

    /// Deal from the top of `deck`: three cards to the leader, three to the
    /// other player, three more each, and the thirteenth card face up.
    pub(crate) fn deal_from(leader: PlayerId, mut deck: Deck) -> Result<Self, Error> {
        let cards = deck.draw(2 * HAND_SIZE + 1)?;
        let mut hands: [Hand; 2] = [Vec::with_capacity(HAND_SIZE), Vec::with_capacity(HAND_SIZE)];
        for (batch, chunk) in cards[..2 * HAND_SIZE].chunks(3).enumerate() {
            let receiver = if batch % 2 == 0 {
                leader
            } else {
                leader.opponent()
            };
            hands[receiver.index()].extend(chunk.iter().copied().map(Some));
        }
        let trump = cards[2 * HAND_SIZE];
        debug!("new deal, trump {}, {} leads", trump, leader);
        Ok(Deal {
            deck,
            hands,
            trump_suit: trump.suit,
            face_up: Some(trump),
            trick: [None, None],
            leader,
            closed_by: None,
            has_trick_won: [false, false],
            marriage_pot: [0, 0],
            score: [0, 0],
            player_in_turn: leader,
            last_trick_winner: None,
            discard: Vec::new(),
        })
    }

    pub fn player_in_turn(&self) -> PlayerId {
        self.player_in_turn
    }

    pub fn hand(&self, player: PlayerId) -> &[Option<Card>] {
        &self.hands[player.index()]
    }

    pub fn trump_suit(&self) -> Suit {
        self.trump_suit
    }

    pub fn face_up(&self) -> Option<Card> {
        self.face_up
    }

    pub fn trick_card(&self, player: PlayerId) -> Option<Card> {
        self.trick[player.index()]
    }

    pub fn closed_by(&self) -> Option<PlayerId> {
        self.closed_by
    }

    pub fn is_closed(&self) -> bool {
        self.closed_by.is_some()
    }

    /// Cards left in the face-down stock, not counting the face-up trump.
    pub fn remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn stock(&self) -> &[Card] {
        self.deck.stock()
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.score[player.index()]
    }

    pub fn has_won_trick(&self, player: PlayerId) -> bool {
        self.has_trick_won[player.index()]
    }

    pub fn marriage_pot(&self, player: PlayerId) -> u32 {
        self.marriage_pot[player.index()]
    }

    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn is_trump(&self, card: Card) -> bool {
        card.suit == self.trump_suit
    }

    /// Closed or exhausted: no more draws, and the follower must follow.
    pub fn stock_shut(&self) -> bool {
        self.is_closed() || self.deck.remaining() == 0
    }

    pub fn trick_complete(&self) -> bool {
        self.trick.iter().all(Option::is_some)
    }

    /// Every card has been played and the last trick taken.
    pub fn is_over(&self) -> bool {
        self.hands.iter().all(|h| h.iter().all(Option::is_none)) && self.trick == [None, None]
    }

    /// Check that `player` may play the card in `slot` without changing
    /// anything, returning the card.
    pub fn validate_play(&self, player: PlayerId, slot: usize) -> Result<Card, Error> {
        let hand = self.hand(player);
        let card = match hand.get(slot) {
            None => return IllegalPlaySnafu { violation: Violation::NoSuchSlot }.fail(),
            Some(None) => return IllegalPlaySnafu { violation: Violation::EmptySlot }.fail(),
            Some(Some(card)) => *card,
        };
        let lead = match self.trick_card(player.opponent()) {
            Some(lead) if self.stock_shut() => lead,
            _ => return Ok(card),
        };
        match follow_violation(hand, lead, card, self.trump_suit) {
            Some(violation) => IllegalPlaySnafu { violation }.fail(),
            None => Ok(card),
        }
    }

    /// Put the card in `slot` on the table, announcing a marriage if it
    /// makes one.
    pub fn play_card(&mut self, player: PlayerId, slot: usize) -> Result<Played, Error> {
        ensure!(self.player_in_turn == player, OutOfTurnSnafu);
        let card = self.validate_play(player, slot)?;
        let lead = self.trick_card(player.opponent());
        let marriage = self.marriage_value(player, card, lead);

        let shut = self.stock_shut();
        let hand = &mut self.hands[player.index()];
        if shut {
            hand.remove(slot);
        } else {
            hand[slot] = None;
        }
        self.trick[player.index()] = Some(card);

        if let Some(points) = marriage {
            debug!("{} declares a marriage worth {}", player, points);
            self.marriage_pot[player.index()] += points;
            self.credit_marriages(player);
        }
        if lead.is_none() {
            self.leader = player;
            self.player_in_turn = player.opponent();
        }
        Ok(Played { card, marriage })
    }

    // A queen or king played while its partner is still in hand. When
    // following, it only counts on the led suit or in trumps.
    fn marriage_value(&self, player: PlayerId, card: Card, lead: Option<Card>) -> Option<u32> {
        let partner = match card.rank {
            Rank::Queen => Rank::King,
            Rank::King => Rank::Queen,
            _ => return None,
        };
        if let Some(lead) = lead {
            if !same_suit(card, lead) && !self.is_trump(card) {
                return None;
            }
        }
        let partner = Card::new(partner, card.suit);
        if !self.hand(player).contains(&Some(partner)) {
            return None;
        }
        if self.is_trump(card) {
            Some(TRUMP_MARRIAGE)
        } else {
            Some(PLAIN_MARRIAGE)
        }
    }

    // Marriage points only count once the player has taken a trick.
    fn credit_marriages(&mut self, player: PlayerId) {
        let i = player.index();
        if self.has_trick_won[i] {
            self.score[i] += self.marriage_pot[i];
            self.marriage_pot[i] = 0;
        }
    }

    /// Decide a complete trick, score it and refill the hands.
    pub fn resolve_trick(&mut self) -> Result<TrickResult, Error> {
        let leader = self.leader;
        let follower = leader.opponent();
        let (lead, reply) = match (self.trick_card(leader), self.trick_card(follower)) {
            (Some(lead), Some(reply)) => (lead, reply),
            _ => return TrickIncompleteSnafu.fail(),
        };
        let winner = if self.beats(reply, lead) {
            follower
        } else {
            leader
        };
        let points = lead.points() + reply.points();

        self.has_trick_won[winner.index()] = true;
        self.credit_marriages(winner);
        self.score[winner.index()] += points;
        self.discard.extend([lead, reply]);
        self.trick = [None, None];
        self.leader = winner;
        self.player_in_turn = winner;
        self.last_trick_winner = Some(winner);
        debug!("{} takes {} and {} for {}", winner, lead, reply, points);

        self.replenish(winner)?;
        Ok(TrickResult { winner, points })
    }

    fn beats(&self, reply: Card, lead: Card) -> bool {
        if self.is_trump(reply) != self.is_trump(lead) {
            self.is_trump(reply)
        } else {
            same_suit(reply, lead) && reply.points() > lead.points()
        }
    }

    // The trick winner draws first. The loser of the trick that empties the
    // stock takes the face-up trump.
    fn replenish(&mut self, winner: PlayerId) -> Result<(), Error> {
        let loser = winner.opponent();
        if self.stock_shut() {
            for hand in self.hands.iter_mut() {
                hand.retain(Option::is_some);
            }
            return Ok(());
        }
        if self.deck.remaining() == 1 {
            let last = self.deck.draw_one()?;
            self.refill(winner, last);
            if let Some(trump) = self.face_up.take() {
                self.refill(loser, trump);
            }
        } else {
            let cards = self.deck.draw(2)?;
            self.refill(winner, cards[0]);
            self.refill(loser, cards[1]);
        }
        Ok(())
    }

    fn refill(&mut self, player: PlayerId, card: Card) {
        let hand = &mut self.hands[player.index()];
        match hand.iter().position(Option::is_none) {
            Some(slot) => hand[slot] = Some(card),
            None => hand.push(Some(card)),
        }
    }

    /// Stop drawing from the stock for the rest of the deal. Only the
    /// player about to lead may close.
    pub fn close(&mut self, player: PlayerId) -> Result<(), Error> {
        ensure!(self.player_in_turn == player, OutOfTurnSnafu);
        ensure!(
            !self.is_closed()
                && self.deck.remaining() > 0
                && self.trick_card(player.opponent()).is_none(),
            IllegalCommandSnafu { command: "close" }
        );
        debug!("{} closes the stock", player);
        self.closed_by = Some(player);
        Ok(())
    }

    /// Swap the nine of trumps in hand for the face-up trump card, returning
    /// the card taken up.
    pub fn exchange(&mut self, player: PlayerId) -> Result<Card, Error> {
        ensure!(self.player_in_turn == player, OutOfTurnSnafu);
        let nine = Card::new(Rank::Nine, self.trump_suit);
        let refused = IllegalCommandSnafu { command: "exchange" };
        let face_up = match self.face_up {
            Some(card) if card.rank != Rank::Nine => card,
            _ => return refused.fail(),
        };
        ensure!(
            self.trick_card(player.opponent()).is_none()
                && self.has_won_trick(player)
                && !self.is_closed()
                && self.deck.remaining() >= 1,
            refused
        );
        let hand = &mut self.hands[player.index()];
        let slot = match hand.iter().position(|c| *c == Some(nine)) {
            Some(slot) => slot,
            None => return refused.fail(),
        };
        hand[slot] = Some(face_up);
        self.face_up = Some(nine);
        debug!("{} exchanges the nine for {}", player, face_up);
        Ok(face_up)
    }

    /// Score the finished deal. `claimant` is the player who stopped the
    /// deal, or `None` when it ran out of cards.
    pub fn settle(&mut self, claimant: Option<PlayerId>) -> DealResult {
        if claimant.is_none() && !self.is_closed() {
            if let Some(last) = self.last_trick_winner {
                self.score[last.index()] += LAST_TRICK_BONUS;
            }
        }
        let evaluated = match claimant.or(self.closed_by) {
            Some(player) => player,
            None => match self.score[0].cmp(&self.score[1]) {
                Ordering::Greater => PlayerId::One,
                Ordering::Less => PlayerId::Two,
                // A tied deal goes to the second seat.
                Ordering::Equal => {
                    return DealResult {
                        winner: PlayerId::Two,
                        points: self.win_points_against(PlayerId::One),
                    }
                }
            },
        };
        let opponent = evaluated.opponent();
        let own = self.score(evaluated);
        let theirs = self.score(opponent);

        if !self.has_won_trick(evaluated) {
            DealResult {
                winner: opponent,
                points: 3,
            }
        } else if own >= WINNING_SCORE && own > theirs {
            DealResult {
                winner: evaluated,
                points: self.win_points_against(opponent),
            }
        } else {
            DealResult {
                winner: opponent,
                points: 2,
            }
        }
    }

    // Three against a shutout, two against a schneider, otherwise one.
    fn win_points_against(&self, loser: PlayerId) -> u32 {
        if !self.has_won_trick(loser) {
            3
        } else if self.score(loser) < HALF_SCORE {
            2
        } else {
            1
        }
    }

    /// Every card of the deal, wherever it currently lies.
    #[cfg(test)]
    pub(crate) fn all_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.stock().to_vec();
        cards.extend(self.hands.iter().flatten().flatten());
        cards.extend(self.face_up);
        cards.extend(self.trick.iter().flatten());
        cards.extend(self.discard());
        cards
    }
}

/// Holding the led suit obliges the follower to play it.
pub fn must_follow_suit(hand: &[Option<Card>], lead: Card, card: Card) -> bool {
    !same_suit(card, lead) && holds(hand, |c| same_suit(c, lead))
}

/// Void in the led suit, a non-trump lead must be trumped if possible.
pub fn must_trump(hand: &[Option<Card>], lead: Card, card: Card, trump: Suit) -> bool {
    !same_suit(card, lead)
        && lead.suit != trump
        && card.suit != trump
        && holds(hand, |c| c.suit == trump)
}

/// Following suit, the lead must be beaten if possible.
pub fn must_overtrump(hand: &[Option<Card>], lead: Card, card: Card) -> bool {
    same_suit(card, lead)
        && card.points() < lead.points()
        && holds(hand, |c| same_suit(c, lead) && c.points() > lead.points())
}

/// The first rule a follower's card breaks once the stock is shut, in order
/// of precedence.
pub fn follow_violation(
    hand: &[Option<Card>],
    lead: Card,
    card: Card,
    trump: Suit,
) -> Option<Violation> {
    if must_follow_suit(hand, lead, card) {
        Some(Violation::MustFollowSuit)
    } else if must_trump(hand, lead, card, trump) {
        Some(Violation::MustTrump)
    } else if must_overtrump(hand, lead, card) {
        Some(Violation::MustOvertrump)
    } else {
        None
    }
}

fn holds(hand: &[Option<Card>], pred: impl Fn(Card) -> bool) -> bool {
    hand.iter().flatten().any(|&c| pred(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{card, deal};
    use crate::model::PlayerId::{One, Two};

    #[test]
    fn deals_two_batches_of_three_and_turns_up_the_thirteenth() {
        let d = Deal::deal_from(Two, Deck::new()).expect("full deck");
        let hand = |p| -> Vec<Card> { d.hand(p).iter().flatten().copied().collect() };
        assert_eq!(
            hand(Two),
            ["9♣", "9♦", "9♥", "J♥", "J♠", "Q♣"].map(card).to_vec()
        );
        assert_eq!(
            hand(One),
            ["9♠", "J♣", "J♦", "Q♦", "Q♥", "Q♠"].map(card).to_vec()
        );
        assert_eq!(d.face_up(), Some(card("K♣")));
        assert_eq!(d.trump_suit(), Suit::Clubs);
        assert_eq!(d.remaining(), 11);
        assert_eq!(d.player_in_turn(), Two);
    }

    #[test]
    fn out_of_turn_is_refused() {
        let mut d = deal(One, "9♣ J♣", "9♦ J♦", "A♠ X♠", "A♥");
        assert_eq!(d.play_card(Two, 0), Err(Error::OutOfTurn));
        assert_eq!(d.close(Two), Err(Error::OutOfTurn));
    }

    #[test]
    fn missing_and_empty_slots() {
        let mut d = deal(One, "9♣ J♣", "9♦ J♦", "A♠ X♠", "A♥");
        assert_eq!(
            d.validate_play(One, 2),
            Err(Error::IllegalPlay {
                violation: Violation::NoSuchSlot
            })
        );
        d.hands[0][1] = None;
        assert_eq!(
            d.validate_play(One, 1),
            Err(Error::IllegalPlay {
                violation: Violation::EmptySlot
            })
        );
    }

    #[test]
    fn anything_goes_while_the_stock_is_open() {
        let mut d = deal(One, "K♠ 9♣", "A♠ 9♥ J♦", "A♦ X♦", "A♥");
        d.play_card(One, 0).expect("lead");
        for slot in 0..3 {
            assert!(d.validate_play(Two, slot).is_ok());
        }
    }

    #[test]
    fn forced_follow_once_closed() {
        let mut d = deal(One, "K♠ 9♣", "9♠ A♠ 9♥ J♦ Q♦ K♦", "A♦ X♦", "A♥");
        d.close(One).expect("leader may close");
        d.play_card(One, 0).expect("lead K♠");
        let refused = |v| Err(Error::IllegalPlay { violation: v });
        assert_eq!(d.validate_play(Two, 3), refused(Violation::MustFollowSuit));
        assert_eq!(d.validate_play(Two, 2), refused(Violation::MustFollowSuit));
        assert_eq!(d.validate_play(Two, 0), refused(Violation::MustOvertrump));
        assert_eq!(d.validate_play(Two, 1), Ok(card("A♠")));
    }

    #[test]
    fn void_follower_must_trump_a_plain_lead() {
        let mut d = deal(One, "K♠ K♥", "9♥ J♦ Q♦ K♦ A♣ X♣", "", "A♥");
        d.play_card(One, 0).expect("lead K♠");
        assert_eq!(
            d.validate_play(Two, 1),
            Err(Error::IllegalPlay {
                violation: Violation::MustTrump
            })
        );
        assert_eq!(d.validate_play(Two, 0), Ok(card("9♥")));
    }

    #[test]
    fn void_follower_may_discard_on_a_trump_lead() {
        let mut d = deal(One, "K♥ K♠", "J♦ Q♦", "", "A♥");
        d.play_card(One, 0).expect("lead K♥");
        assert!(d.validate_play(Two, 0).is_ok());
        assert!(d.validate_play(Two, 1).is_ok());
    }

    #[test]
    fn marriage_is_credited_after_the_first_trick() {
        let mut d = deal(
            One,
            "K♥ Q♥ K♠ Q♠ 9♣ J♣",
            "A♥ 9♦ J♦ Q♦ K♦ 9♠",
            "A♦ X♦ A♣ X♣",
            "J♥",
        );
        let played = d.play_card(One, 0).expect("lead K♥");
        assert_eq!(played.marriage, Some(TRUMP_MARRIAGE));
        assert_eq!(d.marriage_pot(One), 40);
        assert_eq!(d.score(One), 0);

        d.play_card(Two, 0).expect("A♥ beats K♥");
        let trick = d.resolve_trick().expect("complete");
        assert_eq!(trick, TrickResult { winner: Two, points: 15 });
        assert_eq!(d.marriage_pot(One), 40);
        // Winner draws A♦, loser X♦ into the emptied slots.
        assert_eq!(d.hand(Two)[0], Some(card("A♦")));
        assert_eq!(d.hand(One)[0], Some(card("X♦")));

        d.play_card(Two, 1).expect("lead 9♦");
        let played = d.play_card(One, 3).expect("Q♠ discarded");
        assert_eq!(played.marriage, None);
        d.resolve_trick().expect("complete");
        assert_eq!(d.score(One), 0);
        assert_eq!(d.marriage_pot(One), 40);
    }

    #[test]
    fn pending_marriage_flushes_when_the_declarer_takes_a_trick() {
        let mut d = deal(One, "K♥ Q♥ X♦ Q♠ 9♣ J♣", "A♥ 9♦ J♦ Q♦ K♦ 9♠", "A♣ X♣ K♣", "J♥");
        d.play_card(One, 0).expect("lead K♥");
        d.play_card(Two, 0).expect("A♥");
        d.resolve_trick().expect("Two wins");
        d.play_card(Two, 1).expect("lead 9♦");
        d.play_card(One, 2).expect("X♦ beats 9♦");
        let trick = d.resolve_trick().expect("One wins");
        assert_eq!(trick.winner, One);
        assert_eq!(d.score(One), 40 + 10);
        assert_eq!(d.marriage_pot(One), 0);
    }

    #[test]
    fn marriage_counts_at_once_after_a_trick_has_been_won() {
        let mut d = deal(One, "K♠ Q♠ 9♣", "9♦ J♦", "A♦ X♦", "J♥");
        d.has_trick_won[0] = true;
        d.score[0] = 12;
        let played = d.play_card(One, 1).expect("lead Q♠");
        assert_eq!(played.marriage, Some(PLAIN_MARRIAGE));
        assert_eq!(d.score(One), 32);
        assert_eq!(d.marriage_pot(One), 0);
    }

    #[test]
    fn following_marriage_needs_the_led_suit_or_trumps() {
        let mut d = deal(One, "9♦ J♦", "K♠ Q♠ K♥ Q♥", "A♦ X♦", "J♥");
        d.play_card(One, 0).expect("lead 9♦");
        let mut plain = d.clone();
        assert_eq!(plain.play_card(Two, 0).map(|p| p.marriage), Ok(None));
        assert_eq!(d.play_card(Two, 2).map(|p| p.marriage), Ok(Some(40)));
    }

    #[test]
    fn trick_winners() {
        // Trump beats a plain card.
        let mut d = deal(One, "A♠", "9♥", "A♦ X♦", "J♥");
        d.play_card(One, 0).unwrap();
        d.play_card(Two, 0).unwrap();
        assert_eq!(d.resolve_trick().unwrap(), TrickResult { winner: Two, points: 11 });

        // Higher card of the led suit wins.
        let mut d = deal(One, "J♠", "X♠", "A♦ X♦", "J♥");
        d.play_card(One, 0).unwrap();
        d.play_card(Two, 0).unwrap();
        assert_eq!(d.resolve_trick().unwrap().winner, Two);

        // An off-suit discard leaves the trick with the leader.
        let mut d = deal(One, "9♠", "A♦", "A♣ X♦", "J♥");
        d.play_card(One, 0).unwrap();
        d.play_card(Two, 0).unwrap();
        assert_eq!(d.resolve_trick().unwrap(), TrickResult { winner: One, points: 11 });
        assert_eq!(d.player_in_turn(), One);
    }

    #[test]
    fn resolving_half_a_trick_fails() {
        let mut d = deal(One, "9♠", "A♦", "A♣ X♦", "J♥");
        assert_eq!(d.resolve_trick(), Err(Error::TrickIncomplete));
        d.play_card(One, 0).unwrap();
        assert_eq!(d.resolve_trick(), Err(Error::TrickIncomplete));
    }

    #[test]
    fn last_stock_card_goes_to_the_winner_and_the_trump_to_the_loser() {
        let mut d = deal(One, "J♣ Q♣ K♣ X♣ A♣ 9♠", "J♦ Q♦ K♦ X♦ A♦ J♠", "A♠", "9♥");
        d.play_card(One, 4).expect("lead A♣");
        d.play_card(Two, 0).expect("discard J♦");
        let trick = d.resolve_trick().expect("complete");
        assert_eq!(trick.winner, One);
        assert_eq!(d.hand(One)[4], Some(card("A♠")));
        assert_eq!(d.hand(Two)[0], Some(card("9♥")));
        assert_eq!(d.remaining(), 0);
        assert_eq!(d.face_up(), None);

        // From now on played slots disappear and nothing is drawn.
        d.play_card(One, 0).expect("lead J♣");
        assert_eq!(d.hand(One).len(), 5);
        assert_eq!(
            d.validate_play(Two, 1),
            Err(Error::IllegalPlay {
                violation: Violation::MustTrump
            })
        );
        d.play_card(Two, 0).expect("trump with 9♥");
        assert_eq!(d.resolve_trick().unwrap().winner, Two);
        assert_eq!(d.hand(Two).len(), 5);
        assert_eq!(d.hand(One).len(), 5);
        assert_eq!(d.remaining(), 0);
        assert!(d.hand(One).iter().all(Option::is_some));
    }

    #[test]
    fn close_window() {
        let mut d = deal(One, "9♣ J♣", "9♦ J♦", "A♠ X♠", "A♥");
        d.play_card(One, 0).unwrap();
        assert_eq!(
            d.close(Two),
            Err(Error::IllegalCommand { command: "close" })
        );

        let mut d = deal(One, "9♣ J♣", "9♦ J♦", "", "A♥");
        assert_eq!(
            d.close(One),
            Err(Error::IllegalCommand { command: "close" })
        );

        let mut d = deal(One, "9♣ J♣", "9♦ J♦", "A♠ X♠", "A♥");
        d.close(One).expect("may close");
        assert_eq!(d.closed_by(), Some(One));
        assert_eq!(
            d.close(One),
            Err(Error::IllegalCommand { command: "close" })
        );
    }

    #[test]
    fn closed_stock_is_never_drawn_from() {
        let mut d = deal(One, "9♣ J♣ Q♣", "9♦ J♦ Q♦", "A♠ X♠", "A♥");
        d.close(One).unwrap();
        d.play_card(One, 0).unwrap();
        assert_eq!(d.hand(One).len(), 2);
        d.play_card(Two, 0).unwrap();
        d.resolve_trick().unwrap();
        assert_eq!(d.remaining(), 2);
        assert_eq!(d.hand(Two).len(), 2);
        assert_eq!(d.face_up(), Some(card("A♥")));
    }

    #[test]
    fn exchange_refusals() {
        let refused = Err(Error::IllegalCommand { command: "exchange" });
        let base = || {
            let mut d = deal(One, "9♥ J♣ Q♣", "9♦ J♦ Q♦", "A♠ X♠", "A♥");
            d.has_trick_won[0] = true;
            d
        };

        let mut d = base();
        d.face_up = Some(card("9♥"));
        d.hands[0][0] = Some(card("A♥"));
        assert_eq!(d.exchange(One), refused);

        let mut d = base();
        d.has_trick_won[0] = false;
        assert_eq!(d.exchange(One), refused);

        let mut d = base();
        d.close(One).unwrap();
        assert_eq!(d.exchange(One), refused);

        let mut d = deal(One, "9♥ J♣ Q♣", "9♦ J♦ Q♦", "", "A♥");
        d.has_trick_won[0] = true;
        d.face_up = Some(card("A♥"));
        assert_eq!(d.exchange(One), refused);

        let mut d = base();
        d.leader = Two;
        d.player_in_turn = Two;
        d.play_card(Two, 0).unwrap();
        assert_eq!(d.exchange(One), refused);

        let mut d = base();
        d.hands[0][0] = Some(card("X♣"));
        assert_eq!(d.exchange(One), refused);
    }

    #[test]
    fn exchange_swaps_the_nine_for_the_face_up_trump() {
        let mut d = deal(One, "J♣ 9♥ Q♣", "9♦ J♦ Q♦", "A♠ X♠", "A♥");
        d.has_trick_won[0] = true;
        assert_eq!(d.exchange(One), Ok(card("A♥")));
        assert_eq!(d.hand(One)[1], Some(card("A♥")));
        assert_eq!(d.face_up(), Some(card("9♥")));
        assert_eq!(d.trump_suit(), Suit::Hearts);
    }

    #[test]
    fn closer_short_of_66_pays_two() {
        let mut d = deal(One, "", "", "A♠", "A♥");
        d.closed_by = Some(One);
        d.has_trick_won = [true, true];
        d.score = [60, 30];
        assert_eq!(d.settle(None), DealResult { winner: Two, points: 2 });
    }

    #[test]
    fn shutout_pays_three() {
        let mut d = deal(One, "", "", "", "A♥");
        d.has_trick_won = [true, false];
        d.score = [70, 0];
        d.last_trick_winner = Some(One);
        assert_eq!(d.settle(None), DealResult { winner: One, points: 3 });
    }

    #[test]
    fn natural_end_adds_the_last_trick_bonus_first() {
        let mut d = deal(One, "", "", "", "A♥");
        d.has_trick_won = [true, true];
        d.score = [60, 50];
        d.last_trick_winner = Some(One);
        assert_eq!(d.settle(None), DealResult { winner: One, points: 1 });
        assert_eq!(d.score(One), 70);
    }

    #[test]
    fn tied_natural_end_goes_to_player_two() {
        let mut d = deal(One, "", "", "", "A♥");
        d.has_trick_won = [true, true];
        d.score = [55, 65];
        d.last_trick_winner = Some(One);
        assert_eq!(d.settle(None), DealResult { winner: Two, points: 1 });
        assert_eq!(d.score, [65, 65]);
    }

    #[test]
    fn no_bonus_after_closing() {
        let mut d = deal(One, "", "", "A♠", "A♥");
        d.closed_by = Some(Two);
        d.has_trick_won = [true, true];
        d.score = [40, 70];
        d.last_trick_winner = Some(One);
        assert_eq!(d.settle(None), DealResult { winner: Two, points: 1 });
        assert_eq!(d.score(One), 40);
    }

    #[test]
    fn claims() {
        let mut d = deal(One, "", "", "A♠", "A♥");
        d.has_trick_won = [true, true];
        d.score = [40, 20];
        assert_eq!(d.settle(Some(One)), DealResult { winner: Two, points: 2 });

        d.score = [66, 20];
        assert_eq!(d.settle(Some(One)), DealResult { winner: One, points: 2 });

        d.score = [66, 33];
        assert_eq!(d.settle(Some(One)), DealResult { winner: One, points: 1 });

        d.has_trick_won = [true, false];
        d.score = [66, 0];
        assert_eq!(d.settle(Some(One)), DealResult { winner: One, points: 3 });

        d.has_trick_won = [false, true];
        d.score = [0, 50];
        assert_eq!(d.settle(Some(One)), DealResult { winner: Two, points: 3 });
    }

    #[test]
    fn forced_follow_predicates() {
        let hand: Hand = ["9♠", "A♠", "9♥", "J♦"].map(|t| Some(card(t))).to_vec();
        let trump = Suit::Hearts;
        assert!(must_follow_suit(&hand, card("K♠"), card("J♦")));
        assert!(!must_follow_suit(&hand, card("K♣"), card("J♦")));
        assert!(must_trump(&hand, card("K♣"), card("J♦"), trump));
        assert!(!must_trump(&hand, card("K♥"), card("J♦"), trump));
        assert!(must_overtrump(&hand, card("K♠"), card("9♠")));
        assert!(!must_overtrump(&hand, card("K♠"), card("A♠")));
        assert_eq!(
            follow_violation(&hand, card("K♠"), card("9♥"), trump),
            Some(Violation::MustFollowSuit)
        );
    }
}
