//! The shared state of one match: the two seats, the game, and teardown.
//!
//! Every command runs to completion under one lock, including queueing its
//! notices, so the two connection tasks always observe a consistent game and
//! each player receives notices in the order they were produced.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::{mpsc, watch, Mutex};

use sixtysix_game::deal::Played;
use sixtysix_game::{Command, DealEnd, Game, Notice, PlayerId, Settings, TurnInfo};

/// The sender half for notices to a player.
pub type NoticeTx = mpsc::UnboundedSender<Notice>;

/// The receiver half for notices to a player.
pub type NoticeRx = mpsc::UnboundedReceiver<Notice>;

/// A shared handle to the session.
pub type Shared = Arc<Session>;

/// Create a session for one match, waiting for its players.
pub fn create(settings: Settings) -> Shared {
    let (stopped_tx, _) = watch::channel(false);
    Arc::new(Session {
        stopping: AtomicBool::new(false),
        stopped_tx,
        table: Mutex::new(Table::new(settings)),
    })
}

pub struct Session {
    stopping: AtomicBool,
    stopped_tx: watch::Sender<bool>,
    table: Mutex<Table>,
}

impl Session {
    /// Receive `true` once the session has been torn down.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stopped_tx.subscribe()
    }

    /// Resolves once the session has been torn down.
    pub async fn stopped(&self) {
        let mut stopped_rx = self.subscribe();
        let _ = stopped_rx.wait_for(|stopped| *stopped).await;
    }

    /// Inquire whether the session is being torn down.
    pub fn stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Tear the session down. Only the first call has any effect.
    pub fn shutdown(&self) {
        if !self.stopping.swap(true, Ordering::AcqRel) {
            info!("tearing down the session");
            self.stopped_tx.send_replace(true);
        }
    }

    pub async fn is_full(&self) -> bool {
        self.table.lock().await.is_full()
    }

    /// Seat a new player, or `None` if both seats are taken.
    pub async fn join(&self, tx: NoticeTx) -> Option<PlayerId> {
        let mut table = self.table.lock().await;
        if self.stopping() {
            return None;
        }
        let (player, outbox) = table.join(tx)?;
        self.deliver(&table, outbox);
        Some(player)
    }

    /// Handle one line sent by `from`.
    pub async fn dispatch(&self, from: PlayerId, line: &str) {
        let mut table = self.table.lock().await;
        if self.stopping() {
            return;
        }
        let outbox = table.dispatch(from, line);
        self.deliver(&table, outbox);
    }

    /// Answer a line from `from` that could not even be read as text.
    pub async fn wrong_input(&self, from: PlayerId) {
        let table = self.table.lock().await;
        if self.stopping() {
            return;
        }
        table.deliver(vec![(from, Notice::WrongInput)]);
    }

    /// Handle `player`'s connection going away.
    pub async fn leave(&self, player: PlayerId) {
        let table = self.table.lock().await;
        if self.stopping() {
            return;
        }
        info!("{} left", player);
        self.deliver(&table, Table::leave(player));
    }

    fn deliver(&self, table: &Table, outbox: Outbox) {
        table.deliver(outbox.notices);
        if outbox.teardown {
            self.shutdown();
        }
    }
}

/// Notices produced by one event, and whether the session ends with it.
#[derive(Debug, Default)]
struct Outbox {
    notices: Vec<(PlayerId, Notice)>,
    teardown: bool,
}

impl Outbox {
    fn to(&mut self, player: PlayerId, notice: Notice) {
        self.notices.push((player, notice));
    }

    fn both(&mut self, notice: impl Fn(PlayerId) -> Notice) {
        for player in PlayerId::BOTH {
            self.to(player, notice(player));
        }
    }
}

struct Table {
    settings: Settings,
    seats: [Option<NoticeTx>; 2],
    game: Option<Game>,
}

impl Table {
    fn new(settings: Settings) -> Self {
        Table {
            settings,
            seats: [None, None],
            game: None,
        }
    }

    fn is_full(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }

    fn join(&mut self, tx: NoticeTx) -> Option<(PlayerId, Outbox)> {
        let player = PlayerId::BOTH
            .into_iter()
            .find(|p| self.seats[p.index()].is_none())?;
        self.seats[player.index()] = Some(tx);
        info!("{} took a seat", player);

        let mut outbox = Outbox::default();
        if player == PlayerId::One {
            outbox.to(player, Notice::Waiting);
            return Some((player, outbox));
        }
        match Game::new(self.settings) {
            Ok(game) => {
                outbox.both(|_| Notice::Start);
                turn_blocks(&mut outbox, &game);
                self.game = Some(game);
            }
            Err(e) => {
                error!("could not deal the first hand: {}", e);
                outbox.teardown = true;
            }
        }
        Some((player, outbox))
    }

    fn dispatch(&mut self, from: PlayerId, line: &str) -> Outbox {
        let mut outbox = Outbox::default();
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                debug!("rejected input from {}: {}", from, e);
                outbox.to(from, Notice::WrongInput);
                return outbox;
            }
        };
        debug!("{} sent {:?}", from, command);

        match command {
            Command::Help => outbox.to(from, Notice::Help),
            Command::Quit => {
                info!("{} quit", from);
                outbox = Table::leave(from);
            }
            Command::Connect => outbox.to(from, Notice::NotPossible),
            Command::Card(_) | Command::Exchange | Command::Close | Command::Stop => {
                match self.game.as_mut() {
                    None => outbox.to(from, Notice::Waiting),
                    Some(game) if game.player_in_turn() != from => {
                        outbox.to(from, Notice::NotYourTurn)
                    }
                    Some(game) => {
                        if let Err(e) = apply(game, from, command, &mut outbox) {
                            if e.is_invariant_breach() {
                                error!("{:?} from {} broke the deal: {}", command, from, e);
                                outbox.teardown = true;
                            } else {
                                debug!("refused {:?} from {}: {}", command, from, e);
                                outbox.to(from, Notice::NotPossible);
                            }
                        }
                    }
                }
            }
        }
        outbox
    }

    fn leave(player: PlayerId) -> Outbox {
        let mut outbox = Outbox::default();
        outbox.to(player.opponent(), Notice::OpponentLeft);
        outbox.teardown = true;
        outbox
    }

    fn deliver(&self, notices: Vec<(PlayerId, Notice)>) {
        for (player, notice) in notices {
            if let Some(seat) = &self.seats[player.index()] {
                if seat.send(notice).is_err() {
                    debug!("{} is no longer listening", player);
                }
            }
        }
    }
}

// Run a game command for the player in turn. Nothing is queued unless the
// command succeeds.
fn apply(
    game: &mut Game,
    from: PlayerId,
    command: Command,
    outbox: &mut Outbox,
) -> Result<(), sixtysix_game::Error> {
    let opponent = from.opponent();
    match command {
        Command::Card(slot) => {
            let outcome = game.play(from, slot)?;
            let Played { card, marriage } = outcome.played;
            outbox.to(from, Notice::YourCard { card, marriage });
            outbox.to(opponent, Notice::OpponentCard { card, marriage });
            if let Some(trick) = outcome.trick {
                outbox.both(|p| Notice::Trick {
                    won: trick.winner == p,
                });
            }
            if let Some(end) = outcome.deal_end {
                announce_deal_end(outbox, end);
            }
        }
        Command::Close => {
            game.close(from)?;
            outbox.to(from, Notice::YouClosed);
            outbox.to(opponent, Notice::OpponentClosed);
        }
        Command::Exchange => {
            let card = game.exchange(from)?;
            outbox.to(from, Notice::YouExchanged { card });
            outbox.to(opponent, Notice::OpponentExchanged);
        }
        Command::Stop => {
            let end = game.stop(from)?;
            announce_deal_end(outbox, end);
        }
        // Handled before reaching the game.
        Command::Connect | Command::Help | Command::Quit => return Ok(()),
    }
    if game.winner().is_none() {
        turn_blocks(outbox, game);
    }
    Ok(())
}

fn announce_deal_end(outbox: &mut Outbox, end: DealEnd) {
    outbox.both(|p| Notice::Deal {
        won: end.winner == p,
        points: end.points,
    });
    if end.match_over {
        outbox.both(|p| Notice::Game {
            won: end.winner == p,
        });
        outbox.teardown = true;
    }
}

fn turn_blocks(outbox: &mut Outbox, game: &Game) {
    let in_turn = game.player_in_turn();
    for player in PlayerId::BOTH {
        outbox.to(player, Notice::TurnInfo(TurnInfo::new(game, player)));
        let prompt = if player == in_turn {
            Notice::YourTurn
        } else {
            Notice::NotYourTurn
        };
        outbox.to(player, prompt);
    }
}
