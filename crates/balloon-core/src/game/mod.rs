//! Session controller: the state machine, roster and match timer.

mod state;
mod watch;

pub use state::{GameMode, GameState};
pub use watch::StateWatch;

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::player::Player;
use crate::timing::SessionTiming;

/// Authoritative owner of session state: the roster, the current player, the
/// match timer and the published [`GameState`].
///
/// `GameSession` is a cheap handle; clones share one session. Construct one
/// per logical game — there is no global instance, so isolated tests can run
/// independent sessions in parallel.
#[derive(Clone)]
pub struct GameSession {
    shared: Arc<SessionShared>,
}

struct SessionShared {
    data: Mutex<SessionData>,
    /// Wakes a pending match timer when its epoch is superseded.
    timer_cancelled: Condvar,
    watch: StateWatch,
    timing: SessionTiming,
}

#[derive(Default)]
struct SessionData {
    /// Every player ever passed to a start call, first-seen order.
    players: Vec<Player>,
    current: Option<Player>,
    started_at: Option<DateTime<Utc>>,
    /// Bumped on every start and stop. A match timer fires only while the
    /// epoch it was armed under is still current, which makes cancellation
    /// atomic with respect to restarts.
    timer_epoch: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_timing(SessionTiming::default())
    }

    /// Session with a non-standard match duration. Intended for tests; the
    /// shipped game always runs with [`crate::timing::MATCH_DURATION`].
    pub fn with_timing(timing: SessionTiming) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                data: Mutex::new(SessionData::default()),
                timer_cancelled: Condvar::new(),
                watch: StateWatch::new(),
                timing,
            }),
        }
    }

    fn data(&self) -> MutexGuard<'_, SessionData> {
        self.shared
            .data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle for observing published state.
    pub fn watch(&self) -> StateWatch {
        self.shared.watch.clone()
    }

    /// Latest published state.
    pub fn state(&self) -> GameState {
        self.shared.watch.latest()
    }

    /// Start (or restart) a match for `player`.
    ///
    /// Any pending match timer is cancelled before the new one is armed, so a
    /// restart never inherits the previous session's timeout. Restarting
    /// while a match is running is legal and simply overwrites the state.
    pub fn start_game(&self, player: Player, mode: GameMode) {
        let epoch = {
            let mut data = self.data();
            data.timer_epoch += 1;

            match mode {
                GameMode::SinglePlayer => {
                    if !data.players.iter().any(|p| p.is_same(&player)) {
                        data.players.push(player.clone());
                    }
                }
            }

            data.started_at = Some(Utc::now());
            data.current = Some(player.clone());
            data.timer_epoch
        };
        self.shared.timer_cancelled.notify_all();

        info!(player = player.name(), "match started");
        // Publish before arming the timer: the timer's deadline starts after
        // this point, so `Over` can never be published ahead of `Started`
        // and then lost to it.
        self.shared.watch.publish(GameState::Started(player));
        self.spawn_match_timer(epoch);
    }

    /// [`GameSession::start_game`] with the default (and only) mode.
    pub fn start_game_single(&self, player: Player) {
        self.start_game(player, GameMode::SinglePlayer);
    }

    /// End the match manually. Idempotent: stopping with no active match
    /// still publishes `Stopped`.
    pub fn stop_game(&self) {
        {
            let mut data = self.data();
            data.timer_epoch += 1;
            data.started_at = None;
        }
        self.shared.timer_cancelled.notify_all();

        info!("match stopped");
        self.shared.watch.publish(GameState::Stopped);
    }

    /// Adjust `player`'s score by `points` and publish the update.
    ///
    /// The player is taken as given and is not checked against the current
    /// player; callers that want consistent attribution should pass
    /// [`GameSession::current_player`].
    pub fn add_score(&self, player: &Player, points: i32) {
        player.add_score(points);
        debug!(
            player = player.name(),
            points,
            score = player.score(),
            "score updated"
        );
        self.shared
            .watch
            .publish(GameState::ScoreUpdate(player.clone()));
    }

    /// Change whose taps are attributed. Does not touch the match state or
    /// the timer.
    pub fn select_player(&self, player: Player) {
        self.data().current = Some(player);
    }

    /// Snapshot of every player ever passed to a start call, in first-seen
    /// order.
    pub fn players(&self) -> Vec<Player> {
        self.data().players.clone()
    }

    pub fn current_player(&self) -> Option<Player> {
        self.data().current.clone()
    }

    /// True iff a match is running (a start timestamp is set).
    pub fn is_game_started(&self) -> bool {
        self.data().started_at.is_some()
    }

    /// When the running match started, if one is running.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.data().started_at
    }

    fn spawn_match_timer(&self, epoch: u64) {
        let session = self.clone();
        let duration = self.shared.timing.match_duration;
        thread::spawn(move || {
            let deadline = Instant::now() + duration;
            let mut data = session.data();
            while data.timer_epoch == epoch {
                let now = Instant::now();
                if now >= deadline {
                    data.started_at = None;
                    data.timer_epoch += 1;
                    let player = data.current.clone();
                    // Publish outside the data lock so watch consumers may
                    // query the session from their predicates.
                    drop(data);
                    session.publish_game_over(player);
                    return;
                }
                data = session
                    .shared
                    .timer_cancelled
                    .wait_timeout(data, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            debug!(epoch, "match timer superseded");
        });
    }

    /// Timer-driven end of match; only reachable from an un-superseded match
    /// timer, so it fires at most once per session.
    fn publish_game_over(&self, player: Option<Player>) {
        match player {
            Some(player) => {
                info!(
                    player = player.name(),
                    score = player.score(),
                    "match over"
                );
                self.shared.watch.publish(GameState::Over(player));
            }
            // A started session always has a current player; reaching this
            // arm means the contract was broken upstream.
            None => warn!("match timer fired with no current player; nothing published"),
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
