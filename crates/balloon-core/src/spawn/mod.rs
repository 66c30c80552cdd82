//! Target spawner: cadence, lifetimes and tap resolution.

mod rng;
mod target;

pub use rng::{ScriptedSpawnRng, SpawnRng, ThreadSpawnRng};
pub use target::{Target, TargetId, TargetSnapshot};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::game::GameSession;
use crate::timing::{SPAWN_CYCLE_LEN, SpawnTiming};

/// Introduces targets at a fixed cadence while a match is active and retires
/// them when tapped or expired.
///
/// The spawner owns target lifecycle. Renderers poll
/// [`Spawner::live_targets`] and forward taps through [`Spawner::tap`]; they
/// never own targets. Clones share one spawner.
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<SpawnerShared>,
}

struct SpawnerShared {
    session: GameSession,
    /// Live targets keyed by id. Ids are monotonic, so iteration order is
    /// introduction order.
    board: Mutex<BTreeMap<TargetId, Target>>,
    rng: Mutex<Box<dyn SpawnRng>>,
    next_id: AtomicU64,
    spawned: AtomicU64,
    /// Bumped on every `start` (and by `SpawnerHandle::shutdown`). A cadence
    /// run exits once the sequence it was launched under is superseded, so a
    /// restart never leaves two cadences running.
    run_seq: AtomicU64,
    play_area_width: f32,
    timing: SpawnTiming,
}

impl Spawner {
    /// Spawner over `session` with the reference cadence and a thread-local
    /// RNG.
    pub fn new(session: GameSession, play_area_width: f32) -> Self {
        Self::with_parts(
            session,
            play_area_width,
            SpawnTiming::default(),
            Box::new(ThreadSpawnRng),
        )
    }

    /// Spawner with explicit timing and offset source. Intended for tests.
    pub fn with_parts(
        session: GameSession,
        play_area_width: f32,
        timing: SpawnTiming,
        rng: Box<dyn SpawnRng>,
    ) -> Self {
        Self {
            shared: Arc::new(SpawnerShared {
                session,
                board: Mutex::new(BTreeMap::new()),
                rng: Mutex::new(rng),
                next_id: AtomicU64::new(0),
                spawned: AtomicU64::new(0),
                run_seq: AtomicU64::new(0),
                play_area_width,
                timing,
            }),
        }
    }

    fn board(&self) -> MutexGuard<'_, BTreeMap<TargetId, Target>> {
        self.shared
            .board
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Launch the cadence thread.
    ///
    /// Errors with [`Error::SessionNotStarted`] when no match is active; the
    /// cadence only runs inside a match. The thread winds down on its own
    /// once the match goes inactive, or earlier via
    /// [`SpawnerHandle::shutdown`].
    pub fn start(&self) -> Result<SpawnerHandle> {
        if !self.shared.session.is_game_started() {
            return Err(Error::SessionNotStarted);
        }
        let run = self.shared.run_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let spawner = self.clone();
        let join = thread::spawn(move || spawner.run_cadence(run));
        Ok(SpawnerHandle {
            spawner: self.clone(),
            run,
            join: Some(join),
        })
    }

    /// Resolve a tap on `id`.
    ///
    /// A tap on a live target removes it and scores `+1` for the session's
    /// current player. Returns `true` only when the tap scored a removal;
    /// late or repeated taps are no-ops.
    pub fn tap(&self, id: TargetId) -> bool {
        let now = Instant::now();
        let popped = {
            let mut board = self.board();
            match board.remove(&id) {
                // Lost the race with the expiry timer: retire without score.
                Some(target) if target.is_expired(now) => None,
                other => other,
            }
        };
        let Some(mut target) = popped else {
            debug!(%id, "tap on missing or expired target ignored");
            return false;
        };

        target.resolve();
        debug!(%id, "target tapped");
        match self.shared.session.current_player() {
            Some(player) => self.shared.session.add_score(&player, 1),
            None => warn!(%id, "tap landed with no current player; point dropped"),
        }
        true
    }

    /// Snapshot of the currently live targets, in introduction order.
    pub fn live_targets(&self) -> Vec<TargetSnapshot> {
        let now = Instant::now();
        self.board().values().map(|t| t.snapshot(now)).collect()
    }

    /// Total number of targets introduced since construction.
    pub fn spawned_count(&self) -> u64 {
        self.shared.spawned.load(Ordering::SeqCst)
    }

    pub fn play_area_width(&self) -> f32 {
        self.shared.play_area_width
    }

    fn run_cadence(&self, run: u64) {
        let watch = self.shared.session.watch();
        info!(run, "spawn cadence started");
        'cadence: loop {
            for _ in 0..SPAWN_CYCLE_LEN {
                if self.should_stop(run) {
                    break 'cadence;
                }
                self.introduce();
                // Interval wait that returns early when the match ends, so
                // stopping never stalls for a full interval.
                watch.wait_for(self.shared.timing.interval, |state| !state.is_active());
            }
        }
        // Presentation must never see targets from a finished match.
        self.board().clear();
        info!(run, total = self.spawned_count(), "spawn cadence stopped");
    }

    fn should_stop(&self, run: u64) -> bool {
        self.shared.run_seq.load(Ordering::SeqCst) != run
            || !self.shared.session.state().is_active()
    }

    fn introduce(&self) {
        let offset = {
            let mut rng = self
                .shared
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            rng.next_offset(self.shared.play_area_width)
        };
        let id = TargetId(self.shared.next_id.fetch_add(1, Ordering::SeqCst));
        let target = Target::new(id, offset, Instant::now(), self.shared.timing.lifetime);
        self.board().insert(id, target);
        self.shared.spawned.fetch_add(1, Ordering::SeqCst);
        debug!(%id, offset, "target introduced");

        // Each target retires itself on its own thread; expiries never block
        // the cadence or each other, and in-flight ones are harmless after
        // the match ends.
        let spawner = self.clone();
        let lifetime = self.shared.timing.lifetime;
        thread::spawn(move || {
            thread::sleep(lifetime);
            spawner.expire(id);
        });
    }

    fn expire(&self, id: TargetId) {
        // Tapped targets are already gone; anything still here went
        // untouched for its whole lifetime.
        if self.board().remove(&id).is_some() {
            debug!(%id, "target expired untouched");
        }
    }
}

/// Running cadence thread.
///
/// Dropping the handle without joining leaves the cadence to wind down on its
/// own when the match ends.
pub struct SpawnerHandle {
    spawner: Spawner,
    run: u64,
    join: Option<JoinHandle<()>>,
}

impl SpawnerHandle {
    /// Ask this run of the cadence to stop before its next introduction.
    /// Has no effect once a newer run has been started.
    pub fn shutdown(&self) {
        let _ = self.spawner.shared.run_seq.compare_exchange(
            self.run,
            self.run + 1,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Wait for the cadence thread to finish. Returns once the match has
    /// gone inactive (or [`SpawnerHandle::shutdown`] was called) and the
    /// cadence observed it.
    pub fn join(mut self) -> Result<()> {
        match self.join.take() {
            Some(handle) => handle.join().map_err(|_| Error::SpawnerPanicked),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;
    use crate::timing::SessionTiming;
    use std::time::Duration;

    fn active_session() -> GameSession {
        let session = GameSession::with_timing(SessionTiming {
            match_duration: Duration::from_secs(60),
        });
        session.start_game_single(Player::new("Alice"));
        session
    }

    fn manual_spawner(session: &GameSession) -> Spawner {
        // Long interval: nothing spawns unless a test calls introduce().
        Spawner::with_parts(
            session.clone(),
            20.0,
            SpawnTiming {
                interval: Duration::from_secs(60),
                lifetime: Duration::from_secs(60),
            },
            Box::new(ScriptedSpawnRng::new(vec![4.0, 8.0, 12.0])),
        )
    }

    #[test]
    fn test_start_requires_active_match() {
        let session = GameSession::new();
        let spawner = Spawner::new(session, 10.0);
        assert!(matches!(spawner.start(), Err(Error::SessionNotStarted)));
    }

    #[test]
    fn test_introduce_uses_injected_offsets() {
        let session = active_session();
        let spawner = manual_spawner(&session);

        spawner.introduce();
        spawner.introduce();

        let live = spawner.live_targets();
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].offset, 4.0);
        assert_eq!(live[1].offset, 8.0);
        assert_eq!(spawner.spawned_count(), 2);
    }

    #[test]
    fn test_tap_scores_exactly_once() {
        let session = active_session();
        let spawner = manual_spawner(&session);
        spawner.introduce();
        let id = spawner.live_targets()[0].id;

        assert!(spawner.tap(id));
        assert!(!spawner.tap(id));

        let player = session.current_player().unwrap();
        assert_eq!(player.score(), 1);
        assert!(spawner.live_targets().is_empty());
    }

    #[test]
    fn test_tap_on_unknown_target_is_noop() {
        let session = active_session();
        let spawner = manual_spawner(&session);
        let version = session.watch().version();

        assert!(!spawner.tap(TargetId(99)));
        assert_eq!(session.watch().version(), version);
    }

    #[test]
    fn test_tap_credits_the_then_current_player() {
        let session = active_session();
        let spawner = manual_spawner(&session);
        spawner.introduce();
        let id = spawner.live_targets()[0].id;

        let bob = Player::new("Bob");
        session.select_player(bob.clone());

        assert!(spawner.tap(id));
        assert_eq!(bob.score(), 1);
        assert_eq!(session.players()[0].score(), 0);
    }

    #[test]
    fn test_expire_removes_untouched_target() {
        let session = active_session();
        let spawner = manual_spawner(&session);
        spawner.introduce();
        let id = spawner.live_targets()[0].id;

        spawner.expire(id);

        assert!(spawner.live_targets().is_empty());
        assert_eq!(session.current_player().unwrap().score(), 0);
        // The tap now comes too late.
        assert!(!spawner.tap(id));
    }
}
