//! Reference timings for the game.
//!
//! The shipped game always runs with the constants below. The structs exist
//! so tests can run the same machinery at millisecond scale; they are not
//! user configuration.

use std::time::Duration;

/// Fixed match length. A session that is not stopped earlier ends in
/// `GameState::Over` after this long.
pub const MATCH_DURATION: Duration = Duration::from_secs(60);

/// Pause between target introductions.
pub const SPAWN_INTERVAL: Duration = Duration::from_secs(1);

/// How long an untouched target stays live before it retires itself.
pub const TARGET_LIFETIME: Duration = Duration::from_secs(1);

/// Targets introduced per cadence cycle.
pub const SPAWN_CYCLE_LEN: u32 = 3;

/// Match timer parameters for a [`crate::GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub match_duration: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            match_duration: MATCH_DURATION,
        }
    }
}

/// Cadence and lifetime parameters for a [`crate::Spawner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTiming {
    pub interval: Duration,
    pub lifetime: Duration,
}

impl Default for SpawnTiming {
    fn default() -> Self {
        Self {
            interval: SPAWN_INTERVAL,
            lifetime: TARGET_LIFETIME,
        }
    }
}
