//! Core engine for the balloon reaction game.
//!
//! Two components do all the work: [`game::GameSession`] owns the session
//! state machine (roster, current player, match timer, published state) and
//! [`spawn::Spawner`] introduces rising targets at a fixed cadence and
//! resolves taps against them. Rendering is left to front-ends, which observe
//! [`game::StateWatch`] and poll [`spawn::Spawner::live_targets`].

pub mod error;
pub mod game;
pub mod player;
pub mod spawn;
pub mod timing;

pub use error::{Error, Result};
pub use game::{GameMode, GameSession, GameState, StateWatch};
pub use player::{Player, PlayerSummary};
pub use spawn::{
    ScriptedSpawnRng, SpawnRng, Spawner, SpawnerHandle, Target, TargetId, TargetSnapshot,
    ThreadSpawnRng,
};
pub use timing::{SessionTiming, SpawnTiming};
