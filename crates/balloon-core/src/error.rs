use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no active match: start a game before launching the spawner")]
    SessionNotStarted,

    #[error("spawner cadence thread panicked")]
    SpawnerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
