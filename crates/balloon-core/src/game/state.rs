use std::fmt;

use strum::IntoStaticStr;

use crate::player::Player;

/// Authoritative session state.
///
/// Exactly one value is current at any time; consumers observe the latest
/// value through [`super::StateWatch`]. `Started`, `ScoreUpdate` and `Over`
/// carry the player passed to the most recent start (or a later mutation of
/// it); `None` and `Stopped` carry no player.
#[derive(Debug, Clone, Default, PartialEq, IntoStaticStr)]
pub enum GameState {
    /// No session has started yet.
    #[default]
    None,
    /// A match is running.
    Started(Player),
    /// A match is running and a score just changed.
    ScoreUpdate(Player),
    /// The match was ended manually.
    Stopped,
    /// The match timer elapsed.
    Over(Player),
}

impl GameState {
    /// True while a match is in progress. `ScoreUpdate` is not a distinct
    /// phase from `Started` for activity purposes.
    pub fn is_active(&self) -> bool {
        matches!(self, GameState::Started(_) | GameState::ScoreUpdate(_))
    }

    /// The player carried by the state, if any.
    pub fn player(&self) -> Option<&Player> {
        match self {
            GameState::Started(player) | GameState::ScoreUpdate(player) | GameState::Over(player) => {
                Some(player)
            }
            GameState::None | GameState::Stopped => None,
        }
    }

    /// Variant name without payload, for logs and status lines.
    pub fn phase_name(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase_name())
    }
}

/// How a session is played. Only single player exists today; the variant is
/// kept explicit so the start call names its mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IntoStaticStr)]
pub enum GameMode {
    #[default]
    SinglePlayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(GameState::default(), GameState::None);
    }

    #[test]
    fn test_active_phases() {
        let player = Player::new("Alice");
        assert!(GameState::Started(player.clone()).is_active());
        assert!(GameState::ScoreUpdate(player.clone()).is_active());
        assert!(!GameState::None.is_active());
        assert!(!GameState::Stopped.is_active());
        assert!(!GameState::Over(player).is_active());
    }

    #[test]
    fn test_player_payload() {
        let player = Player::new("Alice");
        assert!(GameState::None.player().is_none());
        assert!(GameState::Stopped.player().is_none());
        let state = GameState::Over(player.clone());
        assert!(state.player().unwrap().is_same(&player));
    }

    #[test]
    fn test_phase_names() {
        let player = Player::new("Alice");
        assert_eq!(GameState::None.phase_name(), "None");
        assert_eq!(GameState::Started(player).phase_name(), "Started");
        assert_eq!(GameState::Stopped.to_string(), "Stopped");
    }
}
