use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

/// A participant in the game.
///
/// `Player` is a cheap handle: clones share one underlying record, so a point
/// scored through any clone is visible through all of them. Identity is handle
/// identity — two players constructed with the same name are distinct, which
/// is also how the roster counts them.
#[derive(Clone)]
pub struct Player {
    shared: Arc<PlayerRecord>,
}

struct PlayerRecord {
    name: String,
    score: AtomicU32,
}

impl Player {
    /// New player with a zero score. The name is taken as given; there is no
    /// validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(PlayerRecord {
                name: name.into(),
                score: AtomicU32::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Current score. Never negative; negative adjustments saturate at zero.
    pub fn score(&self) -> u32 {
        self.shared.score.load(Ordering::SeqCst)
    }

    /// Whether two handles refer to the same player record.
    pub fn is_same(&self, other: &Player) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Plain snapshot for display or serialization.
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.shared.name.clone(),
            score: self.score(),
        }
    }

    // Scores flow through GameSession::add_score so every change is published.
    pub(crate) fn add_score(&self, points: i32) {
        let mut current = self.shared.score.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add_signed(points);
            match self.shared.score.compare_exchange(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Player {}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.shared.name)
            .field("score", &self.score())
            .finish()
    }
}

/// Point-in-time view of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_has_zero_score() {
        let player = Player::new("Alice");
        assert_eq!(player.name(), "Alice");
        assert_eq!(player.score(), 0);
    }

    #[test]
    fn test_add_score_accumulates() {
        let player = Player::new("Alice");
        player.add_score(1);
        player.add_score(1);
        player.add_score(3);
        assert_eq!(player.score(), 5);
    }

    #[test]
    fn test_negative_points_saturate_at_zero() {
        let player = Player::new("Alice");
        player.add_score(2);
        player.add_score(-5);
        assert_eq!(player.score(), 0);
    }

    #[test]
    fn test_clones_share_the_score() {
        let player = Player::new("Alice");
        let clone = player.clone();
        player.add_score(1);
        assert_eq!(clone.score(), 1);
        assert!(player.is_same(&clone));
    }

    #[test]
    fn test_same_name_is_a_distinct_player() {
        let first = Player::new("Alice");
        let second = Player::new("Alice");
        assert!(!first.is_same(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_summary_serializes() {
        let player = Player::new("Alice");
        player.add_score(2);
        let json = serde_json::to_string(&player.summary()).unwrap();
        assert_eq!(json, r#"{"name":"Alice","score":2}"#);
    }
}
