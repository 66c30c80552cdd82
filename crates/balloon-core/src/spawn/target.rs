use std::fmt;
use std::time::{Duration, Instant};

/// Process-unique identity of a spawned target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One rising balloon.
///
/// The horizontal offset is fixed at introduction; the vertical position is a
/// pure function of elapsed time, so targets carry no animation state.
#[derive(Debug, Clone)]
pub struct Target {
    id: TargetId,
    /// Horizontal offset in `[0, play_area_width]`.
    offset: f32,
    spawned_at: Instant,
    lifetime: Duration,
    resolved: bool,
}

impl Target {
    pub(crate) fn new(id: TargetId, offset: f32, spawned_at: Instant, lifetime: Duration) -> Self {
        Self {
            id,
            offset,
            spawned_at,
            lifetime,
            resolved: false,
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn spawned_at(&self) -> Instant {
        self.spawned_at
    }

    /// Fraction of the climb completed at `now`, clamped to `0.0..=1.0`.
    ///
    /// 0.0 is the off-screen start below the play area and 1.0 the off-screen
    /// end above it; the full climb takes exactly the lifetime. Easing is a
    /// renderer concern.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.lifetime.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.spawned_at);
        (elapsed.as_secs_f32() / self.lifetime.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Whether the travel completed without a tap.
    pub fn is_expired(&self, now: Instant) -> bool {
        !self.resolved && now.saturating_duration_since(self.spawned_at) >= self.lifetime
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn resolve(&mut self) {
        self.resolved = true;
    }

    pub fn snapshot(&self, now: Instant) -> TargetSnapshot {
        TargetSnapshot {
            id: self.id,
            offset: self.offset,
            progress: self.progress(now),
            age: now.saturating_duration_since(self.spawned_at),
        }
    }
}

/// Point-in-time view of a live target, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSnapshot {
    pub id: TargetId,
    pub offset: f32,
    pub progress: f32,
    /// Time since introduction, saturating at zero for a `now` before it.
    pub age: Duration,
}
