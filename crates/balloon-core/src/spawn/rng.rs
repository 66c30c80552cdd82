use rand::Rng;

/// Source of horizontal spawn offsets.
///
/// Injectable so tests can script deterministic placements.
pub trait SpawnRng: Send {
    /// Uniform offset in `[0.0, width]`.
    fn next_offset(&mut self, width: f32) -> f32;
}

/// Default source backed by [`rand::thread_rng`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawnRng;

impl SpawnRng for ThreadSpawnRng {
    fn next_offset(&mut self, width: f32) -> f32 {
        if width <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(0.0..=width)
    }
}

/// Replays a fixed list of offsets, cycling when exhausted. For tests that
/// assert deterministic placements.
#[derive(Debug, Clone)]
pub struct ScriptedSpawnRng {
    offsets: Vec<f32>,
    next: usize,
}

impl ScriptedSpawnRng {
    pub fn new(offsets: Vec<f32>) -> Self {
        Self { offsets, next: 0 }
    }
}

impl SpawnRng for ScriptedSpawnRng {
    fn next_offset(&mut self, width: f32) -> f32 {
        if self.offsets.is_empty() {
            return 0.0;
        }
        let offset = self.offsets[self.next % self.offsets.len()];
        self.next += 1;
        offset.clamp(0.0, width.max(0.0))
    }
}
