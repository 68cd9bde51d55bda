/// Obstacle spawner: irregular, re-randomized gaps.
///
/// A timer counts ticks since the last spawn. Once it EXCEEDS the current
/// threshold an obstacle is due, the timer resets to zero and a new
/// threshold is drawn uniformly from `min..=max`. The RNG is passed in so
/// tests can drive it with a seeded generator.

use rand::Rng;

use crate::config::SpawnConfig;

#[derive(Clone, Debug)]
pub struct Spawner {
    pub timer: u32,
    pub threshold: u32,
    min_gap: u32,
    max_gap: u32,
}

impl Spawner {
    pub fn new<R: Rng>(cfg: &SpawnConfig, rng: &mut R) -> Self {
        let mut s = Spawner {
            timer: 0,
            threshold: 0,
            min_gap: cfg.min_gap_ticks.min(cfg.max_gap_ticks),
            max_gap: cfg.max_gap_ticks.max(cfg.min_gap_ticks),
        };
        s.reroll(rng);
        s
    }

    /// Advance one tick. Returns true when an obstacle should spawn now.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> bool {
        self.timer += 1;
        if self.timer > self.threshold {
            self.timer = 0;
            self.reroll(rng);
            true
        } else {
            false
        }
    }

    fn reroll<R: Rng>(&mut self, rng: &mut R) {
        self.threshold = rng.random_range(self.min_gap..=self.max_gap);
    }
}
