/// WorldState: everything one play-through owns.
///
/// A fresh WorldState is built for every session (difficulty pick → game
/// over). Nothing survives a restart except what lives in the `Session`
/// context (settings, config).
///
/// ## Speed ownership
///
/// `speed` belongs to the world, not to obstacles. Each tick the ramp
/// recomputes it and pushes the same value into every live obstacle, so
/// old and new obstacles always move in lockstep.

use rand::Rng;

use crate::config::GameConfig;
use crate::domain::entity::{Obstacle, Player};
use crate::domain::rules::{Difficulty, SpeedProfile};
use super::spawner::Spawner;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
}

#[derive(Clone, Debug)]
pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub obstacles: Vec<Obstacle>,

    // ── Difficulty ──
    pub difficulty: Difficulty,
    pub profile: SpeedProfile,
    /// Current obstacle speed (non-decreasing while Playing).
    pub speed: f32,
    /// Ramp steps applied so far.
    pub ramp_ticks: u64,
    pub tick_rate: u32,

    // ── Spawning ──
    pub spawner: Spawner,

    // ── Meta ──
    pub phase: Phase,
    pub score: u32,
    pub tick: u64,
}

impl WorldState {
    pub fn new<R: Rng>(config: &GameConfig, difficulty: Difficulty, rng: &mut R) -> Self {
        let profile = config.difficulty.profile(difficulty);
        WorldState {
            player: Player::with_physics(config.physics.gravity, config.physics.jump_impulse),
            obstacles: Vec::new(),
            difficulty,
            profile,
            speed: profile.speed,
            ramp_ticks: 0,
            tick_rate: config.timing.fps,
            spawner: Spawner::new(&config.spawn, rng),
            phase: Phase::Playing,
            score: 0,
            tick: 0,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn fresh_world_uses_chosen_tier() {
        let mut rng = Pcg32::seed_from_u64(0);
        let w = WorldState::new(&GameConfig::default(), Difficulty::UltraFast, &mut rng);
        assert_eq!(w.speed, 100.0);
        assert_eq!(w.profile.increment, 0.7);
        assert_eq!(w.score, 0);
        assert_eq!(w.spawner.timer, 0);
        assert!(w.obstacles.is_empty());
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player.y, 210.0);
        assert_eq!(w.tick_rate, 60);
    }
}
