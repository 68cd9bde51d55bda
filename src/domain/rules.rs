/// Difficulty rules: tier table and the linear speed ramp.
///
/// Pure functions, no side effects.
///
/// ## Tier Table
///
/// ┌─────────────┬─────┬───────────────┬───────────────────┐
/// │ Tier        │ Key │ Start speed   │ Increment / sec   │
/// ├─────────────┼─────┼───────────────┼───────────────────┤
/// │ Normal      │ 1   │ 25 px/tick    │ 0.30              │
/// │ Fast        │ 2   │ 50 px/tick    │ 0.25              │
/// │ Ultra Fast  │ 3   │ 100 px/tick   │ 0.70              │
/// └─────────────┴─────┴───────────────┴───────────────────┘
///
/// Values above are defaults; `config.toml [difficulty]` overrides them.
///
/// ## Ramp
///
/// speed(t) = initial + increment × (t / tick_rate)
///
/// The increment is per second; it is spread evenly over the ticks of
/// that second. Speed is computed from the tick count rather than
/// accumulated so long sessions don't drift.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Difficulty {
    Normal,
    Fast,
    UltraFast,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Normal, Difficulty::Fast, Difficulty::UltraFast];

    /// Menu slot 0..3 → tier.
    pub fn from_index(i: usize) -> Option<Difficulty> {
        Self::ALL.get(i).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Fast => "Fast",
            Difficulty::UltraFast => "Ultra Fast",
        }
    }
}

/// Speed pair chosen in the menu.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpeedProfile {
    pub speed: f32,
    pub increment: f32,
}

pub const NORMAL: SpeedProfile = SpeedProfile { speed: 25.0, increment: 0.3 };
pub const FAST: SpeedProfile = SpeedProfile { speed: 50.0, increment: 0.25 };
pub const ULTRA_FAST: SpeedProfile = SpeedProfile { speed: 100.0, increment: 0.7 };

pub fn default_profile(d: Difficulty) -> SpeedProfile {
    match d {
        Difficulty::Normal => NORMAL,
        Difficulty::Fast => FAST,
        Difficulty::UltraFast => ULTRA_FAST,
    }
}

/// Session speed after `elapsed_ticks` ramp steps.
pub fn ramped_speed(profile: SpeedProfile, elapsed_ticks: u64, tick_rate: u32) -> f32 {
    let seconds = elapsed_ticks as f64 / tick_rate.max(1) as f64;
    (profile.speed as f64 + profile.increment as f64 * seconds) as f32
}
