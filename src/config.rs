/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::entity::{DEFAULT_GRAVITY, DEFAULT_JUMP_IMPULSE};
use crate::domain::rules::{self, Difficulty, SpeedProfile};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub physics: PhysicsConfig,
    pub spawn: SpawnConfig,
    pub difficulty: DifficultyConfig,
    pub gamepad: GamepadConfig,
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: log::LevelFilter,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub fps: u32,
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_impulse: f32,
}

/// Inclusive bounds for the random spawn gap, in ticks.
#[derive(Clone, Debug)]
pub struct SpawnConfig {
    pub min_gap_ticks: u32,
    pub max_gap_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct DifficultyConfig {
    pub normal: SpeedProfile,
    pub fast: SpeedProfile,
    pub ultra_fast: SpeedProfile,
}

impl DifficultyConfig {
    pub fn profile(&self, d: Difficulty) -> SpeedProfile {
        match d {
            Difficulty::Normal => self.normal,
            Difficulty::Fast => self.fast,
            Difficulty::UltraFast => self.ultra_fast,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub toggle_theme: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
    pub tier_1: Vec<String>,
    pub tier_2: Vec<String>,
    pub tier_3: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    spawn: TomlSpawn,
    #[serde(default)]
    difficulty: TomlDifficulty,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_fps")]
    fps: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_impulse")]
    jump_impulse: f32,
}

#[derive(Deserialize, Debug)]
struct TomlSpawn {
    #[serde(default = "default_min_gap")]
    min_gap_ticks: u32,
    #[serde(default = "default_max_gap")]
    max_gap_ticks: u32,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct TomlProfile {
    speed: f32,
    increment: f32,
}

#[derive(Deserialize, Debug)]
struct TomlDifficulty {
    #[serde(default = "default_normal")]
    normal: TomlProfile,
    #[serde(default = "default_fast")]
    fast: TomlProfile,
    #[serde(default = "default_ultra_fast")]
    ultra_fast: TomlProfile,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_toggle")]
    toggle_theme: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
    #[serde(default = "default_pad_tier_1")]
    tier_1: Vec<String>,
    #[serde(default = "default_pad_tier_2")]
    tier_2: Vec<String>,
    #[serde(default = "default_pad_tier_3")]
    tier_3: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_settings_file")]
    settings_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_fps() -> u32 { 60 }
fn default_gravity() -> f32 { DEFAULT_GRAVITY }
fn default_jump_impulse() -> f32 { DEFAULT_JUMP_IMPULSE }
fn default_min_gap() -> u32 { 50 }
fn default_max_gap() -> u32 { 100 }

fn profile_of(d: Difficulty) -> TomlProfile {
    let p = rules::default_profile(d);
    TomlProfile { speed: p.speed, increment: p.increment }
}
fn default_normal() -> TomlProfile { profile_of(Difficulty::Normal) }
fn default_fast() -> TomlProfile { profile_of(Difficulty::Fast) }
fn default_ultra_fast() -> TomlProfile { profile_of(Difficulty::UltraFast) }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "Up".into()] }
fn default_pad_toggle() -> Vec<String> { vec!["Y".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Start".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_pad_tier_1() -> Vec<String> { vec!["A".into()] }
fn default_pad_tier_2() -> Vec<String> { vec!["B".into()] }
fn default_pad_tier_3() -> Vec<String> { vec!["X".into()] }

fn default_settings_file() -> String { "settings.json".into() }
fn default_log_file() -> String { "jumption.log".into() }
fn default_log_level() -> String { "warn".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { fps: default_fps() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_impulse: default_jump_impulse(),
        }
    }
}

impl Default for TomlSpawn {
    fn default() -> Self {
        TomlSpawn {
            min_gap_ticks: default_min_gap(),
            max_gap_ticks: default_max_gap(),
        }
    }
}

impl Default for TomlDifficulty {
    fn default() -> Self {
        TomlDifficulty {
            normal: default_normal(),
            fast: default_fast(),
            ultra_fast: default_ultra_fast(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            toggle_theme: default_pad_toggle(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
            tier_1: default_pad_tier_1(),
            tier_2: default_pad_tier_2(),
            tier_3: default_pad_tier_3(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            settings_file: default_settings_file(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg)
    }

    /// Parse config text directly (no file search).
    /// A parse error yields the defaults, same as a broken file on disk.
    pub fn from_toml_str(text: &str) -> Self {
        let toml_cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("config parse error, using defaults: {e}");
                TomlConfig::default()
            }
        };
        Self::resolve(toml_cfg)
    }

    fn resolve(toml_cfg: TomlConfig) -> Self {
        let TomlConfig { timing, physics, spawn, difficulty, gamepad, general } = toml_cfg;

        // Swapped bounds are tolerated rather than rejected
        let (min_gap, max_gap) = if spawn.min_gap_ticks <= spawn.max_gap_ticks {
            (spawn.min_gap_ticks, spawn.max_gap_ticks)
        } else {
            (spawn.max_gap_ticks, spawn.min_gap_ticks)
        };

        let to_profile = |p: TomlProfile| SpeedProfile { speed: p.speed, increment: p.increment };

        GameConfig {
            timing: TimingConfig { fps: timing.fps.max(1) },
            physics: PhysicsConfig {
                gravity: physics.gravity,
                jump_impulse: physics.jump_impulse,
            },
            spawn: SpawnConfig { min_gap_ticks: min_gap, max_gap_ticks: max_gap },
            difficulty: DifficultyConfig {
                normal: to_profile(difficulty.normal),
                fast: to_profile(difficulty.fast),
                ultra_fast: to_profile(difficulty.ultra_fast),
            },
            gamepad: GamepadConfig {
                jump: gamepad.jump,
                toggle_theme: gamepad.toggle_theme,
                restart: gamepad.restart,
                quit: gamepad.quit,
                tier_1: gamepad.tier_1,
                tier_2: gamepad.tier_2,
                tier_3: gamepad.tier_3,
            },
            settings_path: PathBuf::from(general.settings_file),
            log_path: PathBuf::from(general.log_file),
            log_level: general.log_level.parse().unwrap_or(log::LevelFilter::Warn),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            return read_toml(&path);
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> TomlConfig {
    // Logger is not up yet at this point, so warnings go to stderr
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: config.toml parse error: {e}");
                eprintln!("Using default settings.");
                TomlConfig::default()
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("");
        assert_eq!(cfg.timing.fps, 60);
        assert_eq!(cfg.physics.gravity, 1.0);
        assert_eq!(cfg.physics.jump_impulse, 15.0);
        assert_eq!(cfg.spawn.min_gap_ticks, 50);
        assert_eq!(cfg.spawn.max_gap_ticks, 100);
        assert_eq!(cfg.difficulty.profile(Difficulty::Fast).speed, 50.0);
        assert_eq!(cfg.settings_path, PathBuf::from("settings.json"));
        assert_eq!(cfg.log_level, log::LevelFilter::Warn);
        assert_eq!(cfg.gamepad.jump, vec!["A".to_string(), "Up".to_string()]);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[timing]\nfps = 30\n\n[difficulty]\nfast = { speed = 40.0, increment = 1.5 }\n",
        );
        assert_eq!(cfg.timing.fps, 30);
        let fast = cfg.difficulty.profile(Difficulty::Fast);
        assert_eq!(fast.speed, 40.0);
        assert_eq!(fast.increment, 1.5);
        assert_eq!(cfg.difficulty.profile(Difficulty::Normal).speed, 25.0);
        assert_eq!(cfg.spawn.max_gap_ticks, 100);
    }

    #[test]
    fn swapped_spawn_bounds_are_reordered() {
        let cfg = GameConfig::from_toml_str("[spawn]\nmin_gap_ticks = 90\nmax_gap_ticks = 20\n");
        assert_eq!(cfg.spawn.min_gap_ticks, 20);
        assert_eq!(cfg.spawn.max_gap_ticks, 90);
    }

    #[test]
    fn zero_fps_is_clamped() {
        let cfg = GameConfig::from_toml_str("[timing]\nfps = 0\n");
        assert_eq!(cfg.timing.fps, 1);
    }

    #[test]
    fn malformed_text_falls_back_to_defaults() {
        let cfg = GameConfig::from_toml_str("[timing\nfps = ");
        assert_eq!(cfg.timing.fps, 60);
    }

    #[test]
    fn general_section_paths_and_level() {
        let cfg = GameConfig::from_toml_str(
            "[general]\nsettings_file = \"prefs.json\"\nlog_level = \"debug\"\n",
        );
        assert_eq!(cfg.settings_path, PathBuf::from("prefs.json"));
        assert_eq!(cfg.log_level, log::LevelFilter::Debug);
        assert_eq!(cfg.log_path, PathBuf::from("jumption.log"));
    }
}
