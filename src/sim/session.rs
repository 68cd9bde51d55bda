/// Session context and the outer state machine.
///
/// ```text
///   Menu ──1/2/3──▶ Playing(tier) ──collision──▶ GameOver
///    ▲                                              │
///    └──────────────────────R───────────────────────┘
///   Esc / Ctrl+C / window close: Quit from any state
/// ```
///
/// `Session` carries what outlives a single run (config + settings) and is
/// handed explicitly to both the menu and the game loop. Each update
/// function consumes one frame's worth of `Action`s and reports an outcome;
/// the driver maps outcomes onto the next `AppState`. Restart goes back
/// through the menu, so the difficulty is picked again.

use std::path::Path;

use anyhow::Result;
use rand::Rng;

use crate::config::GameConfig;
use crate::domain::entity::FrameInput;
use crate::domain::rules::Difficulty;
use crate::settings::Settings;
use super::event::GameEvent;
use super::step;
use super::world::WorldState;

/// Device-independent input, one per fresh press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Jump,
    ToggleTheme,
    Restart,
    Quit,
    SelectTier(Difficulty),
}

/// Outer driver state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Menu,
    Playing(Difficulty),
    Quit,
}

pub struct Session {
    pub config: GameConfig,
    pub settings: Settings,
}

impl Session {
    pub fn new(config: GameConfig, settings: Settings) -> Self {
        Session { config, settings }
    }

    /// Load persisted settings for `config` and build the context.
    pub fn open(config: GameConfig) -> Result<Self> {
        let settings = Settings::load(&config.settings_path)?;
        Ok(Self::new(config, settings))
    }

    pub fn dark_mode(&self) -> bool {
        self.settings.dark_mode
    }

    fn settings_path(&self) -> &Path {
        &self.config.settings_path
    }

    /// Flip dark mode and write it through to disk.
    pub fn toggle_dark_mode(&mut self) -> Result<()> {
        let path = self.settings_path().to_path_buf();
        self.settings.toggle_dark_mode(&path)
    }

    /// Fresh run state for the chosen tier.
    pub fn new_world<R: Rng>(&self, difficulty: Difficulty, rng: &mut R) -> WorldState {
        log::info!("Starting session: {}", difficulty.label());
        WorldState::new(&self.config, difficulty, rng)
    }
}

// ══════════════════════════════════════════════════════════════
// Menu
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuOutcome {
    Stay,
    ThemeToggled,
    Start(Difficulty),
    Quit,
}

impl MenuOutcome {
    pub fn next_state(self) -> Option<AppState> {
        match self {
            MenuOutcome::Start(d) => Some(AppState::Playing(d)),
            MenuOutcome::Quit => Some(AppState::Quit),
            MenuOutcome::Stay | MenuOutcome::ThemeToggled => None,
        }
    }
}

/// Apply one frame of menu input. Actions run in arrival order; the first
/// tier selection or quit ends the frame.
pub fn menu_update(session: &mut Session, actions: &[Action]) -> Result<MenuOutcome> {
    let mut outcome = MenuOutcome::Stay;
    for action in actions {
        match *action {
            Action::Quit => return Ok(MenuOutcome::Quit),
            Action::SelectTier(d) => return Ok(MenuOutcome::Start(d)),
            Action::ToggleTheme => {
                session.toggle_dark_mode()?;
                outcome = MenuOutcome::ThemeToggled;
            }
            Action::Jump | Action::Restart => {}
        }
    }
    Ok(outcome)
}

// ══════════════════════════════════════════════════════════════
// Playing / GameOver
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum PlayOutcome {
    Continue { events: Vec<GameEvent>, theme_toggled: bool },
    Restart,
    Quit,
}

impl PlayOutcome {
    pub fn next_state(&self) -> Option<AppState> {
        match self {
            PlayOutcome::Restart => Some(AppState::Menu),
            PlayOutcome::Quit => Some(AppState::Quit),
            PlayOutcome::Continue { .. } => None,
        }
    }
}

/// Apply one frame of input, then advance the simulation one tick.
///
/// Restart only counts once the run is over. While GameOver the world is
/// frozen and jump presses are dropped.
pub fn play_update<R: Rng>(
    session: &mut Session,
    world: &mut WorldState,
    actions: &[Action],
    rng: &mut R,
) -> Result<PlayOutcome> {
    let mut input = FrameInput::default();
    let mut theme_toggled = false;

    for action in actions {
        match *action {
            Action::Quit => return Ok(PlayOutcome::Quit),
            Action::Restart if world.is_game_over() => return Ok(PlayOutcome::Restart),
            Action::Restart => {}
            Action::ToggleTheme => {
                session.toggle_dark_mode()?;
                theme_toggled = true;
            }
            Action::Jump => input.jump = true,
            Action::SelectTier(_) => {}
        }
    }

    let was_playing = !world.is_game_over();
    let events = step::step(world, input, rng);
    if was_playing && world.is_game_over() {
        log::info!(
            "Game over on {}: score {} after {} ticks",
            world.difficulty.label(), world.score, world.tick,
        );
    }

    Ok(PlayOutcome::Continue { events, theme_toggled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Obstacle;
    use crate::settings::tests::scratch_path;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn session(tag: &str) -> Session {
        let mut cfg = GameConfig::default();
        cfg.settings_path = scratch_path(tag);
        Session::open(cfg).unwrap()
    }

    fn crashed_world(s: &Session, rng: &mut Pcg32) -> WorldState {
        let mut w = s.new_world(Difficulty::Normal, rng);
        w.obstacles.push(Obstacle::new(80.0, 25.0));
        step::step(&mut w, FrameInput::default(), rng);
        assert!(w.is_game_over());
        w
    }

    // ── Menu ──

    #[test]
    fn menu_idles_without_input() {
        let mut s = session("menu-idle");
        assert_eq!(menu_update(&mut s, &[]).unwrap(), MenuOutcome::Stay);
        assert_eq!(MenuOutcome::Stay.next_state(), None);
    }

    #[test]
    fn menu_tier_starts_playing() {
        let mut s = session("menu-tier");
        let out = menu_update(&mut s, &[Action::SelectTier(Difficulty::Fast)]).unwrap();
        assert_eq!(out, MenuOutcome::Start(Difficulty::Fast));
        assert_eq!(out.next_state(), Some(AppState::Playing(Difficulty::Fast)));
    }

    #[test]
    fn menu_quit() {
        let mut s = session("menu-quit");
        let out = menu_update(&mut s, &[Action::Quit, Action::SelectTier(Difficulty::Normal)]).unwrap();
        assert_eq!(out.next_state(), Some(AppState::Quit));
    }

    #[test]
    fn menu_toggle_persists_and_stays() {
        let mut s = session("menu-toggle");
        let out = menu_update(&mut s, &[Action::ToggleTheme]).unwrap();
        assert_eq!(out, MenuOutcome::ThemeToggled);
        assert!(s.dark_mode());
        assert!(Settings::load(&s.config.settings_path).unwrap().dark_mode);
        let _ = std::fs::remove_file(&s.config.settings_path);
    }

    #[test]
    fn menu_toggle_then_select_in_one_frame() {
        let mut s = session("menu-toggle-select");
        let out = menu_update(&mut s, &[Action::ToggleTheme, Action::SelectTier(Difficulty::UltraFast)]).unwrap();
        assert_eq!(out, MenuOutcome::Start(Difficulty::UltraFast));
        assert!(s.dark_mode());
        let _ = std::fs::remove_file(&s.config.settings_path);
    }

    #[test]
    fn menu_ignores_gameplay_keys() {
        let mut s = session("menu-ignore");
        assert_eq!(menu_update(&mut s, &[Action::Jump, Action::Restart]).unwrap(), MenuOutcome::Stay);
    }

    // ── Playing ──

    #[test]
    fn playing_advances_world() {
        let mut s = session("play-advance");
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = s.new_world(Difficulty::Normal, &mut rng);
        let out = play_update(&mut s, &mut w, &[Action::Jump], &mut rng).unwrap();
        match out {
            PlayOutcome::Continue { events, theme_toggled } => {
                assert!(events.contains(&GameEvent::Jumped));
                assert!(!theme_toggled);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(w.tick, 1);
    }

    #[test]
    fn restart_is_ignored_while_playing() {
        let mut s = session("play-restart");
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = s.new_world(Difficulty::Normal, &mut rng);
        let out = play_update(&mut s, &mut w, &[Action::Restart], &mut rng).unwrap();
        assert_eq!(out.next_state(), None);
    }

    #[test]
    fn restart_after_game_over_returns_to_menu() {
        let mut s = session("over-restart");
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = crashed_world(&s, &mut rng);
        let out = play_update(&mut s, &mut w, &[Action::Restart], &mut rng).unwrap();
        assert_eq!(out, PlayOutcome::Restart);
        assert_eq!(out.next_state(), Some(AppState::Menu));
    }

    #[test]
    fn game_over_accepts_theme_toggle_but_stays_frozen() {
        let mut s = session("over-toggle");
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = crashed_world(&s, &mut rng);
        let tick = w.tick;
        let out = play_update(&mut s, &mut w, &[Action::ToggleTheme, Action::Jump], &mut rng).unwrap();
        assert_eq!(out, PlayOutcome::Continue { events: vec![], theme_toggled: true });
        assert!(s.dark_mode());
        assert_eq!(w.tick, tick);
        let _ = std::fs::remove_file(&s.config.settings_path);
    }

    #[test]
    fn quit_works_in_every_state() {
        let mut s = session("quit");
        let mut rng = Pcg32::seed_from_u64(5);

        let mut playing = s.new_world(Difficulty::Fast, &mut rng);
        let out = play_update(&mut s, &mut playing, &[Action::Quit], &mut rng).unwrap();
        assert_eq!(out.next_state(), Some(AppState::Quit));

        let mut over = crashed_world(&s, &mut rng);
        let out = play_update(&mut s, &mut over, &[Action::Quit], &mut rng).unwrap();
        assert_eq!(out.next_state(), Some(AppState::Quit));

        assert_eq!(menu_update(&mut s, &[Action::Quit]).unwrap().next_state(), Some(AppState::Quit));
    }

    #[test]
    fn restart_yields_fresh_world() {
        let mut s = session("fresh");
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = crashed_world(&s, &mut rng);
        w.score = 7;
        assert_eq!(play_update(&mut s, &mut w, &[Action::Restart], &mut rng).unwrap(), PlayOutcome::Restart);

        let fresh = s.new_world(Difficulty::Normal, &mut rng);
        assert_eq!(fresh.score, 0);
        assert!(fresh.obstacles.is_empty());
        assert!(!fresh.is_game_over());
        assert_eq!(fresh.spawner.timer, 0);
    }

    #[test]
    fn session_reads_persisted_preference() {
        let path = scratch_path("persisted");
        Settings { dark_mode: true }.save(&path).unwrap();
        let mut cfg = GameConfig::default();
        cfg.settings_path = path.clone();
        let s = Session::open(cfg).unwrap();
        assert!(s.dark_mode());
        let _ = std::fs::remove_file(&path);
    }
}
