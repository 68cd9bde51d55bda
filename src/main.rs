/// Entry point, outer state machine and frame loop.

mod config;
mod domain;
mod settings;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;

use config::GameConfig;
use domain::rules::Difficulty;
use sim::event::GameEvent;
use sim::session::{self, Action, AppState, MenuOutcome, PlayOutcome, Session};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Palette, Renderer};
use ui::sound::{self as sfx, SoundEngine};

fn main() -> ExitCode {
    let config = GameConfig::load();
    init_logging(&config);
    log::info!("Jumption starting ({} fps)", config.timing.fps);

    // Settings are read before the terminal switches modes, so a broken
    // file is reported on a normal screen.
    let mut session = match Session::open(config) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = Renderer::new();
    // Raw mode may already be on when a later init step fails
    if let Err(e) = undo_on_error(renderer.init(), || renderer.cleanup()) {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = SoundEngine::new();
    let result = run(&mut session, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            log::info!("Clean exit");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Route `log` output to the configured file. The terminal belongs to the
/// game, so nothing is written to stderr; if the file can't be opened the
/// game simply runs without a log.
fn init_logging(config: &GameConfig) {
    let file = match File::create(&config.log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", config.log_path.display());
            return;
        }
    };

    let result = env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: logger init failed: {e}");
    }
}

/// Run `undo` if `result` failed; the original error is kept either way.
fn undo_on_error<T>(result: io::Result<T>, undo: impl FnOnce() -> io::Result<()>) -> io::Result<T> {
    if result.is_err() {
        if let Err(e) = undo() {
            eprintln!("Terminal restore failed: {e}");
        }
    }
    result
}

// ══════════════════════════════════════════════════════════════
// Frame pacing
// ══════════════════════════════════════════════════════════════

/// Fixed-rate pacing: sleep out whatever is left of the frame. A frame
/// that runs long is simply late; there is no catch-up.
struct FrameClock {
    frame: Duration,
    started: Instant,
}

impl FrameClock {
    fn new(fps: u32) -> Self {
        FrameClock {
            frame: frame_duration(fps),
            started: Instant::now(),
        }
    }

    fn wait(&mut self) {
        let left = remaining(self.frame, self.started.elapsed());
        if !left.is_zero() {
            std::thread::sleep(left);
        }
        self.started = Instant::now();
    }
}

fn frame_duration(fps: u32) -> Duration {
    Duration::from_secs(1) / fps.max(1)
}

fn remaining(frame: Duration, elapsed: Duration) -> Duration {
    frame.saturating_sub(elapsed)
}

// ══════════════════════════════════════════════════════════════
// Input devices
// ══════════════════════════════════════════════════════════════

struct Devices {
    keyboard: InputState,
    gamepad: GamepadState,
}

impl Devices {
    fn new(config: &GameConfig, key_events_reported: bool) -> Self {
        let mut keyboard = InputState::new();
        keyboard.honor_release = key_events_reported;

        let mut gamepad = GamepadState::new();
        gamepad.load_button_config(&config.gamepad);
        if gamepad.connected {
            log::info!("Gamepad detected");
        }
        Devices { keyboard, gamepad }
    }

    /// This frame's actions: keyboard first, then gamepad.
    fn poll(&mut self) -> Vec<Action> {
        self.keyboard.drain_events();
        self.gamepad.update();
        let mut actions = self.keyboard.actions().to_vec();
        actions.extend(self.gamepad.actions());
        actions
    }
}

// ══════════════════════════════════════════════════════════════
// Outer loop
// ══════════════════════════════════════════════════════════════

fn run(session: &mut Session, renderer: &mut Renderer, sound: Option<&SoundEngine>) -> Result<()> {
    let mut devices = Devices::new(&session.config, renderer.key_events_reported());
    let mut rng = rand::rng();
    let mut state = AppState::Menu;

    loop {
        state = match state {
            AppState::Menu => run_menu(session, renderer, sound, &mut devices)?,
            AppState::Playing(difficulty) => {
                run_game(session, renderer, sound, &mut devices, difficulty, &mut rng)?
            }
            AppState::Quit => break,
        };
        log::debug!("State -> {state:?}");
    }

    Ok(())
}

/// Fade out the frame on screen toward the background that was showing.
fn fade_out(renderer: &mut Renderer, dark_mode: bool) -> Result<()> {
    renderer.fade(Palette::for_mode(dark_mode).bg).context("drawing fade")
}

fn run_menu(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    devices: &mut Devices,
) -> Result<AppState> {
    let mut clock = FrameClock::new(session.config.timing.fps);

    loop {
        let actions = devices.poll();
        let outcome = session::menu_update(session, &actions)?;

        match outcome {
            MenuOutcome::ThemeToggled => {
                if let Some(s) = sound { s.play_select(); }
                fade_out(renderer, !session.dark_mode())?;
            }
            MenuOutcome::Start(difficulty) => {
                if let Some(s) = sound { s.play_select(); }
                log::info!("Menu: {} selected", difficulty.label());
                fade_out(renderer, session.dark_mode())?;
            }
            MenuOutcome::Stay | MenuOutcome::Quit => {}
        }

        if let Some(next) = outcome.next_state() {
            return Ok(next);
        }

        renderer.render_menu(session.dark_mode()).context("drawing menu")?;
        clock.wait();
    }
}

fn run_game<R: Rng>(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    devices: &mut Devices,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<AppState> {
    let mut clock = FrameClock::new(session.config.timing.fps);
    let mut world = session.new_world(difficulty, rng);

    loop {
        let actions = devices.poll();
        let outcome = session::play_update(session, &mut world, &actions, rng)?;

        match &outcome {
            PlayOutcome::Continue { events, theme_toggled } => {
                sfx::play_events(sound, events);
                log_events(events);
                if *theme_toggled {
                    fade_out(renderer, !session.dark_mode())?;
                }
            }
            PlayOutcome::Restart => {
                log::info!("Restart after score {}", world.score);
                fade_out(renderer, session.dark_mode())?;
            }
            PlayOutcome::Quit => {}
        }

        if let Some(next) = outcome.next_state() {
            return Ok(next);
        }

        renderer.render_game(&world, session.dark_mode()).context("drawing frame")?;
        clock.wait();
    }
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::ObstacleSpawned { speed } => log::debug!("Spawn at speed {speed:.2}"),
            GameEvent::ObstaclePassed { score } => log::debug!("Passed, score {score}"),
            GameEvent::Collision { x } => log::info!("Collision with obstacle at x={x:.1}"),
            GameEvent::Jumped => log::trace!("Jump"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_init_is_undone_and_error_kept() {
        let mut undone = 0;
        let failed: io::Result<()> = Err(io::Error::other("no alternate screen"));
        let out = undo_on_error(failed, || { undone += 1; Ok(()) });
        assert_eq!(undone, 1);
        assert_eq!(out.unwrap_err().to_string(), "no alternate screen");

        // A failing undo doesn't replace the original error
        let failed: io::Result<()> = Err(io::Error::other("raw mode"));
        let out = undo_on_error(failed, || Err(io::Error::other("restore")));
        assert_eq!(out.unwrap_err().to_string(), "raw mode");
    }

    #[test]
    fn successful_init_is_left_alone() {
        let mut undone = false;
        let out = undo_on_error(Ok(5), || { undone = true; Ok(()) });
        assert_eq!(out.unwrap(), 5);
        assert!(!undone);
    }

    #[test]
    fn sixty_fps_frame_is_about_16ms() {
        let f = frame_duration(60);
        assert!(f > Duration::from_micros(16_600) && f < Duration::from_micros(16_700));
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        assert_eq!(frame_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn clock_sleeps_only_the_remainder() {
        let frame = Duration::from_millis(16);
        assert_eq!(remaining(frame, Duration::from_millis(10)), Duration::from_millis(6));
        // A late frame gets no sleep and no catch-up credit
        assert_eq!(remaining(frame, Duration::from_millis(40)), Duration::ZERO);
    }
}
