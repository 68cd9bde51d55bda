/// Gamepad input via gilrs.
///
/// Each action owns a list of buttons; a fresh press of any of them yields
/// the action for that frame. Lists come from `[gamepad]` in config.toml.
///
/// Default bindings:
///
/// | Action        | Buttons        |
/// |---------------|----------------|
/// | Quit          | Select         |
/// | Toggle theme  | Y              |
/// | Restart       | Start          |
/// | Jump          | A, D-pad up    |
/// | Tier 1 / 2 / 3| A / B / X      |
///
/// One press may map to several actions (A is Jump and tier 1); each screen
/// ignores what it has no use for.

use std::collections::HashSet;

#[cfg(feature = "gamepad")]
use gilrs::{Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::rules::Difficulty;
use crate::sim::session::Action;

/// Physical buttons the game listens to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    South,
    East,
    West,
    North,
    LeftBumper,
    RightBumper,
    Start,
    Select,
    DPadUp,
}

/// Accepted spellings in config.toml (matched case-insensitively).
const BUTTON_NAMES: &[(&str, Btn)] = &[
    ("a", Btn::South), ("south", Btn::South),
    ("b", Btn::East), ("east", Btn::East),
    ("x", Btn::West), ("west", Btn::West),
    ("y", Btn::North), ("north", Btn::North),
    ("l1", Btn::LeftBumper), ("lb", Btn::LeftBumper),
    ("r1", Btn::RightBumper), ("rb", Btn::RightBumper),
    ("start", Btn::Start),
    ("select", Btn::Select), ("back", Btn::Select),
    ("up", Btn::DPadUp), ("dpadup", Btn::DPadUp),
];

impl Btn {
    pub fn parse(name: &str) -> Option<Btn> {
        let name = name.trim().to_ascii_lowercase();
        BUTTON_NAMES.iter().find(|(n, _)| *n == name).map(|&(_, b)| b)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::South,
            Button::East => Btn::East,
            Button::West => Btn::West,
            Button::North => Btn::North,
            Button::LeftTrigger => Btn::LeftBumper,
            Button::RightTrigger => Btn::RightBumper,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            Button::DPadUp => Btn::DPadUp,
            _ => return None,
        })
    }
}

type Binding = (Action, Vec<Btn>);

/// Bindings in the order their actions are reported.
fn default_bindings() -> Vec<Binding> {
    vec![
        (Action::Quit, vec![Btn::Select]),
        (Action::ToggleTheme, vec![Btn::North]),
        (Action::Restart, vec![Btn::Start]),
        (Action::Jump, vec![Btn::South, Btn::DPadUp]),
        (Action::SelectTier(Difficulty::Normal), vec![Btn::South]),
        (Action::SelectTier(Difficulty::Fast), vec![Btn::East]),
        (Action::SelectTier(Difficulty::UltraFast), vec![Btn::West]),
    ]
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update()`.
    fresh: HashSet<Btn>,

    bindings: Vec<Binding>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!("Gamepad support unavailable: {e}");
                None
            }
        };

        #[cfg(feature = "gamepad")]
        let connected = gilrs.as_ref().is_some_and(|g| g.gamepads().next().is_some());
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            fresh: HashSet::new(),
            bindings: default_bindings(),
            connected,
        }
    }

    /// Apply `[gamepad]` overrides. A list with no recognisable button
    /// names leaves that action's default in place.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let overrides: [(Action, &[String]); 7] = [
            (Action::Quit, &cfg.quit),
            (Action::ToggleTheme, &cfg.toggle_theme),
            (Action::Restart, &cfg.restart),
            (Action::Jump, &cfg.jump),
            (Action::SelectTier(Difficulty::Normal), &cfg.tier_1),
            (Action::SelectTier(Difficulty::Fast), &cfg.tier_2),
            (Action::SelectTier(Difficulty::UltraFast), &cfg.tier_3),
        ];

        for (action, names) in overrides {
            let buttons: Vec<Btn> = names.iter().filter_map(|n| Btn::parse(n)).collect();
            if buttons.is_empty() {
                if !names.is_empty() {
                    log::warn!("No known buttons in {names:?} for {action:?}, keeping default");
                }
                continue;
            }
            if let Some(slot) = self.bindings.iter_mut().find(|(a, _)| *a == action) {
                slot.1 = buttons;
            }
        }
    }

    /// Start a new frame: forget last frame's presses, then poll.
    pub fn update(&mut self) {
        self.fresh.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };

        while let Some(ev) = gilrs.next_event() {
            match ev.event {
                EventType::ButtonPressed(button, _) => {
                    self.connected = true;
                    if let Some(btn) = Btn::from_gilrs(button) {
                        self.fresh.insert(btn);
                    }
                }
                EventType::Connected => {
                    log::info!("Gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("Gamepad disconnected");
                    self.connected = false;
                    self.fresh.clear();
                }
                _ => {}
            }
        }
    }

    /// Actions for this frame's fresh presses.
    pub fn actions(&self) -> Vec<Action> {
        self.bindings.iter()
            .filter(|(_, buttons)| buttons.iter().any(|b| self.fresh.contains(b)))
            .map(|(action, _)| *action)
            .collect()
    }
}

impl Default for GamepadState {
    fn default() -> Self {
        Self::new()
    }
}
