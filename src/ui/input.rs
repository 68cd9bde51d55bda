/// Keyboard input tracker.
///
/// Every game action is edge-triggered: a key counts once when it goes
/// from "not held" to "held". Holding Space therefore jumps once, not
/// again on every landing.
///
/// Release events are honoured only when `honor_release` is set (the
/// renderer confirmed keyboard enhancement); otherwise a key counts as
/// released once it has been quiet for `HOLD_TIMEOUT`. Repeat events keep
/// a key held but never produce an action, however late they arrive.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::rules::Difficulty;
use crate::sim::session::Action;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Bindings ──

const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up];
const KEYS_TOGGLE: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];
const KEYS_TIER: [(KeyCode, Difficulty); 3] = [
    (KeyCode::Char('1'), Difficulty::Normal),
    (KeyCode::Char('2'), Difficulty::Fast),
    (KeyCode::Char('3'), Difficulty::UltraFast),
];

/// Translate one fresh key press into a game action.
pub fn action_for_key(code: KeyCode) -> Option<Action> {
    if KEYS_JUMP.contains(&code) {
        Some(Action::Jump)
    } else if KEYS_TOGGLE.contains(&code) {
        Some(Action::ToggleTheme)
    } else if KEYS_RESTART.contains(&code) {
        Some(Action::Restart)
    } else if KEYS_QUIT.contains(&code) {
        Some(Action::Quit)
    } else {
        KEYS_TIER.iter()
            .find(|(k, _)| *k == code)
            .map(|&(_, d)| Action::SelectTier(d))
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Actions from keys that transitioned "not held" → "held" during the
    /// most recent drain_events() call, in arrival order.
    actions: Vec<Action>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            actions: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and collect this frame's actions.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.actions.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    /// Actions collected by the last drain, oldest first.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        // Ctrl+C stands in for closing the window
        if is_ctrl_c(&key) {
            if key.kind != KeyEventKind::Release {
                self.actions.push(Action::Quit);
            }
            return;
        }

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            KeyEventKind::Repeat => {
                self.last_active.insert(key.code, now);
            }
            KeyEventKind::Press => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    if let Some(action) = action_for_key(key.code) {
                        self.actions.push(action);
                    }
                }
            }
        }
    }

    /// Expire keys that have timed out (fallback for terminals without Release)
    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
