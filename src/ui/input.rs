/// Keyboard state from crossterm events.
///
/// Most terminals report presses and auto-repeats but never releases,
/// so a key counts as held until `HOLD_TIMEOUT` passes without another
/// press or repeat. When keyboard enhancement is active the renderer
/// reports it and `honor_release` lets Release events end a hold early.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// Longer than the typical auto-repeat interval.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Command {
    Move(Direction),
    Quit,
    Restart,
}

/// Arrows/WASD move, q/Esc/Ctrl-C quit, r restarts.
fn command_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(code, KeyCode::Char('c' | 'C')).then_some(Command::Quit);
    }
    let command = match code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => Command::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => Command::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A') => Command::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D') => Command::Move(Direction::Right),
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Command::Quit,
        KeyCode::Char('r' | 'R') => Command::Restart,
        _ => return None,
    };
    Some(command)
}

pub struct InputState {
    /// Last press or repeat of each bound key.
    held: HashMap<KeyCode, Instant>,
    /// Commands whose key went down during the last `drain_events()`.
    pressed: Vec<Command>,
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(8),
            pressed: Vec::with_capacity(4),
            honor_release: false,
        }
    }

    /// Consume every pending terminal event. Call once per frame.
    pub fn drain_events(&mut self) {
        self.pressed.clear();
        while event::poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle(key, Instant::now());
            }
        }
        let now = Instant::now();
        self.held.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn handle(&mut self, key: KeyEvent, at: Instant) {
        let Some(command) = command_for(key.code, key.modifiers) else { return };
        if key.kind == KeyEventKind::Release {
            if self.honor_release {
                self.held.remove(&key.code);
            }
            return;
        }
        // A repeat of a key already held is not a new press
        if !self.held_at(key.code, at) {
            self.pressed.push(command);
        }
        self.held.insert(key.code, at);
    }

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.held.get(&code).map_or(false, |t| now.duration_since(*t) < HOLD_TIMEOUT)
    }

    /// The held direction whose key went down most recently.
    pub fn held_direction(&self) -> Option<Direction> {
        let now = Instant::now();
        self.held.iter()
            .filter(|(code, _)| self.held_at(**code, now))
            .filter_map(|(code, t)| match command_for(*code, KeyModifiers::NONE) {
                Some(Command::Move(dir)) => Some((dir, *t)),
                _ => None,
            })
            .max_by_key(|&(_, t)| t)
            .map(|(dir, _)| dir)
    }

    pub fn quit_pressed(&self) -> bool {
        self.pressed.contains(&Command::Quit)
    }

    pub fn restart_pressed(&self) -> bool {
        self.pressed.contains(&Command::Restart)
    }
}
