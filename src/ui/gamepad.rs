/// Gamepad polling through gilrs (`gamepad` feature).
///
/// Movement comes from the d-pad, else the left stick. The `[gamepad]`
/// config section names the buttons that restart (`confirm`) and quit
/// (`cancel`); by default Start restarts and Select quits.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::Direction;

const STICK_DEAD_ZONE: f32 = 0.25;

/// Face, shoulder and menu buttons a binding may name.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadButton {
    South,
    East,
    West,
    North,
    LeftBumper,
    RightBumper,
    Start,
    Select,
}

/// Accepted names, matched case-insensitively.
const BUTTON_NAMES: &[(&str, PadButton)] = &[
    ("a", PadButton::South),
    ("south", PadButton::South),
    ("b", PadButton::East),
    ("east", PadButton::East),
    ("x", PadButton::West),
    ("west", PadButton::West),
    ("y", PadButton::North),
    ("north", PadButton::North),
    ("l1", PadButton::LeftBumper),
    ("lb", PadButton::LeftBumper),
    ("r1", PadButton::RightBumper),
    ("rb", PadButton::RightBumper),
    ("start", PadButton::Start),
    ("select", PadButton::Select),
    ("back", PadButton::Select),
];

impl PadButton {
    fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        BUTTON_NAMES.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, b)| b)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(button: Button) -> Option<Self> {
        Some(match button {
            Button::South => PadButton::South,
            Button::East => PadButton::East,
            Button::West => PadButton::West,
            Button::North => PadButton::North,
            Button::LeftTrigger => PadButton::LeftBumper,
            Button::RightTrigger => PadButton::RightBumper,
            Button::Start => PadButton::Start,
            Button::Select => PadButton::Select,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PadAction {
    Restart,
    Quit,
}

/// Resolve configured names; if none are valid, `default` stays bound.
fn bind(names: &[String], action: PadAction, default: PadButton) -> Vec<(PadButton, PadAction)> {
    let mut bound: Vec<_> = names.iter()
        .filter_map(|n| PadButton::parse(n))
        .map(|b| (b, action))
        .collect();
    if bound.is_empty() {
        bound.push((default, action));
    }
    bound
}

/// Digital direction from the left stick, dominant axis first.
fn stick_direction((x, y): (f32, f32)) -> Option<Direction> {
    if x.abs() < STICK_DEAD_ZONE && y.abs() < STICK_DEAD_ZONE {
        return None;
    }
    // gilrs reports +y as up
    if y.abs() >= x.abs() {
        Some(if y > 0.0 { Direction::Up } else { Direction::Down })
    } else {
        Some(if x > 0.0 { Direction::Right } else { Direction::Left })
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    bindings: Vec<(PadButton, PadAction)>,
    /// Actions triggered since the last `update()`.
    triggered: Vec<PadAction>,
    /// Held d-pad directions, oldest first.
    dpad: Vec<Direction>,
    stick: (f32, f32),

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = Gilrs::new().ok();
        #[cfg(feature = "gamepad")]
        let connected = gilrs.as_ref().map_or(false, |g| g.gamepads().next().is_some());
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            bindings: Vec::new(),
            triggered: Vec::new(),
            dpad: Vec::with_capacity(4),
            stick: (0.0, 0.0),
            connected,
        }
        .with_config(&GamepadConfig::default())
    }

    pub fn with_config(mut self, cfg: &GamepadConfig) -> Self {
        self.bindings = bind(&cfg.confirm, PadAction::Restart, PadButton::Start);
        self.bindings.extend(bind(&cfg.cancel, PadAction::Quit, PadButton::Select));
        self
    }

    /// Poll once per frame, before querying.
    pub fn update(&mut self) {
        self.triggered.clear();

        #[cfg(feature = "gamepad")]
        self.poll();
    }

    #[cfg(feature = "gamepad")]
    fn poll(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let mut pending = Vec::new();
        while let Some(ev) = gilrs.next_event() {
            pending.push(ev.event);
        }

        for event in pending {
            match event {
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                EventType::ButtonPressed(button, _) => {
                    self.connected = true;
                    self.on_button(button, true);
                }
                EventType::ButtonReleased(button, _) => self.on_button(button, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick.0 = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick.1 = value,
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn on_button(&mut self, button: Button, down: bool) {
        let dpad = match button {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        match (dpad, down) {
            (Some(dir), true) => self.hold(dir),
            (Some(dir), false) => self.dpad.retain(|&d| d != dir),
            (None, true) => {
                if let Some(b) = PadButton::from_gilrs(button) {
                    self.trigger(b);
                }
            }
            (None, false) => {}
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn hold(&mut self, dir: Direction) {
        self.dpad.retain(|&d| d != dir);
        self.dpad.push(dir);
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn trigger(&mut self, button: PadButton) {
        let actions = self.bindings.iter().filter(|(b, _)| *b == button).map(|&(_, a)| a);
        self.triggered.extend(actions);
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.dpad.clear();
        self.stick = (0.0, 0.0);
    }

    pub fn restart_pressed(&self) -> bool {
        self.triggered.contains(&PadAction::Restart)
    }

    pub fn quit_pressed(&self) -> bool {
        self.triggered.contains(&PadAction::Quit)
    }

    /// Most recently pressed d-pad direction still held, else the stick.
    pub fn held_direction(&self) -> Option<Direction> {
        self.dpad.last().copied().or_else(|| stick_direction(self.stick))
    }
}
