/// Session: the complete state of a running game.
///
/// Constructed once from a parsed maze and dropped at exit; `step`
/// receives it explicitly every tick. Nothing here is global.
///
/// ## Ownership
///   - `layout`, `walls`, `pathfinder`: built once, read-only afterwards
///   - `items`, `powers`, `pursuers`: shrink only, by explicit removal
///   - `player`: `None` once the last life is lost
///
/// ## Timers
///   All timing goes through `scheduler`, advanced one `TICK` per step:
///   the mode switch, empowerment expiry and the mouth animation.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::domain::entity::{Collectible, ItemKind, Player, Pursuer};
use crate::domain::geometry::{GridPos, CELL_SIZE};
use crate::domain::grid::MazeLayout;
use crate::domain::movement::Walls;
use crate::domain::path::Pathfinder;
use super::mode::ModeClock;
use super::scheduler::Scheduler;

pub const STEPS_PER_SECOND: u64 = 120;
/// Simulated time per step.
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / STEPS_PER_SECOND);

pub const STARTING_LIVES: u32 = 3;
pub const EMPOWERMENT_DURATION: Duration = Duration::from_secs(15);
pub const MOUTH_PERIOD: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerTag {
    ModeSwitch,
    EmpowermentExpiry,
    MouthToggle,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

pub struct Session {
    // ── Static maze data ──
    pub layout: MazeLayout,
    pub walls: Walls,
    pub pathfinder: Pathfinder,

    // ── Entities ──
    pub player: Option<Player>,
    /// Spawn order; also the order they are ticked in.
    pub pursuers: Vec<Pursuer>,
    pub items: Vec<Collectible>,
    pub powers: Vec<Collectible>,

    // ── Game tracking ──
    pub score: u32,
    pub lives: u32,
    pub clock: ModeClock,
    pub empowered: bool,
    pub won: bool,
    pub tick: u64,

    // ── Timing / randomness ──
    pub scheduler: Scheduler<TimerTag>,
    pub rng: StdRng,
    seed: u64,
}

impl Session {
    pub fn new(layout: MazeLayout, seed: u64) -> Self {
        let walls = Walls::from_grid(&layout.grid);
        let pathfinder = Pathfinder::new(&layout.grid);

        let pursuers = layout.spawn_cells.iter()
            .enumerate()
            .map(|(id, &cell)| Pursuer::new(id, cell))
            .collect();
        let items = layout.item_cells.iter()
            .map(|&cell| Collectible::new(ItemKind::Ordinary, cell))
            .collect();
        let powers = layout.power_cells.iter()
            .map(|&cell| Collectible::new(ItemKind::Power, cell))
            .collect();

        let clock = ModeClock::new();
        let mut scheduler = Scheduler::new();
        if let Some(first) = clock.current_duration() {
            scheduler.schedule(first, TimerTag::ModeSwitch);
        }
        scheduler.schedule_repeating(MOUTH_PERIOD, TimerTag::MouthToggle);

        let session = Session {
            player: Some(Player::new(layout.player_start)),
            pursuers,
            items,
            powers,
            layout,
            walls,
            pathfinder,
            score: 0,
            lives: STARTING_LIVES,
            clock,
            empowered: false,
            won: false,
            tick: 0,
            scheduler,
            rng: StdRng::seed_from_u64(seed),
            seed,
        };
        info!(
            width = session.layout.grid.width(),
            height = session.layout.grid.height(),
            pursuers = session.pursuers.len(),
            items = session.items.len(),
            seed,
            "session started"
        );
        session
    }

    /// Fresh session on the same maze with the same seed.
    pub fn restart(&mut self) {
        *self = Session::new(self.layout.clone(), self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> Status {
        if self.player.is_none() {
            Status::Lost
        } else if self.won {
            Status::Won
        } else {
            Status::Playing
        }
    }

    /// Playfield width in screen units; horizontal wraparound bound.
    pub fn screen_width(&self) -> i32 {
        self.layout.grid.width() as i32 * CELL_SIZE
    }

    pub fn screen_height(&self) -> i32 {
        self.layout.grid.height() as i32 * CELL_SIZE
    }

    /// The player's cell, if the player exists and is inside the grid.
    pub fn player_cell(&self) -> Option<GridPos> {
        self.player.as_ref()
            .and_then(|p| p.pos().to_cell())
            .filter(|&c| self.layout.grid.contains(c))
    }

    /// Empowerment: pursuers wander, the expiry timer is (re)armed.
    pub fn grant_empowerment(&mut self) {
        self.empowered = true;
        self.clock.retreat();
        self.scheduler.schedule(EMPOWERMENT_DURATION, TimerTag::EmpowermentExpiry);
    }
}
