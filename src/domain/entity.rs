/// Entities: Player, Pursuer, Collectible.
///
/// Composition instead of a class tree:
///   - `Body`    : positioned, drawable box (every entity)
///   - `Motion`  : direction bookkeeping (movable entities only)
///   - `Steering`: the per-tick direction decision, injected per kind
///
/// Player and pursuer share `Actor<S>` and the movement resolver; they
/// differ only in their `Steering` (`KeySteering` vs `PathSteering`).

use rand::RngCore;

use super::ai::{Behavior, PathSteering};
use super::geometry::{GridPos, Point, Rect, CELL_SIZE};
use super::movement::{self, Walls};
use super::path::Pathfinder;

/// Movement direction. `None` = standing still.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// One-step delta in screen units.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    /// Vertical direction by the sign of `dy`.
    pub fn vertical(dy: i32) -> Self {
        match dy.signum() {
            1 => Direction::Down,
            -1 => Direction::Up,
            _ => Direction::None,
        }
    }

    /// Horizontal direction by the sign of `dx`.
    pub fn horizontal(dx: i32) -> Self {
        match dx.signum() {
            1 => Direction::Right,
            -1 => Direction::Left,
            _ => Direction::None,
        }
    }
}

/// Positioned, drawable box.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Body {
    pub pos: Point,
    pub size: i32,
}

impl Body {
    pub fn new(pos: Point, size: i32) -> Self {
        Body { pos, size }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    pub fn rect_at(&self, pos: Point) -> Rect {
        Rect::square(pos, self.size)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.rect().intersects(&other.rect())
    }
}

/// Direction state of a movable entity.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Motion {
    pub direction: Direction,
    /// Last direction that produced a successful move.
    pub last_working: Direction,
}

impl Motion {
    pub fn halt(&mut self) {
        self.direction = Direction::None;
        self.last_working = Direction::None;
    }
}

/// What a steering strategy wants this tick: a preferred direction and
/// an optional fallback tried when the first is blocked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Intent {
    pub primary: Direction,
    pub fallback: Option<Direction>,
}

impl Intent {
    pub fn idle() -> Self {
        Intent { primary: Direction::None, fallback: None }
    }

    pub fn single(dir: Direction) -> Self {
        Intent { primary: dir, fallback: None }
    }
}

/// Read-mostly view of the session handed to steering each tick.
pub struct SteerContext<'a> {
    pub pathfinder: &'a Pathfinder,
    pub walkable: &'a [GridPos],
    pub mode: Behavior,
    pub empowered: bool,
    /// Player's cell, `None` when the player is gone or off the grid.
    pub player_cell: Option<GridPos>,
    pub rng: &'a mut dyn RngCore,
}

/// Per-kind direction decision.
pub trait Steering {
    fn steer(&mut self, body: &Body, motion: &Motion, ctx: &mut SteerContext<'_>) -> Intent;
}

/// A movable entity: body + motion + injected steering.
#[derive(Clone, Debug)]
pub struct Actor<S> {
    pub body: Body,
    pub motion: Motion,
    pub steering: S,
}

impl<S: Steering> Actor<S> {
    pub fn new(pos: Point, steering: S) -> Self {
        Actor {
            body: Body::new(pos, CELL_SIZE),
            motion: Motion::default(),
            steering,
        }
    }

    /// Decide and move once. Returns true if the position changed.
    pub fn tick(&mut self, ctx: &mut SteerContext<'_>, walls: &Walls) -> bool {
        let intent = self.steering.steer(&self.body, &self.motion, ctx);
        movement::advance(&mut self.body, &mut self.motion, intent, walls)
    }
}

// ── Player ──

/// Keyboard steering: try the buffered (latest pressed) direction,
/// fall back to the current one.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeySteering {
    pub buffered: Direction,
}

impl Steering for KeySteering {
    fn steer(&mut self, _body: &Body, motion: &Motion, _ctx: &mut SteerContext<'_>) -> Intent {
        Intent { primary: self.buffered, fallback: Some(motion.direction) }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub actor: Actor<KeySteering>,
    pub start: Point,
    pub mouth_open: bool,
}

impl Player {
    pub fn new(start: GridPos) -> Self {
        let pos = start.to_point();
        Player {
            actor: Actor::new(pos, KeySteering::default()),
            start: pos,
            mouth_open: true,
        }
    }

    pub fn pos(&self) -> Point {
        self.actor.body.pos
    }

    pub fn body(&self) -> &Body {
        &self.actor.body
    }

    pub fn direction(&self) -> Direction {
        self.actor.motion.direction
    }

    /// Buffer a direction; it is applied as soon as it is not blocked.
    pub fn press(&mut self, dir: Direction) {
        self.actor.steering.buffered = dir;
    }

    /// Back to the start cell, standing still, nothing buffered.
    pub fn respawn(&mut self) {
        self.actor.body.pos = self.start;
        self.actor.motion.halt();
        self.actor.steering.buffered = Direction::None;
    }

    /// One tick of player movement: buffered turn, fallback, horizontal
    /// wraparound, then a final wall check that rolls back to the
    /// position held at the start of the tick.
    pub fn tick(&mut self, ctx: &mut SteerContext<'_>, walls: &Walls, screen_width: i32) -> bool {
        let prior = self.actor.body.pos;
        self.actor.tick(ctx, walls);
        movement::wrap_horizontal(&mut self.actor.body.pos, screen_width);
        if walls.overlaps(&self.actor.body.rect()) {
            self.actor.body.pos = prior;
        }
        self.actor.body.pos != prior
    }
}

// ── Pursuer ──

#[derive(Clone, Debug)]
pub struct Pursuer {
    pub id: usize,
    pub actor: Actor<PathSteering>,
}

impl Pursuer {
    pub const POINTS: u32 = 400;

    pub fn new(id: usize, spawn: GridPos) -> Self {
        Pursuer {
            id,
            actor: Actor::new(spawn.to_point(), PathSteering::default()),
        }
    }

    pub fn pos(&self) -> Point {
        self.actor.body.pos
    }

    pub fn body(&self) -> &Body {
        &self.actor.body
    }

    pub fn tick(&mut self, ctx: &mut SteerContext<'_>, walls: &Walls) -> bool {
        self.actor.tick(ctx, walls)
    }
}

// ── Collectibles ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Ordinary,
    Power,
}

impl ItemKind {
    pub fn points(self) -> u32 {
        match self {
            ItemKind::Ordinary => 10,
            ItemKind::Power => 50,
        }
    }

    /// Pickup box side, centred in its cell.
    pub fn size(self) -> i32 {
        match self {
            ItemKind::Ordinary => 4,
            ItemKind::Power => 8,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Collectible {
    pub kind: ItemKind,
    pub cell: GridPos,
    pub body: Body,
}

impl Collectible {
    pub fn new(kind: ItemKind, cell: GridPos) -> Self {
        let half = CELL_SIZE / 2;
        Collectible {
            kind,
            cell,
            body: Body::new(cell.to_point().offset(half, half), kind.size()),
        }
    }
}
