/// Movement & collision resolver, shared by player and pursuers.
///
/// ## Move rule
///
/// ```text
///   desired = pos + one unit in `dir`
///   desired box overlaps any wall box?  → reject, direction := last_working
///   vertical step outside the grid columns? → reject likewise
///   otherwise                           → accept, pos := desired,
///                                         last_working := dir
/// ```
///
/// Movement is sub-cell: one screen unit per tick, so an entity crosses
/// a cell in `CELL_SIZE` ticks. Overlap is strict (see `Rect::intersects`)
/// so a cell-sized box slides flush along corridor walls.
///
/// Past the left or right edge there are no wall boxes, only the
/// wraparound tunnel, so there an entity may move sideways but not up
/// or down.

use super::entity::{Body, Direction, Intent, Motion};
use super::geometry::{Point, Rect, CELL_SIZE};
use super::grid::Grid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved(Point),
    Blocked,
    /// Direction was `None`; nothing attempted.
    Idle,
}

/// Wall geometry: one cell-sized box per wall cell.
#[derive(Clone, Debug)]
pub struct Walls {
    rects: Vec<Rect>,
    /// Grid width in screen units.
    width: i32,
}

impl Walls {
    pub fn from_grid(grid: &Grid) -> Self {
        Walls {
            rects: grid.wall_cells().map(|c| Rect::square(c.to_point(), CELL_SIZE)).collect(),
            width: grid.width() as i32 * CELL_SIZE,
        }
    }

    /// Is `rect` horizontally inside the grid?
    pub fn within_columns(&self, rect: &Rect) -> bool {
        rect.pos.x >= 0 && rect.right() <= self.width
    }

    /// Does `rect` overlap any wall?
    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|w| w.intersects(rect))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter()
    }
}

/// Try one step in `dir`.
pub fn attempt_move(body: &mut Body, motion: &mut Motion, dir: Direction, walls: &Walls) -> MoveOutcome {
    if dir == Direction::None {
        return MoveOutcome::Idle;
    }
    let (dx, dy) = dir.delta();
    let desired = body.pos.offset(dx, dy);
    let off_grid = dy != 0 && !walls.within_columns(&body.rect());
    if off_grid || walls.overlaps(&body.rect_at(desired)) {
        motion.direction = motion.last_working;
        return MoveOutcome::Blocked;
    }
    body.pos = desired;
    motion.direction = dir;
    motion.last_working = dir;
    MoveOutcome::Moved(desired)
}

/// Apply an intent: primary first, fallback if the primary did not move.
pub fn advance(body: &mut Body, motion: &mut Motion, intent: Intent, walls: &Walls) -> bool {
    if let MoveOutcome::Moved(_) = attempt_move(body, motion, intent.primary, walls) {
        return true;
    }
    match intent.fallback {
        Some(dir) if dir != intent.primary => {
            matches!(attempt_move(body, motion, dir, walls), MoveOutcome::Moved(_))
        }
        _ => false,
    }
}

/// Horizontal screen wraparound. No vertical equivalent.
pub fn wrap_horizontal(pos: &mut Point, screen_width: i32) -> bool {
    if pos.x < 0 {
        pos.x = screen_width;
        true
    } else if pos.x > screen_width {
        pos.x = 0;
        true
    } else {
        false
    }
}
