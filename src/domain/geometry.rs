/// Screen-space geometry shared by movement, collision and drawing.
///
/// Two coordinate systems:
///   - `GridPos`: maze cell (column, row)
///   - `Point`  : continuous screen units, `CELL_SIZE` per cell
///
/// Entities move one screen unit per tick, so they spend
/// `CELL_SIZE` ticks crossing a cell.

/// Side length of one maze cell in screen units.
pub const CELL_SIZE: i32 = 32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        GridPos { x, y }
    }

    /// Top-left corner of this cell on screen.
    pub fn to_point(self) -> Point {
        Point::new(self.x as i32 * CELL_SIZE, self.y as i32 * CELL_SIZE)
    }

    pub fn manhattan(self, other: GridPos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Cell containing this point. `None` left of / above the grid origin.
    pub fn to_cell(self) -> Option<GridPos> {
        if self.x < 0 || self.y < 0 {
            return None;
        }
        Some(GridPos::new(
            (self.x / CELL_SIZE) as usize,
            (self.y / CELL_SIZE) as usize,
        ))
    }
}

/// Axis-aligned box: `pos` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub pos: Point,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(pos: Point, w: i32, h: i32) -> Self {
        Rect { pos, w, h }
    }

    pub fn square(pos: Point, size: i32) -> Self {
        Rect::new(pos, size, size)
    }

    pub fn right(&self) -> i32 {
        self.pos.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.pos.y + self.h
    }

    /// Strict overlap. Boxes that only share an edge do not intersect,
    /// which lets a cell-sized mover slide along a corridor wall.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.pos.x < other.right()
            && other.pos.x < self.right()
            && self.pos.y < other.bottom()
            && other.pos.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_point_conversion() {
        let c = GridPos::new(3, 2);
        assert_eq!(c.to_point(), Point::new(96, 64));
        assert_eq!(Point::new(96, 64).to_cell(), Some(c));
        // Mid-cell positions floor to the containing cell
        assert_eq!(Point::new(127, 95).to_cell(), Some(c));
        assert_eq!(Point::new(-1, 0).to_cell(), None);
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::square(Point::new(0, 0), 32);
        let b = Rect::square(Point::new(32, 0), 32);
        assert!(!a.intersects(&b));
        let c = Rect::square(Point::new(31, 0), 32);
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn small_box_inside_large() {
        let big = Rect::square(Point::new(0, 0), 32);
        let dot = Rect::square(Point::new(16, 16), 4);
        assert!(big.intersects(&dot));
        assert!(dot.intersects(&big));
    }
}
