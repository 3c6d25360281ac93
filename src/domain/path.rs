/// Pathfinder: A* over the maze grid.
///
/// 4-directional, unit step cost, Manhattan heuristic (admissible and
/// consistent here, so the first pop of the goal is optimal).
///
/// Determinism: the open set is ordered by (f, h, insertion sequence)
/// and neighbours are expanded in the fixed `DIRS` order, so a fixed
/// (from, to) always yields the same path.
///
/// An empty `Path` means "already there" or "unreachable". Callers never
/// see an error from this module.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use super::geometry::GridPos;
use super::grid::Grid;

const DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const UNVISITED: usize = usize::MAX;

/// Cells from (excluding) the start to (including) the goal.
/// Only ever shrinks from the front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: VecDeque<GridPos>,
}

impl Path {
    pub fn empty() -> Self {
        Path { cells: VecDeque::new() }
    }

    /// Remove and return the next waypoint.
    pub fn pop_front(&mut self) -> Option<GridPos> {
        self.cells.pop_front()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn last(&self) -> Option<GridPos> {
        self.cells.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridPos> {
        self.cells.iter()
    }
}

impl FromIterator<GridPos> for Path {
    fn from_iter<I: IntoIterator<Item = GridPos>>(iter: I) -> Self {
        Path { cells: iter.into_iter().collect() }
    }
}

/// Open-set entry. Ordered so `BinaryHeap` pops the lowest f first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct OpenNode {
    f: u32,
    h: u32,
    seq: u32,
    idx: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path oracle over a fixed passability table.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    open: Vec<bool>,
    width: usize,
    height: usize,
}

impl Pathfinder {
    pub fn new(grid: &Grid) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let open = (0..height)
            .flat_map(|y| (0..width).map(move |x| GridPos::new(x, y)))
            .map(|c| grid.is_open(c))
            .collect();
        Pathfinder { open, width, height }
    }

    fn index(&self, cell: GridPos) -> Option<usize> {
        if cell.x < self.width && cell.y < self.height {
            Some(cell.y * self.width + cell.x)
        } else {
            None
        }
    }

    fn cell(&self, idx: usize) -> GridPos {
        GridPos::new(idx % self.width, idx / self.width)
    }

    fn passable(&self, cell: GridPos) -> bool {
        self.index(cell).map(|i| self.open[i]).unwrap_or(false)
    }

    fn neighbour(&self, cell: GridPos, dx: i32, dy: i32) -> Option<GridPos> {
        let nx = cell.x as i32 + dx;
        let ny = cell.y as i32 + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = GridPos::new(nx as usize, ny as usize);
        if self.passable(next) { Some(next) } else { None }
    }

    pub fn shortest_path(&self, from: GridPos, to: GridPos) -> Path {
        if from == to || !self.passable(from) || !self.passable(to) {
            return Path::empty();
        }
        let (Some(start), Some(goal)) = (self.index(from), self.index(to)) else {
            return Path::empty();
        };

        let n = self.width * self.height;
        let mut g = vec![u32::MAX; n];
        let mut came_from = vec![UNVISITED; n];
        let mut closed = vec![false; n];
        let mut heap = BinaryHeap::with_capacity(64);
        let mut seq = 0u32;

        let h0 = from.manhattan(to) as u32;
        g[start] = 0;
        heap.push(OpenNode { f: h0, h: h0, seq, idx: start });

        while let Some(node) = heap.pop() {
            if closed[node.idx] { continue; }
            closed[node.idx] = true;
            if node.idx == goal {
                return self.reconstruct(&came_from, start, goal);
            }

            let here = self.cell(node.idx);
            let next_g = g[node.idx] + 1;
            for &(dx, dy) in &DIRS {
                let Some(next) = self.neighbour(here, dx, dy) else { continue };
                let Some(ni) = self.index(next) else { continue };
                if closed[ni] || next_g >= g[ni] { continue; }
                g[ni] = next_g;
                came_from[ni] = node.idx;
                let h = next.manhattan(to) as u32;
                seq += 1;
                heap.push(OpenNode { f: next_g + h, h, seq, idx: ni });
            }
        }

        Path::empty()
    }

    fn reconstruct(&self, came_from: &[usize], start: usize, goal: usize) -> Path {
        let mut cells = VecDeque::new();
        let mut idx = goal;
        while idx != start {
            cells.push_front(self.cell(idx));
            idx = came_from[idx];
        }
        Path { cells }
    }
}
