/// Grid model: the static passability table built once from the ASCII map.
///
/// `Grid::build` is a pure one-time transform. Everything it derives
/// (walkable cells, spawn cells, item placement) is computed here and
/// never mutated afterwards; the session only reads it.

use thiserror::Error;

use super::geometry::GridPos;
use super::tile::{Glyph, Tile};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze map is empty")]
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

/// A parsed maze: the grid plus every cell list derived from the map.
#[derive(Clone, Debug)]
pub struct MazeLayout {
    pub grid: Grid,
    pub player_start: GridPos,
    /// Pursuer spawn cells, row-major.
    pub spawn_cells: Vec<GridPos>,
    /// Every non-wall cell (spawn cells included), row-major.
    pub walkable_cells: Vec<GridPos>,
    pub power_cells: Vec<GridPos>,
    /// Where ordinary items are placed.
    pub item_cells: Vec<GridPos>,
}

impl Grid {
    /// Parse a character map. Rows shorter than the widest row are
    /// padded with walls.
    pub fn build<S: AsRef<str>>(rows: &[S]) -> Result<MazeLayout, MazeError> {
        let height = rows.len();
        let width = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }

        let mut tiles = vec![vec![Tile::Wall; width]; height];
        let mut player_start = None;
        let mut spawn_cells = Vec::new();
        let mut walkable_cells = Vec::new();
        let mut power_cells = Vec::new();
        let mut item_cells = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                let glyph = Glyph::from_char(ch);
                let cell = GridPos::new(x, y);
                tiles[y][x] = glyph.tile();
                match glyph {
                    Glyph::Wall => continue,
                    Glyph::PlayerStart => {
                        if player_start.is_none() {
                            player_start = Some(cell);
                        }
                    }
                    Glyph::PursuerSpawn => spawn_cells.push(cell),
                    Glyph::Power => power_cells.push(cell),
                    Glyph::Open => {}
                }
                walkable_cells.push(cell);
            }
        }

        let player_start = player_start
            .or_else(|| walkable_cells.first().copied())
            .unwrap_or(GridPos::new(0, 0));

        for &cell in &walkable_cells {
            if cell == player_start || spawn_cells.contains(&cell) || power_cells.contains(&cell) {
                continue;
            }
            item_cells.push(cell);
        }

        Ok(MazeLayout {
            grid: Grid { tiles, width, height },
            player_start,
            spawn_cells,
            walkable_cells,
            power_cells,
            item_cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile at (x, y). Out of bounds reads as wall.
    #[inline]
    pub fn tile(&self, cell: GridPos) -> Tile {
        if cell.x < self.width && cell.y < self.height {
            self.tiles[cell.y][cell.x]
        } else {
            Tile::Wall
        }
    }

    #[inline]
    pub fn is_open(&self, cell: GridPos) -> bool {
        self.tile(cell).is_passable()
    }

    pub fn contains(&self, cell: GridPos) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// All wall cells, row-major.
    pub fn wall_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .map(move |x| GridPos::new(x, y))
                .filter(move |&c| self.tile(c).is_wall())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_cell() {
        let rows = ["XXXX", "XP X", "X#GX", "XOXX"];
        let layout = Grid::build(&rows).unwrap();
        let g = &layout.grid;
        assert_eq!((g.width(), g.height()), (4, 4));
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let wall = ch == 'X' || ch == '#';
                assert_eq!(g.tile(GridPos::new(x, y)).is_wall(), wall, "cell ({x},{y})");
            }
        }
    }

    #[test]
    fn derived_lists() {
        let layout = Grid::build(&["XXXXX", "XP GX", "X O X", "XXXXX"]).unwrap();
        assert_eq!(layout.player_start, GridPos::new(1, 1));
        assert_eq!(layout.spawn_cells, vec![GridPos::new(3, 1)]);
        assert_eq!(layout.power_cells, vec![GridPos::new(2, 2)]);
        // Spawn cell is walkable
        assert!(layout.walkable_cells.contains(&GridPos::new(3, 1)));
        assert_eq!(layout.walkable_cells.len(), 6);
        // Items skip start, spawn and power cells
        assert_eq!(
            layout.item_cells,
            vec![GridPos::new(2, 1), GridPos::new(1, 2), GridPos::new(3, 2)]
        );
    }

    #[test]
    fn empty_map_is_an_error() {
        let none: [&str; 0] = [];
        assert_eq!(Grid::build(&none).unwrap_err(), MazeError::Empty);
        assert_eq!(Grid::build(&["", ""]).unwrap_err(), MazeError::Empty);
    }

    #[test]
    fn short_rows_padded_with_walls() {
        let layout = Grid::build(&["XXXX", "XP", "XXXX"]).unwrap();
        assert_eq!(layout.grid.width(), 4);
        assert!(layout.grid.tile(GridPos::new(3, 1)).is_wall());
        assert!(layout.grid.tile(GridPos::new(2, 1)).is_wall());
    }

    #[test]
    fn missing_player_start_uses_first_walkable() {
        let layout = Grid::build(&["XXX", "X X", "XXX"]).unwrap();
        assert_eq!(layout.player_start, GridPos::new(1, 1));
        assert!(layout.item_cells.is_empty());
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let layout = Grid::build(&["P "]).unwrap();
        assert!(layout.grid.tile(GridPos::new(5, 0)).is_wall());
        assert!(!layout.grid.contains(GridPos::new(0, 1)));
        assert_eq!(layout.grid.wall_cells().count(), 0);
    }
}
