/// Tile types and the maze legend.
/// Passability is queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    Wall,
    #[default]
    Open,
}

impl Tile {
    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Open)
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

/// What a single map character means.
///
/// ```text
///   'X' / '#' = Wall            'P' = Player start
///   'G'       = Pursuer spawn   'O' = Power item
///   anything else = Open (ordinary item)
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Glyph {
    Wall,
    PlayerStart,
    PursuerSpawn,
    Power,
    Open,
}

impl Glyph {
    pub fn from_char(ch: char) -> Self {
        match ch {
            'X' | '#' => Glyph::Wall,
            'P' => Glyph::PlayerStart,
            'G' => Glyph::PursuerSpawn,
            'O' => Glyph::Power,
            _ => Glyph::Open,
        }
    }

    /// The terrain underneath the marker.
    pub fn tile(self) -> Tile {
        match self {
            Glyph::Wall => Tile::Wall,
            _ => Tile::Open,
        }
    }
}
