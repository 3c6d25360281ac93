/// Maze source: the built-in maze, or a text file named in the config.
///
/// ## File format
///   One row per line. Lines starting with `;` are comments.
///   Trailing blank lines are ignored; short rows are padded with walls.
///
/// ## Legend
///   'X' / '#' = Wall        'P' = Player start
///   'G'       = Pursuer     'O' = Power item
///   anything else = open floor (gets an ordinary item)

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::domain::grid::{Grid, MazeError, MazeLayout};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read maze file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Maze(#[from] MazeError),
}

pub const BUILTIN_MAZE: &[&str] = &[
    "XXXXXXXXXXXXXXXXXXXXXXXXXXXX",
    "XP           XX            X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X XXXXOXXXXX XX XXXXXOXXXX X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X                          X",
    "X XXXX XX XXXXXXXX XX XXXX X",
    "X XXXX XX XXXXXXXX XX XXXX X",
    "X      XX    XX    XX      X",
    "XXXXXX XXXXX XX XXXXX XXXXXX",
    "XXXXXX XXXXX XX XXXXX XXXXXX",
    "XXXXXX XX     G    XX XXXXXX",
    "XXXXXX XX XXX  XXX XX XXXXXX",
    "XXXXXX XX X      X XX XXXXXX",
    "   G      X      X          ",
    "XXXXXX XX X      X XX XXXXXX",
    "XXXXXX XX XXXXXXXX XX XXXXXX",
    "XXXXXX XX    G     XX XXXXXX",
    "XXXXXX XX XXXXXXXX XX XXXXXX",
    "XXXXXX XX XXXXXXXX XX XXXXXX",
    "X            XX            X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X XXXX XXXXX XX XXXXX XXXX X",
    "X   XX       G        XX   X",
    "XXX XX XX XXXXXXXX XX XX XXX",
    "XXX XX XX XXXXXXXX XX XX XXX",
    "X      XX    XX    XX      X",
    "X XXXXXXXXXX XX XXXXXXXXXX X",
    "X XXXXXXXXXX XX XXXXXXXXXX X",
    "X   O                 O    X",
    "XXXXXXXXXXXXXXXXXXXXXXXXXXXX",
];

/// Build the layout from `path`, or from the built-in maze when `None`.
pub fn load_layout(path: Option<&Path>) -> Result<MazeLayout, LoadError> {
    let Some(path) = path else {
        return Ok(Grid::build(BUILTIN_MAZE)?);
    };
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let layout = Grid::build(&parse_rows(&text))?;
    info!(path = %path.display(), "loaded maze file");
    Ok(layout)
}

fn parse_rows(text: &str) -> Vec<String> {
    let mut rows: Vec<String> = text
        .lines()
        .filter(|line| !line.starts_with(';'))
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();
    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::GridPos;

    #[test]
    fn builtin_maze_shape() {
        let layout = load_layout(None).unwrap();
        assert_eq!((layout.grid.width(), layout.grid.height()), (28, 31));
        assert_eq!(layout.player_start, GridPos::new(1, 1));
        assert_eq!(
            layout.spawn_cells,
            vec![GridPos::new(14, 11), GridPos::new(3, 14), GridPos::new(13, 17), GridPos::new(13, 23)]
        );
        assert_eq!(layout.power_cells.len(), 4);
        assert!(BUILTIN_MAZE.iter().all(|r| r.len() == 28));
    }

    #[test]
    fn parses_comments_and_trailing_blanks() {
        let rows = parse_rows("; tiny maze\r\nXXXX\r\nXP X\r\nXXXX\r\n\r\n\n");
        assert_eq!(rows, vec!["XXXX", "XP X", "XXXX"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/nonexistent/maze-chase/none.txt");
        match load_layout(Some(path)) {
            Err(LoadError::Read { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {:?}", other.map(|l| l.player_start)),
        }
    }

    #[test]
    fn blank_file_is_an_empty_maze() {
        let dir = std::env::temp_dir().join(format!("mazechase-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blank.txt");
        std::fs::write(&path, "\n\n; nothing\n").unwrap();
        let err = load_layout(Some(&path)).unwrap_err();
        assert!(matches!(err, LoadError::Maze(MazeError::Empty)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
