/// Runtime configuration from `config.toml`.
///
/// Looked up next to the executable, then in the working directory.
/// Every key is optional. A missing file means defaults; an unreadable
/// or malformed one is reported on stderr and also means defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.toml";

// ── Resolved settings ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Maze file to load instead of the built-in maze.
    pub maze_file: Option<PathBuf>,
    /// Where tracing output goes. `None` disables logging.
    pub log_file: Option<PathBuf>,
    /// Fixed RNG seed; `None` picks a fresh one per run.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub render_fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { render_fps: 60 }
    }
}

/// Button names bound to restart (`confirm`) and quit (`cancel`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            confirm: vec!["Start".into()],
            cancel: vec!["Select".into()],
        }
    }
}

// ── On-disk form: blank strings and zero mean "unset" ──

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FileConfig {
    general: FileGeneral,
    display: FileDisplay,
    gamepad: FileGamepad,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FileGeneral {
    maze_file: String,
    log_file: String,
    seed: u64,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct FileDisplay {
    render_fps: u32,
}

impl Default for FileDisplay {
    fn default() -> Self {
        FileDisplay { render_fps: DisplayConfig::default().render_fps }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct FileGamepad {
    confirm: Vec<String>,
    cancel: Vec<String>,
}

impl Default for FileGamepad {
    fn default() -> Self {
        let GamepadConfig { confirm, cancel } = GamepadConfig::default();
        FileGamepad { confirm, cancel }
    }
}

impl FileConfig {
    /// `search_dirs` anchors a relative `maze_file`.
    fn resolve(self, search_dirs: &[PathBuf]) -> GameConfig {
        let FileConfig { general, display, gamepad } = self;
        GameConfig {
            general: GeneralConfig {
                maze_file: non_blank(&general.maze_file).map(|name| locate(search_dirs, name)),
                log_file: non_blank(&general.log_file).map(PathBuf::from),
                seed: (general.seed != 0).then_some(general.seed),
            },
            display: DisplayConfig {
                // Zero would mean "never draw"
                render_fps: display.render_fps.max(1),
            },
            gamepad: GamepadConfig {
                confirm: gamepad.confirm,
                cancel: gamepad.cancel,
            },
        }
    }
}

// ── Loading ──

impl GameConfig {
    pub fn load() -> Self {
        let dirs = search_dirs();
        let Some(path) = dirs.iter().map(|d| d.join(CONFIG_FILE)).find(|p| p.is_file()) else {
            return FileConfig::default().resolve(&dirs);
        };
        let loaded = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| GameConfig::parse(&text, &dirs).map_err(|e| e.to_string()));
        loaded.unwrap_or_else(|e| {
            eprintln!("Warning: ignoring {}: {e}", path.display());
            eprintln!("Using default settings.");
            FileConfig::default().resolve(&dirs)
        })
    }

    /// Parse config text; `search_dirs` anchors a relative `maze_file`.
    fn parse(text: &str, search_dirs: &[PathBuf]) -> Result<Self, toml::de::Error> {
        toml::from_str::<FileConfig>(text).map(|file| file.resolve(search_dirs))
    }
}

fn non_blank(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

/// Absolute paths are used as-is; relative ones are looked up in the
/// search dirs, staying CWD-relative when nothing matches.
fn locate(search_dirs: &[PathBuf], name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
        .unwrap_or(path)
}

/// Executable directory, then CWD, without duplicates.
fn search_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in exe_dir.into_iter().chain(cwd) {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("", &[]).unwrap();
        assert_eq!(cfg.general, GeneralConfig::default());
        assert_eq!(cfg.display, DisplayConfig { render_fps: 60 });
        assert_eq!(cfg.gamepad, GamepadConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            r#"
            [general]
            maze_file = "mazes/small.txt"
            seed = 42

            [gamepad]
            cancel = ["B", "Select"]
            "#,
            &[],
        )
        .unwrap();
        assert_eq!(cfg.general.maze_file, Some(PathBuf::from("mazes/small.txt")));
        assert_eq!(cfg.general.log_file, None);
        assert_eq!(cfg.general.seed, Some(42));
        assert_eq!(cfg.display.render_fps, 60);
        assert_eq!(cfg.gamepad.confirm, vec!["Start".to_string()]);
        assert_eq!(cfg.gamepad.cancel, vec!["B".to_string(), "Select".to_string()]);
    }

    #[test]
    fn zero_and_blank_mean_unset() {
        let cfg = GameConfig::parse(
            "[general]\nmaze_file = \"  \"\nlog_file = \"\"\nseed = 0\n[display]\nrender_fps = 0\n",
            &[],
        )
        .unwrap();
        assert_eq!(cfg.general.maze_file, None);
        assert_eq!(cfg.general.seed, None);
        assert_eq!(cfg.display.render_fps, 1);
    }

    #[test]
    fn type_mismatch_is_an_error() {
        assert!(GameConfig::parse("[display]\nrender_fps = \"fast\"\n", &[]).is_err());
    }

    #[test]
    fn relative_maze_file_found_in_search_dir() {
        let dir = std::env::temp_dir().join(format!("mazechase-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tiny.txt"), "XXX\nXPX\nXXX\n").unwrap();
        let cfg = GameConfig::parse("[general]\nmaze_file = \"tiny.txt\"\n", &[dir.clone()]).unwrap();
        assert_eq!(cfg.general.maze_file, Some(dir.join("tiny.txt")));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
