/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. `draw_*` calls paint into the `front` buffer (array of Cell)
///   2. `present()` compares each cell with `back` (previous frame)
///   3. Only cells that changed produce terminal commands
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen units map onto the terminal as one maze cell = `CELL_W`
/// columns by one row. Horizontal positions round to the nearest
/// column, so movement shows at half-cell steps.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Direction;
use crate::domain::geometry::{Point, CELL_SIZE};
use crate::sim::session::Session;
use super::canvas::{self, Canvas, Sprite, TITLE_TEXT};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every empty terminal cell, so the
    /// gaps between rows match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Out-of-range (including negative) coordinates are ignored.
    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn bg_at(&self, x: i32, y: i32) -> Color {
        if x < 0 || y < 0 { return Cell::BASE_BG; }
        self.get(x as usize, y as usize).bg
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Screen-unit → terminal mapping ──

/// Terminal columns per maze cell.
const CELL_W: i32 = 2;

/// Vertical offsets: HUD on top, maze two rows below it.
const HUD_ROW: i32 = 0;
const MAP_ROW: i32 = 2;

/// Nearest column for a screen x.
fn col_of(x: i32) -> i32 {
    (x * CELL_W + CELL_SIZE / 2).div_euclid(CELL_SIZE)
}

/// Nearest row for a screen y.
fn row_of(y: i32) -> i32 {
    MAP_ROW + (y + CELL_SIZE / 2).div_euclid(CELL_SIZE)
}

const PLAYER_COLOR: Color = Color::Rgb { r: 255, g: 255, b: 0 };
const FRIGHTENED_COLOR: Color = Color::Rgb { r: 60, g: 60, b: 255 };
const PURSUER_COLORS: [Color; 4] = [
    Color::Rgb { r: 255, g: 0, b: 0 },
    Color::Rgb { r: 255, g: 184, b: 255 },
    Color::Rgb { r: 0, g: 255, b: 255 },
    Color::Rgb { r: 255, g: 184, b: 82 },
];
const BANNER_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

fn sprite_cell(sprite: Sprite) -> Cell {
    match sprite {
        Sprite::Player { facing, mouth_open } => {
            // The mouth opens toward the direction of travel
            let ch = match (mouth_open, facing) {
                (false, _) => 'O',
                (true, Direction::Left) => '>',
                (true, Direction::Up) => 'v',
                (true, Direction::Down) => '^',
                (true, Direction::Right | Direction::None) => '<',
            };
            Cell::new(ch, PLAYER_COLOR, Cell::BASE_BG)
        }
        Sprite::Pursuer { frightened: true, .. } => Cell::new('W', FRIGHTENED_COLOR, Cell::BASE_BG),
        Sprite::Pursuer { id, .. } => {
            Cell::new('M', PURSUER_COLORS[id % PURSUER_COLORS.len()], Cell::BASE_BG)
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the
    /// terminal will report key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Draw and show one frame of `session`.
    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        canvas::draw_session(self, session)
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back differs from front everywhere.
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default background.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Canvas for Renderer {
    fn draw_rect(&mut self, pos: Point, size: (i32, i32), color: Color) {
        let (x0, x1) = (col_of(pos.x), col_of(pos.x + size.0));
        let (y0, y1) = (row_of(pos.y), row_of(pos.y + size.1));
        for y in y0..y1.max(y0 + 1) {
            for x in x0..x1.max(x0 + 1) {
                self.front.set(x, y, Cell::new(' ', color, color));
            }
        }
    }

    fn draw_circle(&mut self, center: Point, radius: i32, color: Color) {
        // Anchor on the containing maze cell's left column
        let x = center.x.div_euclid(CELL_SIZE) * CELL_W;
        let y = MAP_ROW + center.y.div_euclid(CELL_SIZE);
        let ch = if radius >= 4 { '●' } else { '·' };
        let bg = self.front.bg_at(x, y);
        self.front.set(x, y, Cell::new(ch, color, bg));
    }

    fn draw_sprite(&mut self, sprite: Sprite, pos: Point) {
        self.front.set(col_of(pos.x), row_of(pos.y), sprite_cell(sprite));
    }

    fn draw_text(&mut self, text: &str, pos: Point, size: u16) {
        let y = if pos.y < 0 { HUD_ROW } else { row_of(pos.y) };
        if size >= TITLE_TEXT {
            // Headings: centred banner across the terminal
            let padded = format!("  {text}  ");
            let x = (self.term_w as i32 - padded.chars().count() as i32).max(0) / 2;
            self.front.put_str(x, y, &padded, Color::Black, BANNER_BG);
        } else {
            self.front.put_str(col_of(pos.x), y, text, Color::White, Cell::BASE_BG);
        }
    }

    fn present(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maze_cell_maps_to_two_columns() {
        assert_eq!(col_of(0), 0);
        assert_eq!(col_of(CELL_SIZE), 2);
        assert_eq!(col_of(CELL_SIZE * 3), 6);
        // Half-cell movement lands between
        assert_eq!(col_of(CELL_SIZE + 16), 3);
        assert_eq!(col_of(CELL_SIZE + 7), 2);
        assert_eq!(row_of(0), MAP_ROW);
        assert_eq!(row_of(CELL_SIZE * 2 + 20), MAP_ROW + 3);
        assert_eq!(row_of(-2 * CELL_SIZE), HUD_ROW);
    }

    #[test]
    fn frame_buffer_ignores_out_of_range() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.set(-1, 0, Cell::INVALID);
        fb.set(4, 0, Cell::INVALID);
        fb.set(0, 2, Cell::INVALID);
        assert!(fb.cells.iter().all(|c| *c == Cell::BLANK));
        fb.put_str(2, 1, "abc", Color::White, Cell::BASE_BG);
        assert_eq!(fb.get(2, 1).ch, 'a');
        assert_eq!(fb.get(3, 1).ch, 'b');
    }

    #[test]
    fn player_glyph_follows_mouth_and_facing() {
        let open_left = sprite_cell(Sprite::Player { facing: Direction::Left, mouth_open: true });
        assert_eq!(open_left.ch, '>');
        let closed = sprite_cell(Sprite::Player { facing: Direction::Left, mouth_open: false });
        assert_eq!(closed.ch, 'O');
        let scared = sprite_cell(Sprite::Pursuer { id: 2, frightened: true });
        assert_eq!(scared.fg, FRIGHTENED_COLOR);
        let normal = sprite_cell(Sprite::Pursuer { id: 6, frightened: false });
        assert_eq!(normal.fg, PURSUER_COLORS[2]);
    }
}
