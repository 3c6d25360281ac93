/// Drawing surface the game draws through.
///
/// Positions and sizes are in screen units (`CELL_SIZE` per maze cell);
/// the surface decides how those map onto its own pixels or character
/// cells. `draw_session` issues every call for one frame, ending with
/// `present()`.

use std::io;

use crossterm::style::Color;

use crate::domain::entity::{Direction, ItemKind};
use crate::domain::geometry::{Point, CELL_SIZE};
use crate::sim::session::{Session, Status, TimerTag};

pub const WALL_COLOR: Color = Color::Rgb { r: 33, g: 33, b: 222 };
pub const ITEM_COLOR: Color = Color::Rgb { r: 255, g: 184, b: 151 };
pub const POWER_COLOR: Color = Color::Rgb { r: 255, g: 255, b: 255 };

/// Normal text size; headings use `TITLE_TEXT`.
pub const BODY_TEXT: u16 = 1;
pub const TITLE_TEXT: u16 = 2;

const HELP_TEXT: &str = "Arrows/WASD: Move  R: Restart  Q: Quit";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    Player { facing: Direction, mouth_open: bool },
    /// `frightened` while the player is empowered.
    Pursuer { id: usize, frightened: bool },
}

pub trait Canvas {
    fn draw_rect(&mut self, pos: Point, size: (i32, i32), color: Color);
    fn draw_circle(&mut self, center: Point, radius: i32, color: Color);
    fn draw_sprite(&mut self, sprite: Sprite, pos: Point);
    fn draw_text(&mut self, text: &str, pos: Point, size: u16);
    /// Show the finished frame.
    fn present(&mut self) -> io::Result<()>;
}

/// Draw one frame: maze, pickups, pursuers, player, HUD.
pub fn draw_session<C: Canvas + ?Sized>(canvas: &mut C, session: &Session) -> io::Result<()> {
    for wall in session.walls.iter() {
        canvas.draw_rect(wall.pos, (wall.w, wall.h), WALL_COLOR);
    }

    for item in session.items.iter().chain(&session.powers) {
        let color = match item.kind {
            ItemKind::Ordinary => ITEM_COLOR,
            ItemKind::Power => POWER_COLOR,
        };
        // Pickup boxes are anchored on the cell centre
        canvas.draw_circle(item.body.pos, item.body.size / 2, color);
    }

    for pursuer in &session.pursuers {
        let sprite = Sprite::Pursuer { id: pursuer.id, frightened: session.empowered };
        canvas.draw_sprite(sprite, pursuer.pos());
    }

    if let Some(player) = &session.player {
        let sprite = Sprite::Player { facing: player.direction(), mouth_open: player.mouth_open };
        canvas.draw_sprite(sprite, player.pos());
    }

    // HUD sits two rows above the maze
    let mut hud = format!("Score: {:<7} Lives: {}", session.score, session.lives);
    if let Some(left) = session.scheduler.remaining(TimerTag::EmpowermentExpiry) {
        hud.push_str(&format!("  Power: {}s", left.as_secs_f32().ceil() as u32));
    }
    canvas.draw_text(&hud, Point::new(0, -2 * CELL_SIZE), BODY_TEXT);
    canvas.draw_text(HELP_TEXT, Point::new(0, session.screen_height()), BODY_TEXT);

    let banner = match session.status() {
        Status::Playing => None,
        Status::Won => Some("YOU WIN!  [R] Restart  [Q] Quit"),
        Status::Lost => Some("GAME OVER  [R] Restart  [Q] Quit"),
    };
    if let Some(text) = banner {
        let centre = Point::new(0, session.screen_height() / 2);
        canvas.draw_text(text, centre, TITLE_TEXT);
    }

    canvas.present()
}
