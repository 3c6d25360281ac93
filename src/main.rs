/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::event::GameEvent;
use sim::maze::load_layout;
use sim::session::{Session, TICK};
use sim::step::{self, FrameInput};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Steps run per loop iteration at most; a longer stall drops time
/// instead of fast-forwarding.
const MAX_CATCH_UP: u32 = 12;

fn main() {
    let config = GameConfig::load();
    init_tracing(config.general.log_file.as_deref());

    let layout = match load_layout(config.general.maze_file.as_deref()) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Maze error: {e}");
            if let Some(source) = std::error::Error::source(&e) {
                eprintln!("  caused by: {source}");
            }
            std::process::exit(1);
        }
    };

    let seed = config.general.seed.unwrap_or_else(rand::random);
    let mut session = Session::new(layout, seed);

    let mut renderer = Renderer::new();
    let enhanced_keys = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            let _ = renderer.cleanup();
            eprintln!("Terminal init failed: {e}");
            std::process::exit(1);
        }
    };

    let result = game_loop(&mut session, &mut renderer, &config, enhanced_keys);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Maze Chase!");
    println!("Final Score: {}", session.score);
    println!("Seed: {}", session.seed());
}

/// Route tracing output to `log_file`; the terminal belongs to the game,
/// so without a file nothing is logged.
fn init_tracing(log_file: Option<&Path>) {
    let Some(path) = log_file else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
    enhanced_keys: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced_keys;
    let mut gp = GamepadState::new().with_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }

    let frame_interval = Duration::from_secs(1) / config.display.render_fps.max(1);
    let mut next_step = Instant::now();
    let mut last_render: Option<Instant> = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break;
        }
        if kb.restart_pressed() || gp.restart_pressed() {
            session.restart();
            next_step = Instant::now();
        }

        // Fixed-rate simulation, decoupled from the render rate
        let mut steps = 0;
        while Instant::now() >= next_step {
            if steps == MAX_CATCH_UP {
                warn!(behind = ?next_step.elapsed(), "simulation fell behind, dropping time");
                next_step = Instant::now() + TICK;
                break;
            }
            let input = FrameInput {
                direction: kb.held_direction().or_else(|| gp.held_direction()),
            };
            let events = step::step(session, input);
            log_outcome(&events, session);
            next_step += TICK;
            steps += 1;
        }

        if last_render.map_or(true, |t| t.elapsed() >= frame_interval) {
            renderer.render(session)?;
            last_render = Some(Instant::now());
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn log_outcome(events: &[GameEvent], session: &Session) {
    for event in events {
        match event {
            GameEvent::SessionWon => info!(score = session.score, "maze cleared"),
            GameEvent::SessionLost => info!(score = session.score, "out of lives"),
            _ => {}
        }
    }
}
