/// The step function: advances the session by one tick.
///
/// Processing order:
///   1. Input (buffer the player's latest direction)
///   2. Pursuer movement, in spawn order
///   3. Player movement (buffered turn, wraparound, wall rollback)
///   4. Pickups (ordinary items, then one power item)
///   5. Pursuer contact (capture or death)
///   6. Timers (mode switch, empowerment expiry, mouth toggle)
///
/// Pursuers keep moving after the session is won or lost; only the
/// player's part of the pipeline stops once it is gone.

use tracing::debug;

use crate::domain::entity::{Direction, ItemKind, Pursuer, SteerContext};
use super::event::GameEvent;
use super::session::{Session, TimerTag, TICK};

/// Input sampled for one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    /// Held direction, if any. Nothing held keeps the current buffer.
    pub direction: Option<Direction>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;

    apply_input(session, input);
    resolve_pursuer_movement(session);
    resolve_player_movement(session);
    resolve_item_pickup(session, &mut events);
    resolve_power_pickup(session, &mut events);
    resolve_pursuer_contact(session, &mut events);
    resolve_timers(session, &mut events);

    events
}

fn apply_input(session: &mut Session, input: FrameInput) {
    if let (Some(player), Some(dir)) = (session.player.as_mut(), input.direction) {
        player.press(dir);
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_pursuer_movement(session: &mut Session) {
    let player_cell = session.player_cell();
    let mut ctx = SteerContext {
        pathfinder: &session.pathfinder,
        walkable: &session.layout.walkable_cells,
        mode: session.clock.mode,
        empowered: session.empowered,
        player_cell,
        rng: &mut session.rng,
    };
    for pursuer in &mut session.pursuers {
        pursuer.tick(&mut ctx, &session.walls);
    }
}

fn resolve_player_movement(session: &mut Session) {
    let screen_width = session.screen_width();
    let player_cell = session.player_cell();
    let Some(player) = session.player.as_mut() else { return };
    let mut ctx = SteerContext {
        pathfinder: &session.pathfinder,
        walkable: &session.layout.walkable_cells,
        mode: session.clock.mode,
        empowered: session.empowered,
        player_cell,
        rng: &mut session.rng,
    };
    player.tick(&mut ctx, &session.walls, screen_width);
}

// ══════════════════════════════════════════════════════════════
// Pickups
// ══════════════════════════════════════════════════════════════

/// Every overlapping ordinary item is removed and scored exactly once.
fn resolve_item_pickup(session: &mut Session, events: &mut Vec<GameEvent>) {
    let Some(body) = session.player.as_ref().map(|p| *p.body()) else { return };

    let mut eaten = Vec::new();
    session.items.retain(|item| {
        let hit = body.overlaps(&item.body);
        if hit {
            eaten.push(*item);
        }
        !hit
    });
    for item in eaten {
        session.score += item.kind.points();
        events.push(GameEvent::ItemEaten { kind: item.kind, cell: item.cell });
    }

    if !session.won && session.items.is_empty() {
        session.won = true;
        debug!(score = session.score, tick = session.tick, "all items eaten");
        events.push(GameEvent::SessionWon);
    }
}

/// At most one power item per tick, and none while already empowered.
fn resolve_power_pickup(session: &mut Session, events: &mut Vec<GameEvent>) {
    if session.empowered { return; }
    let Some(body) = session.player.as_ref().map(|p| *p.body()) else { return };
    let Some(idx) = session.powers.iter().position(|p| body.overlaps(&p.body)) else { return };

    let power = session.powers.remove(idx);
    session.score += power.kind.points();
    events.push(GameEvent::ItemEaten { kind: ItemKind::Power, cell: power.cell });

    let mode_before = session.clock.mode;
    session.grant_empowerment();
    debug!(cell = ?power.cell, "empowered");
    events.push(GameEvent::Empowered);
    if session.clock.mode != mode_before {
        events.push(GameEvent::ModeSwitched { mode: session.clock.mode, phase: session.clock.phase });
    }
}

// ══════════════════════════════════════════════════════════════
// Pursuer contact
// ══════════════════════════════════════════════════════════════

fn resolve_pursuer_contact(session: &mut Session, events: &mut Vec<GameEvent>) {
    let Some(body) = session.player.as_ref().map(|p| *p.body()) else { return };

    let mut i = 0;
    while i < session.pursuers.len() {
        if !session.pursuers[i].body().overlaps(&body) {
            i += 1;
            continue;
        }
        if session.empowered {
            let captured = session.pursuers.remove(i);
            session.score += Pursuer::POINTS;
            debug!(id = captured.id, score = session.score, "pursuer captured");
            events.push(GameEvent::PursuerCaptured { id: captured.id });
            continue;
        }
        if !session.won {
            lose_life(session, events);
        }
        // One life per tick at most
        break;
    }
}

fn lose_life(session: &mut Session, events: &mut Vec<GameEvent>) {
    session.lives = session.lives.saturating_sub(1);
    debug!(lives = session.lives, tick = session.tick, "player caught");
    events.push(GameEvent::PlayerCaught { lives_left: session.lives });

    if session.lives == 0 {
        session.player = None;
        debug!(score = session.score, "out of lives");
        events.push(GameEvent::SessionLost);
    } else if let Some(player) = session.player.as_mut() {
        player.respawn();
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_timers(session: &mut Session, events: &mut Vec<GameEvent>) {
    for tag in session.scheduler.advance(TICK) {
        match tag {
            TimerTag::ModeSwitch => {
                if let Some(next) = session.clock.switch() {
                    session.scheduler.schedule(next, TimerTag::ModeSwitch);
                }
                let (mode, phase) = (session.clock.mode, session.clock.phase);
                debug!(?mode, phase, "mode switch");
                events.push(GameEvent::ModeSwitched { mode, phase });
            }
            TimerTag::EmpowermentExpiry => {
                session.empowered = false;
                debug!("empowerment expired");
                events.push(GameEvent::EmpowermentExpired);
            }
            TimerTag::MouthToggle => {
                if let Some(player) = session.player.as_mut() {
                    player.mouth_open = !player.mouth_open;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::domain::ai::Behavior;
    use crate::domain::geometry::{GridPos, Point};
    use crate::domain::grid::Grid;
    use crate::sim::maze::BUILTIN_MAZE;
    use crate::sim::session::{Status, STEPS_PER_SECOND};

    fn session(rows: &[&str]) -> Session {
        Session::new(Grid::build(rows).unwrap(), 11)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn toward(dir: Direction) -> FrameInput {
        FrameInput { direction: Some(dir) }
    }

    fn player_pos(s: &Session) -> Point {
        s.player.as_ref().map(|p| p.pos()).unwrap()
    }

    fn place_pursuer(s: &mut Session, pos: Point) {
        s.pursuers[0].actor.body.pos = pos;
    }

    // ── Scenario A: monotonic approach ──

    #[test]
    fn pursuer_closes_in_on_still_player() {
        let mut s = session(&[
            "XXXXXXXX",
            "XP     X",
            "X      X",
            "X      X",
            "X      X",
            "X      X",
            "X     GX",
            "XXXXXXXX",
        ]);
        let target = s.layout.player_start;
        let mut distances = Vec::new();

        for _ in 0..1000 {
            let pursuer = &s.pursuers[0];
            if let Some(cell) = pursuer.pos().to_cell().filter(|c| c.to_point() == pursuer.pos()) {
                let d = s.pathfinder.shortest_path(cell, target).len();
                if distances.last() != Some(&d) {
                    distances.push(d);
                }
            }
            let events = step(&mut s, idle());
            assert_eq!(s.clock.mode, Behavior::Pursue);
            if events.iter().any(|e| matches!(e, GameEvent::PlayerCaught { .. })) {
                break;
            }
        }

        assert_eq!(distances.first(), Some(&10));
        assert_eq!(distances.last(), Some(&1));
        assert!(distances.windows(2).all(|w| w[1] < w[0]), "{distances:?}");
        assert_eq!(s.lives, 2);
    }

    // ── Scenario B: last item wins immediately ──

    #[test]
    fn eating_last_item_wins_same_tick() {
        let mut s = session(&["XXXX", "XP X", "XXXX"]);
        assert_eq!(s.items.len(), 1);
        let mut won_at = None;
        for tick in 1..=100u64 {
            let events = step(&mut s, toward(Direction::Right));
            if s.items.is_empty() {
                assert_eq!(s.score, ItemKind::Ordinary.points());
                assert!(s.won);
                assert!(events.contains(&GameEvent::SessionWon));
                won_at = Some(tick);
                break;
            }
            assert!(!s.won);
            assert_eq!(s.score, 0);
        }
        // Player box reaches the 4x4 item at x=80 after 17 units
        assert_eq!(won_at, Some(17));
        assert_eq!(s.status(), Status::Won);
    }

    // ── Scenario C: capture while empowered ──

    #[test]
    fn empowered_player_captures_pursuer() {
        let mut s = session(&["XXXXXXX", "XP   GX", "X     X", "XXXXXXX"]);
        s.grant_empowerment();
        let start = player_pos(&s);
        place_pursuer(&mut s, start.offset(10, 0));

        let events = step(&mut s, idle());
        assert!(events.contains(&GameEvent::PursuerCaptured { id: 0 }));
        assert!(s.pursuers.is_empty());
        assert_eq!(s.score, Pursuer::POINTS);
        assert_eq!(s.lives, 3);
        assert_eq!(player_pos(&s), start);
    }

    // ── Scenario D: last life ──

    #[test]
    fn last_life_ends_session_same_tick() {
        let mut s = session(&["XXXXXXX", "XP   GX", "X     X", "XXXXXXX"]);
        s.lives = 1;
        let start = player_pos(&s);
        place_pursuer(&mut s, start.offset(5, 0));

        let events = step(&mut s, idle());
        assert_eq!(s.lives, 0);
        assert!(s.player.is_none());
        assert!(events.contains(&GameEvent::SessionLost));
        assert_eq!(s.status(), Status::Lost);
        // Pursuers keep going afterwards
        for _ in 0..50 {
            assert!(step(&mut s, idle()).iter().all(|e| !matches!(e, GameEvent::PlayerCaught { .. })));
        }
    }

    #[test]
    fn caught_player_respawns_and_loses_one_life() {
        let mut s = session(&["XXXXXXXX", "XP    GX", "X G    X", "XXXXXXXX"]);
        let here = GridPos::new(2, 1).to_point();
        if let Some(p) = s.player.as_mut() {
            p.actor.body.pos = here;
            p.actor.motion.direction = Direction::Right;
        }
        // Two pursuers on top of the player: still only one life lost
        place_pursuer(&mut s, here);
        s.pursuers[1].actor.body.pos = here.offset(3, 0);
        let events = step(&mut s, idle());
        assert_eq!(s.lives, 2);
        assert_eq!(events.iter().filter(|e| matches!(e, GameEvent::PlayerCaught { .. })).count(), 1);
        let p = s.player.as_ref().unwrap();
        assert_eq!(p.pos(), GridPos::new(1, 1).to_point());
        assert_eq!(p.direction(), Direction::None);
    }

    #[test]
    fn no_death_after_win() {
        let mut s = session(&["XXXXXX", "XP  GX", "XXXXXX"]);
        s.items.clear();
        step(&mut s, idle());
        assert!(s.won);
        let start = player_pos(&s);
        place_pursuer(&mut s, start.offset(4, 0));
        let events = step(&mut s, idle());
        assert!(events.iter().all(|e| !matches!(e, GameEvent::PlayerCaught { .. })));
        assert_eq!(s.lives, 3);
    }

    // ── Pickups ──

    #[test]
    fn item_scores_only_once() {
        let mut s = session(&["XXXXX", "XP  X", "XXXXX"]);
        assert_eq!(s.items.len(), 2);
        if let Some(p) = s.player.as_mut() {
            p.actor.body.pos = GridPos::new(2, 1).to_point();
        }
        for _ in 0..5 {
            step(&mut s, idle());
            assert_eq!(s.score, 10);
            assert_eq!(s.items.len(), 1);
        }
        assert!(!s.won);
    }

    #[test]
    fn power_item_empowers_until_expiry() {
        let mut s = session(&["XXXXXX", "XPOO X", "XXXXXX"]);
        assert_eq!(s.powers.len(), 2);
        if let Some(p) = s.player.as_mut() {
            p.actor.body.pos = GridPos::new(2, 1).to_point();
        }
        let events = step(&mut s, idle());
        assert!(events.contains(&GameEvent::Empowered));
        assert!(events.contains(&GameEvent::ModeSwitched { mode: Behavior::Wander, phase: 0 }));
        assert_eq!(s.powers.len(), 1);
        assert_eq!(s.score, 50);
        assert_eq!(s.clock.mode, Behavior::Wander);

        // Second power is ignored while empowered
        if let Some(p) = s.player.as_mut() {
            p.actor.body.pos = GridPos::new(3, 1).to_point();
        }
        let mut expired_at = None;
        for tick in 1..=2000 {
            let events = step(&mut s, idle());
            if events.contains(&GameEvent::EmpowermentExpired) {
                expired_at = Some(tick);
                break;
            }
            assert_eq!(s.powers.len(), 1);
        }
        // 15 s at 120 steps per second
        let ticks = expired_at.unwrap();
        assert!((1799..=1801).contains(&ticks), "expired after {ticks}");
        assert!(!s.empowered);
        assert_eq!(s.clock.phase, 0);

        step(&mut s, idle());
        assert!(s.powers.is_empty());
        assert!(s.empowered);
    }

    // ── Timers ──

    #[test]
    fn mode_switches_after_twenty_seconds() {
        let mut s = session(&["XXXXX", "XP  X", "XXXXX"]);
        let mut switches = Vec::new();
        for tick in 1..=2500u64 {
            for e in step(&mut s, idle()) {
                if let GameEvent::ModeSwitched { mode, phase } = e {
                    switches.push((tick, mode, phase));
                }
            }
        }
        assert_eq!(switches.len(), 1);
        let (tick, mode, phase) = switches[0];
        assert!((2399..=2401).contains(&tick));
        assert_eq!((mode, phase), (Behavior::Wander, 1));
    }

    #[test]
    fn wander_then_pursue_again() {
        let mut s = session(&["XXXXX", "XP  X", "XXXXX"]);
        let mut switches = Vec::new();
        for tick in 1..=3300u64 {
            for e in step(&mut s, idle()) {
                if let GameEvent::ModeSwitched { mode, phase } = e {
                    switches.push((tick, mode, phase));
                }
            }
        }
        assert_eq!(switches.len(), 2, "{switches:?}");
        assert_eq!((switches[0].1, switches[0].2), (Behavior::Wander, 1));
        assert_eq!((switches[1].1, switches[1].2), (Behavior::Pursue, 1));
        // Phase 1 wanders for 7 s
        let gap = switches[1].0 - switches[0].0;
        assert!((839..=841).contains(&gap), "wandered for {gap} ticks");
        assert!(s.scheduler.remaining(TimerTag::ModeSwitch).is_some());
    }

    #[test]
    fn mouth_toggles_every_200ms() {
        let mut s = session(&["XXXXX", "XP  X", "XXXXX"]);
        let mut flips = 0;
        let mut last = s.player.as_ref().unwrap().mouth_open;
        for _ in 0..STEPS_PER_SECOND {
            step(&mut s, idle());
            let now = s.player.as_ref().unwrap().mouth_open;
            if now != last {
                flips += 1;
                last = now;
            }
        }
        assert!((4..=5).contains(&flips), "{flips} flips");
    }

    // ── Long-run invariant ──

    #[test]
    fn nothing_ever_overlaps_a_wall() {
        let mut s = Session::new(Grid::build(BUILTIN_MAZE).unwrap(), 3);
        let mut rng = StdRng::seed_from_u64(99);
        let dirs = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
        let mut input = idle();

        for tick in 0..6000 {
            if tick % 40 == 0 {
                input = toward(dirs[rng.gen_range(0..dirs.len())]);
            }
            step(&mut s, input);

            if let Some(p) = s.player.as_ref() {
                assert!(!s.walls.overlaps(&p.body().rect()), "player in wall at tick {tick}: {:?}", p.pos());
            }
            for g in &s.pursuers {
                assert!(!s.walls.overlaps(&g.body().rect()), "pursuer {} in wall at tick {tick}", g.id);
            }
            if s.status() == Status::Lost {
                s.restart();
            }
        }
    }

    #[test]
    fn player_wraps_through_side_tunnel() {
        let mut s = session(&[
            "XXXXX",
            "  P  ",
            "XXXXX",
        ]);
        s.items.clear();
        let width = s.screen_width();
        let mut wrapped = false;
        for _ in 0..200 {
            step(&mut s, toward(Direction::Left));
            let pos = player_pos(&s);
            assert!(pos.x >= 0 && pos.x <= width);
            if pos.x == width {
                wrapped = true;
            }
        }
        assert!(wrapped);
    }

    #[test]
    fn player_cannot_leave_the_tunnel_vertically() {
        let mut s = session(&[
            "XXXXX",
            "  P  ",
            "XXXXX",
        ]);
        s.items.clear();
        let width = s.screen_width();
        let row_y = player_pos(&s).y;
        let mut ticks = 0;
        while player_pos(&s).x != width {
            step(&mut s, toward(Direction::Left));
            ticks += 1;
            assert!(ticks < 200, "never wrapped");
        }
        assert_eq!(s.player_cell(), None);

        for dir in [Direction::Up, Direction::Down] {
            for _ in 0..300 {
                step(&mut s, toward(dir));
                assert_eq!(player_pos(&s).y, row_y);
            }
        }
        // Kept sliding along the row and came back into the maze
        assert!(s.player_cell().is_some());
    }
}
