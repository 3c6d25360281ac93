/// Pursuer AI: path-following steering.
///
/// Two states, derived from whether a next waypoint exists:
///   1. **EnRoute**: walk toward `next`; pop the following waypoint on
///      exact arrival.
///   2. **NoTarget**: nothing queued. On the next decision a fresh path
///      is requested: to the player in `Pursue` mode (and only while the
///      player is not empowered), otherwise to a random walkable cell.
///
/// One path request per tick at most. An unreachable target yields an
/// empty path, which simply leaves the pursuer idle until its next tick.

use rand::seq::SliceRandom;
use tracing::{trace, warn};

use super::entity::{Body, Direction, Intent, Motion, SteerContext, Steering};
use super::geometry::GridPos;
use super::path::Path;

/// Global pursuer behaviour, switched by the session's mode timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Behavior {
    #[default]
    Pursue,
    Wander,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PursuitState {
    NoTarget,
    EnRoute,
}

#[derive(Clone, Debug, Default)]
pub struct PathSteering {
    path: Path,
    next: Option<GridPos>,
}

impl PathSteering {
    pub fn state(&self) -> PursuitState {
        if self.next.is_some() { PursuitState::EnRoute } else { PursuitState::NoTarget }
    }

    /// Replace whatever was queued. An empty path leaves us in `NoTarget`.
    pub fn assign(&mut self, mut path: Path) {
        self.next = path.pop_front();
        self.path = path;
    }

    pub fn clear(&mut self) {
        self.path = Path::empty();
        self.next = None;
    }

    fn request(&mut self, body: &Body, ctx: &mut SteerContext<'_>) {
        let Some(from) = body.pos.to_cell() else {
            self.clear();
            return;
        };
        let target = match (ctx.mode, ctx.empowered, ctx.player_cell) {
            (Behavior::Pursue, false, Some(cell)) => Some(cell),
            _ => ctx.walkable.choose(&mut *ctx.rng).copied(),
        };
        let Some(to) = target else {
            self.clear();
            return;
        };
        let path = ctx.pathfinder.shortest_path(from, to);
        self.assign(path);
        trace!(?from, ?to, state = ?self.state(), mode = ?ctx.mode, "path requested");
    }
}

impl Steering for PathSteering {
    fn steer(&mut self, body: &Body, _motion: &Motion, ctx: &mut SteerContext<'_>) -> Intent {
        match self.next {
            Some(wp) if body.pos == wp.to_point() => {
                self.next = self.path.pop_front();
                if self.next.is_none() {
                    // Exhausted: stand still, re-request next tick.
                    return Intent::idle();
                }
            }
            Some(_) => {}
            None => self.request(body, ctx),
        }

        let Some(wp) = self.next else { return Intent::idle() };
        let target = wp.to_point();
        let dx = target.x - body.pos.x;
        let dy = target.y - body.pos.y;

        // Vertical is checked before horizontal.
        let dir = if dx == 0 && dy != 0 {
            Direction::vertical(dy)
        } else if dy == 0 {
            Direction::horizontal(dx)
        } else {
            warn!(pos = ?body.pos, waypoint = ?wp, state = ?self.state(), "waypoint not axis-aligned, dropping path");
            self.clear();
            Direction::None
        };
        Intent::single(dir)
    }
}
