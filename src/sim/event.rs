/// Events emitted during a simulation step.
/// The presentation layer and the log consume these.

use crate::domain::ai::Behavior;
use crate::domain::entity::ItemKind;
use crate::domain::geometry::GridPos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ItemEaten { kind: ItemKind, cell: GridPos },
    /// A power item granted empowerment.
    Empowered,
    EmpowermentExpired,
    PursuerCaptured { id: usize },
    PlayerCaught { lives_left: u32 },
    ModeSwitched { mode: Behavior, phase: usize },
    SessionWon,
    SessionLost,
}
