/// Global pursuer mode and the phase table that times it.
///
/// ```text
///   phase   wander   pursue
///     0       7 s     20 s
///     1       7 s     20 s
///     2       5 s     20 s
///     3       5 s     forever
/// ```
///
/// The phase counter only advances on the Pursue → Wander edge and
/// saturates at the last row.
///
/// A session opens in Pursue at phase 0 and its first switch already
/// lands in phase 1, so row 0's wander time is never used. It stays in
/// the table to keep the rows uniform.

use std::time::Duration;

use crate::domain::ai::Behavior;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PhaseTiming {
    pub wander: Duration,
    /// `None` = unbounded.
    pub pursue: Option<Duration>,
}

impl PhaseTiming {
    pub fn duration(&self, mode: Behavior) -> Option<Duration> {
        match mode {
            Behavior::Wander => Some(self.wander),
            Behavior::Pursue => self.pursue,
        }
    }
}

const fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

pub const PHASE_TABLE: [PhaseTiming; 4] = [
    PhaseTiming { wander: secs(7), pursue: Some(secs(20)) },
    PhaseTiming { wander: secs(7), pursue: Some(secs(20)) },
    PhaseTiming { wander: secs(5), pursue: Some(secs(20)) },
    PhaseTiming { wander: secs(5), pursue: None },
];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ModeClock {
    pub mode: Behavior,
    pub phase: usize,
}

impl ModeClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn timing(&self) -> &PhaseTiming {
        &PHASE_TABLE[self.phase.min(PHASE_TABLE.len() - 1)]
    }

    /// Duration of the current mode in the current phase.
    pub fn current_duration(&self) -> Option<Duration> {
        self.timing().duration(self.mode)
    }

    /// Mode timer fired. Returns how long until it should fire again,
    /// `None` when the new mode lasts forever.
    pub fn switch(&mut self) -> Option<Duration> {
        self.mode = match self.mode {
            Behavior::Pursue => {
                self.phase = (self.phase + 1).min(PHASE_TABLE.len() - 1);
                Behavior::Wander
            }
            Behavior::Wander => Behavior::Pursue,
        };
        self.current_duration()
    }

    /// Empowerment sends pursuers wandering without touching the phase.
    pub fn retreat(&mut self) {
        self.mode = Behavior::Wander;
    }
}
