//! Worker-owned lifecycle phase.
//!
//! ```text
//!   ┌──────────┐  requested=false  ┌──────────┐  teardown  ┌────────┐
//!   │ Running  │ ────────────────▶ │ Pausing  │ ─────────▶ │ Paused │
//!   └──────────┘                   └──────────┘            └───┬────┘
//!        ▲                                                     │ wakeup
//!        │        rebind ok        ┌──────────┐                │
//!        └──────────────────────── │ Resuming │ ◀──────────────┘
//!                                  └──────────┘
//!                                      │ rebind failed -> Paused
//! ```
//!
//! Requesters read the phase. Only the worker writes it.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of a render worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RenderPhase {
    /// Pulling and executing queued work.
    Running = 0,
    /// Tearing down or disabling its context.
    Pausing = 1,
    /// Blocked until woken by an enable request or shutdown.
    Paused = 2,
    /// Re-enabling or rebinding its context.
    Resuming = 3,
}

impl From<u8> for RenderPhase {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Pausing,
            2 => Self::Paused,
            3 => Self::Resuming,
            _ => Self::Running,
        }
    }
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Pausing => "pausing",
            Self::Paused => "paused",
            Self::Resuming => "resuming",
        })
    }
}

/// Lock-free phase cell shared between the worker and requesters.
#[derive(Debug)]
pub(crate) struct AtomicPhase(AtomicU8);

impl AtomicPhase {
    pub(crate) const fn new(phase: RenderPhase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    #[inline]
    pub(crate) fn load(&self) -> RenderPhase {
        RenderPhase::from(self.0.load(Ordering::Acquire))
    }

    /// Worker thread only. Returns the previous phase.
    #[inline]
    pub(crate) fn commit(&self, phase: RenderPhase) -> RenderPhase {
        RenderPhase::from(self.0.swap(phase as u8, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trips_through_cell() {
        let cell = AtomicPhase::new(RenderPhase::Running);
        for phase in [
            RenderPhase::Pausing,
            RenderPhase::Paused,
            RenderPhase::Resuming,
            RenderPhase::Running,
        ] {
            cell.commit(phase);
            assert_eq!(cell.load(), phase);
        }
    }

    #[test]
    fn test_commit_returns_previous() {
        let cell = AtomicPhase::new(RenderPhase::Running);
        assert_eq!(cell.commit(RenderPhase::Pausing), RenderPhase::Running);
        assert_eq!(cell.commit(RenderPhase::Paused), RenderPhase::Pausing);
    }
}
