//! Request / completion handoff between a requester and the worker.
//!
//! ```text
//! requester                         worker
//!   │ Completion::channel()           │
//!   │── Transition (carries done) ──▶ │  control channel
//!   │                                 │  ...commit phase, touch context...
//!   │ ◀────────── outcome ─────────── │  done.complete(outcome)
//! ```
//!
//! A [`Completion`] is consumed by `complete`, so it fires at most once. If
//! the worker exits holding one, dropping it disconnects the requester's
//! receiver instead of leaving it blocked.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::context::{ContextFactory, ContextResult};

/// One-shot acknowledgement of a transition.
pub(crate) struct Completion(Sender<ContextResult<()>>);

impl Completion {
    /// Creates a completion and the receiver the requester blocks on.
    pub(crate) fn channel() -> (Self, Receiver<ContextResult<()>>) {
        let (tx, rx) = bounded(1);
        (Self(tx), rx)
    }

    /// Reports the outcome. The requester may have given up already.
    pub(crate) fn complete(self, outcome: ContextResult<()>) {
        let _ = self.0.send(outcome);
    }
}

/// A request travelling from a requester to the worker.
pub(crate) enum Transition {
    /// Pause rendering, optionally tearing the context down.
    Disable {
        destroy_context: bool,
        done: Completion,
    },
    /// Resume rendering. `new_factory` is adopted only if a reset is pending.
    Enable {
        new_factory: Option<Arc<dyn ContextFactory>>,
        done: Completion,
    },
}

impl Transition {
    pub(crate) const fn target(&self) -> bool {
        matches!(self, Self::Enable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;

    #[test]
    fn test_completion_delivers_outcome() {
        let (done, rx) = Completion::channel();
        done.complete(Err(ContextError::BindFailed {
            reason: "no surface".to_string(),
        }));
        assert!(matches!(rx.recv(), Ok(Err(ContextError::BindFailed { .. }))));
    }

    #[test]
    fn test_dropped_completion_disconnects_requester() {
        let (done, rx) = Completion::channel();
        drop(done);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_completion_after_requester_left_is_harmless() {
        let (done, rx) = Completion::channel();
        drop(rx);
        done.complete(Ok(()));
    }
}
