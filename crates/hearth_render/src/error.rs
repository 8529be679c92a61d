//! # Controller Error Types
//!
//! Misuse is reported through these variants instead of corrupting state.

use hearth_core::CoreError;
use thiserror::Error;

use crate::context::ContextError;

/// Errors returned by [`crate::RenderThreadController`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// `start_thread` was called on a controller whose worker already exists
    /// or has already been stopped.
    #[error("render worker already started")]
    AlreadyStarted,

    /// The worker is not running (never started, or already stopped).
    #[error("render worker not started")]
    NotStarted,

    /// Another enable/disable request is still outstanding.
    #[error("another rendering transition is still in progress")]
    TransitionInProgress,

    /// The request was issued from the worker thread itself and would block
    /// forever.
    #[error("rendering transitions cannot be requested from the render worker thread")]
    CalledFromWorker,

    /// The worker exited before acknowledging the request.
    #[error("render worker stopped before completing the transition")]
    WorkerStopped,

    /// The worker thread panicked.
    #[error("render worker panicked")]
    WorkerPanicked,

    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn render worker: {0}")]
    Spawn(String),

    /// A context could not be acquired or bound while resuming.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Queue, registry or configuration error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;
