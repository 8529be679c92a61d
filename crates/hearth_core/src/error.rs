//! # Core Error Types
//!
//! Errors raised by the queue, the registry and the configuration loader.

use thiserror::Error;

use crate::registry::ThreadRole;

/// Errors that can occur in the core thread plumbing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The queue was closed; no more messages are accepted.
    #[error("message queue is closed")]
    QueueClosed,

    /// A live thread is already registered under this role.
    #[error("thread role {0} is already registered")]
    RoleTaken(ThreadRole),

    /// No live thread is registered under this role.
    #[error("no thread registered for role {0}")]
    RoleNotRegistered(ThreadRole),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
