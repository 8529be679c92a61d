//! # Worker Inbound Queue
//!
//! The queue a render worker pulls its work from.
//!
//! ## Blocking Contract
//!
//! ```text
//! pop() returns when:
//!   - a visible message is available   -> PopOutcome::Message
//!   - cancel_wait() was called         -> PopOutcome::Interrupted
//!   - the optional timeout elapsed     -> PopOutcome::TimedOut
//!   - close() was called               -> PopOutcome::Closed
//! ```
//!
//! A message is *visible* unless the installed [`MessageFilter`] holds it
//! back. Held-back messages keep their position and become visible again as
//! soon as the filter is removed.

mod filter;
mod message_queue;

pub use filter::MessageFilter;
pub use message_queue::{MessageQueue, PopOutcome};

/// Where a pushed message lands in the queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MessagePriority {
    /// Appended after every queued message.
    #[default]
    Normal,
    /// Inserted ahead of every queued message.
    High,
}
