//! # HEARTH Core
//!
//! Thread plumbing shared by every HEARTH render worker:
//! - A blocking message queue that can be closed, interrupted and filtered
//! - A registry so peers can address a worker by its role
//! - TOML-backed worker configuration
//!
//! ## Architecture
//!
//! ```text
//!   Peer threads ──post_message(role)──> ThreadRegistry ──> MessageQueue ──> Worker
//!                                                              │
//!                                               MessageFilter (holds back, never drops)
//! ```
//!
//! Nothing in this crate knows about graphics contexts. Those live in
//! `hearth_render`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod queue;
pub mod registry;

pub use config::RenderThreadConfig;
pub use error::{CoreError, CoreResult};
pub use queue::{MessageFilter, MessagePriority, MessageQueue, PopOutcome};
pub use registry::{MessageSink, ThreadRegistry, ThreadRole};
