//! # HEARTH Render
//!
//! Lifecycle control for a dedicated render worker thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    RenderThreadController                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  start_thread ──▶ Worker ──▶ pause check ──▶ MessageQueue::pop   │
//! │                     │                                            │
//! │  disable ──────────▶│ Pausing: disable context / destroy context │
//! │                     │ Paused : wait (control channel | shutdown) │
//! │  enable  ──────────▶│ Resuming: re-enable / rebind context       │
//! │                     ▼                                            │
//! │  stop_thread ──▶ cancel + close queue + wake + join              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Requesters ask, the worker commits. Only the worker writes the phase.
//! 2. Every enable/disable is a synchronous round-trip.
//! 3. While a context reset is pending, context-dependent messages are held
//!    in the queue, never dropped.
//! 4. Shutdown reaches both blocking points of the worker.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod context;
pub mod controller;
pub mod error;
pub mod renderer;

pub use context::{
    ContextError, ContextFactory, ContextHandle, ContextResult, HeadlessContext, HeadlessContextFactory,
};
pub use controller::{
    ControllerStats, RenderPhase, RenderThread, RenderThreadController, RenderThreadRegistry,
};
pub use error::{ControllerError, ControllerResult};
pub use renderer::{RenderMessage, Renderer};

pub use hearth_core::{CoreError, MessagePriority, RenderThreadConfig, ThreadRole};
