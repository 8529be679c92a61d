//! # Renderer Collaborator
//!
//! What the worker thread actually runs. The controller only decides *when*
//! these hooks are called:
//!
//! ```text
//! Running  : process_message() for each queued message, on_idle() on timeout
//! Pausing  : on_context_destroy()            (reset only)
//! Resuming : on_context_create(factory)      (reset only)
//! ```

use std::sync::Arc;

use crate::context::{ContextFactory, ContextResult};

/// A unit of queued work for a render worker.
pub trait RenderMessage: Send + 'static {
    /// Returns true if running this message needs a live graphics context.
    ///
    /// Such messages are held in the queue while a context reset is pending.
    fn is_context_dependent(&self) -> bool;
}

/// Work executed on the render worker thread.
///
/// All hooks run on the worker thread, one at a time.
pub trait Renderer: Send + 'static {
    /// Message type accepted by this renderer's queue.
    type Message: RenderMessage;

    /// Executes one message.
    fn process_message(&mut self, message: Self::Message);

    /// The context is about to be destroyed. Release every GPU resource.
    ///
    /// Called exactly once per reset cycle, before [`Self::on_context_create`].
    fn on_context_destroy(&mut self);

    /// A new context is available through `factory`. Rebuild GPU resources.
    ///
    /// # Errors
    ///
    /// Return an error if the context cannot be bound; the worker then stays
    /// paused with the reset still pending.
    fn on_context_create(&mut self, factory: &Arc<dyn ContextFactory>) -> ContextResult<()>;

    /// Called when no message arrived within the configured idle timeout.
    fn on_idle(&mut self) {}
}
