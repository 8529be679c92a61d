//! # Graphics Context Boundary
//!
//! The controller never draws. It only needs to:
//! - fetch the context that belongs to its worker's role
//! - switch rendering off and on in place for a plain pause
//! - hand a (possibly new) factory to the renderer after a reset
//!
//! ```text
//! ThreadRole::Render          -> ContextFactory::draw_context()
//! ThreadRole::ResourceUpload  -> ContextFactory::resources_upload_context()
//! ```

mod headless;

use std::sync::Arc;

use hearth_core::ThreadRole;
use thiserror::Error;

pub use headless::{HeadlessContext, HeadlessContextFactory};

/// Errors raised while acquiring or binding a graphics context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The factory could not produce the context for this role.
    #[error("{role} context unavailable: {reason}")]
    Unavailable {
        /// Role whose context was requested.
        role: ThreadRole,
        /// Factory-provided reason.
        reason: String,
    },

    /// A context was produced but could not be bound to the worker.
    #[error("failed to bind context: {reason}")]
    BindFailed {
        /// Renderer-provided reason.
        reason: String,
    },
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// Opaque drawing or resource-upload context.
pub trait ContextHandle: Send + Sync {
    /// Switches rendering on this context on or off, in place.
    fn set_rendering_enabled(&self, enabled: bool);

    /// Returns whether rendering is currently on.
    fn is_rendering_enabled(&self) -> bool;
}

/// Manufactures the two contexts a render pipeline needs.
pub trait ContextFactory: Send + Sync {
    /// Context used by the thread that draws frames.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Unavailable`] if the surface is gone.
    fn draw_context(&self) -> ContextResult<Arc<dyn ContextHandle>>;

    /// Context used by the thread that uploads textures and buffers.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Unavailable`] if the surface is gone.
    fn resources_upload_context(&self) -> ContextResult<Arc<dyn ContextHandle>>;

    /// Context belonging to `role`.
    ///
    /// # Errors
    ///
    /// Same as the role-specific getter.
    fn context_for(&self, role: ThreadRole) -> ContextResult<Arc<dyn ContextHandle>> {
        if role.uses_draw_context() {
            self.draw_context()
        } else {
            self.resources_upload_context()
        }
    }
}
