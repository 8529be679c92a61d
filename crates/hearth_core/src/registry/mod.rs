//! # Thread Registry
//!
//! Lets peer components address a worker by its role ("pause the render
//! thread", "post this to the upload thread") without owning it.
//!
//! The registry only keeps weak references: dropping the last strong handle
//! to a worker removes it from every lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::queue::MessagePriority;

/// Logical role of a worker thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThreadRole {
    /// Draws frames; owns the draw context.
    Render,
    /// Uploads textures and buffers; owns the resource-upload context.
    ResourceUpload,
}

impl ThreadRole {
    /// Returns true if this role draws with the draw context rather than the
    /// resource-upload context.
    #[must_use]
    pub const fn uses_draw_context(self) -> bool {
        matches!(self, Self::Render)
    }

    /// Short lowercase name, used for thread names and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::ResourceUpload => "resource-upload",
        }
    }
}

impl fmt::Display for ThreadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that accepts messages on behalf of a worker.
pub trait MessageSink<M> {
    /// Queues `message` for the worker.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QueueClosed`] once the worker is shutting down.
    fn post_message(&self, message: M, priority: MessagePriority) -> CoreResult<()>;
}

/// Role → thread lookup.
///
/// `T` is usually a trait object (`dyn SomeThreadTrait`).
pub struct ThreadRegistry<T: ?Sized> {
    threads: RwLock<HashMap<ThreadRole, Weak<T>>>,
}

impl<T: ?Sized> ThreadRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
        }
    }

    /// Binds `thread` to `role`.
    ///
    /// A stale entry (its thread already dropped) is replaced silently.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RoleTaken`] if a live thread already holds `role`.
    pub fn register(&self, role: ThreadRole, thread: &Arc<T>) -> CoreResult<()> {
        let mut threads = self.threads.write();
        if threads.get(&role).is_some_and(|existing| existing.strong_count() > 0) {
            return Err(CoreError::RoleTaken(role));
        }
        threads.insert(role, Arc::downgrade(thread));
        tracing::debug!(%role, "thread registered");
        Ok(())
    }

    /// Removes the binding for `role`. Returns true if one existed.
    pub fn unregister(&self, role: ThreadRole) -> bool {
        self.threads.write().remove(&role).is_some()
    }

    /// Looks up the live thread bound to `role`.
    #[must_use]
    pub fn get(&self, role: ThreadRole) -> Option<Arc<T>> {
        self.threads.read().get(&role).and_then(Weak::upgrade)
    }

    /// Looks up `role`, failing if nothing live is bound to it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RoleNotRegistered`] if the role is unbound or its
    /// thread has been dropped.
    pub fn require(&self, role: ThreadRole) -> CoreResult<Arc<T>> {
        self.get(role).ok_or(CoreError::RoleNotRegistered(role))
    }

    /// Roles with a live thread, sorted.
    #[must_use]
    pub fn roles(&self) -> Vec<ThreadRole> {
        let mut roles: Vec<_> = self
            .threads
            .read()
            .iter()
            .filter(|(_, thread)| thread.strong_count() > 0)
            .map(|(role, _)| *role)
            .collect();
        roles.sort_unstable();
        roles
    }

    /// Routes a message to the thread bound to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RoleNotRegistered`] if nothing live holds `role`,
    /// or the sink's own error.
    pub fn post_message<M>(&self, role: ThreadRole, message: M, priority: MessagePriority) -> CoreResult<()>
    where
        T: MessageSink<M>,
    {
        self.require(role)?.post_message(message, priority)
    }
}

impl<T: ?Sized> Default for ThreadRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ThreadRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadRegistry").field("roles", &self.roles()).finish()
    }
}
