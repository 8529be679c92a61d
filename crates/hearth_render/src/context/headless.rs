//! Surface-less contexts for headless runs, demos and tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use hearth_core::ThreadRole;

use super::{ContextError, ContextFactory, ContextHandle, ContextResult};

/// A context that only records whether rendering is on.
#[derive(Debug)]
pub struct HeadlessContext {
    rendering_enabled: AtomicBool,
    toggles: AtomicU64,
}

impl HeadlessContext {
    /// Creates a context with rendering on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rendering_enabled: AtomicBool::new(true),
            toggles: AtomicU64::new(0),
        }
    }

    /// Number of times rendering was switched on or off.
    #[must_use]
    pub fn toggle_count(&self) -> u64 {
        self.toggles.load(Ordering::Relaxed)
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextHandle for HeadlessContext {
    fn set_rendering_enabled(&self, enabled: bool) {
        self.rendering_enabled.store(enabled, Ordering::Release);
        self.toggles.fetch_add(1, Ordering::Relaxed);
    }

    fn is_rendering_enabled(&self) -> bool {
        self.rendering_enabled.load(Ordering::Acquire)
    }
}

/// Factory handing out one draw and one upload [`HeadlessContext`].
///
/// Can be switched to "surface lost" to exercise failure paths.
#[derive(Debug)]
pub struct HeadlessContextFactory {
    /// Distinguishes factories after a context reset.
    generation: u64,
    draw: Arc<HeadlessContext>,
    upload: Arc<HeadlessContext>,
    available: AtomicBool,
}

impl HeadlessContextFactory {
    /// Creates a factory tagged with `generation`.
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            draw: Arc::new(HeadlessContext::new()),
            upload: Arc::new(HeadlessContext::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Generation tag given at construction.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Makes every later context request succeed or fail.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// The draw context, for inspection.
    #[must_use]
    pub fn draw(&self) -> &Arc<HeadlessContext> {
        &self.draw
    }

    /// The upload context, for inspection.
    #[must_use]
    pub fn upload(&self) -> &Arc<HeadlessContext> {
        &self.upload
    }

    fn hand_out(&self, role: ThreadRole, context: &Arc<HeadlessContext>) -> ContextResult<Arc<dyn ContextHandle>> {
        if !self.available.load(Ordering::Acquire) {
            return Err(ContextError::Unavailable {
                role,
                reason: format!("headless surface generation {} lost", self.generation),
            });
        }
        Ok(Arc::clone(context) as Arc<dyn ContextHandle>)
    }
}

impl ContextFactory for HeadlessContextFactory {
    fn draw_context(&self) -> ContextResult<Arc<dyn ContextHandle>> {
        self.hand_out(ThreadRole::Render, &self.draw)
    }

    fn resources_upload_context(&self) -> ContextResult<Arc<dyn ContextHandle>> {
        self.hand_out(ThreadRole::ResourceUpload, &self.upload)
    }
}
