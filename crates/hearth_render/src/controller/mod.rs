//! # Render Thread Controller
//!
//! Owns one render worker thread and lets any other thread pause it, resume
//! it, or force a full context teardown/rebuild, each as a synchronous
//! round-trip.
//!
//! ## Roles
//!
//! ```text
//!   Requester threads (any number, serialized)        Worker thread (one)
//!   ───────────────────────────────────────────       ───────────────────
//!   writes requested_enabled                          commits RenderPhase
//!   sends Transition on the control channel  ──────▶  runs the pause check
//!   blocks on the Completion receiver        ◀──────  completes after commit
//! ```
//!
//! ## Preconditions
//!
//! - `start_thread` is called once. A second call reports
//!   [`ControllerError::AlreadyStarted`].
//! - Enable/disable requests are serialized by the callers. A request issued
//!   while another is outstanding reports
//!   [`ControllerError::TransitionInProgress`]; it is never queued.
//!
//! ## Known Limitation
//!
//! A transition has no timeout. A worker stuck inside one long message keeps
//! its requester blocked until the message returns.

mod handshake;
mod phase;
mod worker;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use hearth_core::{
    CoreResult, MessagePriority, MessageQueue, MessageSink, RenderThreadConfig, ThreadRegistry, ThreadRole,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::context::{ContextFactory, ContextResult};
use crate::error::{ControllerError, ControllerResult};
use crate::renderer::Renderer;

use handshake::{Completion, Transition};
use phase::AtomicPhase;
use worker::Worker;

pub use phase::RenderPhase;

/// Object-safe view of a controller, used by the registry.
pub trait RenderThread<M>: MessageSink<M> + Send + Sync {
    /// Role this thread is registered under.
    fn role(&self) -> ThreadRole;

    /// Pauses or resumes rendering and waits for the worker to commit.
    ///
    /// # Errors
    ///
    /// See [`RenderThreadController::set_rendering_enabled`].
    fn set_rendering_enabled(&self, target: bool, new_factory: Option<Arc<dyn ContextFactory>>) -> ControllerResult<()>;

    /// Pauses rendering, optionally tearing the context down.
    ///
    /// # Errors
    ///
    /// See [`RenderThreadController::disable_rendering`].
    fn disable_rendering(&self, destroy_context: bool) -> ControllerResult<()>;

    /// Whether the worker is currently running with rendering on.
    fn is_rendering_enabled(&self) -> bool;

    /// Whether posted messages will still be processed.
    fn can_receive_messages(&self) -> bool;
}

/// Registry of render threads exchanging messages of type `M`.
pub type RenderThreadRegistry<M> = ThreadRegistry<dyn RenderThread<M>>;

/// Snapshot of controller counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Completed pause and resume transitions.
    pub transitions: u64,
    /// `on_context_destroy` calls.
    pub contexts_destroyed: u64,
    /// Successful `on_context_create` calls.
    pub contexts_created: u64,
    /// Messages executed by the worker.
    pub messages_processed: u64,
    /// Idle timeouts reached by the worker.
    pub idle_ticks: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) transitions: AtomicU64,
    pub(crate) contexts_destroyed: AtomicU64,
    pub(crate) contexts_created: AtomicU64,
    pub(crate) messages_processed: AtomicU64,
    pub(crate) idle_ticks: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> ControllerStats {
        ControllerStats {
            transitions: self.transitions.load(Ordering::Relaxed),
            contexts_destroyed: self.contexts_destroyed.load(Ordering::Relaxed),
            contexts_created: self.contexts_created.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            idle_ticks: self.idle_ticks.load(Ordering::Relaxed),
        }
    }
}

/// State read by requesters and the worker.
pub(crate) struct Shared<M> {
    pub(crate) queue: MessageQueue<M>,
    pub(crate) phase: AtomicPhase,
    /// The only field requesters write.
    pub(crate) requested_enabled: AtomicBool,
    pub(crate) cancelled: AtomicBool,
    pub(crate) stats: StatsCounters,
}

/// The OS thread plus the channel whose disconnection wakes a paused worker.
struct WorkerHandle {
    join: JoinHandle<()>,
    shutdown_tx: Sender<()>,
    thread_id: ThreadId,
}

enum WorkerSlot<R: Renderer> {
    /// Built, waiting for `start_thread`.
    Ready(Box<Worker<R>>),
    Running(WorkerHandle),
    Stopped,
}

/// Releases the in-flight guard when a request returns.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> ControllerResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ControllerError::TransitionInProgress)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns a render worker thread and its enable/disable/reset protocol.
///
/// # Example
///
/// ```rust,ignore
/// let registry = RenderThreadRegistry::new();
/// let controller = RenderThreadController::new(
///     ThreadRole::Render,
///     RenderThreadConfig::default(),
///     factory,
///     MyRenderer::new(),
///     &registry,
/// )?;
///
/// controller.start_thread()?;
/// controller.disable_rendering(true)?;      // surface lost
/// controller.enable_rendering(Some(new_factory))?;
/// controller.stop_thread()?;
/// ```
pub struct RenderThreadController<R: Renderer> {
    role: ThreadRole,
    config: RenderThreadConfig,
    shared: Arc<Shared<R::Message>>,
    control_tx: Sender<Transition>,
    worker: Mutex<WorkerSlot<R>>,
    request_in_flight: AtomicBool,
}

impl<R: Renderer> RenderThreadController<R> {
    /// Builds the controller and registers it under `role`.
    ///
    /// The worker thread is not spawned until [`Self::start_thread`].
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Core`] if `config` is invalid or `role` is
    /// already held by a live thread.
    pub fn new(
        role: ThreadRole,
        config: RenderThreadConfig,
        factory: Arc<dyn ContextFactory>,
        renderer: R,
        registry: &RenderThreadRegistry<R::Message>,
    ) -> ControllerResult<Arc<Self>> {
        config.validate()?;

        let shared = Arc::new(Shared {
            queue: MessageQueue::with_capacity(config.queue_capacity_hint),
            phase: AtomicPhase::new(RenderPhase::Running),
            requested_enabled: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
            stats: StatsCounters::default(),
        });
        let (control_tx, control_rx) = unbounded();
        let worker = Worker::new(
            role,
            renderer,
            factory,
            Arc::clone(&shared),
            control_rx,
            config.idle_timeout(),
        );

        let controller = Arc::new(Self {
            role,
            config,
            shared,
            control_tx,
            worker: Mutex::new(WorkerSlot::Ready(Box::new(worker))),
            request_in_flight: AtomicBool::new(false),
        });

        let handle: Arc<dyn RenderThread<R::Message>> = controller.clone();
        registry.register(role, &handle)?;

        Ok(controller)
    }

    /// Spawns the worker thread.
    ///
    /// Must be called exactly once. The worker is never recreated, so calling
    /// it again (even after [`Self::stop_thread`]) is a caller error.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::AlreadyStarted`] on a second call and
    /// [`ControllerError::Spawn`] if the OS refuses the thread; the
    /// controller is unusable afterwards.
    pub fn start_thread(&self) -> ControllerResult<()> {
        let mut slot = self.worker.lock();
        let worker = match std::mem::replace(&mut *slot, WorkerSlot::Stopped) {
            WorkerSlot::Ready(worker) => worker,
            other => {
                *slot = other;
                return Err(ControllerError::AlreadyStarted);
            }
        };

        // Never sent on: dropping the sender is the shutdown signal.
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let name = self
            .config
            .thread_name
            .clone()
            .unwrap_or_else(|| format!("hearth-{}", self.role));

        let join = thread::Builder::new()
            .name(name)
            .spawn(move || worker.run(&shutdown_rx))
            .map_err(|e| ControllerError::Spawn(e.to_string()))?;

        let thread_id = join.thread().id();
        *slot = WorkerSlot::Running(WorkerHandle {
            join,
            shutdown_tx,
            thread_id,
        });
        info!(role = %self.role, "render thread started");
        Ok(())
    }

    /// Cancels the worker, closes its queue, wakes it if paused and joins it.
    ///
    /// Returns only after the worker has exited. Requests still waiting on
    /// the worker fail with [`ControllerError::WorkerStopped`].
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::NotStarted`] if there is no running worker,
    /// [`ControllerError::CalledFromWorker`] when called on the worker thread
    /// and [`ControllerError::WorkerPanicked`] if the worker panicked.
    pub fn stop_thread(&self) -> ControllerResult<()> {
        let handle = {
            let mut slot = self.worker.lock();
            match &*slot {
                WorkerSlot::Running(handle) if handle.thread_id == thread::current().id() => {
                    return Err(ControllerError::CalledFromWorker);
                }
                WorkerSlot::Running(_) => {}
                WorkerSlot::Ready(_) | WorkerSlot::Stopped => return Err(ControllerError::NotStarted),
            }
            match std::mem::replace(&mut *slot, WorkerSlot::Stopped) {
                WorkerSlot::Running(handle) => handle,
                WorkerSlot::Ready(_) | WorkerSlot::Stopped => return Err(ControllerError::NotStarted),
            }
        };

        self.shared.cancelled.store(true, Ordering::Release);
        self.shared.queue.close();

        // Unconditional: a paused worker waits on this channel, not the queue.
        let WorkerHandle { join, shutdown_tx, .. } = handle;
        drop(shutdown_tx);

        join.join().map_err(|_| ControllerError::WorkerPanicked)?;
        info!(role = %self.role, "render thread stopped");
        Ok(())
    }

    /// Pauses (`target == false`) or resumes (`target == true`) rendering and
    /// blocks until the worker has committed the change.
    ///
    /// Returns at once if `target` already matches the requested state.
    /// `new_factory` is only adopted when resuming after a context reset.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::TransitionInProgress`]: another request is outstanding
    /// - [`ControllerError::NotStarted`]: no running worker
    /// - [`ControllerError::CalledFromWorker`]: called on the worker thread
    /// - [`ControllerError::WorkerStopped`]: the worker exited first
    /// - [`ControllerError::Context`]: resume failed; rendering stays disabled
    pub fn set_rendering_enabled(
        &self,
        target: bool,
        new_factory: Option<Arc<dyn ContextFactory>>,
    ) -> ControllerResult<()> {
        let (done, done_rx) = Completion::channel();
        let transition = if target {
            Transition::Enable { new_factory, done }
        } else {
            Transition::Disable {
                destroy_context: false,
                done,
            }
        };
        self.request(transition, done_rx)
    }

    /// Resumes rendering, rebinding `new_factory` if a reset is pending.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_rendering_enabled`].
    pub fn enable_rendering(&self, new_factory: Option<Arc<dyn ContextFactory>>) -> ControllerResult<()> {
        self.set_rendering_enabled(true, new_factory)
    }

    /// Pauses rendering. With `destroy_context` the worker tears its context
    /// down and holds context-dependent messages until the next resume.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_rendering_enabled`].
    pub fn disable_rendering(&self, destroy_context: bool) -> ControllerResult<()> {
        let (done, done_rx) = Completion::channel();
        self.request(Transition::Disable { destroy_context, done }, done_rx)
    }

    fn request(
        &self,
        transition: Transition,
        done_rx: Receiver<ContextResult<()>>,
    ) -> ControllerResult<()> {
        let _in_flight = InFlight::acquire(&self.request_in_flight)?;

        let target = transition.target();
        if self.shared.requested_enabled.load(Ordering::Acquire) == target {
            return Ok(());
        }

        match &*self.worker.lock() {
            WorkerSlot::Running(handle) if handle.thread_id == thread::current().id() => {
                return Err(ControllerError::CalledFromWorker);
            }
            WorkerSlot::Running(_) => {}
            WorkerSlot::Ready(_) | WorkerSlot::Stopped => return Err(ControllerError::NotStarted),
        }

        debug!(role = %self.role, enable = target, "rendering transition requested");

        if target {
            // The paused worker never reads the flag, so it can flip first.
            self.shared.requested_enabled.store(true, Ordering::Release);
            if self.control_tx.send(transition).is_err() {
                self.shared.requested_enabled.store(false, Ordering::Release);
                return Err(ControllerError::WorkerStopped);
            }
        } else {
            // Queue the request before the worker can observe the flag.
            self.control_tx
                .send(transition)
                .map_err(|_| ControllerError::WorkerStopped)?;
            self.shared.requested_enabled.store(false, Ordering::Release);
            self.shared.queue.cancel_wait();
        }

        match done_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                if target {
                    self.shared.requested_enabled.store(false, Ordering::Release);
                }
                Err(e.into())
            }
            Err(_) => Err(ControllerError::WorkerStopped),
        }
    }

    /// Whether the worker is running with rendering on.
    #[must_use]
    pub fn is_rendering_enabled(&self) -> bool {
        self.shared.phase.load() == RenderPhase::Running
    }

    /// Current worker phase.
    #[must_use]
    pub fn phase(&self) -> RenderPhase {
        self.shared.phase.load()
    }

    /// Whether the worker exists and has not been cancelled.
    #[must_use]
    pub fn can_receive_messages(&self) -> bool {
        matches!(&*self.worker.lock(), WorkerSlot::Running(_)) && !self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Queues a message for the worker.
    ///
    /// # Errors
    ///
    /// Returns [`hearth_core::CoreError::QueueClosed`] after shutdown.
    pub fn post_message(&self, message: R::Message, priority: MessagePriority) -> CoreResult<()> {
        self.shared.queue.push(message, priority)
    }

    /// Messages currently waiting in the worker's queue.
    #[must_use]
    pub fn pending_messages(&self) -> usize {
        self.shared.queue.len()
    }

    /// Messages currently held back by the context-dependent filter.
    #[must_use]
    pub fn held_back_messages(&self) -> usize {
        self.shared.queue.held_back_count()
    }

    /// Role this controller is registered under.
    #[must_use]
    pub const fn role(&self) -> ThreadRole {
        self.role
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> ControllerStats {
        self.shared.stats.snapshot()
    }
}

impl<R: Renderer> MessageSink<R::Message> for RenderThreadController<R> {
    fn post_message(&self, message: R::Message, priority: MessagePriority) -> CoreResult<()> {
        Self::post_message(self, message, priority)
    }
}

impl<R: Renderer> RenderThread<R::Message> for RenderThreadController<R> {
    fn role(&self) -> ThreadRole {
        self.role
    }

    fn set_rendering_enabled(&self, target: bool, new_factory: Option<Arc<dyn ContextFactory>>) -> ControllerResult<()> {
        Self::set_rendering_enabled(self, target, new_factory)
    }

    fn disable_rendering(&self, destroy_context: bool) -> ControllerResult<()> {
        Self::disable_rendering(self, destroy_context)
    }

    fn is_rendering_enabled(&self) -> bool {
        Self::is_rendering_enabled(self)
    }

    fn can_receive_messages(&self) -> bool {
        Self::can_receive_messages(self)
    }
}

impl<R: Renderer> Drop for RenderThreadController<R> {
    fn drop(&mut self) {
        match self.stop_thread() {
            Ok(()) | Err(ControllerError::NotStarted) => {}
            Err(ControllerError::CalledFromWorker) => {
                // Last handle dropped on the worker itself: it cannot be
                // joined, so let it fall out of its loop.
                self.shared.cancelled.store(true, Ordering::Release);
                self.shared.queue.close();
            }
            Err(e) => warn!(role = %self.role, error = %e, "render thread did not stop cleanly"),
        }
    }
}

impl<R: Renderer> fmt::Debug for RenderThreadController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderThreadController")
            .field("role", &self.role)
            .field("phase", &self.shared.phase.load())
            .field("queue", &self.shared.queue)
            .finish_non_exhaustive()
    }
}
