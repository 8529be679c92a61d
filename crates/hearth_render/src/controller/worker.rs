//! The render worker routine.
//!
//! Only this thread commits [`RenderPhase`] changes and touches contexts.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, Receiver, TryRecvError};
use hearth_core::{MessageFilter, PopOutcome, ThreadRole};
use tracing::{debug, error, info, warn};

use super::handshake::Transition;
use super::phase::RenderPhase;
use super::Shared;
use crate::context::{ContextFactory, ContextHandle, ContextResult};
use crate::renderer::{RenderMessage, Renderer};

/// Name of the filter installed while a context reset is pending.
pub(crate) const CONTEXT_DEPENDENT_FILTER: &str = "context-dependent";

/// What the main loop does after a pause.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// State owned by the worker thread.
pub(crate) struct Worker<R: Renderer> {
    role: ThreadRole,
    renderer: R,
    factory: Arc<dyn ContextFactory>,
    shared: Arc<Shared<R::Message>>,
    control_rx: Receiver<Transition>,
    idle_timeout: Option<Duration>,
    reset_pending: bool,
    /// Context disabled in place during a plain pause.
    paused_context: Option<Arc<dyn ContextHandle>>,
}

impl<R: Renderer> Worker<R> {
    pub(crate) fn new(
        role: ThreadRole,
        renderer: R,
        factory: Arc<dyn ContextFactory>,
        shared: Arc<Shared<R::Message>>,
        control_rx: Receiver<Transition>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            role,
            renderer,
            factory,
            shared,
            control_rx,
            idle_timeout,
            reset_pending: false,
            paused_context: None,
        }
    }

    /// Thread body. `shutdown_rx` disconnects when the controller stops us.
    pub(crate) fn run(mut self, shutdown_rx: &Receiver<()>) {
        info!(role = %self.role, "render worker started");

        while !self.shared.cancelled.load(Ordering::Acquire) {
            if !self.shared.requested_enabled.load(Ordering::Acquire) {
                if self.pause(shutdown_rx) == Flow::Exit {
                    break;
                }
                continue;
            }

            match self.shared.queue.pop(self.idle_timeout) {
                PopOutcome::Message(message) => {
                    self.renderer.process_message(message);
                    self.shared.stats.messages_processed.fetch_add(1, Ordering::Relaxed);
                }
                PopOutcome::TimedOut => {
                    self.renderer.on_idle();
                    self.shared.stats.idle_ticks.fetch_add(1, Ordering::Relaxed);
                }
                // Woken for a pause check.
                PopOutcome::Interrupted => {}
                PopOutcome::Closed => break,
            }
        }

        // Requests that raced shutdown get a disconnected completion.
        let abandoned = self.control_rx.try_iter().count();
        if abandoned > 0 {
            debug!(role = %self.role, abandoned, "pending transitions dropped at exit");
        }

        info!(role = %self.role, phase = %self.shared.phase.load(), "render worker exited");
    }

    fn commit(&self, phase: RenderPhase) {
        let previous = self.shared.phase.commit(phase);
        debug!(role = %self.role, from = %previous, to = %phase, "render phase committed");
    }

    /// Running → Pausing → Paused, then waits for the next wakeup.
    fn pause(&mut self, shutdown_rx: &Receiver<()>) -> Flow {
        // The requester queues its transition before flipping the flag, so
        // the request is already here.
        let (destroy_context, done) = match self.control_rx.try_recv() {
            Ok(Transition::Disable { destroy_context, done }) => (destroy_context, Some(done)),
            Ok(Transition::Enable { done, .. }) => {
                error!(role = %self.role, "enable request received while running");
                done.complete(Ok(()));
                return Flow::Continue;
            }
            Err(TryRecvError::Empty) => {
                warn!(role = %self.role, "pause flag set without a pending request");
                (false, None)
            }
            Err(TryRecvError::Disconnected) => return Flow::Exit,
        };

        self.commit(RenderPhase::Pausing);
        if destroy_context {
            self.destroy_context();
        } else {
            self.disable_context();
        }
        self.commit(RenderPhase::Paused);

        self.shared.stats.transitions.fetch_add(1, Ordering::Relaxed);
        if let Some(done) = done {
            done.complete(Ok(()));
        }

        self.wait_for_wakeup(shutdown_rx)
    }

    fn destroy_context(&mut self) {
        self.reset_pending = true;
        self.shared.queue.enable_filtering(MessageFilter::new(
            CONTEXT_DEPENDENT_FILTER,
            |message: &R::Message| message.is_context_dependent(),
        ));
        self.renderer.on_context_destroy();
        self.shared.stats.contexts_destroyed.fetch_add(1, Ordering::Relaxed);
        debug!(role = %self.role, "context destroyed");
    }

    fn disable_context(&mut self) {
        match self.factory.context_for(self.role) {
            Ok(context) => {
                context.set_rendering_enabled(false);
                self.paused_context = Some(context);
            }
            // Nothing holds the context, so the pause still stands.
            Err(e) => warn!(role = %self.role, error = %e, "could not disable context for pause"),
        }
    }

    /// Blocks in `Paused` until an enable request commits or shutdown.
    fn wait_for_wakeup(&mut self, shutdown_rx: &Receiver<()>) -> Flow {
        loop {
            let transition = select! {
                recv(self.control_rx) -> msg => match msg {
                    Ok(transition) => transition,
                    Err(_) => return Flow::Exit,
                },
                recv(shutdown_rx) -> _ => return Flow::Exit,
            };

            // A wakeup racing shutdown is dropped; its requester sees a
            // disconnected completion.
            if self.shared.cancelled.load(Ordering::Acquire) {
                debug!(role = %self.role, "wakeup after cancellation ignored");
                return Flow::Exit;
            }

            match transition {
                Transition::Enable { new_factory, done } => {
                    self.commit(RenderPhase::Resuming);
                    match self.resume(new_factory) {
                        Ok(()) => {
                            self.commit(RenderPhase::Running);
                            self.shared.stats.transitions.fetch_add(1, Ordering::Relaxed);
                            done.complete(Ok(()));
                            return Flow::Continue;
                        }
                        Err(e) => {
                            warn!(role = %self.role, error = %e, "resume failed, staying paused");
                            self.commit(RenderPhase::Paused);
                            done.complete(Err(e));
                        }
                    }
                }
                Transition::Disable { done, .. } => {
                    debug!(role = %self.role, "disable request while already paused");
                    done.complete(Ok(()));
                }
            }
        }
    }

    fn resume(&mut self, new_factory: Option<Arc<dyn ContextFactory>>) -> ContextResult<()> {
        if self.reset_pending {
            if let Some(factory) = new_factory {
                self.factory = factory;
            }
            self.renderer.on_context_create(&self.factory)?;
            self.reset_pending = false;
            self.shared.queue.disable_filtering();
            self.shared.stats.contexts_created.fetch_add(1, Ordering::Relaxed);
            debug!(role = %self.role, "context recreated");
            return Ok(());
        }

        if new_factory.is_some() {
            debug!(role = %self.role, "no reset pending, keeping current context factory");
        }
        let context = match self.paused_context.take() {
            Some(context) => context,
            None => self.factory.context_for(self.role)?,
        };
        context.set_rendering_enabled(true);
        Ok(())
    }
}
