//! Shared fixtures for the controller integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use hearth_render::{
    ContextFactory, ContextResult, ControllerResult, HeadlessContextFactory, MessagePriority, RenderMessage,
    RenderThreadConfig, RenderThreadController, RenderThreadRegistry, Renderer, ThreadRole,
};
use parking_lot::Mutex;

/// Upper bound for anything that is expected to happen.
pub const WAIT: Duration = Duration::from_secs(5);
/// How long we listen before concluding nothing happened.
pub const QUIET: Duration = Duration::from_millis(50);

/// What the recording renderer saw, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Processed(u32),
    ContextDestroyed,
    ContextCreated,
    Idle,
}

/// Lets a test park the worker inside a message.
pub struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Test-side end of a [`Gate`].
pub struct GateControl {
    entered: Receiver<()>,
    release: Sender<()>,
}

impl GateControl {
    /// Blocks until the worker is inside the gated message.
    pub fn wait_entered(&self) {
        self.entered.recv_timeout(WAIT).unwrap();
    }

    /// Lets the gated message return.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

pub struct TestMessage {
    pub id: u32,
    pub context_dependent: bool,
    gate: Option<Gate>,
}

impl TestMessage {
    pub fn plain(id: u32) -> Self {
        Self {
            id,
            context_dependent: false,
            gate: None,
        }
    }

    pub fn dependent(id: u32) -> Self {
        Self {
            id,
            context_dependent: true,
            gate: None,
        }
    }

    pub fn gated(id: u32) -> (Self, GateControl) {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let message = Self {
            id,
            context_dependent: false,
            gate: Some(Gate {
                entered: entered_tx,
                release: release_rx,
            }),
        };
        let control = GateControl {
            entered: entered_rx,
            release: release_tx,
        };
        (message, control)
    }
}

impl RenderMessage for TestMessage {
    fn is_context_dependent(&self) -> bool {
        self.context_dependent
    }
}

/// Renderer that logs every hook and reports processed ids on a channel.
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<Event>>>,
    processed_tx: Sender<u32>,
}

impl Renderer for RecordingRenderer {
    type Message = TestMessage;

    fn process_message(&mut self, message: TestMessage) {
        if let Some(gate) = message.gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }
        self.events.lock().push(Event::Processed(message.id));
        let _ = self.processed_tx.send(message.id);
    }

    fn on_context_destroy(&mut self) {
        self.events.lock().push(Event::ContextDestroyed);
    }

    fn on_context_create(&mut self, factory: &Arc<dyn ContextFactory>) -> ContextResult<()> {
        factory.draw_context()?;
        self.events.lock().push(Event::ContextCreated);
        Ok(())
    }

    fn on_idle(&mut self) {
        self.events.lock().push(Event::Idle);
    }
}

/// A controller around a [`RecordingRenderer`] plus everything needed to
/// observe it.
pub struct Harness {
    pub controller: Arc<RenderThreadController<RecordingRenderer>>,
    pub factory: Arc<HeadlessContextFactory>,
    pub events: Arc<Mutex<Vec<Event>>>,
    pub processed: Receiver<u32>,
}

impl Harness {
    /// Builds a controller without starting its worker.
    pub fn try_new(
        role: ThreadRole,
        config: RenderThreadConfig,
        registry: &RenderThreadRegistry<TestMessage>,
    ) -> ControllerResult<Self> {
        let factory = Arc::new(HeadlessContextFactory::new(1));
        let events = Arc::new(Mutex::new(Vec::new()));
        let (processed_tx, processed) = unbounded();
        let renderer = RecordingRenderer {
            events: Arc::clone(&events),
            processed_tx,
        };
        let shared_factory: Arc<dyn ContextFactory> = factory.clone();
        let controller = RenderThreadController::new(role, config, shared_factory, renderer, registry)?;
        Ok(Self {
            controller,
            factory,
            events,
            processed,
        })
    }

    /// Builds and starts a controller with its own registry.
    pub fn started(role: ThreadRole) -> Self {
        Self::started_with(role, RenderThreadConfig::default())
    }

    pub fn started_with(role: ThreadRole, config: RenderThreadConfig) -> Self {
        let registry = RenderThreadRegistry::new();
        let harness = Self::try_new(role, config, &registry).unwrap();
        harness.controller.start_thread().unwrap();
        harness
    }

    pub fn post(&self, message: TestMessage) {
        self.controller.post_message(message, MessagePriority::Normal).unwrap();
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: Event) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }

    pub fn expect_processed(&self, id: u32) {
        assert_eq!(self.processed.recv_timeout(WAIT), Ok(id));
    }

    pub fn expect_quiet(&self) {
        assert!(self.processed.recv_timeout(QUIET).is_err());
    }
}

/// Runs `f` on a helper thread and fails the test if it does not return
/// within [`WAIT`].
pub fn run_bounded<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(WAIT).expect("operation did not finish in time")
}

/// Polls `condition` until it holds or [`WAIT`] elapses.
pub fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}
