//! Benchmark for rendering transition round-trips.
//!
//! Run with: cargo bench --package hearth_render --bench handshake_benchmark

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use hearth_render::{
    ContextFactory, ContextResult, HeadlessContextFactory, MessagePriority, RenderMessage, RenderThreadConfig,
    RenderThreadController, RenderThreadRegistry, Renderer, ThreadRole,
};

struct Frame(u64);

impl RenderMessage for Frame {
    fn is_context_dependent(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct CountingRenderer {
    frames: u64,
}

impl Renderer for CountingRenderer {
    type Message = Frame;

    fn process_message(&mut self, message: Frame) {
        self.frames = self.frames.wrapping_add(black_box(message.0));
    }

    fn on_context_destroy(&mut self) {}

    fn on_context_create(&mut self, factory: &Arc<dyn ContextFactory>) -> ContextResult<()> {
        factory.draw_context().map(|_| ())
    }
}

fn start_controller(registry: &RenderThreadRegistry<Frame>) -> Arc<RenderThreadController<CountingRenderer>> {
    let factory: Arc<dyn ContextFactory> = Arc::new(HeadlessContextFactory::new(1));
    let controller = RenderThreadController::new(
        ThreadRole::Render,
        RenderThreadConfig::default(),
        factory,
        CountingRenderer::default(),
        registry,
    )
    .unwrap();
    controller.start_thread().unwrap();
    controller
}

fn benchmark_pause_resume(c: &mut Criterion) {
    let registry = RenderThreadRegistry::new();
    let controller = start_controller(&registry);

    c.bench_function("pause_resume_round_trip", |b| {
        b.iter(|| {
            controller.disable_rendering(false).unwrap();
            controller.enable_rendering(None).unwrap();
        });
    });
}

fn benchmark_context_reset(c: &mut Criterion) {
    let registry = RenderThreadRegistry::new();
    let controller = start_controller(&registry);

    c.bench_function("context_reset_round_trip", |b| {
        b.iter(|| {
            controller.disable_rendering(true).unwrap();
            let fresh: Arc<dyn ContextFactory> = Arc::new(HeadlessContextFactory::new(2));
            controller.enable_rendering(Some(fresh)).unwrap();
        });
    });
}

fn benchmark_post_while_running(c: &mut Criterion) {
    let registry = RenderThreadRegistry::new();
    let controller = start_controller(&registry);

    c.bench_function("post_message", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            controller
                .post_message(Frame(black_box(i)), MessagePriority::Normal)
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_pause_resume,
    benchmark_context_reset,
    benchmark_post_while_running
);
criterion_main!(benches);
