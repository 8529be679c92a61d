//! # Pause / Resume Demo
//!
//! Walks a render worker through the lifecycle an app goes through when its
//! window is hidden and its surface is lost:
//!
//! ```text
//! 1. Start the worker, draw a few frames
//! 2. App goes to background  -> pause, keep context
//! 3. App comes back          -> resume
//! 4. Surface lost            -> pause, destroy context
//! 5. New surface             -> resume with a new context factory
//! 6. Shut down
//! ```
//!
//! Run with: cargo run --package hearth_render --example pause_resume_demo

use std::sync::Arc;
use std::time::{Duration, Instant};

use hearth_render::{
    ContextFactory, ContextHandle, ContextResult, ControllerResult, HeadlessContextFactory, MessagePriority, RenderMessage,
    RenderThreadConfig, RenderThreadController, RenderThreadRegistry, Renderer, ThreadRole,
};

enum DemoMessage {
    /// Draws a frame; needs the context.
    Frame(u32),
    /// Bookkeeping that does not touch the GPU.
    Log(&'static str),
}

impl RenderMessage for DemoMessage {
    fn is_context_dependent(&self) -> bool {
        matches!(self, Self::Frame(_))
    }
}

struct DemoRenderer {
    started: Instant,
}

impl DemoRenderer {
    fn stamp(&self) -> String {
        format!("[{:>6.1}ms]", self.started.elapsed().as_secs_f64() * 1000.0)
    }
}

impl Renderer for DemoRenderer {
    type Message = DemoMessage;

    fn process_message(&mut self, message: DemoMessage) {
        match message {
            DemoMessage::Frame(n) => println!("   {} 🎨 frame {n}", self.stamp()),
            DemoMessage::Log(text) => println!("   {} 📝 {text}", self.stamp()),
        }
    }

    fn on_context_destroy(&mut self) {
        println!("   {} 💥 GPU resources released", self.stamp());
    }

    fn on_context_create(&mut self, factory: &Arc<dyn ContextFactory>) -> ContextResult<()> {
        factory.draw_context()?;
        println!("   {} ✨ GPU resources rebuilt", self.stamp());
        Ok(())
    }
}

fn post_frames(controller: &RenderThreadController<DemoRenderer>, frames: std::ops::Range<u32>) {
    for n in frames {
        if let Err(e) = controller.post_message(DemoMessage::Frame(n), MessagePriority::Normal) {
            println!("   ⚠️  frame {n} rejected: {e}");
        }
    }
}

fn main() -> ControllerResult<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("   HEARTH - Render Thread Pause / Resume Demo");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    let registry = RenderThreadRegistry::new();
    let surface = Arc::new(HeadlessContextFactory::new(1));
    let factory: Arc<dyn ContextFactory> = surface.clone();

    let controller = RenderThreadController::new(
        ThreadRole::Render,
        RenderThreadConfig {
            thread_name: Some("demo-render".to_string()),
            ..RenderThreadConfig::default()
        },
        factory,
        DemoRenderer { started: Instant::now() },
        &registry,
    )?;

    println!("STEP 1: Start and draw");
    controller.start_thread()?;
    post_frames(&controller, 0..3);
    std::thread::sleep(Duration::from_millis(20));
    println!();

    println!("STEP 2: App hidden, pause rendering");
    controller.disable_rendering(false)?;
    println!(
        "   phase = {}, draw context on = {}",
        controller.phase(),
        surface.draw().is_rendering_enabled()
    );
    post_frames(&controller, 3..5);
    println!("   {} message(s) waiting", controller.pending_messages());
    println!();

    println!("STEP 3: App visible, resume");
    controller.enable_rendering(None)?;
    std::thread::sleep(Duration::from_millis(20));
    println!();

    println!("STEP 4: Surface lost, destroy context");
    controller.disable_rendering(true)?;
    surface.set_available(false);
    post_frames(&controller, 5..8);
    controller.post_message(DemoMessage::Log("surface lost"), MessagePriority::High)?;
    println!(
        "   {} message(s) waiting, {} held until a new context exists",
        controller.pending_messages(),
        controller.held_back_messages()
    );
    println!();

    println!("STEP 5: New surface, resume with it");
    let new_surface: Arc<dyn ContextFactory> = Arc::new(HeadlessContextFactory::new(2));
    controller.enable_rendering(Some(new_surface))?;
    std::thread::sleep(Duration::from_millis(20));
    println!();

    println!("STEP 6: Shut down");
    controller.stop_thread()?;

    let stats = controller.stats();
    println!();
    println!("📊 STATISTICS:");
    println!("   Transitions:        {}", stats.transitions);
    println!("   Contexts destroyed: {}", stats.contexts_destroyed);
    println!("   Contexts created:   {}", stats.contexts_created);
    println!("   Messages processed: {}", stats.messages_processed);
    println!();
    println!("═══════════════════════════════════════════════════════════════");

    Ok(())
}
