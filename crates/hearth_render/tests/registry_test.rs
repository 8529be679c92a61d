//! Integration tests for role-based lookup of render threads.

mod common;

use common::{Harness, TestMessage};
use hearth_render::{
    ContextHandle, ControllerError, CoreError, MessagePriority, RenderThread, RenderThreadConfig, RenderThreadRegistry,
    ThreadRole,
};

#[test]
fn test_messages_are_routed_by_role() {
    let registry = RenderThreadRegistry::new();
    let render = Harness::try_new(ThreadRole::Render, RenderThreadConfig::default(), &registry).unwrap();
    let upload = Harness::try_new(ThreadRole::ResourceUpload, RenderThreadConfig::default(), &registry).unwrap();
    render.controller.start_thread().unwrap();
    upload.controller.start_thread().unwrap();

    assert_eq!(registry.roles(), vec![ThreadRole::Render, ThreadRole::ResourceUpload]);

    registry
        .post_message(ThreadRole::ResourceUpload, TestMessage::plain(7), MessagePriority::Normal)
        .unwrap();
    upload.expect_processed(7);
    render.expect_quiet();
}

#[test]
fn test_registry_handle_controls_its_own_context() {
    let registry = RenderThreadRegistry::new();
    let upload = Harness::try_new(ThreadRole::ResourceUpload, RenderThreadConfig::default(), &registry).unwrap();
    upload.controller.start_thread().unwrap();

    let thread = registry.require(ThreadRole::ResourceUpload).unwrap();
    assert_eq!(thread.role(), ThreadRole::ResourceUpload);
    assert!(thread.can_receive_messages());

    thread.disable_rendering(false).unwrap();
    assert!(!thread.is_rendering_enabled());
    assert!(!upload.factory.upload().is_rendering_enabled());
    assert!(upload.factory.draw().is_rendering_enabled());

    thread.set_rendering_enabled(true, None).unwrap();
    assert!(thread.is_rendering_enabled());
    assert!(upload.factory.upload().is_rendering_enabled());
}

#[test]
fn test_live_role_cannot_be_registered_twice() {
    let registry = RenderThreadRegistry::new();
    let _first = Harness::try_new(ThreadRole::Render, RenderThreadConfig::default(), &registry).unwrap();

    let err = Harness::try_new(ThreadRole::Render, RenderThreadConfig::default(), &registry)
        .err()
        .unwrap();
    assert_eq!(err, ControllerError::Core(CoreError::RoleTaken(ThreadRole::Render)));
}

#[test]
fn test_dropped_controller_leaves_registry() {
    let registry = RenderThreadRegistry::new();
    let render = Harness::try_new(ThreadRole::Render, RenderThreadConfig::default(), &registry).unwrap();
    render.controller.start_thread().unwrap();
    drop(render);

    assert!(registry.get(ThreadRole::Render).is_none());
    assert_eq!(
        registry.post_message(ThreadRole::Render, TestMessage::plain(1), MessagePriority::Normal),
        Err(CoreError::RoleNotRegistered(ThreadRole::Render))
    );

    // The role is free again
    let again = Harness::try_new(ThreadRole::Render, RenderThreadConfig::default(), &registry).unwrap();
    again.controller.start_thread().unwrap();
}

#[test]
fn test_invalid_config_is_rejected_before_registration() {
    let registry = RenderThreadRegistry::new();
    let config = RenderThreadConfig {
        idle_timeout_ms: Some(0),
        ..RenderThreadConfig::default()
    };

    let err = Harness::try_new(ThreadRole::Render, config, &registry).err().unwrap();
    assert!(matches!(err, ControllerError::Core(CoreError::InvalidConfig(_))));
    assert!(registry.roles().is_empty());
}
