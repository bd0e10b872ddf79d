use cgmath::Vector2;
use dorm_viewer::{
    context::{Context, Flow},
    data_structures::material::UniformSpec,
    input::{InputEvent, Key},
    settings::Settings,
};
use instant::Duration;

use crate::common::test_utils::{
    Call, MockGpu, TRIANGLE_OBJ, approx_eq, fixture_dir, write_file, write_png, write_shaders,
};

mod common;

const FRAME: Duration = Duration::from_millis(16);

fn context() -> Context<MockGpu> {
    Context::new(MockGpu::new(), &Settings::default())
}

/// Loads a one-mesh room the way the binary does: textures, shader,
/// materials, meshes, then one compile pass.
fn furnished(test_name: &str) -> Context<MockGpu> {
    let dir = fixture_dir(test_name);
    let mut ctx = context();
    ctx.load_texture("grid", write_png(&dir, "grid.png", 2, 2)).unwrap();
    ctx.load_texture("floor_tex", write_png(&dir, "FLOOR_TEX.png", 2, 2)).unwrap();
    let (vs, fs) = write_shaders(&dir);
    ctx.load_shader("default_shader", vs, fs).unwrap();
    ctx.create_material(
        "default_material",
        "default_shader",
        UniformSpec::new().texture("texture", "grid", 0),
    )
    .unwrap();
    ctx.create_material(
        "floor",
        "default_shader",
        UniformSpec::new().texture("texture", "floor_tex", 0),
    )
    .unwrap();
    ctx.load_mesh(write_file(&dir, "CHAIR_ONE.obj", TRIANGLE_OBJ)).unwrap();
    let floor = ctx.load_mesh(write_file(&dir, "FLOOR.obj", TRIANGLE_OBJ)).unwrap();
    floor.material_name = "floor".to_string();
    ctx.compile_shaders().unwrap();
    ctx
}

#[test]
fn released_mouse_motion_never_reaches_the_camera() {
    let mut ctx = context();
    let start_yaw = ctx.camera.yaw();
    let start_pitch = ctx.camera.pitch();

    for _ in 0..10 {
        ctx.input.accumulate_mouse(250.0, 180.0);
        ctx.update(FRAME);
    }
    assert_eq!(ctx.camera.yaw(), start_yaw);
    assert_eq!(ctx.camera.pitch(), start_pitch);

    ctx.input.set_primary_button(true);
    ctx.input.accumulate_mouse(5.0, 0.0);
    ctx.update(FRAME);

    let expected = start_yaw.0 + 5.0 * ctx.camera.sensitivity;
    assert!(approx_eq(ctx.camera.yaw().0, expected));
    assert_eq!(ctx.input.pending_mouse(), Vector2::new(0.0, 0.0));
}

#[test]
fn held_keys_move_the_camera_until_released() {
    let mut ctx = context();
    let start = ctx.camera.position;

    assert_eq!(ctx.handle_event(InputEvent::KeyDown(Key::W)), Flow::Continue);
    ctx.update(FRAME);
    let moved = ctx.camera.position;
    assert!(moved.z < start.z);

    ctx.handle_event(InputEvent::KeyUp(Key::W));
    ctx.update(FRAME);
    assert_eq!(ctx.camera.position, moved);
}

#[test]
fn quit_event_ends_the_loop() {
    let mut ctx = context();
    assert_eq!(ctx.handle_event(InputEvent::Quit), Flow::Quit);
}

#[test]
fn resize_reaches_camera_and_backend() {
    let mut ctx = context();
    let log = ctx.gpu().log();

    ctx.handle_event(InputEvent::Resize(800, 600));
    assert_eq!(ctx.camera.aspect_ratio(), 800.0 / 600.0);
    ctx.handle_event(InputEvent::Resize(0, 0));
    assert_eq!(ctx.camera.window_size(), (800, 600));

    assert_eq!(*log.borrow(), [Call::Resize(800, 600)]);
}

#[test]
fn frame_clears_draws_and_presents() {
    let mut ctx = furnished("frame_clears_draws_and_presents");
    let log = ctx.gpu().log();
    log.borrow_mut().clear();

    let stats = ctx.frame(FRAME).unwrap();
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.skipped, 0);

    let calls = log.borrow();
    assert_eq!(calls.first(), Some(&Call::BeginFrame));
    assert_eq!(calls.last(), Some(&Call::Present));
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::DrawIndexed { .. })).count(),
        2
    );
}

#[test]
fn teardown_releases_buffers_then_programs_then_textures() {
    let ctx = furnished("teardown_order");
    let log = ctx.gpu().log();
    log.borrow_mut().clear();
    drop(ctx);

    let calls = log.borrow();
    let kinds: Vec<_> = calls
        .iter()
        .map(|c| match c {
            Call::ReleaseBuffers(_) => 'b',
            Call::ReleaseProgram(_) => 'p',
            Call::ReleaseTexture(_) => 't',
            other => panic!("unexpected call during teardown: {other:?}"),
        })
        .collect();
    assert_eq!(kinds, ['b', 'b', 'p', 't', 't']);
}
