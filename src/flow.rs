//! Application event loop.
//!
//! This module is the platform glue around [`Context`]: it opens the window,
//! creates the wgpu backend, runs the caller's asset setup once, and then
//! drives frames in a fixed order:
//!
//! 1. Drain window/device events into the context's input state
//! 2. Integrate the camera (`Context::update`)
//! 3. Clear, draw the scene in order, present (`Context::draw`)
//! 4. Advance the frame clock and wait for the next frame slot

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    context::{Context, Flow},
    gpu::Gpu,
    input::{InputEvent, Key},
    settings::Settings,
};

/// Loads assets into a freshly created context. Runs once, before the first frame.
pub type Setup = Box<dyn FnOnce(&mut Context<Gpu>, &Settings) -> anyhow::Result<()>>;

/// Measures frame time and paces frames to an optional rate limit.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_tick: Instant,
    dt: Duration,
    frame_time: Option<Duration>,
}

impl FrameClock {
    /// `fps_limit` of 0 disables pacing.
    pub fn new(fps_limit: u32) -> Self {
        Self {
            last_tick: Instant::now(),
            dt: Duration::ZERO,
            frame_time: (fps_limit > 0).then(|| Duration::from_secs_f64(1.0 / fps_limit as f64)),
        }
    }

    /// Time the previous frame took; zero before the first tick.
    pub fn dt(&self) -> Duration {
        self.dt
    }

    /// Marks the end of a frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now - self.last_tick;
        self.last_tick = now;
    }

    /// When the next frame may start, or `None` when unpaced.
    pub fn next_frame_at(&self) -> Option<Instant> {
        self.frame_time.map(|frame_time| self.last_tick + frame_time)
    }
}

pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::KeyQ => Some(Key::Q),
        _ => None,
    }
}

struct App {
    settings: Settings,
    setup: Option<Setup>,
    context: Option<Context<Gpu>>,
    clock: FrameClock,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings, setup: Setup) -> Self {
        let clock = FrameClock::new(settings.fps_limit);
        Self {
            settings,
            setup: Some(setup),
            context: None,
            clock,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.settings.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.window_title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let gpu = futures::executor::block_on(Gpu::new(window.clone(), &self.settings))?;
        let mut context = Context::new(gpu, &self.settings);
        let size = window.inner_size();
        context.resize(size.width, size.height);

        if let Some(setup) = self.setup.take() {
            setup(&mut context, &self.settings)?;
        }
        log::info!(
            "Scene ready: {} meshes, {} materials, {} textures.",
            context.scene.len(),
            context.registry.material_count(),
            context.registry.texture_count()
        );
        window.request_redraw();
        self.context = Some(context);
        self.clock = FrameClock::new(self.settings.fps_limit);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e.context("startup failed"));
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(ctx) = &mut self.context else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            ctx.input.accumulate_mouse(dx as f32, dy as f32);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(ctx) = &mut self.context else {
            return;
        };

        let mut frame_error = None;
        let input_event = match event {
            WindowEvent::CloseRequested => Some(InputEvent::Quit),
            WindowEvent::Resized(size) => Some(InputEvent::Resize(size.width, size.height)),
            WindowEvent::KeyboardInput { ref event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => map_key(code).map(|key| {
                    if event.state.is_pressed() {
                        InputEvent::KeyDown(key)
                    } else {
                        InputEvent::KeyUp(key)
                    }
                }),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                ctx.input.set_primary_button(state.is_pressed());
                None
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = ctx.frame(self.clock.dt()) {
                    frame_error = Some(e);
                }
                self.clock.tick();
                None
            }
            _ => None,
        };

        if let Some(input_event) = input_event {
            if ctx.handle_event(input_event) == Flow::Quit {
                event_loop.exit();
            }
        }
        if let Some(e) = frame_error {
            self.fail(event_loop, e.context("frame failed"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(ctx) = &self.context else {
            return;
        };
        match self.clock.next_frame_at() {
            Some(at) if Instant::now() < at => {
                event_loop.set_control_flow(ControlFlow::WaitUntil(at));
            }
            _ => {
                event_loop.set_control_flow(ControlFlow::Poll);
                ctx.gpu().window().request_redraw();
            }
        }
    }
}

/// Opens the viewer window and runs until it is closed.
pub fn run(settings: Settings, setup: Setup) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings, setup);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_reports_zero_before_the_first_tick() {
        let clock = FrameClock::new(60);
        assert_eq!(clock.dt(), Duration::ZERO);
    }

    #[test]
    fn unlimited_clock_never_waits() {
        let mut clock = FrameClock::new(0);
        assert_eq!(clock.next_frame_at(), None);
        clock.tick();
        assert_eq!(clock.next_frame_at(), None);
    }

    #[test]
    fn limited_clock_waits_one_frame_after_the_last_tick() {
        let mut clock = FrameClock::new(50);
        clock.tick();
        assert_eq!(
            clock.next_frame_at(),
            Some(clock.last_tick + Duration::from_millis(20))
        );
    }

    #[test]
    fn tick_measures_the_elapsed_frame() {
        let mut clock = FrameClock::new(0);
        std::thread::sleep(Duration::from_millis(5));
        clock.tick();
        assert!(clock.dt() >= Duration::from_millis(5));
    }

    #[test]
    fn only_motion_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyA), Some(Key::A));
        assert_eq!(map_key(KeyCode::KeyS), Some(Key::S));
        assert_eq!(map_key(KeyCode::KeyD), Some(Key::D));
        assert_eq!(map_key(KeyCode::KeyE), Some(Key::E));
        assert_eq!(map_key(KeyCode::KeyQ), Some(Key::Q));
        assert_eq!(map_key(KeyCode::Space), None);
        assert_eq!(map_key(KeyCode::Escape), None);
    }
}
