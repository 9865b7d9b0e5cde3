//! Platform layer: window and GL context creation, the event loop, input
//! aggregation, and the demo scene that ties them together.

pub mod context;
pub mod input;
pub mod scene;

use std::{path::PathBuf, time::Instant};

use anyhow::{Context as _, Result};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use crate::{
    context::GlWindowContext,
    input::{FrameClock, Gamepads, InputState},
    scene::DemoScene,
};

const WINDOW_TITLE: &str = "PerunGL";
const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

/// Startup knobs, usually parsed from the command line.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub width: u32,
    pub height: u32,
    pub obj_path: Option<PathBuf>,
    pub texture_path: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            obj_path: None,
            texture_path: None,
        }
    }
}

/// Open the window and drive the demo until the user quits.
/// Returns when the window is closed.
pub fn run(options: RunOptions) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    // Keep rendering continuously; the demo animates every frame.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new(options);
    event_loop.run_app(&mut app).context("event loop error")?;
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Everything that only exists while the window is open. `scene` is
/// declared before `ctx` so its GL objects drop while the context still
/// lives.
struct ActiveDemo {
    scene: DemoScene,
    input: InputState,
    pads: Gamepads,
    clock: FrameClock,
    started: Instant,
    ctx: GlWindowContext,
}

/// `ApplicationHandler` cannot return errors, so failures are parked here
/// and reported by [`run`] after the loop exits.
struct DemoApp {
    options: RunOptions,
    demo: Option<ActiveDemo>,
    error: Option<anyhow::Error>,
}

impl DemoApp {
    fn new(options: RunOptions) -> Self {
        Self {
            options,
            demo: None,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<ActiveDemo> {
        let size = PhysicalSize::new(self.options.width.max(1), self.options.height.max(1));
        let ctx = GlWindowContext::create(event_loop, WINDOW_TITLE, size)?;
        ctx.grab_cursor();
        let scene = DemoScene::create(
            ctx.gl(),
            self.options.obj_path.as_deref(),
            self.options.texture_path.as_deref(),
        )?;
        Ok(ActiveDemo {
            scene,
            input: InputState::default(),
            pads: Gamepads::new(),
            clock: FrameClock::new(),
            started: Instant::now(),
            ctx,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.error = Some(err);
        event_loop.exit();
    }

    /// One animation frame: poll the pad, advance the camera, draw, swap.
    fn frame(demo: &mut ActiveDemo, event_loop: &ActiveEventLoop) -> Result<()> {
        let dt = demo.clock.tick();

        let pad = demo.pads.poll();
        if pad.quit {
            log::info!("Gamepad quit pressed. Exiting event loop.");
            event_loop.exit();
            return Ok(());
        }
        let axes = pad.axes.any_active().then_some(pad.axes);
        demo.scene.advance(dt, &mut demo.input, axes);

        let size = demo.ctx.window().inner_size();
        let t = demo.started.elapsed().as_secs_f32();
        demo.scene.render(t, size.width, size.height)?;
        demo.ctx.swap_buffers()
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.demo.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(demo) => self.demo = Some(demo),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(demo) = self.demo.as_ref() {
                    demo.ctx.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && event.state == ElementState::Pressed
                {
                    log::info!("Escape pressed. Exiting event loop.");
                    event_loop.exit();
                    return;
                }
                if let Some(demo) = self.demo.as_mut() {
                    demo.input.key_event(event.physical_key, event.state);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(demo) = self.demo.as_mut() {
                    demo.input.add_scroll(delta);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(demo) = self.demo.as_mut() else {
                    return;
                };
                if let Err(err) = Self::frame(demo, event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        // Raw motion, not cursor position: keeps mouse look working while
        // the cursor is grabbed.
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(demo) = self.demo.as_mut() {
                demo.input.add_mouse_delta(delta);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(demo) = self.demo.as_ref() {
            demo.ctx.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_documented_window_size() {
        let options = RunOptions::default();
        assert_eq!((options.width, options.height), (1280, 720));
        assert!(options.obj_path.is_none());
        assert!(options.texture_path.is_none());
    }
}
