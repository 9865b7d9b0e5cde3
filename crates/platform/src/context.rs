//! Window + OpenGL context bootstrap: winit window, glutin display/surface,
//! glow function loading. All GL state created here is owned by
//! [`GlWindowContext`] and stays valid until it drops.

use std::{num::NonZeroU32, sync::Arc};

use anyhow::{Context as _, Result, anyhow};
use glow::HasContext;
use glutin::{
    config::{Config, ConfigTemplateBuilder, GlConfig},
    context::{
        ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext,
        PossiblyCurrentContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use winit::{
    dpi::PhysicalSize,
    event_loop::ActiveEventLoop,
    raw_window_handle::HasWindowHandle,
    window::{CursorGrabMode, Window},
};

/// Target multisampling level; the config closest to it wins the pick,
/// so platforms without MSAA still produce a usable config.
const DESIRED_SAMPLES: i32 = 4;

/// Current GL 3.3 core context bound to a visible window, with vsync on
/// when the platform allows it.
pub struct GlWindowContext {
    gl: Arc<glow::Context>,
    // Declared before `window`: surface and context drop first.
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl GlWindowContext {
    pub fn create(
        event_loop: &ActiveEventLoop,
        title: &str,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(size);
        let template = ConfigTemplateBuilder::new().with_depth_size(24);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|err| anyhow!("failed to create window and pick GL config: {err}"))?;
        let window = window.context("display builder produced no window")?;
        log::info!(
            "Window created: {}x{} ({} samples)",
            window.inner_size().width,
            window.inner_size().height,
            gl_config.num_samples()
        );

        let raw_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(raw_handle);
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .context("failed to create GL 3.3 core context")?;

        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::<WindowSurface>::new())
            .context("failed to build surface attributes")?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            log::warn!("Could not enable vsync: {err}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        let renderer = unsafe { gl.get_parameter_string(glow::RENDERER) };
        log::info!("OpenGL {version} on {renderer}");

        let inner = window.inner_size();
        unsafe {
            gl.viewport(0, 0, inner.width as i32, inner.height as i32);
            gl.enable(glow::DEPTH_TEST);
        }

        Ok(Self {
            gl: Arc::new(gl),
            surface,
            context,
            window,
        })
    }

    /// Shared handle to the loaded GL functions.
    pub fn gl(&self) -> Arc<glow::Context> {
        self.gl.clone()
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Capture the cursor for mouse look. Some platforms refuse to lock;
    /// the demo then runs with a free cursor.
    pub fn grab_cursor(&self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => self.window.set_cursor_visible(false),
            Err(err) => log::warn!("Cursor grab unavailable ({err}); mouse look stays free"),
        }
    }

    /// Resize the surface and viewport. Zero-sized (minimized) windows are
    /// ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        self.surface.resize(&self.context, width, height);
        unsafe {
            self.gl
                .viewport(0, 0, width.get() as i32, height.get() as i32)
        };
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .max_by_key(|config| -(i32::from(config.num_samples()) - DESIRED_SAMPLES).abs())
        .expect("glutin offered no GL configs")
}
