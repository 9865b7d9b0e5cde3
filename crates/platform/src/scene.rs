//! The demo scene: a spinning textured cube, an optional OBJ model beside
//! it, and a fly camera driven by the accumulated frame input.

use std::{path::Path, sync::Arc};

use anyhow::{Context as _, Result};
use asset::{mesh, obj, texture::TextureData};
use corelib::{
    Mat4, Vec3,
    camera::{Camera, PITCH, YAW},
};
use glow::HasContext;
use renderer::{mesh::GpuMesh, shader::ShaderProgram, texture::Texture2d};

use crate::input::{InputState, PadAxes};

const VERT_PATH: &str = "assets/shaders/scene.vert";
const FRAG_PATH: &str = "assets/shaders/scene.frag";

const CLEAR_COLOR: [f32; 4] = [0.05, 0.05, 0.08, 1.0];
const LIGHT_DIR: Vec3 = Vec3::new(1.2, 1.0, 2.0);
const MODEL_OFFSET: Vec3 = Vec3::new(2.0, 0.0, 0.0);
const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 3.0);
const CHECKER_SIZE: u32 = 256;

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

pub struct DemoScene {
    gl: Arc<glow::Context>,
    camera: Camera,
    shader: ShaderProgram,
    cube: GpuMesh,
    model: Option<GpuMesh>,
    texture: Texture2d,
}

impl DemoScene {
    /// Load shaders, upload the cube and the optional model, pick the
    /// texture. An explicit asset path that fails to load is an error; no
    /// path at all falls back to the built-in checkerboard.
    pub fn create(
        gl: Arc<glow::Context>,
        obj_path: Option<&Path>,
        texture_path: Option<&Path>,
    ) -> Result<Self> {
        let shader = ShaderProgram::from_files(gl.clone(), VERT_PATH, FRAG_PATH)
            .context("failed to build scene shader")?;
        let cube = GpuMesh::build(gl.clone(), &mesh::cube()).context("failed to upload cube")?;

        let model = match obj_path {
            Some(path) => {
                let data = obj::load_obj_from_path(path)?;
                Some(GpuMesh::build(gl.clone(), &data).context("failed to upload model")?)
            }
            None => None,
        };

        let pixels = match texture_path {
            Some(path) => TextureData::from_file(path)?,
            None => TextureData::checkerboard(CHECKER_SIZE),
        };
        let texture =
            Texture2d::upload(gl.clone(), &pixels).context("failed to upload texture")?;
        log::info!("Scene texture: {}x{}", texture.width(), texture.height());

        Ok(Self {
            gl,
            camera: Camera::new(CAMERA_START, Vec3::Y, YAW, PITCH),
            shader,
            cube,
            model,
            texture,
        })
    }

    /// Feed one frame of input into the camera. Mouse deltas arrive in
    /// screen coordinates where y grows downward, so dy flips sign here.
    pub fn advance(&mut self, dt: f32, input: &mut InputState, pad: Option<PadAxes>) {
        for direction in input.active_moves() {
            self.camera.keyboard_move(direction, dt);
        }

        let (dx, dy) = input.take_mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            self.camera.mouse_move(dx as f32, -dy as f32, true);
        }

        let scroll = input.take_scroll();
        if scroll != 0.0 {
            self.camera.zoom(scroll);
        }

        if let Some(axes) = pad {
            self.camera
                .gamepad_move(axes.left_x, axes.left_y, axes.right_x, axes.right_y, dt, true);
        }
    }

    /// Draw one frame. `t` is seconds since startup and drives the cube
    /// spin; `width`/`height` give the current viewport for the aspect
    /// ratio.
    pub fn render(&mut self, t: f32, width: u32, height: u32) -> Result<()> {
        let [r, g, b, a] = CLEAR_COLOR;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let aspect = width as f32 / height.max(1) as f32;
        let projection =
            Mat4::perspective_rh_gl(self.camera.fov_deg().to_radians(), aspect, Z_NEAR, Z_FAR);

        self.texture.bind_unit(0)?;
        self.shader.bind()?;
        self.shader.set("u_view", self.camera.view())?;
        self.shader.set("u_projection", projection)?;
        self.shader.set("u_light_dir", LIGHT_DIR)?;
        self.shader.set("u_texture", 0i32)?;

        let spin = Mat4::from_rotation_y(t) * Mat4::from_rotation_x(0.5 * t);
        self.shader.set("u_model", spin)?;
        self.cube.bind()?;
        self.cube.draw()?;

        if let Some(model) = &self.model {
            self.shader
                .set("u_model", Mat4::from_translation(MODEL_OFFSET))?;
            model.bind()?;
            model.draw()?;
        }

        Ok(())
    }
}
