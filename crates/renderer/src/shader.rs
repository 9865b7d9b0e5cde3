//! Shader program wrapper: compile two GLSL files, link, and set uniforms
//! by name through a location cache.

use std::{collections::HashMap, fmt, fs, path::Path, sync::Arc};

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{stage} shader compilation failed: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program link failed: {log}")]
    Link { log: String },
    #[error("program validation failed: {log}")]
    Validate { log: String },
    #[error("failed to allocate GL object: {0}")]
    Allocate(String),
    #[error("uniform '{name}' not found in program {program}")]
    UniformNotFound { name: String, program: u32 },
    #[error("program {expected} is not the active program (active id: {active})")]
    NotActive { expected: u32, active: u32 },
    #[error("shader program was already released")]
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Every value a uniform can carry. `ShaderProgram::set` accepts anything
/// convertible into this, so unsupported types are rejected at compile
/// time rather than dispatched dynamically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

macro_rules! uniform_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for UniformValue {
            fn from(value: $ty) -> Self {
                UniformValue::$variant(value)
            }
        })+
    };
}

uniform_from! {
    f32 => Float,
    i32 => Int,
    bool => Bool,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

/// Linked GL program plus a name→location cache. Move-only: releasing the
/// program (explicitly or on drop) deletes the GL object, and every later
/// operation fails with [`ShaderError::Released`].
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    program: Option<glow::NativeProgram>,
    locations: HashMap<String, glow::NativeUniformLocation>,
}

impl ShaderProgram {
    /// Build a program from a vertex and a fragment source file.
    pub fn from_files(
        gl: Arc<glow::Context>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        log::debug!(
            "Building shader program from {} + {}",
            vertex_path.display(),
            fragment_path.display()
        );
        let vertex_src = read_source(vertex_path)?;
        let fragment_src = read_source(fragment_path)?;
        Self::from_sources(gl, &vertex_src, &fragment_src)
    }

    /// Compile both stages, then link and validate the program; the stage
    /// objects are detached and deleted along the way. Each failure path
    /// deletes everything created so far.
    pub fn from_sources(
        gl: Arc<glow::Context>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let vs = compile_stage(&gl, ShaderStage::Vertex, vertex_src)?;
        let fs = match compile_stage(&gl, ShaderStage::Fragment, fragment_src) {
            Ok(fs) => fs,
            Err(err) => {
                unsafe { gl.delete_shader(vs) };
                return Err(err);
            }
        };

        let program = unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(msg) => {
                    gl.delete_shader(vs);
                    gl.delete_shader(fs);
                    return Err(ShaderError::Allocate(msg));
                }
            };
            gl.attach_shader(program, vs);
            gl.attach_shader(program, fs);
            gl.link_program(program);
            gl.detach_shader(program, vs);
            gl.detach_shader(program, fs);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Link { log });
            }
            gl.validate_program(program);
            if !gl.get_program_validate_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Validate { log });
            }
            program
        };

        log::debug!("Linked shader program {}", program.0.get());
        Ok(Self {
            gl,
            program: Some(program),
            locations: HashMap::new(),
        })
    }

    /// Make this program the active one.
    pub fn bind(&self) -> Result<(), ShaderError> {
        let program = self.program.ok_or(ShaderError::Released)?;
        unsafe { self.gl.use_program(Some(program)) };
        Ok(())
    }

    /// Upload a uniform by name. The program must currently be the active
    /// GL program (`bind` first); an unknown name is an error and is not
    /// cached, so a later link fix can still resolve it.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), ShaderError> {
        let program = self.ensure_active()?;
        let location = self.location(program, name)?;
        let gl = &self.gl;
        unsafe {
            match value.into() {
                UniformValue::Float(v) => gl.uniform_1_f32(Some(&location), v),
                UniformValue::Int(v) => gl.uniform_1_i32(Some(&location), v),
                UniformValue::Bool(v) => gl.uniform_1_i32(Some(&location), v as i32),
                UniformValue::Vec2(v) => gl.uniform_2_f32(Some(&location), v.x, v.y),
                UniformValue::Vec3(v) => gl.uniform_3_f32(Some(&location), v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl.uniform_4_f32(Some(&location), v.x, v.y, v.z, v.w),
                UniformValue::Mat3(m) => {
                    gl.uniform_matrix_3_f32_slice(Some(&location), false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    gl.uniform_matrix_4_f32_slice(Some(&location), false, &m.to_cols_array())
                }
            }
        }
        Ok(())
    }

    /// Delete the GL program. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(program) = self.program.take() {
            unsafe { self.gl.delete_program(program) };
            self.locations.clear();
        }
    }

    fn ensure_active(&self) -> Result<glow::NativeProgram, ShaderError> {
        let program = self.program.ok_or(ShaderError::Released)?;
        let active = unsafe { self.gl.get_parameter_i32(glow::CURRENT_PROGRAM) } as u32;
        if active != program.0.get() {
            return Err(ShaderError::NotActive {
                expected: program.0.get(),
                active,
            });
        }
        Ok(program)
    }

    fn location(
        &mut self,
        program: glow::NativeProgram,
        name: &str,
    ) -> Result<glow::NativeUniformLocation, ShaderError> {
        if let Some(location) = self.locations.get(name) {
            return Ok(location.clone());
        }
        let location = unsafe { self.gl.get_uniform_location(program, name) }.ok_or_else(|| {
            ShaderError::UniformNotFound {
                name: name.to_owned(),
                program: program.0.get(),
            }
        })?;
        self.locations.insert(name.to_owned(), location.clone());
        Ok(location)
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.release();
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::NativeShader, ShaderError> {
    unsafe {
        let shader = gl.create_shader(stage.gl_enum()).map_err(ShaderError::Allocate)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ShaderError::Compile { stage, log });
        }
        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{vec2, vec3, vec4};

    #[test]
    fn rust_types_convert_to_uniform_variants() {
        assert_eq!(UniformValue::from(1.5f32), UniformValue::Float(1.5));
        assert_eq!(UniformValue::from(-7i32), UniformValue::Int(-7));
        assert_eq!(UniformValue::from(true), UniformValue::Bool(true));
        assert_eq!(
            UniformValue::from(vec2(1.0, 2.0)),
            UniformValue::Vec2(vec2(1.0, 2.0))
        );
        assert_eq!(
            UniformValue::from(vec3(1.0, 2.0, 3.0)),
            UniformValue::Vec3(vec3(1.0, 2.0, 3.0))
        );
        assert_eq!(
            UniformValue::from(vec4(1.0, 2.0, 3.0, 4.0)),
            UniformValue::Vec4(vec4(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(
            UniformValue::from(Mat3::IDENTITY),
            UniformValue::Mat3(Mat3::IDENTITY)
        );
        assert_eq!(
            UniformValue::from(Mat4::IDENTITY),
            UniformValue::Mat4(Mat4::IDENTITY)
        );
    }

    #[test]
    fn wrong_program_and_missing_uniform_errors_are_distinct() {
        let not_active = ShaderError::NotActive {
            expected: 3,
            active: 0,
        };
        let not_found = ShaderError::UniformNotFound {
            name: "u_mvp".into(),
            program: 3,
        };
        assert!(not_active.to_string().contains("not the active program"));
        assert!(not_found.to_string().contains("u_mvp"));
        assert_ne!(not_active.to_string(), not_found.to_string());
    }

    #[test]
    fn link_and_validation_failures_render_distinct_messages() {
        // Validation catches program states a successful link permits, e.g.
        // samplers of different types sharing a texture unit.
        let link = ShaderError::Link {
            log: "error: vertex output not read by fragment shader".into(),
        };
        let validate = ShaderError::Validate {
            log: "Samplers of different types point to the same texture image unit".into(),
        };
        assert!(link.to_string().contains("link failed"));
        assert!(validate.to_string().contains("validation failed"));
        assert!(validate.to_string().contains("texture image unit"));
        assert_ne!(link.to_string(), validate.to_string());
    }

    #[test]
    fn stage_names_render_for_compile_errors() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: "0:1(1): error: syntax error".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fragment"));
        assert!(msg.contains("syntax error"));
    }
}
