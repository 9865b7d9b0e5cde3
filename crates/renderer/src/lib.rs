//! GL object wrappers over glow: shader programs, mesh buffers, textures.
//!
//! Every wrapper owns a shared handle to the GL context, releases its GL
//! names on drop, and rejects operations after an explicit release. The
//! demo is single-threaded; wrappers must be dropped before the context
//! they were created on.

pub mod mesh;
pub mod shader;
pub mod texture;

pub use mesh::{GpuMesh, MeshError};
pub use shader::{ShaderError, ShaderProgram, ShaderStage, UniformValue};
pub use texture::{Texture2d, TextureError};
