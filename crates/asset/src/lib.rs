//! Asset loading and CPU-side data (meshes, OBJ files, textures).

pub mod mesh;
pub mod obj;
pub mod texture;
