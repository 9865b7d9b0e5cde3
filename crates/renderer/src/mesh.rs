//! Indexed mesh upload: one VAO with interleaved VBO + IBO.

use std::sync::Arc;

use asset::mesh::{MeshData, MeshVertex};
use glow::HasContext;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh has no geometry to upload")]
    Empty,
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
    #[error("failed to allocate GL object: {0}")]
    Allocate(String),
    #[error("mesh was already released")]
    Released,
}

struct MeshObjects {
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
    ibo: glow::NativeBuffer,
}

/// GPU-resident triangle mesh. Buffers are immutable after upload
/// (`STATIC_DRAW`); drawing requires the VAO to be bound via [`bind`].
///
/// [`bind`]: GpuMesh::bind
pub struct GpuMesh {
    gl: Arc<glow::Context>,
    objects: Option<MeshObjects>,
    index_count: i32,
}

impl GpuMesh {
    /// Validate and upload `data`. Attribute layout: position (location 0,
    /// offset 0), normal (location 1, offset 12), uv (location 2, offset
    /// 24), stride 32.
    pub fn build(gl: Arc<glow::Context>, data: &MeshData) -> Result<Self, MeshError> {
        validate(data)?;

        let objects = unsafe {
            let vao = gl.create_vertex_array().map_err(MeshError::Allocate)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(msg) => {
                    gl.delete_vertex_array(vao);
                    return Err(MeshError::Allocate(msg));
                }
            };
            let ibo = match gl.create_buffer() {
                Ok(ibo) => ibo,
                Err(msg) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(MeshError::Allocate(msg));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&data.vertices),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&data.indices),
                glow::STATIC_DRAW,
            );

            let stride = std::mem::size_of::<MeshVertex>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 24);

            // Unbind the VAO before the buffers so the element binding
            // stays recorded in it.
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            MeshObjects { vao, vbo, ibo }
        };

        log::debug!(
            "Uploaded mesh: {} vertices, {} indices",
            data.vertices.len(),
            data.indices.len()
        );
        Ok(Self {
            gl,
            objects: Some(objects),
            index_count: data.indices.len() as i32,
        })
    }

    /// Bind the VAO for drawing.
    pub fn bind(&self) -> Result<(), MeshError> {
        let objects = self.objects.as_ref().ok_or(MeshError::Released)?;
        unsafe { self.gl.bind_vertex_array(Some(objects.vao)) };
        Ok(())
    }

    /// Draw the full index range. Assumes the VAO is currently bound.
    pub fn draw(&self) -> Result<(), MeshError> {
        if self.objects.is_none() {
            return Err(MeshError::Released);
        }
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0)
        };
        Ok(())
    }

    /// Delete the GL objects: buffers before the array object. Safe to
    /// call more than once.
    pub fn release(&mut self) {
        if let Some(objects) = self.objects.take() {
            unsafe {
                self.gl.delete_buffer(objects.ibo);
                self.gl.delete_buffer(objects.vbo);
                self.gl.delete_vertex_array(objects.vao);
            }
        }
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.release();
    }
}

fn validate(data: &MeshData) -> Result<(), MeshError> {
    if !data.is_valid() {
        return Err(MeshError::Empty);
    }
    let vertex_count = data.vertices.len();
    if let Some(&index) = data.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(MeshError::IndexOutOfBounds {
            index,
            vertex_count,
        });
    }
    Ok(())
}
