//! 2D texture upload and sampler-unit binding.

use std::sync::Arc;

use asset::texture::{TextureData, TextureFormat};
use glow::HasContext;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to allocate GL texture: {0}")]
    Allocate(String),
    #[error("texture was already released")]
    Released,
}

/// GL texture holding one mip level at the decoded resolution.
/// CLAMP_TO_EDGE wrapping, LINEAR filtering.
pub struct Texture2d {
    gl: Arc<glow::Context>,
    texture: Option<glow::NativeTexture>,
    width: u32,
    height: u32,
}

impl Texture2d {
    /// Upload decoded pixel data. The internal format follows the source
    /// channel count (RGB8 or RGBA8).
    pub fn upload(gl: Arc<glow::Context>, data: &TextureData) -> Result<Self, TextureError> {
        let (internal_format, format) = gl_formats(data.format);
        let texture = unsafe {
            let texture = gl.create_texture().map_err(TextureError::Allocate)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            if data.format == TextureFormat::Rgb8 {
                // Rows of 3-byte pixels are not 4-byte aligned.
                gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            }
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                data.width as i32,
                data.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&data.data)),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        log::debug!(
            "Uploaded texture {}x{} ({:?})",
            data.width,
            data.height,
            data.format
        );
        Ok(Self {
            gl,
            texture: Some(texture),
            width: data.width,
            height: data.height,
        })
    }

    /// Make `unit` the active texture unit and bind this texture to it.
    pub fn bind_unit(&self, unit: u32) -> Result<(), TextureError> {
        let texture = self.texture.ok_or(TextureError::Released)?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Delete the GL texture. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(texture) = self.texture.take() {
            unsafe { self.gl.delete_texture(texture) };
        }
    }
}

impl Drop for Texture2d {
    fn drop(&mut self) {
        self.release();
    }
}

fn gl_formats(format: TextureFormat) -> (i32, u32) {
    match format {
        TextureFormat::Rgb8 => (glow::RGB8 as i32, glow::RGB),
        TextureFormat::Rgba8 => (glow::RGBA8 as i32, glow::RGBA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_count_picks_gl_format() {
        assert_eq!(
            gl_formats(TextureFormat::Rgb8),
            (glow::RGB8 as i32, glow::RGB)
        );
        assert_eq!(
            gl_formats(TextureFormat::Rgba8),
            (glow::RGBA8 as i32, glow::RGBA)
        );
    }
}
