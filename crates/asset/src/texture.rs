//! Texture decoding and CPU-side pixel data.

use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;

/// Pixel data in CPU-friendly form before GPU upload. Rows are stored
/// bottom-up (GL convention); decoding flips the image vertically.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats, inferred from the source channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl TextureData {
    pub fn new_rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 3) as usize,
            "Data size doesn't match RGB8 format"
        );
        Self {
            data,
            width,
            height,
            format: TextureFormat::Rgb8,
        }
    }

    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        }
    }

    /// Load and decode an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {}", path.display());
        let img = image::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;
        let data = Self::from_image(img);
        log::info!(
            "Loaded texture {}x{} ({:?}, {} bytes)",
            data.width,
            data.height,
            data.format,
            data.data.len()
        );
        Ok(data)
    }

    /// Decode an in-memory image: flip vertically, then keep alpha only
    /// when the source carries it (4 channels → RGBA8, otherwise RGB8).
    pub fn from_image(img: DynamicImage) -> Self {
        let img = img.flipv();
        if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Self::new_rgba8(width, height, rgba.into_raw())
        } else {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            Self::new_rgb8(width, height, rgb.into_raw())
        }
    }

    /// Fallback pattern for running without texture assets.
    pub fn checkerboard(size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let checker = ((x / 8) + (y / 8)) % 2;
                if checker == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self::new_rgba8(size, size, data)
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size = (self.width * self.height * self.bytes_per_pixel()) as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    #[test]
    fn decode_flips_vertically() {
        // Top pixel red, bottom pixel blue in image space.
        let img = image::RgbImage::from_fn(1, 2, |_, y| {
            if y == 0 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        });
        let data = TextureData::from_image(DynamicImage::ImageRgb8(img));
        assert_eq!(data.format, TextureFormat::Rgb8);
        // First stored row is the bottom of the source image.
        assert_eq!(&data.data[0..3], &[0, 0, 255]);
        assert_eq!(&data.data[3..6], &[255, 0, 0]);
    }

    #[test]
    fn alpha_sources_decode_as_rgba() {
        let img = image::RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40]));
        let data = TextureData::from_image(DynamicImage::ImageRgba8(img));
        assert_eq!(data.format, TextureFormat::Rgba8);
        assert_eq!(data.bytes_per_pixel(), 4);
        assert!(data.is_valid());
    }

    #[test]
    fn checkerboard_is_valid() {
        let data = TextureData::checkerboard(32);
        assert!(data.is_valid());
        assert_eq!(data.format, TextureFormat::Rgba8);
        // Both corners of a 32px board land on white cells; stepping one
        // 8px cell along either axis lands on gray.
        assert_eq!(&data.data[0..4], &[255, 255, 255, 255]);
        let last = data.data.len() - 4;
        assert_eq!(&data.data[last..], &[255, 255, 255, 255]);
        let row = (32 * 4) as usize;
        assert_eq!(&data.data[8 * 4..8 * 4 + 4], &[128, 128, 128, 255]);
        assert_eq!(&data.data[8 * row..8 * row + 4], &[128, 128, 128, 255]);
    }
}
