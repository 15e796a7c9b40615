//! Raster images handed to figures for display.

use std::io::Cursor;

use crate::error::{Result, VisualizerError};

/// An 8-bit raster laid out row-major as `height × width × channels`.
///
/// Grayscale (1 channel), RGB (3) and RGBA (4) are supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wrap raw bytes, validating them against the declared shape.
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(VisualizerError::ImageShape(format!(
                "unsupported channel count {channels}, expected 1, 3 or 4"
            )));
        }
        let expected = height
            .checked_mul(width)
            .and_then(|pixels| pixels.checked_mul(channels))
            .ok_or_else(|| VisualizerError::ImageShape(format!("{height}x{width} overflows")))?;
        if data.len() != expected {
            return Err(VisualizerError::ImageShape(format!(
                "{height}x{width}x{channels} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Grayscale image.
    pub fn from_gray(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(height, width, 1, data)
    }

    /// RGB image.
    pub fn from_rgb(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(height, width, 3, data)
    }

    /// RGBA image.
    pub fn from_rgba(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(height, width, 4, data)
    }

    // Canvas buffers are sized from their own dimensions.
    pub(crate) fn from_rgba_pixels(height: usize, width: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), height * width * 4);
        Self {
            height,
            width,
            channels: 4,
            data,
        }
    }

    /// All-zero image of the given shape.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Result<Self> {
        let len = height.saturating_mul(width).saturating_mul(channels);
        Self::new(height, width, channels, vec![0; len])
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Raw bytes in the stored layout.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Flattened RGBA bytes.
    ///
    /// Grayscale is replicated into R, G and B; missing alpha becomes 255.
    pub fn to_rgba(&self) -> Vec<u8> {
        match self.channels {
            4 => self.data.clone(),
            3 => self
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
                .collect(),
            _ => self
                .data
                .iter()
                .flat_map(|&v| [v, v, v, u8::MAX])
                .collect(),
        }
    }

    /// Provider size as `[width, height]`.
    pub fn size(&self) -> [u32; 2] {
        [
            u32::try_from(self.width).unwrap_or(u32::MAX),
            u32::try_from(self.height).unwrap_or(u32::MAX),
        ]
    }
}

/// Encode RGBA bytes as PNG for display surfaces that take encoded images.
#[cfg_attr(not(feature = "gpui"), allow(dead_code))]
pub(crate) fn encode_png(rgba: &[u8], size: [u32; 2]) -> Result<Vec<u8>> {
    let [width, height] = size;
    let buffer = image::RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
        VisualizerError::ImageShape(format!(
            "{} bytes do not fill a {width}x{height} RGBA image",
            rgba.len()
        ))
    })?;
    let mut out = Vec::new();
    buffer.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_gains_opaque_alpha() {
        let image = Image::from_rgb(1, 2, vec![1, 2, 3, 4, 5, 6]).expect("valid shape");
        assert_eq!(image.to_rgba(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(image.size(), [2, 1]);
    }

    #[test]
    fn gray_is_replicated() {
        let image = Image::from_gray(1, 2, vec![7, 9]).expect("valid shape");
        assert_eq!(image.to_rgba(), vec![7, 7, 7, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn rgba_passes_through() {
        let data = vec![1, 2, 3, 4];
        let image = Image::from_rgba(1, 1, data.clone()).expect("valid shape");
        assert_eq!(image.to_rgba(), data);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(matches!(
            Image::from_rgb(2, 2, vec![0; 11]),
            Err(VisualizerError::ImageShape(_))
        ));
        assert!(matches!(
            Image::new(1, 1, 2, vec![0; 2]),
            Err(VisualizerError::ImageShape(_))
        ));
    }

    #[test]
    fn png_keeps_pixels_and_size() {
        let rgba = [1, 2, 3, 4, 5, 6, 7, 8];
        let png = encode_png(&rgba, [2, 1]).expect("complete buffer");
        let decoded = image::load_from_memory(&png).expect("valid png").to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.into_raw(), rgba.to_vec());
        assert!(matches!(
            encode_png(&rgba, [3, 1]),
            Err(VisualizerError::ImageShape(_))
        ));
    }
}
