use std::sync::Arc;

use crate::foundation::core::Size;
use crate::foundation::error::{SegmenterError, SegmenterResult};

/// Immutable premultiplied RGBA8 raster shared between layers.
///
/// Cloning is cheap: the pixmap is reference counted and never mutated after construction.
#[derive(Clone)]
pub struct Texture {
    pixmap: Arc<vello_cpu::Pixmap>,
    size: Size,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.size.width)
            .field("height", &self.size.height)
            .finish()
    }
}

impl Texture {
    /// Wrap premultiplied, row-major, tightly packed RGBA8 bytes.
    pub fn from_premul_rgba(width: u32, height: u32, bytes: &[u8]) -> SegmenterResult<Self> {
        let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
        Ok(Self {
            pixmap: Arc::new(pixmap),
            size: Size::new(width, height),
        })
    }

    /// Wrap straight-alpha RGBA8 bytes.
    pub fn from_straight_rgba(width: u32, height: u32, bytes: &[u8]) -> SegmenterResult<Self> {
        let mut tmp = bytes.to_vec();
        crate::foundation::math::premultiply_rgba8_in_place(&mut tmp);
        Self::from_premul_rgba(width, height, &tmp)
    }

    /// A texture filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SegmenterResult<Self> {
        let mut bytes = Vec::with_capacity(Size::new(width, height).rgba_len());
        for _ in 0..(width as usize).saturating_mul(height as usize) {
            bytes.extend_from_slice(&rgba);
        }
        Self::from_straight_rgba(width, height, &bytes)
    }

    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        let size = Size::new(u32::from(pixmap.width()), u32::from(pixmap.height()));
        Self {
            pixmap: Arc::new(pixmap),
            size,
        }
    }

    /// Pixel dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Premultiplied RGBA8 bytes.
    pub fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn premul_pixel(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if !self.size.contains(x, y) {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        let px = self.premul_bytes().get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Image paint for the CPU rasterizer.
    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(self.pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// Convert pixel dimensions to the `u16` range the rasterizer accepts.
pub(crate) fn surface_dims(width: u32, height: u32) -> SegmenterResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SegmenterError::validation(format!("surface width exceeds u16: {width}")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SegmenterError::validation(format!("surface height exceeds u16: {height}")))?;
    Ok((w, h))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SegmenterResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(width, height)?;
    if bytes.len() != Size::new(width, height).rgba_len() {
        return Err(SegmenterError::validation("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;
