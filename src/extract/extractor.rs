use crate::assets::decode::encode_png;
use crate::extract::bbox::bounding_box_rgba;
use crate::foundation::core::{PixelRect, Size};
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::render::cpu::{crop_rgba8, mask_apply_coverage, resample_nearest};
use crate::render::surface_pool::SurfacePool;
use crate::render::texture::Texture;

/// An encoded extraction result.
#[derive(Clone, Debug)]
pub struct Extraction {
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Region of the base image the PNG covers.
    pub region: PixelRect,
}

/// Mask `base` by `mask` and encode the result, optionally cropped to the mask's bounding box.
///
/// The mask is stretched to the base size when they differ. Masking is multiplicative: each
/// base pixel keeps `coverage(mask)` of its color and alpha. Both scratch surfaces go back to
/// `pool` on every exit path.
#[tracing::instrument(skip(base, mask, pool), fields(base = ?base.size(), mask = ?mask.size()))]
pub fn extract(
    base: &Texture,
    mask: &Texture,
    crop: bool,
    pool: &SurfacePool,
) -> SegmenterResult<Extraction> {
    let size = base.size();
    let mut mask_surface = pool.borrow(size)?;
    if mask.size() == size {
        mask_surface.bytes_mut().copy_from_slice(mask.premul_bytes());
    } else {
        tracing::debug!("resampling mask to base size");
        resample_nearest(mask_surface.bytes_mut(), size, mask);
    }

    let mut out = pool.borrow(size)?;
    mask_apply_coverage(base.premul_bytes(), mask_surface.bytes(), out.bytes_mut())?;

    if !crop {
        let region = PixelRect {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        };
        return Ok(Extraction {
            png: encode_png(out.bytes(), size)?,
            region,
        });
    }

    let region = bounding_box_rgba(mask_surface.bytes(), size)
        .ok_or_else(|| SegmenterError::empty_mask("mask has no covered pixels"))?;
    let cropped = crop_rgba8(out.bytes(), size, region)?;
    let png = encode_png(&cropped, Size::new(region.width, region.height))?;
    Ok(Extraction { png, region })
}

#[cfg(test)]
#[path = "../../tests/unit/extract/extractor.rs"]
mod tests;
