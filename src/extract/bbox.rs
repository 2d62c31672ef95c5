use crate::foundation::core::{PixelRect, Size};
use crate::foundation::math::coverage_u8;
use crate::render::texture::Texture;

/// Tightest rectangle around the mask's covered pixels.
///
/// Returns `None` for a mask with no covered pixel; callers surface that as an empty mask.
pub fn bounding_box(mask: &Texture) -> Option<PixelRect> {
    bounding_box_rgba(mask.premul_bytes(), mask.size())
}

/// [`bounding_box`] over premultiplied RGBA8 bytes of `size`.
pub fn bounding_box_rgba(premul: &[u8], size: Size) -> Option<PixelRect> {
    if premul.len() != size.rgba_len() || size.width == 0 {
        return None;
    }
    let row_bytes = size.width as usize * 4;
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (y, row) in premul.chunks_exact(row_bytes).enumerate() {
        for (x, px) in row.chunks_exact(4).enumerate() {
            if coverage_u8([px[0], px[1], px[2], px[3]]) == 0 {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    any.then(|| PixelRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/extract/bbox.rs"]
mod tests;
