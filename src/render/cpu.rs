use crate::foundation::core::{FrameRGBA, PixelRect, Size};
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::foundation::math::{coverage_u8, mul_div255_u8};
use crate::geometry::fit::Viewport;
use crate::render::texture::{Texture, surface_dims};
use crate::scene::layer::{LayerTree, Sprite};

pub(crate) type PremulRgba8 = [u8; 4];

pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite the `dst_size` region of `src` starting at `(src_x, src_y)` over `dst`.
///
/// Source pixels outside the texture contribute nothing.
pub(crate) fn blit_over(
    dst: &mut [u8],
    dst_size: Size,
    src: &Texture,
    src_x: i64,
    src_y: i64,
    opacity: f32,
) -> SegmenterResult<()> {
    if dst.len() != dst_size.rgba_len() {
        return Err(SegmenterError::validation(
            "blit_over expects a buffer matching width*height*4",
        ));
    }
    for y in 0..dst_size.height {
        for x in 0..dst_size.width {
            let Some(s) = src.premul_pixel(src_x + i64::from(x), src_y + i64::from(y)) else {
                continue;
            };
            let idx = ((y as usize) * (dst_size.width as usize) + (x as usize)) * 4;
            let d = [dst[idx], dst[idx + 1], dst[idx + 2], dst[idx + 3]];
            dst[idx..idx + 4].copy_from_slice(&over(d, s, opacity));
        }
    }
    Ok(())
}

/// Nearest-neighbour resample of `src` into `dst` (premultiplied bytes of `dst_size`).
pub(crate) fn resample_nearest(dst: &mut [u8], dst_size: Size, src: &Texture) {
    let (sw, sh) = (u64::from(src.width()), u64::from(src.height()));
    let (dw, dh) = (u64::from(dst_size.width), u64::from(dst_size.height));
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }
    let src_bytes = src.premul_bytes();
    for y in 0..dh {
        let sy = (y * sh / dh).min(sh - 1);
        for x in 0..dw {
            let sx = (x * sw / dw).min(sw - 1);
            let si = ((sy * sw + sx) * 4) as usize;
            let di = ((y * dw + x) * 4) as usize;
            dst[di..di + 4].copy_from_slice(&src_bytes[si..si + 4]);
        }
    }
}

/// `dst = src * coverage(mask)`, all buffers premultiplied and equally sized.
pub(crate) fn mask_apply_coverage(src: &[u8], mask: &[u8], dst: &mut [u8]) -> SegmenterResult<()> {
    if src.len() != mask.len() || src.len() != dst.len() || !src.len().is_multiple_of(4) {
        return Err(SegmenterError::validation(
            "mask_apply expects equal-length rgba8 buffers",
        ));
    }
    for ((s, m), d) in src
        .chunks_exact(4)
        .zip(mask.chunks_exact(4))
        .zip(dst.chunks_exact_mut(4))
    {
        let w16 = u16::from(coverage_u8([m[0], m[1], m[2], m[3]]));
        d[0] = mul_div255_u8(u16::from(s[0]), w16);
        d[1] = mul_div255_u8(u16::from(s[1]), w16);
        d[2] = mul_div255_u8(u16::from(s[2]), w16);
        d[3] = mul_div255_u8(u16::from(s[3]), w16);
    }
    Ok(())
}

/// Turn a mask's coverage into alpha: background becomes transparent, color is kept.
///
/// `src` is premultiplied; every channel is at most its coverage, so the result stays valid
/// premultiplied data.
pub(crate) fn coverage_to_alpha(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(4) {
        px[3] = coverage_u8([px[0], px[1], px[2], px[3]]);
    }
    out
}

/// Copy `rect` out of a row-major RGBA8 buffer of `size`.
pub(crate) fn crop_rgba8(src: &[u8], size: Size, rect: PixelRect) -> SegmenterResult<Vec<u8>> {
    if rect.right() > size.width || rect.bottom() > size.height || rect.area() == 0 {
        return Err(SegmenterError::validation(format!(
            "crop rect {rect:?} outside {}x{} raster",
            size.width, size.height
        )));
    }
    let stride = size.width as usize * 4;
    let row_len = rect.width as usize * 4;
    let mut out = Vec::with_capacity(row_len * rect.height as usize);
    for y in rect.y..rect.bottom() {
        let start = y as usize * stride + rect.x as usize * 4;
        out.extend_from_slice(&src[start..start + row_len]);
    }
    Ok(out)
}

fn draw_sprite(ctx: &mut vello_cpu::RenderContext, sprite: &Sprite, scale: f64) {
    let Some(tex) = sprite.texture() else {
        return;
    };
    ctx.set_blend_mode(sprite.blend.to_cpu());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::scale(scale));
    ctx.set_paint(tex.paint());
    let opacity = sprite.opacity.clamp(0.0, 1.0);
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(tex.width()),
        f64::from(tex.height()),
    ));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

/// Render the visible layers of `tree` at the viewport's display size and device-pixel ratio.
#[tracing::instrument(skip(tree, selection))]
pub(crate) fn render_layers(
    viewport: &Viewport,
    tree: &LayerTree,
    selection: Option<&Sprite>,
) -> SegmenterResult<FrameRGBA> {
    let size = viewport.surface_size();
    let (w, h) = surface_dims(size.width, size.height)?;
    let scale = viewport.scale * viewport.device_pixel_ratio;

    let mut layers: Vec<&Sprite> = vec![&tree.base];
    layers.extend(tree.masks.composite.iter());
    layers.extend(tree.masks.overlay.iter().map(|o| &o.sprite));
    layers.extend(selection);

    let mut ctx = vello_cpu::RenderContext::new(w, h);

    for sprite in layers.into_iter().filter(|s| s.is_drawable()) {
        draw_sprite(&mut ctx, sprite, scale);
    }

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(FrameRGBA {
        width: size.width,
        height: size.height,
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
