use crate::foundation::core::Size;

/// Fit `content` inside `max` preserving aspect ratio.
///
/// Wide content is width-constrained, tall content is height-constrained. Zero or
/// non-finite inputs yield `(0.0, 0.0)`.
pub fn fit_dimensions(content_w: f64, content_h: f64, max_w: f64, max_h: f64) -> (f64, f64) {
    let degenerate = |v: f64| !v.is_finite() || v <= 0.0;
    if degenerate(content_w) || degenerate(content_h) || degenerate(max_w) || degenerate(max_h) {
        return (0.0, 0.0);
    }

    let content_ratio = content_w / content_h;
    let max_ratio = max_w / max_h;
    if content_ratio > max_ratio {
        (max_w, max_w / content_ratio)
    } else {
        (max_h * content_ratio, max_h)
    }
}

/// Convert a display-space pointer position into integer texture coordinates.
///
/// A non-positive scale leaves the coordinates unscaled.
pub fn to_texture_space(screen_x: f64, screen_y: f64, scale: f64) -> (i64, i64) {
    let s = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    ((screen_x / s).round() as i64, (screen_y / s).round() as i64)
}

/// Current display transform: uniform scale from texture to display pixels plus the
/// device-pixel ratio used for the backing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Natural size of the base image.
    pub natural: Size,
    /// Fitted display width in CSS-like pixels.
    pub display_w: f64,
    /// Fitted display height in CSS-like pixels.
    pub display_h: f64,
    /// Texture-to-display scale factor.
    pub scale: f64,
    /// Device-pixel ratio applied to the backing surface.
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Derive a viewport for `natural` inside `max_w x max_h`.
    pub fn fit(natural: Size, max_w: f64, max_h: f64, device_pixel_ratio: f64) -> Self {
        let (display_w, display_h) = fit_dimensions(
            f64::from(natural.width),
            f64::from(natural.height),
            max_w,
            max_h,
        );
        let scale = if natural.width == 0 {
            0.0
        } else {
            display_w / f64::from(natural.width)
        };
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            natural,
            display_w,
            display_h,
            scale,
            device_pixel_ratio: dpr,
        }
    }

    /// Backing surface size in device pixels (at least 1x1).
    pub fn surface_size(&self) -> Size {
        let px = |v: f64| ((v * self.device_pixel_ratio).round() as u32).max(1);
        Size::new(px(self.display_w), px(self.display_h))
    }

    /// Convert a display-space pointer position to texture coordinates.
    pub fn to_texture(&self, screen_x: f64, screen_y: f64) -> (i64, i64) {
        to_texture_space(screen_x, screen_y, self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fit.rs"]
mod tests;
