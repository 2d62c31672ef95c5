use crate::foundation::core::{Rgb, Size};
use crate::foundation::math::unpremultiply_px;
use crate::render::cpu::blit_over;
use crate::render::surface_pool::SurfacePool;
use crate::scene::layer::Sprite;

/// Reads single pixels of a layer through an isolated off-screen render.
///
/// The target sprite is copied on its own into a 1x1 scratch surface with full opacity and
/// normal blending, so the decoded color is the texture's own color regardless of how the
/// layer is currently displayed. Each call borrows and returns its own surface.
pub struct PixelSampler<'p> {
    pool: &'p SurfacePool,
}

impl<'p> PixelSampler<'p> {
    /// Sample through `pool`'s scratch surfaces.
    pub fn new(pool: &'p SurfacePool) -> Self {
        Self { pool }
    }

    /// Straight RGB at texture pixel `(x, y)`.
    ///
    /// Returns `None` if the sprite has no texture yet or the coordinate is outside it.
    /// Fully transparent pixels read as black.
    pub fn sample(&self, sprite: &Sprite, x: i64, y: i64) -> Option<Rgb> {
        let Some(texture) = sprite.texture() else {
            tracing::debug!("sample skipped: texture not loaded");
            return None;
        };
        if !texture.size().contains(x, y) {
            return None;
        }

        let isolated = sprite.isolated();
        let tex = isolated.texture()?;
        let size = Size::new(1, 1);
        let mut surface = match self.pool.borrow(size) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("sample surface unavailable: {e}");
                return None;
            }
        };
        if let Err(e) = blit_over(surface.bytes_mut(), size, tex, x, y, isolated.opacity) {
            tracing::warn!("sample render failed: {e}");
            return None;
        }
        let px = surface.bytes();
        let [r, g, b, _] = unpremultiply_px([px[0], px[1], px[2], px[3]]);
        Some(Rgb::new(r, g, b))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sampler.rs"]
mod tests;
