use crate::foundation::core::Rgb;
use crate::masks::color_map::{ColorMap, SegmentId};
use crate::render::cpu::coverage_to_alpha;
use crate::render::sampler::PixelSampler;
use crate::render::texture::Texture;
use crate::scene::layer::{Overlay, OverlayHandle, Sprite};
use crate::scene::manager::SceneManager;

/// Opacity of the highlighted-segment overlay.
pub const OVERLAY_OPACITY: f32 = 0.6;

/// Display state of the composite mask layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositeStyle {
    /// Whether the composite is drawn on screen.
    pub visible: bool,
    /// On-screen opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Default for CompositeStyle {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 0.5,
        }
    }
}

/// Result of decoding the composite mask under the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentHit {
    /// Segment under the pointer.
    pub segment_id: SegmentId,
    /// Its confidence.
    pub confidence: f64,
    /// Composite color that was decoded.
    pub color: Rgb,
    /// Texture-space pixel that was sampled.
    pub texel: (i64, i64),
}

type ClickListener = Box<dyn FnMut(OverlayHandle, SegmentId)>;

/// Manages the composite-mask layer, the single highlighted overlay and the color table.
pub struct MaskCompositor {
    color_map: ColorMap,
    on_click: ClickListener,
    next_handle: u64,
}

impl std::fmt::Debug for MaskCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskCompositor")
            .field("color_map", &self.color_map.len())
            .field("next_handle", &self.next_handle)
            .finish_non_exhaustive()
    }
}

impl Default for MaskCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskCompositor {
    /// Compositor with an empty color table and a no-op click listener.
    pub fn new() -> Self {
        Self {
            color_map: ColorMap::new(),
            on_click: Box::new(|_, _| {}),
            next_handle: 1,
        }
    }

    /// Create or replace the composite-mask layer.
    ///
    /// Returns `false` (and logs) when the scene is not initialized.
    pub fn set_composite(
        &mut self,
        scene: &mut SceneManager,
        mask: Texture,
        style: CompositeStyle,
    ) -> bool {
        let Some(layers) = scene.layers_mut() else {
            tracing::debug!("set_composite skipped: scene not initialized");
            return false;
        };
        layers.masks.composite = Some(
            Sprite::new(mask)
                .with_opacity(style.opacity)
                .with_visible(style.visible),
        );
        true
    }

    /// Change the composite opacity; a no-op while no composite exists.
    pub fn set_composite_opacity(&mut self, scene: &mut SceneManager, opacity: f32) {
        match scene.layers_mut().and_then(|l| l.masks.composite.as_mut()) {
            Some(sprite) => sprite.opacity = opacity.clamp(0.0, 1.0),
            None => tracing::debug!("composite opacity ignored: no composite layer"),
        }
    }

    /// Show or hide the composite; a no-op while no composite exists.
    pub fn set_composite_visible(&mut self, scene: &mut SceneManager, visible: bool) {
        match scene.layers_mut().and_then(|l| l.masks.composite.as_mut()) {
            Some(sprite) => sprite.visible = visible,
            None => tracing::debug!("composite visibility ignored: no composite layer"),
        }
    }

    /// Replace the color table that belongs to the current composite.
    pub fn set_color_map(&mut self, color_map: ColorMap) {
        self.color_map = color_map;
    }

    /// Current color table.
    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    /// Highlight `segment_id` with `mask`, replacing any previous overlay.
    ///
    /// The mask's background is made transparent so only the segment is tinted.
    pub fn add_overlay(
        &mut self,
        scene: &mut SceneManager,
        mask: Texture,
        segment_id: SegmentId,
    ) -> Option<OverlayHandle> {
        let Some(layers) = scene.layers_mut() else {
            tracing::debug!("add_overlay skipped: scene not initialized");
            return None;
        };
        let alpha = coverage_to_alpha(mask.premul_bytes());
        let tinted = match Texture::from_premul_rgba(mask.width(), mask.height(), &alpha) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("overlay for segment {segment_id} skipped: {e}");
                return None;
            }
        };
        let handle = OverlayHandle(self.next_handle);
        self.next_handle += 1;
        layers.masks.overlay = Some(Overlay {
            handle,
            segment_id,
            sprite: Sprite::new(tinted).with_opacity(OVERLAY_OPACITY),
        });
        Some(handle)
    }

    /// Remove the highlighted overlay, if any.
    pub fn clear_overlays(&mut self, scene: &mut SceneManager) {
        if let Some(layers) = scene.layers_mut() {
            layers.masks.overlay = None;
        }
    }

    /// Register the overlay click listener. The last registration wins.
    pub fn on_overlay_click(&mut self, listener: impl FnMut(OverlayHandle, SegmentId) + 'static) {
        self.on_click = Box::new(listener);
    }

    /// Route a pointer-down at display `(x, y)` to the overlay.
    ///
    /// The overlay is hit where its mask is non-background; a hit invokes the click listener
    /// and returns `true`.
    pub fn pointer_down(
        &mut self,
        scene: &SceneManager,
        sampler: &PixelSampler<'_>,
        x: f64,
        y: f64,
    ) -> bool {
        let (Some(vp), Some(layers)) = (scene.viewport(), scene.layers()) else {
            return false;
        };
        let Some(overlay) = layers.masks.overlay.as_ref() else {
            return false;
        };
        let (tx, ty) = vp.to_texture(x, y);
        match sampler.sample(&overlay.sprite, tx, ty) {
            Some(c) if !c.is_black() => {
                (self.on_click)(overlay.handle, overlay.segment_id);
                true
            }
            _ => false,
        }
    }

    /// Decode which segment lies under display position `(x, y)`.
    ///
    /// Background, anti-aliased edges and out-of-bounds positions yield `None`.
    pub fn decode_hover(
        &self,
        scene: &SceneManager,
        sampler: &PixelSampler<'_>,
        x: f64,
        y: f64,
    ) -> Option<SegmentHit> {
        let vp = scene.viewport()?;
        let composite = scene.layers()?.masks.composite.as_ref()?;
        let texel = vp.to_texture(x, y);
        let color = sampler.sample(composite, texel.0, texel.1)?;
        let info = self.color_map.lookup(color)?;
        Some(SegmentHit {
            segment_id: info.segment_id,
            confidence: info.confidence,
            color,
            texel,
        })
    }

    /// Drop the composite, overlay and color table.
    pub fn reset(&mut self, scene: &mut SceneManager) {
        self.color_map = ColorMap::new();
        if let Some(layers) = scene.layers_mut() {
            layers.masks.composite = None;
            layers.masks.overlay = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/masks/compositor.rs"]
mod tests;
