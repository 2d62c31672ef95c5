use std::sync::Arc;

use crate::assets::decode::{decode_image, encode_texture_png};
use crate::brush::stroke::SelectionLayer;
use crate::foundation::core::{FrameRGBA, Size};
use crate::foundation::error::SegmenterResult;
use crate::geometry::fit::Viewport;
use crate::render::cpu::render_layers;
use crate::render::texture::Texture;
use crate::scene::layer::LayerTree;

/// Decoded base image plus the encoded bytes it came from.
#[derive(Clone, Debug)]
pub struct BaseImage {
    texture: Texture,
    encoded: Arc<Vec<u8>>,
}

impl BaseImage {
    /// Decode an encoded image, retaining the original bytes for service uploads.
    pub fn decode(bytes: Vec<u8>) -> SegmenterResult<Self> {
        let texture = decode_image(&bytes)?;
        Ok(Self {
            texture,
            encoded: Arc::new(bytes),
        })
    }

    /// Wrap an already decoded texture, encoding it as PNG for uploads.
    pub fn from_texture(texture: Texture) -> SegmenterResult<Self> {
        let encoded = encode_texture_png(&texture)?;
        Ok(Self {
            texture,
            encoded: Arc::new(encoded),
        })
    }

    /// Decoded raster.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Natural pixel size.
    pub fn size(&self) -> Size {
        self.texture.size()
    }

    /// Original encoded bytes.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InitState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Proof that this caller holds the initialization latch. Hand it back to
/// [`SceneManager::finish_init`] once the image has been decoded.
#[derive(Debug)]
#[must_use = "the scene stays latched until the ticket is passed to finish_init"]
pub struct InitTicket {
    max_w: f64,
    max_h: f64,
}

/// Owns the rendering surface, the base image and the fixed set of layer slots.
///
/// Layers are reached through typed accessors that return `None` until the scene is
/// initialized; callers treat that as "not available yet".
#[derive(Debug)]
pub struct SceneManager {
    state: InitState,
    max_w: f64,
    max_h: f64,
    device_pixel_ratio: f64,
    base: Option<BaseImage>,
    viewport: Option<Viewport>,
    layers: Option<LayerTree>,
}

impl SceneManager {
    /// Uninitialized scene using `device_pixel_ratio` for its backing surface.
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            state: InitState::Uninitialized,
            max_w: 0.0,
            max_h: 0.0,
            device_pixel_ratio,
            base: None,
            viewport: None,
            layers: None,
        }
    }

    /// Take the initialization latch.
    ///
    /// Returns `None` if initialization is already in flight or complete, so rapid
    /// image-change events cannot construct the surface twice.
    pub fn begin_init(&mut self, max_w: f64, max_h: f64) -> Option<InitTicket> {
        if self.state != InitState::Uninitialized {
            tracing::debug!(state = ?self.state, "scene init skipped");
            return None;
        }
        self.state = InitState::Initializing;
        Some(InitTicket { max_w, max_h })
    }

    /// Complete initialization with the decoded image (or release the latch on failure).
    #[tracing::instrument(skip(self, image))]
    pub fn finish_init(
        &mut self,
        ticket: InitTicket,
        image: SegmenterResult<BaseImage>,
    ) -> SegmenterResult<()> {
        let image = match image {
            Ok(img) => img,
            Err(e) => {
                self.state = InitState::Uninitialized;
                return Err(e);
            }
        };
        self.max_w = ticket.max_w;
        self.max_h = ticket.max_h;
        self.viewport = Some(Viewport::fit(
            image.size(),
            self.max_w,
            self.max_h,
            self.device_pixel_ratio,
        ));
        self.layers = Some(LayerTree::new(image.texture().clone()));
        self.base = Some(image);
        self.state = InitState::Ready;
        tracing::debug!(surface = ?self.surface_size(), "scene initialized");
        Ok(())
    }

    /// Initialize with an already decoded image. Returns `false` if the scene was
    /// already initialized (or initializing) and nothing was built.
    pub fn init(&mut self, image: BaseImage, max_w: f64, max_h: f64) -> SegmenterResult<bool> {
        let Some(ticket) = self.begin_init(max_w, max_h) else {
            return Ok(false);
        };
        self.finish_init(ticket, Ok(image))?;
        Ok(true)
    }

    /// Decode `bytes` and initialize.
    pub fn init_from_bytes(
        &mut self,
        bytes: Vec<u8>,
        max_w: f64,
        max_h: f64,
    ) -> SegmenterResult<bool> {
        let Some(ticket) = self.begin_init(max_w, max_h) else {
            return Ok(false);
        };
        self.finish_init(ticket, BaseImage::decode(bytes))?;
        Ok(true)
    }

    /// Swap the base raster on the existing layer without rebuilding the surface.
    ///
    /// Before initialization this logs and does nothing; returns whether the swap happened.
    pub fn update_base_image(&mut self, image: BaseImage) -> bool {
        let Some(layers) = self.layers.as_mut() else {
            tracing::warn!("update_base_image called before scene init");
            return false;
        };
        layers.base.set_texture(Some(image.texture().clone()));
        self.viewport = Some(Viewport::fit(
            image.size(),
            self.max_w,
            self.max_h,
            self.device_pixel_ratio,
        ));
        self.base = Some(image);
        true
    }

    /// Recompute scale and surface size for a new container size.
    pub fn update_max_size(&mut self, max_w: f64, max_h: f64) {
        self.max_w = max_w;
        self.max_h = max_h;
        if let Some(base) = &self.base {
            self.viewport = Some(Viewport::fit(
                base.size(),
                max_w,
                max_h,
                self.device_pixel_ratio,
            ));
        }
    }

    /// Change the device-pixel ratio used for the backing surface.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        self.device_pixel_ratio = dpr;
        self.update_max_size(self.max_w, self.max_h);
    }

    /// Return `true` once the surface and layers exist.
    pub fn is_ready(&self) -> bool {
        self.state == InitState::Ready
    }

    /// Return `true` while an initialization ticket is outstanding.
    pub fn is_initializing(&self) -> bool {
        self.state == InitState::Initializing
    }

    /// Current viewport.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Backing surface size in device pixels.
    pub fn surface_size(&self) -> Option<Size> {
        self.viewport.as_ref().map(Viewport::surface_size)
    }

    /// Current base image.
    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base.as_ref()
    }

    /// Layer slots.
    pub fn layers(&self) -> Option<&LayerTree> {
        self.layers.as_ref()
    }

    /// Mutable layer slots.
    pub fn layers_mut(&mut self) -> Option<&mut LayerTree> {
        self.layers.as_mut()
    }

    /// Render all visible layers to the display surface.
    ///
    /// Refreshes the cached selection raster on the way.
    pub fn render_frame(&mut self) -> SegmenterResult<Option<FrameRGBA>> {
        let (Some(vp), Some(layers)) = (&self.viewport, &mut self.layers) else {
            tracing::debug!("render skipped: scene not initialized");
            return Ok(None);
        };
        let selection = layers
            .selection
            .as_mut()
            .and_then(SelectionLayer::display_sprite);
        render_layers(vp, layers, selection.as_ref()).map(Some)
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/manager.rs"]
mod tests;
