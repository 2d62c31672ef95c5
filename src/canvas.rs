use std::sync::Arc;

use crate::assets::decode::decode_image;
use crate::brush::engine::{BrushEngine, PointerEvent};
use crate::config::CanvasOpts;
use crate::export::coordinator::{
    ExportArtifact, ExportCoordinator, ExportInputs, ExportRequest, ExportSource,
};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::masks::color_map::SegmentId;
use crate::masks::compositor::{MaskCompositor, SegmentHit};
use crate::masks::hover::{HoverTicket, HoverTracker};
use crate::render::sampler::PixelSampler;
use crate::render::surface_pool::{SurfacePool, SurfacePoolStats};
use crate::scene::layer::OverlayHandle;
use crate::scene::manager::{BaseImage, SceneManager};
use crate::service::client::SegmentationService;
use crate::service::model::{AutoSegmentParams, Segment, Segmentation, SegmentationResponse};

/// What pointer input currently does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Hover decodes segments; clicks hit the overlay.
    #[default]
    Select,
    /// Pointer paints the freehand selection.
    Draw,
}

/// The interactive segmentation canvas.
///
/// Owns the scene and every component attached to it. Rendering and sampling run
/// synchronously on the caller's thread; only service round-trips suspend.
pub struct SegmentationCanvas {
    opts: CanvasOpts,
    scene: SceneManager,
    pool: SurfacePool,
    compositor: MaskCompositor,
    brush: BrushEngine,
    hover: HoverTracker,
    segmentation: Option<Segmentation>,
    mode: InteractionMode,
}

impl Default for SegmentationCanvas {
    fn default() -> Self {
        Self::new(CanvasOpts::default())
    }
}

impl SegmentationCanvas {
    /// Empty canvas; nothing is drawn until an image is loaded.
    pub fn new(opts: CanvasOpts) -> Self {
        Self {
            scene: SceneManager::new(opts.device_pixel_ratio),
            pool: SurfacePool::new(opts.pool),
            compositor: MaskCompositor::new(),
            brush: BrushEngine::new(opts.brush_diameter),
            hover: HoverTracker::new(),
            segmentation: None,
            mode: InteractionMode::Select,
            opts,
        }
    }

    /// Decode `bytes` and show them, fitted inside `max_w x max_h`.
    ///
    /// The first load initializes the scene. Later loads swap the base raster in place and
    /// drop everything derived from the previous image.
    pub fn load_image(&mut self, bytes: Vec<u8>, max_w: f64, max_h: f64) -> SegmenterResult<()> {
        let image = BaseImage::decode(bytes)?;
        self.load_base(image, max_w, max_h)
    }

    /// [`Self::load_image`] for an already decoded image.
    pub fn load_base(&mut self, image: BaseImage, max_w: f64, max_h: f64) -> SegmenterResult<()> {
        if self.scene.is_ready() {
            self.reset();
            self.scene.update_max_size(max_w, max_h);
            self.scene.update_base_image(image);
            if self.mode == InteractionMode::Draw {
                self.brush.set_enabled(&mut self.scene, true);
            }
            return Ok(());
        }
        if !self.scene.init(image, max_w, max_h)? {
            tracing::debug!("image load ignored: scene initialization in flight");
            return Ok(());
        }
        if self.mode == InteractionMode::Draw {
            self.brush.set_enabled(&mut self.scene, true);
        }
        Ok(())
    }

    /// Refit to a new container size.
    pub fn resize(&mut self, max_w: f64, max_h: f64) {
        self.scene.update_max_size(max_w, max_h);
    }

    /// Change the device-pixel ratio of the backing surface.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        self.opts.device_pixel_ratio = dpr;
        self.scene.set_device_pixel_ratio(dpr);
    }

    /// Decode and show a segmentation result.
    ///
    /// Every mask is decoded before anything changes; on error the canvas is untouched.
    /// Returns the number of segments.
    #[tracing::instrument(skip_all, fields(segments = resp.segments.len()))]
    pub fn apply_segmentation(&mut self, resp: &SegmentationResponse) -> SegmenterResult<usize> {
        if !self.scene.is_ready() {
            return Err(SegmenterError::not_ready(
                "segmentation applied before an image was loaded",
            ));
        }
        let decoded = Segmentation::decode(resp)?;

        self.compositor.reset(&mut self.scene);
        self.hover.reset();
        if let Some(composite) = &decoded.composite {
            self.compositor.set_composite(
                &mut self.scene,
                composite.mask.clone(),
                self.opts.composite_style(),
            );
            self.compositor.set_color_map(composite.color_map.clone());
        }
        let n = decoded.segments.len();
        self.segmentation = Some(decoded);
        Ok(n)
    }

    /// Run automatic segmentation on the current image and apply the result.
    pub async fn auto_segment<S: SegmentationService>(
        &mut self,
        service: &S,
        params: &AutoSegmentParams,
    ) -> SegmenterResult<usize> {
        params.validate()?;
        let image = self.base_image()?;
        let resp = service.auto_segment(image.encoded(), params).await?;
        self.apply_segmentation(&resp)
    }

    /// Segment the current image guided by the freehand selection and apply the result.
    pub async fn segment_selection<S: SegmentationService>(
        &mut self,
        service: &S,
    ) -> SegmenterResult<usize> {
        let image = self.base_image()?;
        let selection = self.selection_png()?;
        let resp = service.mask_segment(image.encoded(), &selection).await?;
        self.apply_segmentation(&resp)
    }

    fn base_image(&self) -> SegmenterResult<BaseImage> {
        self.scene
            .base_image()
            .cloned()
            .ok_or_else(|| SegmenterError::not_ready("no image loaded"))
    }

    /// Segments of the current result, highest confidence first.
    pub fn segments(&self) -> &[Segment] {
        self.segmentation
            .as_ref()
            .map(|s| s.segments.as_slice())
            .unwrap_or_default()
    }

    /// Register a hover lookup for display `(x, y)`.
    pub fn begin_hover(&mut self, x: f64, y: f64) -> HoverTicket {
        self.hover.issue(x, y)
    }

    /// Resolve a hover ticket. Returns `false` if a newer ticket superseded it.
    pub fn resolve_hover(&mut self, ticket: HoverTicket) -> bool {
        let hit = self.decode_at(ticket.x, ticket.y);
        self.hover.resolve(ticket, hit)
    }

    /// Decode the segment under display `(x, y)` and make it the hovered segment.
    pub fn hover(&mut self, x: f64, y: f64) -> Option<SegmentHit> {
        let ticket = self.begin_hover(x, y);
        self.resolve_hover(ticket);
        self.hovered().copied()
    }

    /// Segment currently under the pointer.
    pub fn hovered(&self) -> Option<&SegmentHit> {
        self.hover.current()
    }

    fn decode_at(&self, x: f64, y: f64) -> Option<SegmentHit> {
        let sampler = PixelSampler::new(&self.pool);
        self.compositor.decode_hover(&self.scene, &sampler, x, y)
    }

    /// Highlight segment `id` as the single overlay.
    pub fn select_segment(&mut self, id: SegmentId) -> SegmenterResult<Option<OverlayHandle>> {
        let segmentation = self
            .segmentation
            .as_ref()
            .ok_or_else(|| SegmenterError::not_ready("no segmentation result"))?;
        let segment = segmentation
            .segment(id)
            .ok_or_else(|| SegmenterError::validation(format!("unknown segment {id}")))?;
        Ok(self
            .compositor
            .add_overlay(&mut self.scene, segment.mask.clone(), id))
    }

    /// Remove the highlighted overlay.
    pub fn clear_overlay(&mut self) {
        self.compositor.clear_overlays(&mut self.scene);
    }

    /// Register the overlay click listener; the last registration wins.
    pub fn on_overlay_click(&mut self, listener: impl FnMut(OverlayHandle, SegmentId) + 'static) {
        self.compositor.on_overlay_click(listener);
    }

    /// Change composite-mask opacity.
    pub fn set_composite_opacity(&mut self, opacity: f32) {
        self.opts.composite_opacity = opacity;
        self.compositor.set_composite_opacity(&mut self.scene, opacity);
    }

    /// Show or hide the composite mask.
    pub fn set_composite_visible(&mut self, visible: bool) {
        self.opts.composite_visible = visible;
        self.compositor.set_composite_visible(&mut self.scene, visible);
    }

    /// Feed pointer input according to the current mode. Returns `true` if consumed.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        match self.mode {
            InteractionMode::Draw => self.brush.handle(&mut self.scene, event),
            InteractionMode::Select => match event {
                PointerEvent::Down { x, y } => {
                    let sampler = PixelSampler::new(&self.pool);
                    self.compositor.pointer_down(&self.scene, &sampler, x, y)
                }
                PointerEvent::Move { x, y } => self.hover(x, y).is_some(),
                PointerEvent::Up => false,
                PointerEvent::Leave => {
                    self.hover.reset();
                    false
                }
            },
        }
    }

    /// Current interaction mode.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch interaction mode. Switching clears the freehand selection.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode == self.mode {
            return;
        }
        self.brush.clear(&mut self.scene);
        self.hover.reset();
        let enabled = self
            .brush
            .set_enabled(&mut self.scene, mode == InteractionMode::Draw);
        if !enabled {
            tracing::debug!("draw mode deferred until an image is loaded");
        }
        self.mode = mode;
    }

    /// Change the brush diameter.
    pub fn set_brush_diameter(&mut self, diameter: f64) {
        self.opts.brush_diameter = diameter;
        self.brush.set_diameter(diameter);
    }

    /// Erase the freehand selection.
    pub fn clear_selection(&mut self) {
        self.brush.clear(&mut self.scene);
    }

    /// Return `true` if something has been drawn.
    pub fn has_selection(&self) -> bool {
        self.brush.has_selection(&self.scene)
    }

    /// Encode the freehand selection as a white-on-black PNG.
    pub fn selection_png(&mut self) -> SegmenterResult<Vec<u8>> {
        self.brush.export_selection(&mut self.scene, &self.pool)
    }

    /// Snapshot the read-only inputs for an export from `source`.
    pub fn export_inputs(&mut self, source: ExportSource) -> SegmenterResult<ExportInputs> {
        let base = self.base_image()?;
        match source {
            ExportSource::Selection => {
                let png = self.selection_png()?;
                Ok(ExportInputs {
                    base,
                    mask: decode_image(&png)?,
                    mask_png: Arc::new(png),
                })
            }
            ExportSource::Segment(id) => {
                let segment = self
                    .segmentation
                    .as_ref()
                    .and_then(|s| s.segment(id))
                    .ok_or_else(|| SegmenterError::validation(format!("unknown segment {id}")))?;
                Ok(ExportInputs {
                    base,
                    mask: segment.mask.clone(),
                    mask_png: segment.mask_png.clone(),
                })
            }
        }
    }

    /// Produce one download artifact.
    pub async fn export<S: SegmentationService>(
        &mut self,
        service: &S,
        req: &ExportRequest,
    ) -> SegmenterResult<ExportArtifact> {
        let inputs = self.export_inputs(req.source)?;
        ExportCoordinator::new(service, &self.pool)
            .export(&inputs, req)
            .await
    }

    /// Drop the segmentation, overlay, hover state and freehand selection.
    pub fn reset(&mut self) {
        self.compositor.reset(&mut self.scene);
        self.brush.clear(&mut self.scene);
        self.hover.reset();
        self.segmentation = None;
    }

    /// Render the visible layers at display size.
    pub fn render_frame(&mut self) -> SegmenterResult<Option<FrameRGBA>> {
        self.scene.render_frame()
    }

    /// The underlying scene.
    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    /// Scratch-surface counters.
    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Current options.
    pub fn opts(&self) -> &CanvasOpts {
        &self.opts
    }
}

#[cfg(test)]
#[path = "../tests/unit/canvas.rs"]
mod tests;
