use crate::assets::decode::encode_png;
use crate::brush::stroke::{SelectionLayer, StrokeOp};
use crate::foundation::core::{Point, Size};
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::render::cpu::blit_over;
use crate::render::surface_pool::SurfacePool;
use crate::scene::manager::SceneManager;

/// Pointer input in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Button pressed at a position.
    Down {
        /// Display x.
        x: f64,
        /// Display y.
        y: f64,
    },
    /// Pointer moved to a position.
    Move {
        /// Display x.
        x: f64,
        /// Display y.
        y: f64,
    },
    /// Button released.
    Up,
    /// Pointer left the surface.
    Leave,
}

/// Default brush diameter in texture pixels.
pub const DEFAULT_BRUSH_DIAMETER: f64 = 20.0;

/// Freehand drawing state machine painting the selection layer.
#[derive(Clone, Debug)]
pub struct BrushEngine {
    drawing: bool,
    last_point: Option<Point>,
    diameter: f64,
    attached: bool,
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_DIAMETER)
    }
}

impl BrushEngine {
    /// Idle engine with the given brush diameter.
    pub fn new(diameter: f64) -> Self {
        Self {
            drawing: false,
            last_point: None,
            diameter: diameter.max(0.0),
            attached: false,
        }
    }

    /// Current brush diameter.
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Change the brush diameter for subsequent strokes.
    pub fn set_diameter(&mut self, diameter: f64) {
        self.diameter = diameter.max(0.0);
    }

    /// Return `true` between pointer-down and pointer-up/leave.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Return `true` while the pointer handlers are attached.
    pub fn is_enabled(&self) -> bool {
        self.attached
    }

    /// Attach or detach all pointer handlers at once.
    ///
    /// Enabling creates the selection layer if the scene has none. Returns `false` if the
    /// scene is not initialized, in which case nothing is attached.
    pub fn set_enabled(&mut self, scene: &mut SceneManager, enabled: bool) -> bool {
        self.drawing = false;
        self.last_point = None;
        if !enabled {
            self.attached = false;
            return true;
        }
        let Some(base_size) = scene.base_image().map(|b| b.size()) else {
            tracing::debug!("brush enable skipped: scene not initialized");
            return false;
        };
        let Some(layers) = scene.layers_mut() else {
            return false;
        };
        if layers.selection.as_ref().is_none_or(|s| s.size() != base_size) {
            layers.selection = Some(SelectionLayer::new(base_size));
        }
        self.attached = true;
        true
    }

    /// Feed one pointer event. Returns `true` if the event was consumed.
    pub fn handle(&mut self, scene: &mut SceneManager, event: PointerEvent) -> bool {
        if !self.attached {
            return false;
        }
        match event {
            PointerEvent::Down { x, y } => {
                let Some(p) = to_texture(scene, x, y) else {
                    return false;
                };
                self.drawing = true;
                self.last_point = Some(p);
                self.append(
                    scene,
                    StrokeOp::Dot {
                        center: p,
                        diameter: self.diameter,
                    },
                );
                true
            }
            PointerEvent::Move { x, y } => {
                if !self.drawing {
                    return false;
                }
                let Some(p) = to_texture(scene, x, y) else {
                    return false;
                };
                if let Some(prev) = self.last_point {
                    self.append(
                        scene,
                        StrokeOp::Segment {
                            from: prev,
                            to: p,
                            diameter: self.diameter,
                        },
                    );
                    self.append(
                        scene,
                        StrokeOp::Dot {
                            center: p,
                            diameter: self.diameter,
                        },
                    );
                }
                self.last_point = Some(p);
                true
            }
            PointerEvent::Up | PointerEvent::Leave => {
                let was_drawing = self.drawing;
                self.drawing = false;
                self.last_point = None;
                was_drawing
            }
        }
    }

    fn append(&self, scene: &mut SceneManager, op: StrokeOp) {
        match scene.layers_mut().and_then(|l| l.selection.as_mut()) {
            Some(selection) => selection.push(op),
            None => tracing::debug!("stroke dropped: selection layer missing"),
        }
    }

    /// Erase the selection content, keeping the layer.
    pub fn clear(&mut self, scene: &mut SceneManager) {
        if let Some(selection) = scene.layers_mut().and_then(|l| l.selection.as_mut()) {
            selection.clear();
        }
    }

    /// Return `true` if the selection layer has content of nonzero extent.
    pub fn has_selection(&self, scene: &SceneManager) -> bool {
        scene
            .layers()
            .and_then(|l| l.selection.as_ref())
            .is_some_and(SelectionLayer::has_selection)
    }

    /// Encode the selection as a PNG: white strokes on an opaque black base-image-sized
    /// background.
    #[tracing::instrument(skip_all)]
    pub fn export_selection(
        &self,
        scene: &mut SceneManager,
        pool: &SurfacePool,
    ) -> SegmenterResult<Vec<u8>> {
        let selection = scene
            .layers_mut()
            .and_then(|l| l.selection.as_mut())
            .ok_or_else(|| SegmenterError::not_ready("selection layer does not exist"))?;
        let raster = selection.raster()?;
        let size: Size = selection.size();

        let mut surface = pool.borrow(size)?;
        for px in surface.bytes_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
        blit_over(surface.bytes_mut(), size, &raster, 0, 0, 1.0)?;
        encode_png(surface.bytes(), size)
    }
}

fn to_texture(scene: &SceneManager, x: f64, y: f64) -> Option<Point> {
    let vp = scene.viewport()?;
    let (tx, ty) = vp.to_texture(x, y);
    Some(Point::new(tx as f64, ty as f64))
}

#[cfg(test)]
#[path = "../../tests/unit/brush/engine.rs"]
mod tests;
