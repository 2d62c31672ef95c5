use vello_cpu::kurbo::Shape as _;

use crate::foundation::core::{Point, Rect, Size};
use crate::foundation::error::SegmenterResult;
use crate::render::texture::{Texture, surface_dims};
use crate::scene::layer::Sprite;

const STROKE_TOLERANCE: f64 = 0.1;

/// Opacity used when showing the selection on screen.
const SELECTION_DISPLAY_OPACITY: f32 = 0.5;

/// One appended brush operation, in texture space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeOp {
    /// Filled circle.
    Dot {
        /// Circle center.
        center: Point,
        /// Circle diameter.
        diameter: f64,
    },
    /// Round-capped line from `from` to `to`.
    Segment {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Line width.
        diameter: f64,
    },
}

impl StrokeOp {
    fn bounds(&self) -> Rect {
        match *self {
            StrokeOp::Dot { center, diameter } => {
                let r = diameter.max(0.0) / 2.0;
                Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
            }
            StrokeOp::Segment { from, to, diameter } => {
                let r = diameter.max(0.0) / 2.0;
                Rect::from_points(from, to).inflate(r, r)
            }
        }
    }
}

/// Append-only log of brush operations; the raster is always derived from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeLog {
    ops: Vec<StrokeOp>,
}

impl StrokeLog {
    /// Append one operation.
    pub fn push(&mut self, op: StrokeOp) {
        self.ops.push(op);
    }

    /// Recorded operations in order.
    pub fn ops(&self) -> &[StrokeOp] {
        &self.ops
    }

    /// Return `true` when nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Union of all operation bounds, or `None` for an empty log.
    pub fn bounds(&self) -> Option<Rect> {
        self.ops
            .iter()
            .map(StrokeOp::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Rasterize the log as white strokes on a transparent `size` raster.
    pub fn rasterize(&self, size: Size) -> SegmenterResult<Texture> {
        let (w, h) = surface_dims(size.width, size.height)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for op in &self.ops {
            match *op {
                StrokeOp::Dot { center, diameter } => fill_circle(&mut ctx, center, diameter),
                StrokeOp::Segment { from, to, diameter } => {
                    fill_capsule(&mut ctx, from, to, diameter)
                }
            }
        }
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(Texture::from_pixmap(pixmap))
    }
}

fn cpu_point(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn fill_circle(ctx: &mut vello_cpu::RenderContext, center: Point, diameter: f64) {
    if diameter <= 0.0 {
        return;
    }
    let circle = vello_cpu::kurbo::Circle::new(cpu_point(center), diameter / 2.0);
    ctx.fill_path(&circle.to_path(STROKE_TOLERANCE));
}

/// Round-capped, round-joined line: a quad along the segment plus end discs.
fn fill_capsule(ctx: &mut vello_cpu::RenderContext, from: Point, to: Point, diameter: f64) {
    if diameter <= 0.0 {
        return;
    }
    let r = diameter / 2.0;
    let d = to - from;
    let len = d.hypot();
    if len > f64::EPSILON {
        let n = kurbo::Vec2::new(-d.y / len * r, d.x / len * r);
        let mut quad = vello_cpu::kurbo::BezPath::new();
        quad.move_to(cpu_point(from + n));
        quad.line_to(cpu_point(to + n));
        quad.line_to(cpu_point(to - n));
        quad.line_to(cpu_point(from - n));
        quad.close_path();
        ctx.fill_path(&quad);
    }
    fill_circle(ctx, from, diameter);
    fill_circle(ctx, to, diameter);
}

/// The user-authored selection: a stroke log plus its cached raster.
#[derive(Clone, Debug)]
pub struct SelectionLayer {
    size: Size,
    log: StrokeLog,
    raster: Option<Texture>,
}

impl SelectionLayer {
    /// Empty selection covering a `size` base image.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            log: StrokeLog::default(),
            raster: None,
        }
    }

    /// Raster size (the base image size).
    pub fn size(&self) -> Size {
        self.size
    }

    /// The recorded strokes.
    pub fn log(&self) -> &StrokeLog {
        &self.log
    }

    /// Append an operation and invalidate the cached raster.
    pub fn push(&mut self, op: StrokeOp) {
        self.log.push(op);
        self.raster = None;
    }

    /// Erase all strokes; the layer itself stays.
    pub fn clear(&mut self) {
        self.log = StrokeLog::default();
        self.raster = None;
    }

    /// Return `true` if the strokes cover a region of nonzero extent.
    pub fn has_selection(&self) -> bool {
        self.log
            .bounds()
            .is_some_and(|b| b.width() > 0.0 && b.height() > 0.0)
    }

    /// Raster derived from the log (cached until the next edit).
    pub fn raster(&mut self) -> SegmenterResult<Texture> {
        if let Some(r) = &self.raster {
            return Ok(r.clone());
        }
        let r = self.log.rasterize(self.size)?;
        self.raster = Some(r.clone());
        Ok(r)
    }

    /// Sprite used to show the selection on screen, if there is anything to show.
    ///
    /// Goes through [`SelectionLayer::raster`], so repeated frames reuse the cached raster.
    pub(crate) fn display_sprite(&mut self) -> Option<Sprite> {
        if self.log.is_empty() {
            return None;
        }
        match self.raster() {
            Ok(texture) => Some(Sprite::new(texture).with_opacity(SELECTION_DISPLAY_OPACITY)),
            Err(e) => {
                tracing::warn!("selection raster unavailable: {e}");
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_raster_cached(&self) -> bool {
        self.raster.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/stroke.rs"]
mod tests;
