//! Interactive segmentation canvas and mask-compositing engine.
//!
//! The engine shows a base image, overlays masks produced by an external segmentation
//! service, decodes which segment lies under the pointer, records a freehand selection and
//! extracts masked or cropped images of a segment.
//!
//! - Load an image into a [`SegmentationCanvas`]
//! - Apply a [`SegmentationResponse`] (or run one through a [`SegmentationService`])
//! - Hover, select and draw, then [`SegmentationCanvas::export`] an artifact
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod brush;
pub(crate) mod canvas;
pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod extract;
pub(crate) mod geometry;
pub(crate) mod masks;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod service;

pub use crate::foundation::core::{FrameRGBA, PixelRect, Point, Rect, Rgb, Size, Vec2};
pub use crate::foundation::error::{SegmenterError, SegmenterResult};

pub use crate::assets::decode::{decode_base64_png, decode_image, encode_png, encode_texture_png};
pub use crate::brush::engine::{BrushEngine, DEFAULT_BRUSH_DIAMETER, PointerEvent};
pub use crate::brush::stroke::{SelectionLayer, StrokeLog, StrokeOp};
pub use crate::canvas::{InteractionMode, SegmentationCanvas};
pub use crate::config::{CanvasOpts, ENV_API_URL, ENV_TIMEOUT_SECS, ServiceOpts};
pub use crate::export::coordinator::{
    ExportArtifact, ExportCoordinator, ExportInputs, ExportKind, ExportRequest, ExportSource,
};
pub use crate::extract::bbox::{bounding_box, bounding_box_rgba};
pub use crate::extract::extractor::{Extraction, extract};
pub use crate::geometry::fit::{Viewport, fit_dimensions, to_texture_space};
pub use crate::masks::color_map::{ColorKey, ColorMap, SegmentId, SegmentInfo};
pub use crate::masks::compositor::{CompositeStyle, MaskCompositor, OVERLAY_OPACITY, SegmentHit};
pub use crate::masks::hover::{HoverTicket, HoverTracker};
pub use crate::render::sampler::PixelSampler;
pub use crate::render::surface_pool::{
    ScopedSurface, SurfacePool, SurfacePoolOpts, SurfacePoolStats,
};
pub use crate::render::texture::Texture;
pub use crate::scene::layer::{
    BlendMode, LayerTree, MaskContainer, Overlay, OverlayHandle, Sprite,
};
pub use crate::scene::manager::{BaseImage, InitTicket, SceneManager};
pub use crate::service::client::{HttpSegmentationClient, SegmentationService};
pub use crate::service::model::{
    AutoSegmentParams, Composite, Matte, MatteParams, MatteResponse, MattingAlgorithm, Segment,
    Segmentation, SegmentationResponse, WireSegment,
};
