//! Wire types exchanged with the segmentation/matting service and their decoded forms.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::assets::decode::decode_base64_png;
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::masks::color_map::{ColorMap, SegmentId, SegmentInfo};
use crate::render::texture::Texture;

/// Parameters of `POST /segment/auto`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AutoSegmentParams {
    /// Sampling grid density.
    pub points_per_side: u32,
    /// Predicted-IoU threshold in `[0, 1]`.
    pub pred_iou_thresh: f64,
    /// Stability-score threshold in `[0, 1]`.
    pub stability_score_thresh: f64,
}

impl Default for AutoSegmentParams {
    fn default() -> Self {
        Self {
            points_per_side: 32,
            pred_iou_thresh: 0.88,
            stability_score_thresh: 0.95,
        }
    }
}

fn unit_interval(name: &str, v: f64) -> SegmenterResult<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(SegmenterError::validation(format!(
            "{name} must be in [0, 1], got {v}"
        )));
    }
    Ok(())
}

fn positive(name: &str, v: u32) -> SegmenterResult<()> {
    if v == 0 {
        return Err(SegmenterError::validation(format!("{name} must be > 0")));
    }
    Ok(())
}

impl AutoSegmentParams {
    /// Reject out-of-range values before anything is sent.
    pub fn validate(&self) -> SegmenterResult<()> {
        positive("points_per_side", self.points_per_side)?;
        unit_interval("pred_iou_thresh", self.pred_iou_thresh)?;
        unit_interval("stability_score_thresh", self.stability_score_thresh)
    }
}

/// Matting algorithms offered by the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MattingAlgorithm {
    /// Closed-form matting.
    #[default]
    Cf,
    /// KNN matting.
    Knn,
    /// Learning-based digital matting.
    Lbdm,
    /// Large-kernel matting.
    Lkm,
}

impl MattingAlgorithm {
    /// Form value sent to the service.
    pub fn as_str(self) -> &'static str {
        match self {
            MattingAlgorithm::Cf => "cf",
            MattingAlgorithm::Knn => "knn",
            MattingAlgorithm::Lbdm => "lbdm",
            MattingAlgorithm::Lkm => "lkm",
        }
    }
}

impl fmt::Display for MattingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MattingAlgorithm {
    type Err = SegmenterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cf" => Ok(Self::Cf),
            "knn" => Ok(Self::Knn),
            "lbdm" => Ok(Self::Lbdm),
            "lkm" => Ok(Self::Lkm),
            other => Err(SegmenterError::validation(format!(
                "unknown matting algorithm '{other}' (expected cf, knn, lbdm or lkm)"
            ))),
        }
    }
}

/// Parameters of `POST /segment/matte`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MatteParams {
    /// Trimap erosion kernel size.
    pub erosion_kernel_size: u32,
    /// Trimap dilation kernel size.
    pub dilation_kernel_size: u32,
    /// Longest side the service works at.
    pub max_size: u32,
    /// Matting algorithm.
    pub algorithm: MattingAlgorithm,
}

impl Default for MatteParams {
    fn default() -> Self {
        Self {
            erosion_kernel_size: 10,
            dilation_kernel_size: 10,
            max_size: 1024,
            algorithm: MattingAlgorithm::Cf,
        }
    }
}

impl MatteParams {
    /// Reject zero kernel or size values.
    pub fn validate(&self) -> SegmenterResult<()> {
        positive("erosion_kernel_size", self.erosion_kernel_size)?;
        positive("dilation_kernel_size", self.dilation_kernel_size)?;
        positive("max_size", self.max_size)
    }
}

/// One segment as returned by the service.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WireSegment {
    /// Segment id.
    pub segment_id: SegmentId,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Base64 PNG mask.
    pub mask: String,
    /// `[x0, y0, x1, y1]` box reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    /// Mask pixel count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<u64>,
    /// Stability score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_score: Option<f64>,
    /// Predicted IoU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_iou: Option<f64>,
}

/// Response body of `/segment/auto` and `/segment/mask`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentationResponse {
    /// Detected segments.
    #[serde(default)]
    pub segments: Vec<WireSegment>,
    /// Base64 PNG composite; empty when nothing was found.
    #[serde(default, alias = "composite_mask")]
    pub semantic_mask: String,
    /// `"(r, g, b)"` to segment lookup.
    #[serde(default)]
    pub color_map: BTreeMap<String, SegmentInfo>,
    /// Server-side processing time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Response body of `/segment/matte`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatteResponse {
    /// Base64 PNG grayscale alpha.
    pub alpha_matte: String,
    /// Base64 PNG RGBA foreground.
    pub foreground: String,
    /// Base64 PNG trimap used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trimap: Option<String>,
    /// Base64 PNG of the image at working resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
    /// Server-side processing time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// A decoded segment. Immutable; shared by reference between layers and exports.
#[derive(Clone, Debug)]
pub struct Segment {
    /// Segment id.
    pub id: SegmentId,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Decoded mask raster.
    pub mask: Texture,
    /// Encoded mask as received.
    pub mask_png: Arc<Vec<u8>>,
    /// Service-reported box.
    pub bbox: Option<[f64; 4]>,
    /// Service-reported area.
    pub area: Option<u64>,
    /// Stability score.
    pub stability_score: Option<f64>,
    /// Predicted IoU.
    pub predicted_iou: Option<f64>,
}

impl Segment {
    /// Decode a wire segment's mask.
    pub fn decode(wire: &WireSegment) -> SegmenterResult<Self> {
        let (mask, png) = decode_base64_png(&wire.mask)?;
        Ok(Self {
            id: wire.segment_id,
            confidence: wire.confidence,
            mask,
            mask_png: Arc::new(png),
            bbox: wire.bbox,
            area: wire.area,
            stability_score: wire.stability_score,
            predicted_iou: wire.predicted_iou,
        })
    }
}

/// Composite mask with its color table.
#[derive(Clone, Debug)]
pub struct Composite {
    /// Decoded composite raster.
    pub mask: Texture,
    /// Encoded composite as received.
    pub mask_png: Arc<Vec<u8>>,
    /// Color lookup built together with the raster.
    pub color_map: ColorMap,
}

/// A fully decoded segmentation response.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Segments, highest confidence first.
    pub segments: Vec<Segment>,
    /// Composite; `None` when the service found nothing.
    pub composite: Option<Composite>,
    /// Server-side processing time in seconds.
    pub processing_time: Option<f64>,
}

impl Segmentation {
    /// Decode every payload in `resp`. Fails without partial output if any payload is bad.
    pub fn decode(resp: &SegmentationResponse) -> SegmenterResult<Self> {
        let mut segments = resp
            .segments
            .iter()
            .map(Segment::decode)
            .collect::<SegmenterResult<Vec<_>>>()?;
        segments.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let composite = if resp.semantic_mask.trim().is_empty() {
            None
        } else {
            let (mask, png) = decode_base64_png(&resp.semantic_mask)?;
            Some(Composite {
                mask,
                mask_png: Arc::new(png),
                color_map: ColorMap::from_wire(&resp.color_map)?,
            })
        };

        Ok(Self {
            segments,
            composite,
            processing_time: resp.processing_time,
        })
    }

    /// Segment with `id`.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }
}

/// A decoded matte response.
#[derive(Clone, Debug)]
pub struct Matte {
    /// Refined alpha.
    pub alpha: Texture,
    /// Refined RGBA foreground.
    pub foreground: Texture,
    /// Encoded foreground as received.
    pub foreground_png: Vec<u8>,
}

impl Matte {
    /// Decode the alpha and foreground payloads.
    pub fn decode(resp: &MatteResponse) -> SegmenterResult<Self> {
        let (alpha, _) = decode_base64_png(&resp.alpha_matte)?;
        let (foreground, foreground_png) = decode_base64_png(&resp.foreground)?;
        Ok(Self {
            alpha,
            foreground,
            foreground_png,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/model.rs"]
mod tests;
