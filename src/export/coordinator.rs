use std::fmt;
use std::sync::Arc;

use crate::assets::decode::{encode_png, encode_texture_png};
use crate::extract::bbox::bounding_box_rgba;
use crate::extract::extractor::extract;
use crate::foundation::core::Size;
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::masks::color_map::SegmentId;
use crate::render::cpu::{crop_rgba8, resample_nearest};
use crate::render::surface_pool::SurfacePool;
use crate::render::texture::Texture;
use crate::scene::manager::BaseImage;
use crate::service::client::SegmentationService;
use crate::service::model::{Matte, MatteParams};

/// Artifact kinds a user can download.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// The mask itself.
    Mask,
    /// Base image masked by the mask, full size.
    Segment,
    /// Base image masked by the mask, cropped to the mask's bounding box.
    Cutout,
}

impl ExportKind {
    fn stem(self) -> &'static str {
        match self {
            ExportKind::Mask => "mask",
            ExportKind::Segment => "segment",
            ExportKind::Cutout => "cutout",
        }
    }

    /// Download file name for this kind.
    pub fn file_name(self, refined: bool) -> String {
        if refined {
            format!("{}-refined.png", self.stem())
        } else {
            format!("{}.png", self.stem())
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Which mask an export is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportSource {
    /// The freehand selection.
    Selection,
    /// A segment from the current segmentation.
    Segment(SegmentId),
}

/// One download request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportRequest {
    /// What to produce.
    pub kind: ExportKind,
    /// Which mask to use.
    pub source: ExportSource,
    /// Send through the matting service first.
    pub refine: bool,
    /// Matting parameters, used when `refine` is set.
    pub matte: MatteParams,
}

impl ExportRequest {
    /// Unrefined request.
    pub fn new(kind: ExportKind, source: ExportSource) -> Self {
        Self {
            kind,
            source,
            refine: false,
            matte: MatteParams::default(),
        }
    }

    /// Builder-style refinement toggle.
    pub fn refined(mut self, matte: MatteParams) -> Self {
        self.refine = true;
        self.matte = matte;
        self
    }
}

/// An encoded download.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    /// Kind produced.
    pub kind: ExportKind,
    /// Suggested file name.
    pub file_name: String,
    /// PNG bytes.
    pub png: Vec<u8>,
}

/// Read-only snapshot of what an export needs. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ExportInputs {
    /// Base image.
    pub base: BaseImage,
    /// Decoded mask.
    pub mask: Texture,
    /// Encoded mask, exported verbatim for unrefined masks and uploaded for refinement.
    pub mask_png: Arc<Vec<u8>>,
}

/// Routes export requests to local extraction or to a matting round-trip.
///
/// Holds no per-request state, so independent requests may run concurrently.
pub struct ExportCoordinator<'a, S> {
    service: &'a S,
    pool: &'a SurfacePool,
}

impl<'a, S: SegmentationService> ExportCoordinator<'a, S> {
    /// Coordinator using `service` for refinement and `pool` for scratch surfaces.
    pub fn new(service: &'a S, pool: &'a SurfacePool) -> Self {
        Self { service, pool }
    }

    /// Produce exactly one artifact for `req`.
    #[tracing::instrument(skip(self, inputs), fields(kind = %req.kind, refine = req.refine))]
    pub async fn export(
        &self,
        inputs: &ExportInputs,
        req: &ExportRequest,
    ) -> SegmenterResult<ExportArtifact> {
        let png = if req.refine {
            let resp = self
                .service
                .matte(inputs.base.encoded(), &inputs.mask_png, &req.matte)
                .await?;
            let matte = Matte::decode(&resp)?;
            self.refined_png(&matte, req.kind)?
        } else {
            match req.kind {
                ExportKind::Mask => inputs.mask_png.as_ref().clone(),
                ExportKind::Segment => {
                    extract(inputs.base.texture(), &inputs.mask, false, self.pool)?.png
                }
                ExportKind::Cutout => {
                    extract(inputs.base.texture(), &inputs.mask, true, self.pool)?.png
                }
            }
        };
        Ok(ExportArtifact {
            kind: req.kind,
            file_name: req.kind.file_name(req.refine),
            png,
        })
    }

    fn refined_png(&self, matte: &Matte, kind: ExportKind) -> SegmenterResult<Vec<u8>> {
        match kind {
            ExportKind::Mask => encode_texture_png(&matte.alpha),
            ExportKind::Segment => Ok(matte.foreground_png.clone()),
            ExportKind::Cutout => {
                let size = matte.foreground.size();
                let mut alpha = self.pool.borrow(size)?;
                resample_nearest(alpha.bytes_mut(), size, &matte.alpha);
                let region = bounding_box_rgba(alpha.bytes(), size)
                    .ok_or_else(|| SegmenterError::empty_mask("refined alpha is empty"))?;
                let cropped = crop_rgba8(matte.foreground.premul_bytes(), size, region)?;
                encode_png(&cropped, Size::new(region.width, region.height))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/coordinator.rs"]
mod tests;
