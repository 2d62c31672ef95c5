use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::config::ServiceOpts;
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::service::model::{AutoSegmentParams, MatteParams, MatteResponse, SegmentationResponse};

/// The external segmentation and matting backend.
///
/// Calls are the only suspension points of the engine. A failure is reported to the caller
/// and never touches canvas state.
#[allow(async_fn_in_trait)]
pub trait SegmentationService {
    /// Automatic whole-image segmentation.
    async fn auto_segment(
        &self,
        image: &[u8],
        params: &AutoSegmentParams,
    ) -> SegmenterResult<SegmentationResponse>;

    /// Segmentation guided by a white-on-black selection mask PNG.
    async fn mask_segment(
        &self,
        image: &[u8],
        selection_mask: &[u8],
    ) -> SegmenterResult<SegmentationResponse>;

    /// Alpha matting of `image` seeded by `mask`.
    async fn matte(
        &self,
        image: &[u8],
        mask: &[u8],
        params: &MatteParams,
    ) -> SegmenterResult<MatteResponse>;
}

/// [`SegmentationService`] over multipart HTTP.
#[derive(Clone, Debug)]
pub struct HttpSegmentationClient {
    http: reqwest::Client,
    base_url: String,
}

fn png_part(bytes: &[u8], file_name: &'static str) -> SegmenterResult<Part> {
    Part::bytes(bytes.to_vec())
        .file_name(file_name)
        .mime_str("image/png")
        .map_err(|e| SegmenterError::service(format!("build multipart part: {e}")))
}

impl HttpSegmentationClient {
    /// Build a client for `opts.base_url` with the configured request timeout.
    pub fn new(opts: &ServiceOpts) -> SegmenterResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| SegmenterError::service(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: opts.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> SegmenterResult<T> {
        let url = format!("{}/segment/{endpoint}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, "request failed: {e}");
                SegmenterError::service(format!("POST {url}: {e}"))
            })?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| SegmenterError::service(format!("read response from {url}: {e}")))?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            tracing::warn!(%url, %status, "service returned an error");
            return Err(SegmenterError::service(format!(
                "POST {url} returned {status}: {text}"
            )));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

impl SegmentationService for HttpSegmentationClient {
    #[tracing::instrument(skip(self, image))]
    async fn auto_segment(
        &self,
        image: &[u8],
        params: &AutoSegmentParams,
    ) -> SegmenterResult<SegmentationResponse> {
        params.validate()?;
        let form = Form::new()
            .part("file", png_part(image, "image.png")?)
            .text("points_per_side", params.points_per_side.to_string())
            .text("pred_iou_thresh", params.pred_iou_thresh.to_string())
            .text(
                "stability_score_thresh",
                params.stability_score_thresh.to_string(),
            );
        self.post("auto", form).await
    }

    #[tracing::instrument(skip_all)]
    async fn mask_segment(
        &self,
        image: &[u8],
        selection_mask: &[u8],
    ) -> SegmenterResult<SegmentationResponse> {
        let form = Form::new()
            .part("file", png_part(image, "image.png")?)
            .part("selection_mask", png_part(selection_mask, "selection.png")?);
        self.post("mask", form).await
    }

    #[tracing::instrument(skip(self, image, mask))]
    async fn matte(
        &self,
        image: &[u8],
        mask: &[u8],
        params: &MatteParams,
    ) -> SegmenterResult<MatteResponse> {
        params.validate()?;
        let form = Form::new()
            .part("file", png_part(image, "image.png")?)
            .part("mask", png_part(mask, "mask.png")?)
            .text("erosion_kernel_size", params.erosion_kernel_size.to_string())
            .text(
                "dilation_kernel_size",
                params.dilation_kernel_size.to_string(),
            )
            .text("max_size", params.max_size.to_string())
            .text("algorithm", params.algorithm.as_str());
        self.post("matte", form).await
    }
}
