use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::masks::compositor::CompositeStyle;
use crate::render::surface_pool::SurfacePoolOpts;

/// Environment variable overriding [`ServiceOpts::base_url`].
pub const ENV_API_URL: &str = "SEGMENTER_API_URL";
/// Environment variable overriding [`ServiceOpts::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "SEGMENTER_TIMEOUT_SECS";

/// Options for a [`crate::SegmentationCanvas`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasOpts {
    /// Brush diameter in texture pixels.
    pub brush_diameter: f64,
    /// Initial composite-mask opacity.
    pub composite_opacity: f32,
    /// Whether the composite mask starts visible.
    pub composite_visible: bool,
    /// Backing-surface device-pixel ratio.
    pub device_pixel_ratio: f64,
    /// Scratch surface pool limits.
    pub pool: SurfacePoolOpts,
}

impl Default for CanvasOpts {
    fn default() -> Self {
        Self {
            brush_diameter: 20.0,
            composite_opacity: 0.5,
            composite_visible: true,
            device_pixel_ratio: 1.0,
            pool: SurfacePoolOpts::default(),
        }
    }
}

impl CanvasOpts {
    pub(crate) fn composite_style(&self) -> CompositeStyle {
        CompositeStyle {
            visible: self.composite_visible,
            opacity: self.composite_opacity,
        }
    }
}

/// Where and how to reach the segmentation service.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServiceOpts {
    /// API root, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceOpts {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_owned(),
            timeout_secs: 120,
        }
    }
}

impl ServiceOpts {
    /// Defaults overridden by `SEGMENTER_API_URL` and `SEGMENTER_TIMEOUT_SECS`.
    pub fn from_env() -> SegmenterResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SegmenterResult<Self> {
        let mut opts = Self::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            opts.base_url = url.trim().to_owned();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            opts.timeout_secs = raw.trim().parse().map_err(|_| {
                SegmenterError::validation(format!(
                    "{ENV_TIMEOUT_SECS} must be an integer, got '{raw}'"
                ))
            })?;
        }
        Ok(opts)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
