/// Convenience result type used across the engine.
pub type SegmenterResult<T> = Result<T, SegmenterError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Missing layers and unloaded textures are mostly *not* errors: those operations log and
/// become no-ops. `NotReady` is reserved for calls that must produce an artifact.
#[derive(thiserror::Error, Debug)]
pub enum SegmenterError {
    /// Invalid caller-provided parameters or malformed data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required layer or texture does not exist yet.
    #[error("not ready: {0}")]
    NotReady(String),

    /// A mask has no nonzero pixel, so no bounding box exists.
    #[error("empty mask: {0}")]
    EmptyMask(String),

    /// The external inference service failed or returned an unusable payload.
    #[error("service error: {0}")]
    Service(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SegmenterError {
    /// Build a [`SegmenterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SegmenterError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`SegmenterError::EmptyMask`] value.
    pub fn empty_mask(msg: impl Into<String>) -> Self {
        Self::EmptyMask(msg.into())
    }

    /// Build a [`SegmenterError::Service`] value.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`SegmenterError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for the degenerate-geometry case.
    pub fn is_empty_mask(&self) -> bool {
        matches!(self, Self::EmptyMask(_))
    }
}

impl From<serde_json::Error> for SegmenterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
