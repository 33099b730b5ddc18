/// Convenience result type used across the capture pipeline.
pub type KioskResult<T> = Result<T, KioskError>;

/// Top-level error taxonomy for capture, masking and placement.
///
/// Only [`KioskError::Decode`] and [`KioskError::Validation`] escape a capture as hard failures.
/// Marker and mask errors are converted into a degraded artifact at their stage boundary.
#[derive(thiserror::Error, Debug)]
pub enum KioskError {
    /// Invalid configuration, arguments or pixel buffers.
    #[error("validation error: {0}")]
    Validation(String),

    /// No marker could be decoded in the marker search region.
    #[error("marker not found")]
    MarkerNotFound,

    /// The mask bitmap for a decoded identifier could not be loaded.
    #[error("failed to load mask '{identifier}': {source}")]
    MaskLoad {
        /// Identifier that was looked up.
        identifier: String,
        /// Underlying cause (I/O, decode, invalid identifier).
        #[source]
        source: anyhow::Error,
    },

    /// An upload was not a raster image and never reached the pipeline.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The camera could not be opened or stopped delivering frames.
    #[error("frame capture unavailable: {0}")]
    FrameCaptureUnavailable(String),

    /// The source frame itself could not be read.
    #[error("decode error: {0}")]
    Decode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KioskError {
    /// Build a [`KioskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KioskError::MaskLoad`] value.
    pub fn mask_load(identifier: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::MaskLoad {
            identifier: identifier.into(),
            source: source.into(),
        }
    }

    /// Build a [`KioskError::UnsupportedFileType`] value.
    pub fn unsupported_file_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedFileType(msg.into())
    }

    /// Build a [`KioskError::FrameCaptureUnavailable`] value.
    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::FrameCaptureUnavailable(msg.into())
    }

    /// Build a [`KioskError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether the pipeline can continue with a degraded artifact after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MarkerNotFound | Self::MaskLoad { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
