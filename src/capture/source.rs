use std::path::Path;

use anyhow::Context as _;
use async_trait::async_trait;

use crate::assets::decode::{decode_frame, sniff_format};
use crate::foundation::core::RawFrame;
use crate::foundation::error::{KioskError, KioskResult};

/// Anything that can hand the pipeline one still frame: a camera, an upload.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn grab(&self) -> KioskResult<RawFrame>;

    fn describe(&self) -> String {
        "frame source".to_string()
    }
}

/// A user-supplied still image.
#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    /// Declared media type, if the client sent one.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime,
            bytes,
        }
    }

    /// Read a file from disk as an upload without a declared media type.
    pub async fn from_path(path: &Path) -> KioskResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read upload '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, None, bytes))
    }
}

/// Reject anything that is not a raster image before it reaches the pipeline.
pub fn validate_upload(upload: &Upload) -> KioskResult<image::ImageFormat> {
    if let Some(mime) = upload.mime.as_deref() {
        let is_image = mime
            .trim()
            .get(..6)
            .is_some_and(|p| p.eq_ignore_ascii_case("image/"));
        if !is_image {
            return Err(KioskError::unsupported_file_type(format!(
                "'{}' is {mime}, please select an image file",
                upload.file_name
            )));
        }
    }
    sniff_format(&upload.bytes).ok_or_else(|| {
        KioskError::unsupported_file_type(format!(
            "'{}' is not a recognized image, please select an image file",
            upload.file_name
        ))
    })
}

/// [`FrameSource`] over a validated upload.
#[derive(Clone, Debug)]
pub struct UploadSource {
    upload: Upload,
}

impl UploadSource {
    pub fn new(upload: Upload) -> Self {
        Self { upload }
    }
}

#[async_trait]
impl FrameSource for UploadSource {
    async fn grab(&self) -> KioskResult<RawFrame> {
        decode_frame(&self.upload.bytes)
    }

    fn describe(&self) -> String {
        format!("upload '{}'", self.upload.file_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/source.rs"]
mod tests;
