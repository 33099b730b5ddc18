//! Capture entry points: busy gate, status text and the station driving one capture end to end.

pub mod gate;
pub mod source;
pub mod status;

use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::KioskConfig;
use crate::foundation::core::ScreenSize;
use crate::foundation::error::{KioskError, KioskResult};
use crate::pipeline::{Artifact, Diagnostics, FramePipeline};
use crate::placement::{PlacementResult, Theme, place};

use self::gate::CaptureGate;
use self::source::{FrameSource, Upload, UploadSource, validate_upload};
use self::status::{Status, StatusBoard};

/// Everything the rendering layer needs to spawn a drawing.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub artifact: Artifact,
    pub placement: PlacementResult,
    pub diagnostics: Diagnostics,
}

#[derive(Debug)]
pub enum CaptureOutcome {
    /// Another capture was in flight; this request was dropped.
    Busy,
    /// Refused before the pipeline ran (unsupported upload, no camera).
    Rejected(KioskError),
    Completed(Box<Delivery>),
    /// The frame could not be read.
    Failed(KioskError),
}

impl CaptureOutcome {
    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            CaptureOutcome::Completed(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_delivery(self) -> KioskResult<Delivery> {
        match self {
            CaptureOutcome::Completed(d) => Ok(*d),
            CaptureOutcome::Busy => Err(KioskError::validation("capture already in progress")),
            CaptureOutcome::Rejected(err) | CaptureOutcome::Failed(err) => Err(err),
        }
    }
}

pub struct CaptureStation {
    pipeline: FramePipeline,
    gate: CaptureGate,
    status: Mutex<StatusBoard>,
    theme: Theme,
    screen: ScreenSize,
    rng: Mutex<StdRng>,
    camera: Option<Box<dyn FrameSource>>,
}

impl std::fmt::Debug for CaptureStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStation")
            .field("pipeline", &self.pipeline)
            .field("theme", &self.theme)
            .field("screen", &self.screen)
            .field("busy", &self.gate.is_busy())
            .field("camera", &self.camera.as_ref().map(|c| c.describe()))
            .finish_non_exhaustive()
    }
}

impl CaptureStation {
    pub fn new(pipeline: FramePipeline, config: &KioskConfig) -> Self {
        Self::with_rng(pipeline, config, StdRng::from_os_rng())
    }

    /// Station with reproducible placement draws.
    pub fn with_seed(pipeline: FramePipeline, config: &KioskConfig, seed: u64) -> Self {
        Self::with_rng(pipeline, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pipeline: FramePipeline, config: &KioskConfig, rng: StdRng) -> Self {
        Self {
            pipeline,
            gate: CaptureGate::new(),
            status: Mutex::new(StatusBoard::new(config.status_revert())),
            theme: config.theme,
            screen: config.screen,
            rng: Mutex::new(rng),
            camera: None,
        }
    }

    /// Install the camera, or surface why it could not be opened. Uploads keep working either way.
    pub fn attach_camera(&mut self, camera: KioskResult<Box<dyn FrameSource>>) -> KioskResult<()> {
        match camera {
            Ok(camera) => {
                tracing::info!(camera = %camera.describe(), "camera attached");
                self.camera = Some(camera);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "camera unavailable, uploads only");
                self.camera = None;
                let err = match err {
                    KioskError::FrameCaptureUnavailable(_) => err,
                    other => KioskError::capture_unavailable(other.to_string()),
                };
                self.set_status(Status::Error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn status(&self) -> Status {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }

    #[tracing::instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn capture_upload(&self, upload: Upload) -> CaptureOutcome {
        if let Err(err) = validate_upload(&upload) {
            tracing::info!(error = %err, "upload rejected");
            self.set_status(Status::Error(err.to_string()));
            return CaptureOutcome::Rejected(err);
        }
        self.run(&UploadSource::new(upload), "Drawing added successfully!")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn capture_camera(&self) -> CaptureOutcome {
        let Some(camera) = self.camera.as_deref() else {
            return CaptureOutcome::Rejected(KioskError::capture_unavailable("no camera attached"));
        };
        self.run(camera, "Drawing captured! Press SPACEBAR to capture another.")
            .await
    }

    async fn run(&self, source: &dyn FrameSource, success: &str) -> CaptureOutcome {
        let Some(_ticket) = self.gate.try_acquire() else {
            tracing::debug!(source = %source.describe(), "capture dropped, busy");
            return CaptureOutcome::Busy;
        };

        self.set_status(Status::Processing);
        let frame = match source.grab().await {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, source = %source.describe(), "frame unreadable");
                self.set_status(Status::Error(err.to_string()));
                return CaptureOutcome::Failed(err);
            }
        };

        self.set_status(Status::Scanning);
        let processed = self.pipeline.process(frame).await;

        let placement = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            place(self.theme, self.screen, processed.artifact.size(), &mut *rng)
        };
        tracing::info!(
            theme = %self.theme,
            outcome = ?processed.diagnostics.outcome,
            x = placement.x,
            y = placement.y,
            scale = placement.scale,
            "drawing delivered"
        );
        self.set_status(Status::Success(success.to_string()));

        CaptureOutcome::Completed(Box::new(Delivery {
            artifact: processed.artifact,
            placement,
            diagnostics: processed.diagnostics,
        }))
    }

    fn set_status(&self, status: Status) {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(status);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/station.rs"]
mod tests;
