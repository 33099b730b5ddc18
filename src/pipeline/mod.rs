//! Frame pipeline: marker scan, mask lookup, compositing, name extraction and scaffold cleanup.
//!
//! Every recoverable failure degrades to the unmasked frame. [`FramePipeline::process`] always
//! yields an [`Artifact`]; what happened is reported through [`Diagnostics`].

pub mod layout;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assets::mask_cache::MaskCache;
use crate::config::KioskConfig;
use crate::effects::bitmask::apply_bitmask;
use crate::foundation::core::{Point, RawFrame};
use crate::marker::{InversionPolicy, MarkerDecoder, MarkerScan, scan_marker};

use self::layout::SheetLayout;

/// The extracted drawing and, when the sheet has room for one, the visitor's name.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    /// Same dimensions as the captured frame.
    pub drawing: RawFrame,
    pub name: Option<RawFrame>,
}

impl Artifact {
    /// Unmasked fallback.
    pub fn unmasked(frame: RawFrame) -> Self {
        Self {
            drawing: frame,
            name: None,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.drawing.size()
    }
}

/// How far a frame got through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Masked,
    MarkerNotFound,
    MaskUnavailable,
    CompositeFailed,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MarkerDiagnostics {
    pub attempts: u32,
    pub succeeded_with: Option<InversionPolicy>,
    pub identifier: Option<String>,
    pub location: Option<[Point; 4]>,
    pub elapsed_ms: f64,
}

impl From<&MarkerScan> for MarkerDiagnostics {
    fn from(scan: &MarkerScan) -> Self {
        Self {
            attempts: scan.attempts,
            succeeded_with: scan.succeeded_with,
            identifier: scan.marker.as_ref().map(|m| m.identifier.clone()),
            location: scan.marker.as_ref().map(|m| m.location),
            elapsed_ms: millis(scan.elapsed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MaskDiagnostics {
    pub identifier: String,
    pub cache_hit: bool,
    pub elapsed_ms: f64,
    pub error: Option<String>,
}

/// Informational record of one pipeline run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostics {
    pub outcome: Outcome,
    pub marker: MarkerDiagnostics,
    pub mask: Option<MaskDiagnostics>,
    pub composite_error: Option<String>,
    pub processing_ms: f64,
}

/// Pipeline output.
#[derive(Clone, Debug)]
pub struct Processed {
    pub artifact: Artifact,
    pub diagnostics: Diagnostics,
}

pub struct FramePipeline {
    decoder: Arc<dyn MarkerDecoder>,
    cache: Arc<MaskCache>,
    white_threshold: u8,
    layout: SheetLayout,
}

impl std::fmt::Debug for FramePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePipeline")
            .field("cache", &self.cache)
            .field("white_threshold", &self.white_threshold)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl FramePipeline {
    pub fn new(
        decoder: Arc<dyn MarkerDecoder>,
        cache: Arc<MaskCache>,
        config: &KioskConfig,
    ) -> Self {
        Self {
            decoder,
            cache,
            white_threshold: config.white_threshold,
            layout: config.layout,
        }
    }

    /// Pipeline with the built-in QR decoder and a filesystem mask cache from `config`.
    #[cfg(feature = "qr")]
    pub fn from_config(config: &KioskConfig) -> Self {
        let cache = MaskCache::from_dir(config.masks_dir.clone(), config.mask_extension.clone());
        Self::new(
            Arc::new(crate::marker::qr::QrDecoder::new()),
            Arc::new(cache),
            config,
        )
    }

    pub fn cache(&self) -> &Arc<MaskCache> {
        &self.cache
    }

    #[tracing::instrument(skip(self, frame), fields(w = frame.width(), h = frame.height()))]
    pub async fn process(&self, frame: RawFrame) -> Processed {
        let start = Instant::now();
        let (w, h) = frame.size();

        let scan = scan_marker(
            self.decoder.as_ref(),
            &frame,
            self.layout.marker_search_region(w, h),
        )
        .await;
        let marker_diag = MarkerDiagnostics::from(&scan);

        let Some(marker) = scan.marker else {
            return finish(
                Artifact::unmasked(frame),
                Diagnostics {
                    outcome: Outcome::MarkerNotFound,
                    marker: marker_diag,
                    mask: None,
                    composite_error: None,
                    processing_ms: 0.0,
                },
                start,
            );
        };

        let lookup_start = Instant::now();
        let lookup = match self.cache.get(&marker.identifier).await {
            Ok(lookup) => lookup,
            Err(err) => {
                return finish(
                    Artifact::unmasked(frame),
                    Diagnostics {
                        outcome: Outcome::MaskUnavailable,
                        marker: marker_diag,
                        mask: Some(MaskDiagnostics {
                            identifier: marker.identifier,
                            cache_hit: false,
                            elapsed_ms: millis(lookup_start.elapsed()),
                            error: Some(err.to_string()),
                        }),
                        composite_error: None,
                        processing_ms: 0.0,
                    },
                    start,
                );
            }
        };
        let mask_diag = MaskDiagnostics {
            identifier: marker.identifier,
            cache_hit: lookup.cache_hit,
            elapsed_ms: millis(lookup.elapsed),
            error: None,
        };

        let masked = match apply_bitmask(&frame, &lookup.mask, self.white_threshold) {
            Ok(masked) => masked,
            Err(err) => {
                return finish(
                    Artifact::unmasked(frame),
                    Diagnostics {
                        outcome: Outcome::CompositeFailed,
                        marker: marker_diag,
                        mask: Some(mask_diag),
                        composite_error: Some(err.to_string()),
                        processing_ms: 0.0,
                    },
                    start,
                );
            }
        };

        let artifact = self.extract(masked);
        finish(
            artifact,
            Diagnostics {
                outcome: Outcome::Masked,
                marker: marker_diag,
                mask: Some(mask_diag),
                composite_error: None,
                processing_ms: 0.0,
            },
            start,
        )
    }

    /// Cut the name strip out of the masked frame, then clear the printed scaffold squares.
    fn extract(&self, mut drawing: RawFrame) -> Artifact {
        let (w, h) = drawing.size();

        let name = self
            .layout
            .name_region(w, h)
            .and_then(|rect| match drawing.crop(rect) {
                Ok(name) => Some(name),
                Err(err) => {
                    tracing::warn!(error = %err, ?rect, "name strip not extracted");
                    None
                }
            });

        let squares = [
            self.layout.marker_square(w, h),
            self.layout.orientation_square(w, h),
        ];
        for square in squares.into_iter().flatten() {
            drawing.clear_rect(square);
        }

        Artifact { drawing, name }
    }
}

fn finish(artifact: Artifact, mut diagnostics: Diagnostics, start: Instant) -> Processed {
    diagnostics.processing_ms = millis(start.elapsed());
    match diagnostics.outcome {
        Outcome::Masked => tracing::debug!(
            ms = diagnostics.processing_ms,
            name = artifact.name.is_some(),
            "frame masked"
        ),
        outcome => tracing::warn!(?outcome, ms = diagnostics.processing_ms, "using unmasked frame"),
    }
    Processed {
        artifact,
        diagnostics,
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/process.rs"]
mod tests;
