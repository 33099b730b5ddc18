//! Marker decoding contract and the retrying scan over the marker search region.

#[cfg(feature = "qr")]
pub mod qr;

use std::time::{Duration, Instant};

use crate::foundation::core::{PixelRect, Point, RawFrame};
use crate::foundation::error::{KioskError, KioskResult};

/// How a decoder treats light-on-dark versus dark-on-light codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionPolicy {
    /// Only try the pixels as captured.
    DontInvert,
    /// Try as captured, then inverted.
    AttemptBoth,
    /// Try inverted, then as captured.
    InvertFirst,
}

impl InversionPolicy {
    /// Order in which a scan tries the policies.
    pub const SCAN_ORDER: [InversionPolicy; 3] = [
        InversionPolicy::DontInvert,
        InversionPolicy::AttemptBoth,
        InversionPolicy::InvertFirst,
    ];

    /// Whether to decode the inverted image, in trial order (`false` = as captured).
    pub fn trial_order(self) -> &'static [bool] {
        match self {
            InversionPolicy::DontInvert => &[false],
            InversionPolicy::AttemptBoth => &[false, true],
            InversionPolicy::InvertFirst => &[true, false],
        }
    }
}

/// A decoded marker payload and its four corners.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecodedMarker {
    /// Opaque payload, used as a mask lookup key and file stem.
    pub identifier: String,
    /// Corner points; region-relative from a decoder, frame-relative after a scan.
    pub location: [Point; 4],
}

impl DecodedMarker {
    fn translated(mut self, dx: f64, dy: f64) -> Self {
        for p in &mut self.location {
            p.x += dx;
            p.y += dy;
        }
        self
    }
}

/// Decoding library seam: turns a region of pixels into a payload.
pub trait MarkerDecoder: Send + Sync {
    fn decode(&self, region: &RawFrame, policy: InversionPolicy) -> Option<DecodedMarker>;
}

impl<D: MarkerDecoder + ?Sized> MarkerDecoder for Box<D> {
    fn decode(&self, region: &RawFrame, policy: InversionPolicy) -> Option<DecodedMarker> {
        (**self).decode(region, policy)
    }
}

impl<D: MarkerDecoder + ?Sized> MarkerDecoder for std::sync::Arc<D> {
    fn decode(&self, region: &RawFrame, policy: InversionPolicy) -> Option<DecodedMarker> {
        (**self).decode(region, policy)
    }
}

/// Outcome of scanning a frame for its marker.
#[derive(Clone, Debug)]
pub struct MarkerScan {
    pub marker: Option<DecodedMarker>,
    pub region: Option<PixelRect>,
    pub attempts: u32,
    pub succeeded_with: Option<InversionPolicy>,
    pub elapsed: Duration,
}

impl MarkerScan {
    pub fn require(&self) -> KioskResult<&DecodedMarker> {
        self.marker.as_ref().ok_or(KioskError::MarkerNotFound)
    }
}

/// Scan `region` of `frame` with every [`InversionPolicy`] in [`InversionPolicy::SCAN_ORDER`],
/// stopping at the first success.
#[tracing::instrument(skip(decoder, frame))]
pub async fn scan_marker(
    decoder: &dyn MarkerDecoder,
    frame: &RawFrame,
    region: Option<PixelRect>,
) -> MarkerScan {
    let start = Instant::now();
    let mut scan = MarkerScan {
        marker: None,
        region,
        attempts: 0,
        succeeded_with: None,
        elapsed: Duration::ZERO,
    };

    let crop = match region.map(|r| frame.crop(r)) {
        Some(Ok(crop)) => crop,
        Some(Err(err)) => {
            tracing::warn!(error = %err, "marker region unavailable");
            scan.elapsed = start.elapsed();
            return scan;
        }
        None => {
            tracing::debug!("frame too small for a marker region");
            scan.elapsed = start.elapsed();
            return scan;
        }
    };
    let (dx, dy) = region
        .map(|r| (f64::from(r.x), f64::from(r.y)))
        .unwrap_or_default();

    for policy in InversionPolicy::SCAN_ORDER {
        scan.attempts += 1;
        if let Some(marker) = decoder.decode(&crop, policy) {
            tracing::debug!(?policy, identifier = %marker.identifier, "marker decoded");
            scan.marker = Some(marker.translated(dx, dy));
            scan.succeeded_with = Some(policy);
            break;
        }
        tokio::task::yield_now().await;
    }

    scan.elapsed = start.elapsed();
    if scan.marker.is_none() {
        tracing::info!(attempts = scan.attempts, "marker not found");
    }
    scan
}

#[cfg(test)]
#[path = "../../tests/unit/marker/scan.rs"]
mod tests;
