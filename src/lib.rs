//! Drawing capture and masking for a drawing kiosk.
//!
//! A photographed sheet goes through [`CaptureStation`]:
//!
//! - the printed marker is decoded from the bottom-left corner ([`marker`])
//! - the mask for that marker is looked up once per session ([`MaskCache`])
//! - near-white mask pixels are cut out of the photo ([`apply_bitmask`])
//! - the visitor's name strip is extracted and the scaffold squares cleared ([`FramePipeline`])
//! - a themed spawn position and scale is chosen ([`place`])
//!
//! Anything short of an unreadable frame degrades to the unmasked photo instead of failing.
#![forbid(unsafe_code)]

pub mod assets;
pub mod capture;
pub mod config;
pub mod effects;
pub mod foundation;
pub mod marker;
pub mod pipeline;
pub mod placement;

pub use crate::assets::mask_cache::{FsMaskSource, MaskBitmap, MaskCache, MaskLookup, MaskSource};
pub use crate::capture::source::{FrameSource, Upload, UploadSource, validate_upload};
pub use crate::capture::status::{Status, StatusBoard};
pub use crate::capture::{CaptureOutcome, CaptureStation, Delivery};
pub use crate::config::KioskConfig;
pub use crate::effects::bitmask::apply_bitmask;
pub use crate::foundation::core::{PixelRect, Point, RawFrame, Rect, ScreenSize};
pub use crate::foundation::error::{KioskError, KioskResult};
#[cfg(feature = "qr")]
pub use crate::marker::qr::QrDecoder;
pub use crate::marker::{DecodedMarker, InversionPolicy, MarkerDecoder, MarkerScan, scan_marker};
pub use crate::pipeline::layout::SheetLayout;
pub use crate::pipeline::{Artifact, Diagnostics, FramePipeline, Outcome, Processed};
pub use crate::placement::{PlacementResult, Theme, place, place_with};
