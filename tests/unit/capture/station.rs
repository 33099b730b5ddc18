use std::sync::Arc;

use async_trait::async_trait;

use super::*;
use crate::assets::mask_cache::{MaskBitmap, MaskCache, MaskSource};
use crate::foundation::core::RawFrame;
use crate::marker::{DecodedMarker, InversionPolicy, MarkerDecoder};
use crate::pipeline::Outcome;

struct NoMarker;

impl MarkerDecoder for NoMarker {
    fn decode(&self, _region: &RawFrame, _policy: InversionPolicy) -> Option<DecodedMarker> {
        None
    }
}

struct NoMasks;

#[async_trait]
impl MaskSource for NoMasks {
    async fn load(&self, identifier: &str) -> anyhow::Result<MaskBitmap> {
        anyhow::bail!("no mask for {identifier}")
    }
}

struct StillCamera(RawFrame);

#[async_trait]
impl FrameSource for StillCamera {
    async fn grab(&self) -> KioskResult<RawFrame> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "still camera".into()
    }
}

struct BrokenCamera;

#[async_trait]
impl FrameSource for BrokenCamera {
    async fn grab(&self) -> KioskResult<RawFrame> {
        Err(KioskError::decode("sensor returned garbage"))
    }
}

fn station() -> CaptureStation {
    let config = KioskConfig::default();
    let pipeline = FramePipeline::new(
        Arc::new(NoMarker),
        Arc::new(MaskCache::new(NoMasks)),
        &config,
    );
    CaptureStation::with_seed(pipeline, &config, 7)
}

fn png_upload() -> Upload {
    let frame = RawFrame::filled(64, 48, [200, 10, 10, 255]).unwrap();
    Upload::new(
        "sheet.png",
        Some("image/png".into()),
        crate::assets::decode::encode_png(&frame).unwrap(),
    )
}

#[tokio::test]
async fn upload_without_marker_is_delivered_unmasked() {
    let st = station();
    let outcome = st.capture_upload(png_upload()).await;
    let delivery = outcome.into_delivery().unwrap();
    assert_eq!(delivery.artifact.size(), (64, 48));
    assert_eq!(delivery.diagnostics.outcome, Outcome::MarkerNotFound);
    assert!(delivery.placement.scale <= 1.0);
    assert!(matches!(st.status(), Status::Success(_)));
    assert!(!st.is_busy());
}

#[tokio::test]
async fn unsupported_upload_is_rejected_without_touching_the_gate() {
    let st = station();
    let up = Upload::new("notes.txt", Some("text/plain".into()), b"hello".to_vec());
    let outcome = st.capture_upload(up).await;
    assert!(matches!(
        outcome,
        CaptureOutcome::Rejected(KioskError::UnsupportedFileType(_))
    ));
    assert!(!st.is_busy());
    assert!(matches!(st.status(), Status::Error(_)));
}

#[tokio::test]
async fn camera_failure_is_surfaced_once_and_uploads_still_work() {
    let mut st = station();
    let err = st
        .attach_camera(Err(KioskError::capture_unavailable("permission denied")))
        .unwrap_err();
    assert!(matches!(err, KioskError::FrameCaptureUnavailable(_)));
    assert!(!st.has_camera());

    assert!(matches!(
        st.capture_camera().await,
        CaptureOutcome::Rejected(KioskError::FrameCaptureUnavailable(_))
    ));
    assert!(st.capture_upload(png_upload()).await.delivery().is_some());
}

#[tokio::test]
async fn camera_frames_go_through_the_pipeline() {
    let mut st = station();
    let frame = RawFrame::filled(32, 32, [1, 2, 3, 255]).unwrap();
    st.attach_camera(Ok(Box::new(StillCamera(frame.clone()))))
        .unwrap();
    let outcome = st.capture_camera().await;
    let delivery = outcome.delivery().unwrap();
    assert_eq!(delivery.artifact.drawing, frame);
}

#[tokio::test]
async fn unreadable_frame_fails_and_releases_the_gate() {
    let mut st = station();
    st.attach_camera(Ok(Box::new(BrokenCamera))).unwrap();
    let outcome = st.capture_camera().await;
    let CaptureOutcome::Failed(err) = outcome else {
        panic!("expected a failed capture, got {outcome:?}");
    };
    assert!(matches!(err, KioskError::Decode(_)));
    assert!(!st.is_busy());
    assert!(matches!(st.status(), Status::Error(_)));
}

#[tokio::test]
async fn same_seed_gives_same_placement() {
    let a = station().capture_upload(png_upload()).await;
    let b = station().capture_upload(png_upload()).await;
    let (a, b) = (a.into_delivery().unwrap(), b.into_delivery().unwrap());
    assert_eq!(a.placement, b.placement);
}
