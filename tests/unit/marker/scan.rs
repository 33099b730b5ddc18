use std::sync::Mutex;

use super::*;

/// Succeeds on the n-th call (1-based) and remembers the policies it saw.
struct NthCall {
    succeed_on: usize,
    seen: Mutex<Vec<(InversionPolicy, (u32, u32))>>,
}

impl NthCall {
    fn new(succeed_on: usize) -> Self {
        Self {
            succeed_on,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl MarkerDecoder for NthCall {
    fn decode(&self, region: &RawFrame, policy: InversionPolicy) -> Option<DecodedMarker> {
        let mut seen = self.seen.lock().unwrap();
        seen.push((policy, region.size()));
        (seen.len() == self.succeed_on).then(|| DecodedMarker {
            identifier: "sample42".to_string(),
            location: [
                Point::new(1.0, 1.0),
                Point::new(9.0, 1.0),
                Point::new(9.0, 9.0),
                Point::new(1.0, 9.0),
            ],
        })
    }
}

fn frame() -> RawFrame {
    RawFrame::filled(100, 50, [255, 255, 255, 255]).unwrap()
}

fn region() -> Option<PixelRect> {
    Some(PixelRect::new(0, 30, 20, 20))
}

#[tokio::test]
async fn first_policy_success_short_circuits() {
    let dec = NthCall::new(1);
    let scan = scan_marker(&dec, &frame(), region()).await;
    assert_eq!(scan.attempts, 1);
    assert_eq!(scan.succeeded_with, Some(InversionPolicy::DontInvert));
    assert_eq!(dec.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn policies_are_tried_in_fixed_order() {
    let dec = NthCall::new(3);
    let scan = scan_marker(&dec, &frame(), region()).await;
    assert_eq!(scan.attempts, 3);
    assert_eq!(scan.succeeded_with, Some(InversionPolicy::InvertFirst));
    let seen: Vec<_> = dec.seen.lock().unwrap().iter().map(|s| s.0).collect();
    assert_eq!(seen, InversionPolicy::SCAN_ORDER.to_vec());
}

#[tokio::test]
async fn decoder_sees_only_the_region_and_corners_are_translated() {
    let dec = NthCall::new(2);
    let scan = scan_marker(&dec, &frame(), region()).await;
    assert_eq!(dec.seen.lock().unwrap()[0].1, (20, 20));
    let marker = scan.require().unwrap();
    assert_eq!(marker.location[0], Point::new(1.0, 31.0));
    assert_eq!(marker.location[2], Point::new(9.0, 39.0));
}

#[tokio::test]
async fn exhausted_scan_reports_not_found() {
    let dec = NthCall::new(usize::MAX);
    let scan = scan_marker(&dec, &frame(), region()).await;
    assert_eq!(scan.attempts, 3);
    assert!(scan.marker.is_none());
    assert!(matches!(scan.require(), Err(KioskError::MarkerNotFound)));
}

#[tokio::test]
async fn missing_region_is_not_scanned() {
    let dec = NthCall::new(1);
    let scan = scan_marker(&dec, &frame(), None).await;
    assert_eq!(scan.attempts, 0);
    assert!(dec.seen.lock().unwrap().is_empty());
}

#[test]
fn trial_orders() {
    assert_eq!(InversionPolicy::DontInvert.trial_order(), &[false]);
    assert_eq!(InversionPolicy::AttemptBoth.trial_order(), &[false, true]);
    assert_eq!(InversionPolicy::InvertFirst.trial_order(), &[true, false]);
}
