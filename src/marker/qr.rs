use crate::foundation::core::{Point, RawFrame};

use super::{DecodedMarker, InversionPolicy, MarkerDecoder};

/// QR code decoder backed by `rqrr`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl MarkerDecoder for QrDecoder {
    #[tracing::instrument(level = "trace", skip(self, region))]
    fn decode(&self, region: &RawFrame, policy: InversionPolicy) -> Option<DecodedMarker> {
        let luma = luma_plane(region);
        policy
            .trial_order()
            .iter()
            .find_map(|&inverted| decode_luma(&luma, region.width(), region.height(), inverted))
    }
}

/// BT.601 luma, integer weights.
fn luma_plane(frame: &RawFrame) -> Vec<u8> {
    frame
        .as_bytes()
        .chunks_exact(4)
        .map(|px| {
            let (r, g, b) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
            ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
        })
        .collect()
}

fn decode_luma(luma: &[u8], width: u32, height: u32, inverted: bool) -> Option<DecodedMarker> {
    let (w, h) = (width as usize, height as usize);
    let mut img = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| {
        let v = luma[y * w + x];
        if inverted { 255 - v } else { v }
    });

    img.detect_grids().into_iter().find_map(|grid| {
        let location: [Point; 4] = std::array::from_fn(|i| {
            let p = &grid.bounds[i];
            Point::new(f64::from(p.x), f64::from(p.y))
        });
        match grid.decode() {
            Ok((_meta, content)) => Some(DecodedMarker {
                identifier: content,
                location,
            }),
            Err(err) => {
                tracing::trace!(error = %err, inverted, "grid found but not decodable");
                None
            }
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/marker/qr.rs"]
mod tests;
