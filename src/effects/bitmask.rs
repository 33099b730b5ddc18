use std::borrow::Cow;

use image::imageops::{self, FilterType};
use rayon::prelude::*;

use crate::assets::mask_cache::MaskBitmap;
use crate::foundation::core::RawFrame;
use crate::foundation::error::KioskResult;

/// Whether a mask pixel marks "remove". The comparison is strict on every color channel.
#[inline]
pub fn is_white(px: &[u8], threshold: u8) -> bool {
    px[0] > threshold && px[1] > threshold && px[2] > threshold
}

/// Make every source pixel transparent where the mask is near-white.
///
/// The mask is stretched to the source size when they differ. Only alpha changes, and only to 0.
#[tracing::instrument(skip(source, mask), fields(w = source.width(), h = source.height()))]
pub fn apply_bitmask(source: &RawFrame, mask: &MaskBitmap, threshold: u8) -> KioskResult<RawFrame> {
    let (w, h) = source.size();
    let mask_px = resample_mask(mask, w, h);

    let mut out = source.as_bytes().to_vec();
    let row_bytes = w as usize * 4;
    out.par_chunks_exact_mut(row_bytes)
        .zip(mask_px.par_chunks_exact(row_bytes))
        .for_each(|(dst_row, mask_row)| {
            for (d, m) in dst_row.chunks_exact_mut(4).zip(mask_row.chunks_exact(4)) {
                if is_white(m, threshold) {
                    d[3] = 0;
                }
            }
        });

    RawFrame::new(w, h, out)
}

fn resample_mask(mask: &MaskBitmap, width: u32, height: u32) -> Cow<'_, [u8]> {
    let img = mask.image();
    if img.dimensions() == (width, height) {
        return Cow::Borrowed(img.as_raw().as_slice());
    }
    tracing::debug!(
        from_w = img.width(),
        from_h = img.height(),
        to_w = width,
        to_h = height,
        "resampling mask"
    );
    Cow::Owned(imageops::resize(img, width, height, FilterType::Triangle).into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bitmask.rs"]
mod tests;
