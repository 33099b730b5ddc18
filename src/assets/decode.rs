use std::io::Cursor;

use crate::foundation::core::RawFrame;
use crate::foundation::error::{KioskError, KioskResult};

/// Detect the raster format of encoded image bytes from their magic number.
pub fn sniff_format(bytes: &[u8]) -> Option<image::ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Decode encoded image bytes into straight RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> KioskResult<image::RgbaImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| KioskError::decode(format!("read image header: {e}")))?;
    if reader.format().is_none() {
        return Err(KioskError::decode("unrecognized image format"));
    }
    let img = reader
        .decode()
        .map_err(|e| KioskError::decode(format!("decode image: {e}")))?;
    Ok(img.to_rgba8())
}

/// Decode a still image into a capture frame.
pub fn decode_frame(bytes: &[u8]) -> KioskResult<RawFrame> {
    let rgba = decode_rgba(bytes)?;
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(KioskError::decode("image has no pixels"));
    }
    RawFrame::from_rgba_image(rgba)
}

/// Encode a frame as PNG bytes.
pub fn encode_png(frame: &RawFrame) -> KioskResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        frame.as_bytes(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| KioskError::Other(anyhow::Error::new(e).context("encode png")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
