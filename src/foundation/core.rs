use crate::foundation::error::{KioskError, KioskResult};

pub use kurbo::{Point, Rect};

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// A captured frame: tightly packed, row-major, straight RGBA8.
///
/// Frames are immutable once captured; every pipeline stage produces a new frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RawFrame {
    /// Wrap an RGBA8 buffer, checking that it matches `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> KioskResult<Self> {
        if width == 0 || height == 0 {
            return Err(KioskError::validation(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(KioskError::validation(format!(
                "frame buffer length {} does not match {width}x{height} rgba8 ({expected})",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame filled with a single color.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> KioskResult<Self> {
        let len = rgba_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            data.extend_from_slice(&px);
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bounds of the whole frame as a pixel rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Pixel at `(x, y)`, or `None` when outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Copy out a sub-rectangle as a new frame. The rectangle must lie inside the frame.
    pub fn crop(&self, rect: PixelRect) -> KioskResult<RawFrame> {
        if rect.is_empty() || !self.bounds().contains_rect(rect) {
            return Err(KioskError::validation(format!(
                "crop {rect:?} is empty or outside {}x{} frame",
                self.width, self.height
            )));
        }
        let row_bytes = rect.width as usize * 4;
        let mut out = Vec::with_capacity(row_bytes * rect.height as usize);
        for y in rect.y..rect.bottom() {
            let start = self.offset(rect.x, y);
            out.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        RawFrame::new(rect.width, rect.height, out)
    }

    /// Zero every channel inside `rect` (clipped to the frame), like a canvas `clearRect`.
    pub fn clear_rect(&mut self, rect: PixelRect) {
        let Some(rect) = rect.intersect(self.bounds()) else {
            return;
        };
        let row_bytes = rect.width as usize * 4;
        for y in rect.y..rect.bottom() {
            let start = self.offset(rect.x, y);
            self.data[start..start + row_bytes].fill(0);
        }
    }

    /// Wrap an `image` buffer without copying.
    pub fn from_rgba_image(img: image::RgbaImage) -> KioskResult<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, img.into_raw())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

fn rgba_len(width: u32, height: u32) -> KioskResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| KioskError::validation("frame buffer size overflow"))
}

/// Integer pixel rectangle (origin top-left, exclusive right/bottom edges).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Snap a floating-point rectangle to whole pixels (truncating) and clip it to `bounds`.
    ///
    /// Returns `None` when nothing of the rectangle survives.
    pub fn from_rect_clipped(rect: Rect, bounds: PixelRect) -> Option<Self> {
        let r = rect.abs().intersect(bounds.to_rect());
        let x0 = r.x0.max(0.0).trunc();
        let y0 = r.y0.max(0.0).trunc();
        let x1 = r.x1.trunc();
        let y1 = r.y1.trunc();
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        let (x, y) = (x0 as u32, y0 as u32);
        Some(Self::new(x, y, x1 as u32 - x, y1 as u32 - y))
    }

    pub fn right(self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn contains_rect(self, other: PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn overlaps(self, other: PixelRect) -> bool {
        self.intersect(other).is_some()
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

/// Size of the on-screen scene that artifacts are spawned into.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> KioskResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(KioskError::validation("screen size must be finite and > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn min_side(self) -> f64 {
        self.width.min(self.height)
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Parse `WIDTHxHEIGHT` (e.g. `1920x1080`).
pub fn parse_dimensions(s: &str) -> KioskResult<(u32, u32)> {
    let (w, h) = s
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| KioskError::validation(format!("expected WIDTHxHEIGHT, got '{s}'")))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| KioskError::validation(format!("invalid dimension '{v}': {e}")))
    };
    let (w, h) = (parse(w)?, parse(h)?);
    if w == 0 || h == 0 {
        return Err(KioskError::validation("dimensions must be > 0"));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
