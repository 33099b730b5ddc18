use crate::foundation::core::{PixelRect, Rect};
use crate::foundation::error::{KioskError, KioskResult};

/// Geometry of the printed drawing sheet, as fractions of the photo's shorter side.
///
/// The marker sits in the bottom-left corner, the visitor's name is written to its right, and an
/// orientation square is printed in the top-right corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLayout {
    /// Side of the bottom-left square searched for the marker.
    pub marker_search_fraction: f64,
    /// Side of the printed marker and orientation squares.
    pub scaffold_fraction: f64,
    /// Horizontal gap in pixels between the scaffold squares and the name strip.
    pub name_padding_px: f64,
    /// Offset of the name strip from the top of the marker square, relative to the scaffold side.
    pub name_top_fraction: f64,
    /// Height of the name strip, relative to the scaffold side.
    pub name_height_fraction: f64,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            marker_search_fraction: 0.4,
            scaffold_fraction: 0.2,
            name_padding_px: 10.0,
            name_top_fraction: 0.2,
            name_height_fraction: 0.6,
        }
    }
}

impl SheetLayout {
    pub fn validate(&self) -> KioskResult<()> {
        let unit = |name: &str, v: f64| {
            if !v.is_finite() || v <= 0.0 || v > 1.0 {
                return Err(KioskError::validation(format!(
                    "{name} must be in (0, 1], got {v}"
                )));
            }
            Ok(())
        };
        unit("marker_search_fraction", self.marker_search_fraction)?;
        unit("scaffold_fraction", self.scaffold_fraction)?;
        unit("name_height_fraction", self.name_height_fraction)?;
        if !self.name_top_fraction.is_finite() || self.name_top_fraction < 0.0 {
            return Err(KioskError::validation("name_top_fraction must be >= 0"));
        }
        if !self.name_padding_px.is_finite() || self.name_padding_px < 0.0 {
            return Err(KioskError::validation("name_padding_px must be >= 0"));
        }
        Ok(())
    }

    /// Region handed to the marker decoder.
    pub fn marker_search_region(&self, width: u32, height: u32) -> Option<PixelRect> {
        let side = min_side(width, height) * self.marker_search_fraction;
        let bounds = PixelRect::new(0, 0, width, height);
        let side = side.floor();
        PixelRect::from_rect_clipped(
            Rect::new(0.0, f64::from(height) - side, side, f64::from(height)),
            bounds,
        )
    }

    /// Side of the printed scaffold squares in (fractional) pixels.
    pub fn scaffold_side(&self, width: u32, height: u32) -> f64 {
        min_side(width, height) * self.scaffold_fraction
    }

    /// Strip right of the marker holding the visitor's name.
    pub fn name_region(&self, width: u32, height: u32) -> Option<PixelRect> {
        let qr = self.scaffold_side(width, height);
        let (w, h) = (f64::from(width), f64::from(height));
        let x = qr + self.name_padding_px;
        let y = h - qr + qr * self.name_top_fraction;
        let name_w = w - 2.0 * qr - 2.0 * self.name_padding_px;
        let name_h = qr * self.name_height_fraction;
        if name_w <= 0.0 || name_h <= 0.0 {
            return None;
        }
        PixelRect::from_rect_clipped(
            Rect::new(x, y, x + name_w, y + name_h),
            PixelRect::new(0, 0, width, height),
        )
    }

    /// Bottom-left square covering the printed marker.
    pub fn marker_square(&self, width: u32, height: u32) -> Option<PixelRect> {
        let qr = self.scaffold_side(width, height).round();
        let h = f64::from(height);
        PixelRect::from_rect_clipped(
            Rect::new(0.0, h - qr, qr, h),
            PixelRect::new(0, 0, width, height),
        )
    }

    /// Top-right square covering the printed orientation mark.
    pub fn orientation_square(&self, width: u32, height: u32) -> Option<PixelRect> {
        let qr = self.scaffold_side(width, height).round();
        let w = f64::from(width);
        PixelRect::from_rect_clipped(
            Rect::new(w - qr, 0.0, w, qr),
            PixelRect::new(0, 0, width, height),
        )
    }
}

fn min_side(width: u32, height: u32) -> f64 {
    f64::from(width.min(height))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/layout.rs"]
mod tests;
