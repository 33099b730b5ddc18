//! Theme-dependent spawn position and scale for new artifacts.

use std::{f64::consts::TAU, fmt, str::FromStr};

use rand::Rng;

use crate::foundation::core::{Point, ScreenSize};
use crate::foundation::error::{KioskError, KioskResult};

/// Visual theme of the scene the drawings are dropped into.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Space,
    Fishtank,
    Rocket,
    Petri,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Default,
        Theme::Space,
        Theme::Fishtank,
        Theme::Rocket,
        Theme::Petri,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Space => "space",
            Theme::Fishtank => "fishtank",
            Theme::Rocket => "rocket",
            Theme::Petri => "petri",
        }
    }

    /// Fraction of the screen's shorter side an artifact may occupy.
    pub fn footprint_fraction(self) -> f64 {
        match self {
            Theme::Petri => 0.15,
            _ => 0.3,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| KioskError::validation(format!("unknown theme '{s}'")))
    }
}

/// Spawn position (sprite center) and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementResult {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl PlacementResult {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Place an artifact using two fresh uniform draws from `rng`.
pub fn place<R: Rng>(
    theme: Theme,
    screen: ScreenSize,
    artifact_size: (u32, u32),
    rng: &mut R,
) -> PlacementResult {
    let r1: f64 = rng.random();
    let r2: f64 = rng.random();
    place_with(theme, screen, artifact_size, r1, r2)
}

/// Deterministic placement for given draws `r1, r2` in `[0, 1)`.
pub fn place_with(
    theme: Theme,
    screen: ScreenSize,
    artifact_size: (u32, u32),
    r1: f64,
    r2: f64,
) -> PlacementResult {
    let ScreenSize {
        width: w,
        height: h,
    } = screen;

    let pos = match theme {
        Theme::Default | Theme::Space => Point::new(w * (0.2 + 0.6 * r1), h * (0.2 + 0.6 * r2)),
        Theme::Fishtank => Point::new(w * (0.2 + 0.6 * r1), h * (0.2 + 0.5 * r2)),
        Theme::Rocket => Point::new(w * 0.5, h * 0.7),
        Theme::Petri => {
            let angle = TAU * r1;
            let radius = screen.min_side() * 0.3 * r2;
            let c = screen.center();
            Point::new(c.x + angle.cos() * radius, c.y + angle.sin() * radius)
        }
    };

    PlacementResult {
        x: pos.x,
        y: pos.y,
        scale: fit_scale(theme, screen, artifact_size),
    }
}

/// Shrink-only scale so the artifact's longer side fits the theme footprint.
pub fn fit_scale(theme: Theme, screen: ScreenSize, artifact_size: (u32, u32)) -> f64 {
    let max_size = screen.min_side() * theme.footprint_fraction();
    let longest = f64::from(artifact_size.0.max(artifact_size.1));
    if longest <= 0.0 {
        return 1.0;
    }
    (max_size / longest).min(1.0)
}

/// Build a [`ScreenSize`] from integer dimensions.
pub fn screen_from_dimensions(dims: (u32, u32)) -> KioskResult<ScreenSize> {
    ScreenSize::new(f64::from(dims.0), f64::from(dims.1))
}

#[cfg(test)]
#[path = "../tests/unit/placement.rs"]
mod tests;
