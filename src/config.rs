use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    foundation::core::ScreenSize,
    foundation::error::{KioskError, KioskResult},
    pipeline::layout::SheetLayout,
    placement::Theme,
};

/// Mask pixels whose R, G and B all exceed this value are treated as "remove".
pub const DEFAULT_WHITE_THRESHOLD: u8 = 240;

/// Kiosk configuration, loaded from JSON. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KioskConfig {
    /// Directory holding `<identifier>.<mask_extension>` mask bitmaps.
    pub masks_dir: PathBuf,
    /// File extension of mask bitmaps, without the dot.
    pub mask_extension: String,
    /// Strict brightness threshold for "white" mask pixels.
    pub white_threshold: u8,
    /// Active visual theme.
    pub theme: Theme,
    /// Scene size used for placement.
    pub screen: ScreenSize,
    /// How long transient status text stays before reverting to the idle hint.
    pub status_revert_ms: u64,
    /// Printed sheet geometry.
    pub layout: SheetLayout,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            masks_dir: PathBuf::from("masks"),
            mask_extension: "png".to_string(),
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            theme: Theme::Default,
            screen: ScreenSize::default(),
            status_revert_ms: 3000,
            layout: SheetLayout::default(),
        }
    }
}

impl KioskConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> KioskResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: KioskConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> KioskResult<()> {
        let ext = self.mask_extension.as_str();
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(KioskError::validation(format!(
                "mask_extension must be a bare extension, got '{ext}'"
            )));
        }
        ScreenSize::new(self.screen.width, self.screen.height)?;
        self.layout.validate()
    }

    pub fn status_revert(&self) -> Duration {
        Duration::from_millis(self.status_revert_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
