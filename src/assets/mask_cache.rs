use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use anyhow::Context as _;
use async_trait::async_trait;

use crate::assets::decode;
use crate::foundation::error::{KioskError, KioskResult};

/// Decoded mask bitmap. Near-white pixels mean "remove", anything else means "keep".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskBitmap {
    image: image::RgbaImage,
}

impl MaskBitmap {
    pub fn new(image: image::RgbaImage) -> KioskResult<Self> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(KioskError::validation("mask bitmap must not be empty"));
        }
        Ok(Self { image })
    }

    pub fn image(&self) -> &image::RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Where mask bitmaps come from on a cache miss.
#[async_trait]
pub trait MaskSource: Send + Sync {
    /// Load the mask for `identifier`. Resolves once the underlying fetch completes.
    async fn load(&self, identifier: &str) -> anyhow::Result<MaskBitmap>;
}

/// Loads `<dir>/<identifier>.<ext>` from the filesystem.
#[derive(Clone, Debug)]
pub struct FsMaskSource {
    dir: PathBuf,
    extension: String,
}

impl FsMaskSource {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// Deterministic path for an identifier. Identifiers must be a single safe file stem.
    pub fn path_for(&self, identifier: &str) -> KioskResult<PathBuf> {
        let stem = normalize_identifier(identifier)?;
        Ok(self.dir.join(format!("{stem}.{}", self.extension)))
    }
}

#[async_trait]
impl MaskSource for FsMaskSource {
    async fn load(&self, identifier: &str) -> anyhow::Result<MaskBitmap> {
        let path = self.path_for(identifier)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read mask '{}'", path.display()))?;
        let image = decode::decode_rgba(&bytes)
            .with_context(|| format!("decode mask '{}'", path.display()))?;
        Ok(MaskBitmap::new(image)?)
    }
}

/// Validate a decoded identifier for use as a file stem.
///
/// Identifiers come from printed markers, so anything that could escape the mask directory is
/// refused.
pub fn normalize_identifier(identifier: &str) -> KioskResult<&str> {
    let s = identifier.trim();
    if s.is_empty() {
        return Err(KioskError::validation("mask identifier must be non-empty"));
    }
    if s.contains(['/', '\\', '\0']) {
        return Err(KioskError::validation("mask identifier must not contain path separators"));
    }
    if s == "." || s == ".." {
        return Err(KioskError::validation(
            "mask identifier must not be a relative path component",
        ));
    }
    Ok(s)
}

/// Result of a cache lookup.
#[derive(Clone, Debug)]
pub struct MaskLookup {
    pub mask: Arc<MaskBitmap>,
    pub cache_hit: bool,
    pub elapsed: Duration,
}

/// Session-wide mask cache. Entries are loaded on miss and never evicted.
///
/// Failed loads are not remembered, so a later lookup for the same identifier tries again.
/// Concurrent misses for one identifier may both load; the last one to finish wins.
pub struct MaskCache {
    source: Box<dyn MaskSource>,
    entries: Mutex<HashMap<String, Arc<MaskBitmap>>>,
    loads: Mutex<HashMap<String, u64>>,
}

impl std::fmt::Debug for MaskCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl MaskCache {
    pub fn new(source: impl MaskSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    pub fn from_boxed(source: Box<dyn MaskSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
            loads: Mutex::new(HashMap::new()),
        }
    }

    /// Cache backed by [`FsMaskSource`].
    pub fn from_dir(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::new(FsMaskSource::new(dir, extension))
    }

    /// Look up the mask for `identifier`, loading it on a miss.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, identifier: &str) -> KioskResult<MaskLookup> {
        let start = Instant::now();
        if let Some(mask) = self.cached(identifier) {
            tracing::debug!("mask cache hit");
            return Ok(MaskLookup {
                mask,
                cache_hit: true,
                elapsed: start.elapsed(),
            });
        }

        self.bump_loads(identifier);
        let mask = match self.source.load(identifier).await {
            Ok(mask) => Arc::new(mask),
            Err(err) => {
                tracing::warn!(error = %err, "mask load failed");
                return Err(KioskError::mask_load(identifier, err));
            }
        };

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_string(), Arc::clone(&mask));
        tracing::debug!(w = mask.width(), h = mask.height(), "mask cached");

        Ok(MaskLookup {
            mask,
            cache_hit: false,
            elapsed: start.elapsed(),
        })
    }

    pub fn cached(&self, identifier: &str) -> Option<Arc<MaskBitmap>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.cached(identifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times the source was asked to load `identifier`, including failed attempts.
    pub fn load_count(&self, identifier: &str) -> u64 {
        self.loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    fn bump_loads(&self, identifier: &str) {
        *self
            .loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(identifier.to_string())
            .or_insert(0) += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/mask_cache.rs"]
mod tests;
