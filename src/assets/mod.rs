//! Image decoding and the session mask cache.

pub mod decode;
pub mod mask_cache;
