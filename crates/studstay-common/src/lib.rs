//! Common types for StudStay
//!
//! Listing records, storage configuration and the image reference normalizer
//! that every rendering site goes through to turn a listing's loosely typed
//! `images` field into absolute, fetchable URLs.

#![warn(missing_docs)]
pub use smol_str;
pub use url;

/// Storage host configuration (base URL, host marker, placeholder).
pub mod config;
pub mod error;
/// Image reference normalization.
pub mod normalize;
/// Raw and normalized data types.
pub mod types;

pub use config::StorageConfig;
pub use error::{ConfigError, ImageError};
pub use normalize::ImageNormalizer;
pub use types::image::{ImageRef, ImageSet, NormalizedImage};
pub use types::kot::{Kot, KotDraft};
