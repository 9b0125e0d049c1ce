/// Listing tag catalogue offered by the creation form
pub mod filter;
/// Raw image references and their normalized forms
pub mod image;
/// Listing records
pub mod kot;

pub use filter::{FILTER_CATEGORIES, FilterCategory};
pub use image::{ImageRef, ImageSet, NormalizedImage};
pub use kot::{Kot, KotDraft};
