use std::{fmt, ops::Deref};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;

use crate::error::ImageError;

/// One raw image reference, as it comes out of the listing store.
///
/// The store enforces no schema, so a listing's `images` field shows up as a
/// bare string, an array, a JSON-encoded array inside a string, or nothing at
/// all. This type is the single decoded shape all of those map onto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ImageRef {
    /// null, missing, or a JSON scalar that isn't a string
    #[default]
    Absent,
    /// URL, storage path, JSON text, or some malformed fragment
    Literal(SmolStr),
    /// Array of references, possibly nested
    Sequence(Vec<ImageRef>),
}

impl ImageRef {
    /// Decode raw field text. JSON-looking text (leading `[` or `"`) is parsed;
    /// anything else, including JSON that fails to parse, stays a literal.
    pub fn decode(raw: &str) -> Self {
        if looks_like_json(raw) {
            if let Ok(decoded) = Self::try_decode(raw) {
                return decoded;
            }
        }
        Self::Literal(SmolStr::new(raw))
    }

    /// Strict JSON decode of raw field text
    pub fn try_decode(raw: &str) -> Result<Self, ImageError> {
        serde_json::from_str::<serde_json::Value>(raw.trim())
            .map(Self::from)
            .map_err(|e| ImageError::unparsable_json(raw, &e))
    }

    /// The literal text, if this is a literal
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True for null, missing, or non-string scalars
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Leading `[` or `"` after trimming
pub(crate) fn looks_like_json(raw: &str) -> bool {
    matches!(raw.trim_start().as_bytes().first(), Some(&(b'[' | b'"')))
}

impl From<serde_json::Value> for ImageRef {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Literal(SmolStr::new(s)),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            _ => Self::Absent,
        }
    }
}

impl From<&serde_json::Value> for ImageRef {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Literal(SmolStr::new(s)),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.iter().map(Self::from).collect())
            }
            _ => Self::Absent,
        }
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::Literal(SmolStr::new(value))
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self::Literal(SmolStr::new(value))
    }
}

impl<T: Into<ImageRef>> From<Vec<T>> for ImageRef {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ImageRef>> From<Option<T>> for ImageRef {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Serialize for ImageRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Literal(s) => serializer.serialize_str(s),
            Self::Sequence(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from(value))
    }
}

/// An absolute, percent-encoded image URL that parses with [`url::Url`].
///
/// Only the normalizer hands these out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedImage(String);

impl NormalizedImage {
    /// Caller guarantees the string is already encoded and parses as an http(s) URL.
    pub(crate) fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The encoded URL text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the encoded URL text
    pub fn into_string(self) -> String {
        self.0
    }

    /// Parsed form, for callers that need the host or path
    pub fn to_url(&self) -> Option<url::Url> {
        url::Url::parse(&self.0).ok()
    }
}

impl fmt::Display for NormalizedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedImage {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for NormalizedImage {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl From<NormalizedImage> for String {
    fn from(value: NormalizedImage) -> Self {
        value.0
    }
}

impl PartialEq<str> for NormalizedImage {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedImage {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordered, never-empty list of normalized images for one listing.
///
/// Either the valid references in input order, or the placeholder alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSet {
    images: Vec<NormalizedImage>,
    #[serde(skip)]
    placeholder: bool,
}

#[allow(clippy::len_without_is_empty)]
impl ImageSet {
    /// `None` if `images` is empty
    pub(crate) fn from_vec(images: Vec<NormalizedImage>) -> Option<Self> {
        (!images.is_empty()).then_some(Self {
            images,
            placeholder: false,
        })
    }

    pub(crate) fn placeholder(image: NormalizedImage) -> Self {
        Self {
            images: vec![image],
            placeholder: true,
        }
    }

    /// Representative image, as shown on a feed card
    pub fn first(&self) -> &NormalizedImage {
        &self.images[0]
    }

    /// Everything after the first image
    pub fn rest(&self) -> &[NormalizedImage] {
        &self.images[1..]
    }

    /// Always at least 1
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when no reference was usable and the placeholder was substituted
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Images in order
    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedImage> {
        self.images.iter()
    }

    /// Images in order, as a slice
    pub fn as_slice(&self) -> &[NormalizedImage] {
        &self.images
    }

    /// Take the images, in order; never empty
    pub fn into_vec(self) -> Vec<NormalizedImage> {
        self.images
    }

    /// Plain strings, in order
    pub fn to_strings(&self) -> Vec<String> {
        self.images.iter().map(|i| i.0.clone()).collect()
    }
}

impl IntoIterator for ImageSet {
    type Item = NormalizedImage;
    type IntoIter = std::vec::IntoIter<NormalizedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImageSet {
    type Item = &'a NormalizedImage;
    type IntoIter = std::slice::Iter<'a, NormalizedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}
