//! Turns untrusted image references into absolute, fetchable URLs.
//!
//! Every rendering site (feed card, detail gallery) goes through
//! [`ImageNormalizer`] instead of poking at the raw `images` field itself.
//! Normalizing a collection never fails: unusable references are dropped, and
//! if nothing is left the configured placeholder is returned.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::{
    config::StorageConfig,
    error::ImageError,
    types::image::{ImageRef, ImageSet, NormalizedImage, looks_like_json},
};

/// Characters left alone when encoding a whole URL: alphanumerics plus the
/// unreserved and reserved URI characters and `#`. `%` is handled separately.
const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'#');

/// Normalizes listing image references against one storage configuration.
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    config: StorageConfig,
}

impl ImageNormalizer {
    /// Normalizer bound to `config`
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// The storage configuration in use
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The fallback image
    pub fn placeholder(&self) -> NormalizedImage {
        NormalizedImage::new_unchecked(self.config.placeholder())
    }

    /// Normalize a listing's whole image field.
    ///
    /// JSON-encoded text is decoded (repeatedly, for double-encoded fields), a
    /// single reference is treated as a one-element list, and each element is
    /// run through [`normalize_one`](Self::normalize_one). Invalid elements are
    /// dropped; valid ones keep their order. Never empty: falls back to the
    /// placeholder.
    pub fn normalize_collection(&self, raw: &ImageRef) -> ImageSet {
        let decoded = unwrap_json(raw);
        let items: &[ImageRef] = match &*decoded {
            ImageRef::Absent => &[],
            ImageRef::Sequence(items) => items,
            single => std::slice::from_ref(single),
        };

        let images: Vec<NormalizedImage> = items
            .iter()
            .filter_map(|item| match self.normalize_one(item) {
                Ok(image) => Some(image),
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(error = %_err, "dropping image reference");
                    None
                }
            })
            .collect();

        ImageSet::from_vec(images).unwrap_or_else(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                placeholder = self.config.placeholder(),
                "no usable image reference, using placeholder"
            );
            ImageSet::placeholder(self.placeholder())
        })
    }

    /// [`normalize_collection`](Self::normalize_collection) on raw field text
    pub fn normalize_raw(&self, raw: &str) -> ImageSet {
        self.normalize_collection(&ImageRef::Literal(raw.into()))
    }

    /// [`normalize_collection`](Self::normalize_collection) on a JSON value
    pub fn normalize_json(&self, raw: &serde_json::Value) -> ImageSet {
        self.normalize_collection(&ImageRef::from(raw))
    }

    /// Representative image for a feed card
    pub fn card_image(&self, raw: &ImageRef) -> NormalizedImage {
        self.normalize_collection(raw).into_vec().swap_remove(0)
    }

    /// Normalize a single reference.
    ///
    /// An array collapses to its first element, recursively; any siblings are
    /// dropped. List cards only ever show one image per group, so a nested
    /// group is treated as one image. A literal that looks like JSON is decoded
    /// first.
    pub fn normalize_one(&self, reference: &ImageRef) -> Result<NormalizedImage, ImageError> {
        match reference {
            ImageRef::Absent => Err(ImageError::Absent),
            ImageRef::Sequence(items) => {
                let head = items.first().ok_or(ImageError::EmptySequence)?;
                #[cfg(feature = "tracing")]
                if items.len() > 1 {
                    tracing::debug!(
                        dropped = items.len() - 1,
                        "nested image array collapsed to its first element"
                    );
                }
                self.normalize_one(head)
            }
            ImageRef::Literal(text) => {
                if looks_like_json(text) {
                    if let Ok(decoded) = ImageRef::try_decode(text) {
                        return self.normalize_one(&decoded);
                    }
                }
                self.normalize_str(text)
            }
        }
    }

    /// Classify and encode one string reference.
    ///
    /// In priority order: contains the storage host marker, starts with `/`
    /// (storage path, gets the base URL), starts with `http`. Anything else is
    /// rejected.
    pub fn normalize_str(&self, text: &str) -> Result<NormalizedImage, ImageError> {
        let clean = strip_quotes(text.trim()).trim();
        if clean.is_empty() {
            return Err(ImageError::Empty);
        }

        let absolute: Cow<'_, str> = if clean.contains(self.config.host_marker()) {
            Cow::Borrowed(clean)
        } else if clean.starts_with('/') {
            Cow::Owned(format!("{}{}", self.config.base_url(), clean))
        } else if clean.starts_with("http") {
            Cow::Borrowed(clean)
        } else {
            return Err(ImageError::Unclassifiable {
                reference: clean.to_string(),
            });
        };

        let encoded = encode_uri(&absolute);
        Url::parse(&encoded).map_err(|source| ImageError::MalformedUrl {
            url: encoded.clone(),
            source,
        })?;
        Ok(NormalizedImage::new_unchecked(encoded))
    }
}

/// Peel JSON string layers until we hit something that isn't JSON text.
fn unwrap_json(raw: &ImageRef) -> Cow<'_, ImageRef> {
    let mut current = Cow::Borrowed(raw);
    while let ImageRef::Literal(text) = &*current {
        if !looks_like_json(text) {
            break;
        }
        match ImageRef::try_decode(text) {
            Ok(decoded) => current = Cow::Owned(decoded),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_err, "image field kept as literal");
                break;
            }
        }
    }
    current
}

/// One matching pair of surrounding `"` or `'`
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Percent-encode a whole URL with the `encodeURI` character set.
///
/// Existing `%XX` escapes pass through untouched so the result is stable under
/// re-encoding; a stray `%` becomes `%25`.
pub fn encode_uri(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(idx) = rest.find('%') {
        out.extend(utf8_percent_encode(&rest[..idx], URI));
        let tail = &rest[idx..];
        if is_escape(tail.as_bytes()) {
            out.push_str(&tail[..3]);
            rest = &tail[3..];
        } else {
            out.push_str("%25");
            rest = &tail[1..];
        }
    }
    out.extend(utf8_percent_encode(rest, URI));
    out
}

fn is_escape(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
}
