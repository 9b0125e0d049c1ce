//! Error types for image normalization and configuration loading

use smol_str::SmolStr;

/// Why a single image reference could not be turned into a [`NormalizedImage`].
///
/// These never escape [`ImageNormalizer::normalize_collection`], which drops
/// the offending element (or falls back to the placeholder). They are returned
/// from [`ImageNormalizer::normalize_one`] so callers can log or inspect them.
///
/// [`NormalizedImage`]: crate::types::image::NormalizedImage
/// [`ImageNormalizer::normalize_collection`]: crate::normalize::ImageNormalizer::normalize_collection
/// [`ImageNormalizer::normalize_one`]: crate::normalize::ImageNormalizer::normalize_one
#[derive(Debug, Clone, PartialEq, thiserror::Error, miette::Diagnostic)]
pub enum ImageError {
    /// Null, missing, or a JSON value that is neither a string nor an array
    #[error("no image reference present")]
    #[diagnostic(code(studstay::image::absent))]
    Absent,

    /// String was empty after trimming and quote stripping
    #[error("image reference is empty")]
    #[diagnostic(code(studstay::image::empty))]
    Empty,

    /// Nested array with no head element
    #[error("image reference is an empty array")]
    #[diagnostic(code(studstay::image::empty_sequence))]
    EmptySequence,

    /// Text looked like JSON (leading `[` or `"`) but did not parse
    #[error("image reference looks like JSON but does not parse: {message}")]
    #[diagnostic(
        code(studstay::image::unparsable_json),
        help("the raw text is used as a literal reference instead")
    )]
    UnparsableJson {
        /// The text that failed to parse
        source_text: String,
        /// serde_json's description of the failure
        message: SmolStr,
    },

    /// Not a storage URL, not a storage path, not an http(s) URL
    #[error("unrecognized image reference `{reference}`")]
    #[diagnostic(
        code(studstay::image::unclassifiable),
        help("expected an http(s) URL or a storage path starting with `/`")
    )]
    Unclassifiable {
        /// The cleaned reference
        reference: String,
    },

    /// Encoded reference failed URL construction
    #[error("`{url}` is not a valid URL: {source}")]
    #[diagnostic(code(studstay::image::malformed_url))]
    MalformedUrl {
        /// The encoded candidate URL
        url: String,
        /// Underlying parse failure
        #[source]
        source: url::ParseError,
    },
}

impl ImageError {
    pub(crate) fn unparsable_json(source_text: &str, err: &serde_json::Error) -> Self {
        Self::UnparsableJson {
            source_text: source_text.to_string(),
            message: smol_str::format_smolstr!("{err}"),
        }
    }
}

/// Errors loading a [`StorageConfig`](crate::config::StorageConfig)
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// KDL syntax error
    #[error("failed to parse KDL config")]
    Kdl(
        #[from]
        #[diagnostic_source]
        kdl::KdlError,
    ),

    /// Node name not understood
    #[error("unknown config node `{0}`")]
    #[diagnostic(
        code(studstay::config::unknown_node),
        help("valid nodes inside `storage` are base-url, host-marker, placeholder and bucket")
    )]
    UnknownNode(SmolStr),

    /// Node needs a single string argument
    #[error("`{0}` expects a string value")]
    #[diagnostic(code(studstay::config::expected_string))]
    ExpectedString(SmolStr),

    /// Configured URL does not parse
    #[error("`{field}` is not a valid URL: `{value}`")]
    #[diagnostic(code(studstay::config::invalid_url))]
    InvalidUrl {
        /// Config field name
        field: &'static str,
        /// Offending value
        value: String,
        /// Underlying parse failure
        #[source]
        source: url::ParseError,
    },

    /// Configured URL is not http(s)
    #[error("`{field}` must be an http(s) URL, got `{value}`")]
    #[diagnostic(code(studstay::config::not_http))]
    NotHttp {
        /// Config field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Host marker must be non-empty, otherwise it matches everything
    #[error("`host-marker` must not be empty")]
    #[diagnostic(code(studstay::config::empty_marker))]
    EmptyMarker,
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;
