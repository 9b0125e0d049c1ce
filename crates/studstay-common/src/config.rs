use crate::error::{ConfigError, Result};
use crate::normalize::encode_uri;
use smol_str::SmolStr;
use url::Url;

/// Base URL of the hosted storage project listings are uploaded to
pub const DEFAULT_BASE_URL: &str = "https://uabrniklevoi3rnyqogs.supabase.co";
/// Substring that marks a URL as already pointing at our own storage
pub const DEFAULT_HOST_MARKER: &str = "supabase.co";
/// Shown whenever a listing has no usable image
pub const DEFAULT_PLACEHOLDER: &str = "https://picsum.photos/300";
/// Storage bucket listing photos are uploaded to
pub const DEFAULT_BUCKET: &str = "kot-photos";

/// Where listing images live and what to show when there are none.
///
/// Constructed once and handed to [`ImageNormalizer`](crate::ImageNormalizer),
/// so the storage host is never hard-coded at a rendering site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    base_url: SmolStr,
    host_marker: SmolStr,
    placeholder: SmolStr,
    bucket: SmolStr,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: SmolStr::new_static(DEFAULT_BASE_URL),
            host_marker: SmolStr::new_static(DEFAULT_HOST_MARKER),
            placeholder: SmolStr::new_static(DEFAULT_PLACEHOLDER),
            bucket: SmolStr::new_static(DEFAULT_BUCKET),
        }
    }
}

impl StorageConfig {
    /// Validating constructor. A trailing `/` on the base URL is dropped.
    pub fn new(
        base_url: impl AsRef<str>,
        host_marker: impl AsRef<str>,
        placeholder: impl AsRef<str>,
    ) -> Result<Self> {
        Self::default()
            .with_base_url(base_url)?
            .with_host_marker(host_marker)?
            .with_placeholder(placeholder)
    }

    /// Replace the storage base URL
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/');
        check_http_url("base-url", base_url)?;
        self.base_url = SmolStr::new(base_url);
        Ok(self)
    }

    /// Replace the storage host marker
    pub fn with_host_marker(mut self, host_marker: impl AsRef<str>) -> Result<Self> {
        let host_marker = host_marker.as_ref().trim();
        if host_marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        self.host_marker = SmolStr::new(host_marker);
        Ok(self)
    }

    /// Replace the placeholder image URL. Stored percent-encoded, the same way
    /// the normalizer encodes image references.
    pub fn with_placeholder(mut self, placeholder: impl AsRef<str>) -> Result<Self> {
        let placeholder = encode_uri(placeholder.as_ref().trim());
        check_http_url("placeholder", &placeholder)?;
        self.placeholder = SmolStr::new(placeholder);
        Ok(self)
    }

    /// Replace the upload bucket name
    pub fn with_bucket(mut self, bucket: impl AsRef<str>) -> Self {
        self.bucket = SmolStr::new(bucket.as_ref().trim().trim_matches('/'));
        self
    }

    /// Parse a KDL document of the form
    ///
    /// ```kdl
    /// storage {
    ///     base-url "https://example.supabase.co"
    ///     host-marker "supabase.co"
    ///     placeholder "https://picsum.photos/300"
    ///     bucket "kot-photos"
    /// }
    /// ```
    ///
    /// Missing entries keep their defaults.
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc = text.parse::<kdl::KdlDocument>()?;

        let mut config = Self::default();
        for node in doc.nodes() {
            match node.name().value() {
                "storage" => {
                    let Some(children) = node.children() else {
                        continue;
                    };
                    for child in children.nodes() {
                        let name = child.name().value();
                        let value = child
                            .entries()
                            .first()
                            .and_then(|e| e.value().as_string())
                            .ok_or_else(|| ConfigError::ExpectedString(SmolStr::new(name)))?;
                        config = match name {
                            "base-url" => config.with_base_url(value)?,
                            "host-marker" => config.with_host_marker(value)?,
                            "placeholder" => config.with_placeholder(value)?,
                            "bucket" => config.with_bucket(value),
                            other => return Err(ConfigError::UnknownNode(SmolStr::new(other))),
                        };
                    }
                }
                other => return Err(ConfigError::UnknownNode(SmolStr::new(other))),
            }
        }
        Ok(config)
    }

    /// Storage base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Substring identifying URLs that already point at our storage
    pub fn host_marker(&self) -> &str {
        &self.host_marker
    }

    /// Fallback image URL
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Upload bucket
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for a freshly picked image: `{user_id}/{millis}-{file_name}`,
    /// where the file name is the last segment of the local URI.
    pub fn object_path(&self, user_id: &str, timestamp_millis: i64, local_uri: &str) -> String {
        let file_name = local_uri.rsplit('/').next().unwrap_or(local_uri);
        format!("{user_id}/{timestamp_millis}-{file_name}")
    }

    /// Public URL of an uploaded object. This is the canonical absolute form
    /// persisted in a listing's `images` field.
    pub fn public_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            object_path.trim_start_matches('/')
        )
    }
}

/// `image/{ext}` for an uploaded file, from its extension
pub fn content_type(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| format!("image/{}", ext.to_ascii_lowercase()))
}

fn check_http_url(field: &'static str, value: &str) -> Result<()> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;
    if !value.starts_with("http") {
        return Err(ConfigError::NotHttp {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kdl_overrides_and_defaults() {
        let config = StorageConfig::from_kdl(
            r#"
            storage {
                base-url "https://demo.supabase.co/"
                bucket "photos"
            }
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://demo.supabase.co");
        assert_eq!(config.bucket(), "photos");
        assert_eq!(config.host_marker(), DEFAULT_HOST_MARKER);
        assert_eq!(config.placeholder(), DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn kdl_rejects_unknown_nodes() {
        let err = StorageConfig::from_kdl("storage {\n    colour \"blue\"\n}\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNode(name) if name == "colour"));

        let err = StorageConfig::from_kdl("cache\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNode(name) if name == "cache"));
    }

    #[test]
    fn kdl_requires_string_values() {
        let err = StorageConfig::from_kdl("storage {\n    placeholder 3\n}\n").unwrap_err();
        assert!(matches!(err, ConfigError::ExpectedString(name) if name == "placeholder"));
    }

    #[test]
    fn kdl_syntax_error() {
        assert!(matches!(
            StorageConfig::from_kdl("storage {").unwrap_err(),
            ConfigError::Kdl(_)
        ));
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            StorageConfig::default().with_placeholder("not a url"),
            Err(ConfigError::InvalidUrl { field: "placeholder", .. })
        ));
        assert!(matches!(
            StorageConfig::default().with_base_url("ftp://files.example"),
            Err(ConfigError::NotHttp { field: "base-url", .. })
        ));
        assert!(matches!(
            StorageConfig::default().with_host_marker("  "),
            Err(ConfigError::EmptyMarker)
        ));
    }

    #[test]
    fn placeholder_is_stored_encoded() {
        let config = StorageConfig::default()
            .with_placeholder("https://files.test/no image.png")
            .unwrap();
        assert_eq!(config.placeholder(), "https://files.test/no%20image.png");

        let config = config
            .with_placeholder("https://files.test/no%20image.png")
            .unwrap();
        assert_eq!(config.placeholder(), "https://files.test/no%20image.png");
    }

    #[test]
    fn upload_paths() {
        let config = StorageConfig::default();
        let path = config.object_path("user-1", 1_700_000_000_000, "file:///tmp/picker/IMG_01.jpg");
        assert_eq!(path, "user-1/1700000000000-IMG_01.jpg");
        assert_eq!(
            config.public_url(&path),
            "https://uabrniklevoi3rnyqogs.supabase.co/storage/v1/object/public/kot-photos/user-1/1700000000000-IMG_01.jpg"
        );
        assert_eq!(content_type("IMG_01.JPG").as_deref(), Some("image/jpg"));
        assert_eq!(content_type("noext"), None);
    }
}
