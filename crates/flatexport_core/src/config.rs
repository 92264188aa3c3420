use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// How image references under the upload path are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageLinks {
    /// Bare file name, resolving against the attachments linked next to the export.
    #[default]
    Relative,
    /// Full URL under the configured upload base.
    Absolute,
}

/// Settings the transform chain needs to recognise and rewrite site URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Public base URL of the site, used to absolutize internal links.
    pub site_url: String,
    /// Public base URL of the upload directory (e.g. `https://example.com/wp-content/uploads`).
    pub upload_url: String,
    pub image_links: ImageLinks,
    /// Keep the size of a resized image as a `?resize=w,h` query.
    pub resize_query: bool,
    /// ATX header depth -> Setext underline character. Depths not listed stay ATX.
    pub header_underlines: BTreeMap<u8, char>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".to_string(),
            upload_url: "http://localhost/wp-content/uploads".to_string(),
            image_links: ImageLinks::default(),
            resize_query: false,
            header_underlines: BTreeMap::from([(1, '='), (2, '-')]),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} is not an absolute http(s) URL: {value:?}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("header depth {0} is outside 1..=6")]
    InvalidHeaderDepth(u8),
    #[error("header underline {0:?} must be a visible ASCII punctuation character")]
    InvalidUnderline(char),
    #[error("could not build URL pattern: {0}")]
    InvalidPattern(String),
}

impl TransformConfig {
    /// Check the settings once at startup; a failure here disables exporting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site()?;
        self.upload()?;
        for (&depth, &ch) in &self.header_underlines {
            if !(1..=6).contains(&depth) {
                return Err(ConfigError::InvalidHeaderDepth(depth));
            }
            if !ch.is_ascii_punctuation() {
                return Err(ConfigError::InvalidUnderline(ch));
            }
        }
        Ok(())
    }

    pub(crate) fn site(&self) -> Result<Url, ConfigError> {
        parse_base("site_url", &self.site_url)
    }

    pub(crate) fn upload(&self) -> Result<Url, ConfigError> {
        parse_base("upload_url", &self.upload_url)
    }

    /// Site base without a trailing slash, for string concatenation.
    pub fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

fn parse_base(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}
