//! Image reference stages: resized -> original, upload path canonicalisation,
//! featured image insertion and `{#img-ID}` marker stripping.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::{ConfigError, ImageLinks, TransformConfig};
use crate::document::Document;
use crate::transform::Transform;

// Characters that terminate a URL inside markdown or HTML attributes.
const URL_DIRS: &str = r#"(?:[^\s"'()<>\[\]]*/)?"#;
const URL_NAME: &str = r#"[^/\s"'()<>\[\]?#]"#;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{#img-[0-9]+\}").expect("valid marker regex"));

/// The upload base split into the parts the image patterns are built from.
#[derive(Debug, Clone)]
struct UploadBase {
    /// `scheme://host[:port]/path` without trailing slash.
    absolute: String,
    /// Regex prefix matching the base with or without `scheme://host`. The `lead`
    /// group keeps a root-relative match from starting inside a foreign URL.
    prefix_pattern: String,
}

impl UploadBase {
    fn new(config: &TransformConfig) -> Result<Self, ConfigError> {
        let upload = config.upload()?;
        let host = match upload.port() {
            Some(port) => format!("{}:{port}", upload.host_str().unwrap_or_default()),
            None => upload.host_str().unwrap_or_default().to_string(),
        };
        let path = upload.path().trim_end_matches('/').to_string();
        Ok(Self {
            absolute: format!("{}://{host}{path}", upload.scheme()),
            prefix_pattern: format!(
                r#"(?m)(?P<lead>^|[\s("'=<\[])(?:https?://{})?{}/"#,
                regex::escape(&host),
                regex::escape(&path)
            ),
        })
    }

    fn rewrite(&self, links: ImageLinks, dirs: &str, file: &str) -> String {
        match links {
            ImageLinks::Relative => file.to_string(),
            ImageLinks::Absolute => format!("{}/{dirs}{file}", self.absolute),
        }
    }
}

/// Rewrites `name-300x200.jpg` under the upload path to the original `name.jpg`.
#[derive(Debug, Clone)]
pub struct ResizedImages {
    base: UploadBase,
    pattern: Regex,
    links: ImageLinks,
    resize_query: bool,
}

impl ResizedImages {
    pub fn new(config: &TransformConfig) -> Result<Self, ConfigError> {
        let base = UploadBase::new(config)?;
        let pattern = format!(
            r"{prefix}(?P<dirs>{URL_DIRS})(?P<name>{URL_NAME}+?)-(?P<w>[0-9]{{1,4}})[x×](?P<h>[0-9]{{1,4}})\.(?P<ext>[a-zA-Z]{{2,4}})\b",
            prefix = base.prefix_pattern,
        );
        Ok(Self {
            pattern: compile(&pattern)?,
            base,
            links: config.image_links,
            resize_query: config.resize_query,
        })
    }
}

impl Transform for ResizedImages {
    fn name(&self) -> &'static str {
        "resized-images"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        self.pattern
            .replace_all(body, |caps: &Captures| {
                let file = format!("{}.{}", &caps["name"], &caps["ext"]);
                let mut url = self.base.rewrite(self.links, &caps["dirs"], &file);
                if self.resize_query {
                    url.push_str(&format!("?resize={},{}", &caps["w"], &caps["h"]));
                }
                format!("{}{url}", &caps["lead"])
            })
            .into_owned()
    }
}

/// Canonicalises any remaining reference under the upload path.
#[derive(Debug, Clone)]
pub struct UploadImages {
    base: UploadBase,
    pattern: Regex,
    links: ImageLinks,
}

impl UploadImages {
    pub fn new(config: &TransformConfig) -> Result<Self, ConfigError> {
        let base = UploadBase::new(config)?;
        let pattern = format!(
            r"{prefix}(?P<dirs>{URL_DIRS})(?P<name>{URL_NAME}+)\.(?P<ext>[a-zA-Z]{{2,4}})\b",
            prefix = base.prefix_pattern,
        );
        Ok(Self {
            pattern: compile(&pattern)?,
            base,
            links: config.image_links,
        })
    }

    /// Canonical form of a single URL; URLs outside the upload path come back unchanged.
    pub fn canonical(&self, url: &str) -> String {
        self.rewrite(url)
    }

    fn rewrite(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let file = format!("{}.{}", &caps["name"], &caps["ext"]);
                let url = self.base.rewrite(self.links, &caps["dirs"], &file);
                format!("{}{url}", &caps["lead"])
            })
            .into_owned()
    }
}

impl Transform for UploadImages {
    fn name(&self) -> &'static str {
        "upload-images"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        self.rewrite(body)
    }
}

/// Appends the featured image as `![title](url){#img-ID}` unless the body already shows it.
#[derive(Debug, Clone)]
pub struct FeaturedImageInsertion {
    uploads: UploadImages,
}

impl FeaturedImageInsertion {
    pub fn new(config: &TransformConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            uploads: UploadImages::new(config)?,
        })
    }
}

impl Transform for FeaturedImageInsertion {
    fn name(&self) -> &'static str {
        "featured-image"
    }

    fn apply(&self, body: &str, document: &Document) -> String {
        let Some(image) = document.featured_image() else {
            return body.to_string();
        };
        let url = self.uploads.canonical(image.url.trim());
        if url.is_empty() || references(body, &url) {
            return body.to_string();
        }

        let title = image
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(document.title())
            .replace(['[', ']'], "");

        let mut out = body.trim_end().to_string();
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&format!("![{title}]({url}){{#img-{}}}", image.id));
        out
    }
}

/// Removes `{#img-ID}` markers once the featured image has been placed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageMarkers;

impl Transform for ImageMarkers {
    fn name(&self) -> &'static str {
        "image-markers"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        MARKER.replace_all(body, "").into_owned()
    }
}

/// True when `body` mentions `url` as a whole reference, not as the tail of a longer one.
fn references(body: &str, url: &str) -> bool {
    body.match_indices(url).any(|(start, _)| {
        let before = body[..start].chars().next_back();
        let after = body[start + url.len()..].chars().next();
        before.map_or(true, |c| c.is_whitespace() || "(\"'=<[".contains(c))
            && after.map_or(true, |c| c.is_whitespace() || ")\"'>]?#{".contains(c))
    })
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|err| ConfigError::InvalidPattern(err.to_string()))
}
