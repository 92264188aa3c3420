use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::document::{Document, DocumentId};

// Slugs WordPress leaves behind for revisions and autosaves, e.g. `42-revision-v1`.
static HOUSEKEEPING_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[-_])(?:revision|autosave)(?:-v?[0-9]+)?$")
        .expect("valid housekeeping slug regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

/// Format-independent view of a document's metadata.
///
/// Field order is the serialisation order of the front matter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub title: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorMeta>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub taxonomy: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    pub uuid: String,
}

/// Collect everything the renderers need from `document`.
///
/// `site_url` is the public site base used for old-slug and id-based URLs.
pub fn assemble(document: &Document, site_url: &str) -> MetadataRecord {
    let updated = (document.modified() > document.published())
        .then(|| format_timestamp(document.modified()));

    MetadataRecord {
        title: document.title().to_string(),
        date: format_timestamp(document.published()),
        updated,
        slug: document.slug().to_string(),
        excerpt: document.excerpt().map(ToOwned::to_owned),
        author: author_meta(document),
        urls: alternate_urls(document, site_url),
        tags: dedupe(document.tags().iter().cloned()),
        taxonomy: taxonomy(document),
        location: location(document),
        attachments: document
            .attachments()
            .iter()
            .filter_map(|a| a.file_name.clone())
            .collect(),
        uuid: fingerprint(document.id(), document.published()),
    }
}

/// Permanent UUID-shaped key derived from the id and first publish time.
pub fn fingerprint(id: DocumentId, published: i64) -> String {
    let digest = Sha256::digest(format!("{id}:{published}").as_bytes());
    let mut hex = String::with_capacity(32);
    for byte in digest.iter().take(16) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// RFC 3339 in UTC with a `+00:00` offset; out-of-range values fall back to raw seconds.
pub fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
        .unwrap_or_else(|| epoch_seconds.to_string())
}

fn author_meta(document: &Document) -> Option<AuthorMeta> {
    let author = document.author();
    if author.name.is_empty() && author.email.is_none() && author.url.is_none() {
        return None;
    }
    Some(AuthorMeta {
        name: author.name.clone(),
        email: author.email.clone(),
        url: author.url.clone(),
    })
}

/// Old slugs, the id-based URL, the permalink and syndication copies; shortest first.
fn alternate_urls(document: &Document, site_url: &str) -> Vec<String> {
    let base = site_url.trim_end_matches('/');

    let old_slugs = document
        .old_slugs()
        .iter()
        .map(|slug| slug.trim().trim_matches('/'))
        .filter(|slug| !slug.is_empty() && !HOUSEKEEPING_SLUG.is_match(slug))
        .map(|slug| format!("{base}/{slug}/"));

    let candidates = old_slugs
        .chain(std::iter::once(format!("{base}/?p={}", document.id())))
        .chain(document.permalink().map(ToOwned::to_owned))
        .chain(document.syndication_urls().iter().cloned())
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty());

    let mut urls = dedupe(candidates);
    urls.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    urls
}

fn taxonomy(document: &Document) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(category) = document.category() {
        grouped
            .entry("category".to_string())
            .or_default()
            .push(category.to_string());
    }
    for term in document.terms() {
        let name = term.name.trim();
        if name.is_empty() {
            continue;
        }
        let taxonomy = term.taxonomy.trim();
        let taxonomy = taxonomy.strip_prefix("post_").unwrap_or(taxonomy);
        let names = grouped.entry(taxonomy.to_string()).or_default();
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    grouped
}

fn location(document: &Document) -> Option<Location> {
    let geo = document.geo()?;
    let latitude = geo.latitude.filter(|v| v.is_finite())?;
    let longitude = geo.longitude.filter(|v| v.is_finite())?;
    Some(Location {
        latitude,
        longitude,
        altitude: geo.altitude.filter(|v| v.is_finite()),
    })
}

fn dedupe(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
