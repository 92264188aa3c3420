use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::filename::{is_safe_component, sanitize_component};

pub type DocumentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Post,
    Page,
    Attachment,
    Revision,
    NavMenuItem,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
    pub url: Option<String>,
}

/// Raw geo meta as stored by the host; any part may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
}

/// A taxonomy term attached to a document (`post_tag`, `category`, custom taxonomies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub taxonomy: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedImage {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A binary file owned by a document, linked or copied next to its export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub source: PathBuf,
    /// Target name inside the document directory; defaults to the source's file name.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Attachment {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            file_name: None,
        }
    }

    /// The sanitized target file name, or `None` if no usable name exists.
    ///
    /// An explicit name that sanitises to nothing falls back to the source's name.
    pub fn target_name(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|name| last_component(Path::new(name)))
            .or_else(|| last_component(&self.source))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommentKind {
    #[default]
    Reply,
    Pingback,
    Trackback,
    Like,
    Reaction,
    Other(String),
}

impl From<String> for CommentKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "comment" | "reply" => CommentKind::Reply,
            "pingback" => CommentKind::Pingback,
            "trackback" => CommentKind::Trackback,
            "like" => CommentKind::Like,
            "reaction" => CommentKind::Reaction,
            other => CommentKind::Other(other.to_string()),
        }
    }
}

impl From<CommentKind> for String {
    fn from(kind: CommentKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentKind::Reply => write!(f, "Reply"),
            CommentKind::Pingback => write!(f, "Pingback"),
            CommentKind::Trackback => write!(f, "Trackback"),
            CommentKind::Like => write!(f, "Like"),
            CommentKind::Reaction => write!(f, "Reaction"),
            CommentKind::Other(raw) => {
                let mut chars = raw.chars();
                match chars.next() {
                    Some(first) => write!(f, "{}{}", first.to_uppercase(), chars.as_str()),
                    None => write!(f, "Reply"),
                }
            }
        }
    }
}

/// Comment as supplied by the host store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentRecord {
    pub id: u64,
    pub author: Author,
    pub body: String,
    /// Epoch seconds.
    pub date: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: u64,
    author: Author,
    body: String,
    date: i64,
    kind: CommentKind,
    avatar: Option<String>,
}

impl Comment {
    pub fn new(record: CommentRecord) -> Result<Self, DocumentError> {
        if record.id == 0 {
            return Err(DocumentError::InvalidCommentId);
        }
        Ok(Self {
            id: record.id,
            author: normalize_author(record.author),
            body: record.body,
            date: record.date,
            kind: CommentKind::from(record.kind),
            avatar: non_empty(record.avatar),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Comment timestamp in epoch seconds; this is the staleness key for its file.
    pub fn date(&self) -> i64 {
        self.date
    }

    pub fn kind(&self) -> &CommentKind {
        &self.kind
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }
}

/// Document as supplied by the host store, before validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    /// First publish time, epoch seconds.
    pub published: i64,
    /// Last modification time, epoch seconds. Zero means "never modified".
    pub modified: i64,
    pub author: Author,
    pub tags: Vec<String>,
    pub terms: Vec<Term>,
    pub category: Option<String>,
    pub geo: Option<GeoPoint>,
    pub old_slugs: Vec<String>,
    /// Newline separated, as the host stores it.
    pub syndication_urls: Option<String>,
    pub permalink: Option<String>,
    pub featured_image: Option<FeaturedImage>,
    pub attachments: Vec<Attachment>,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document id must be non-zero")]
    InvalidId,
    #[error("document {id}: slug {slug:?} is not a safe path component")]
    InvalidSlug { id: DocumentId, slug: String },
    #[error("comment id must be non-zero")]
    InvalidCommentId,
}

/// A validated, immutable exportable unit.
///
/// Only [`Document::new`] produces one, so every value carries a non-zero id
/// and a slug usable as a directory name. Attachment target names are
/// sanitised; invalid comments are set aside in [`Document::rejected`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    kind: DocumentKind,
    slug: String,
    title: String,
    body: String,
    excerpt: Option<String>,
    published: i64,
    modified: i64,
    author: Author,
    tags: Vec<String>,
    terms: Vec<Term>,
    category: Option<String>,
    geo: Option<GeoPoint>,
    old_slugs: Vec<String>,
    syndication_urls: Vec<String>,
    permalink: Option<String>,
    featured_image: Option<FeaturedImage>,
    attachments: Vec<Attachment>,
    comments: Vec<Comment>,
    rejected: Vec<DocumentError>,
}

impl Document {
    pub fn new(record: DocumentRecord) -> Result<Self, DocumentError> {
        if record.id == 0 {
            return Err(DocumentError::InvalidId);
        }
        let slug = record.slug.trim().to_string();
        if !is_safe_component(&slug) {
            return Err(DocumentError::InvalidSlug {
                id: record.id,
                slug: record.slug,
            });
        }

        // Unusable attachment names stay `None`; reconciliation reports them as failed.
        let attachments = record
            .attachments
            .into_iter()
            .map(|attachment| Attachment {
                file_name: attachment.target_name(),
                source: attachment.source,
            })
            .collect();

        let mut rejected = Vec::new();
        let mut comments = Vec::new();
        for comment in record.comments {
            match Comment::new(comment) {
                Ok(comment) => comments.push(comment),
                Err(err) => rejected.push(err),
            }
        }

        let syndication_urls = record
            .syndication_urls
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        let modified = if record.modified == 0 {
            record.published
        } else {
            record.modified
        };

        Ok(Self {
            id: record.id,
            kind: record.kind,
            slug,
            title: record.title.trim().to_string(),
            body: record.body,
            excerpt: non_empty(record.excerpt),
            published: record.published,
            modified,
            author: normalize_author(record.author),
            tags: record
                .tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            terms: record.terms,
            category: non_empty(record.category),
            geo: record.geo,
            old_slugs: record.old_slugs,
            syndication_urls,
            permalink: non_empty(record.permalink),
            featured_image: record.featured_image,
            attachments,
            comments,
            rejected,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    pub fn published(&self) -> i64 {
        self.published
    }

    /// Modification time in epoch seconds; this is the staleness key for the body file.
    pub fn modified(&self) -> i64 {
        self.modified
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn geo(&self) -> Option<&GeoPoint> {
        self.geo.as_ref()
    }

    pub fn old_slugs(&self) -> &[String] {
        &self.old_slugs
    }

    pub fn syndication_urls(&self) -> &[String] {
        &self.syndication_urls
    }

    pub fn permalink(&self) -> Option<&str> {
        self.permalink.as_deref()
    }

    pub fn featured_image(&self) -> Option<&FeaturedImage> {
        self.featured_image.as_ref()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Child records dropped during validation; the rest of the document is intact.
    pub fn rejected(&self) -> &[DocumentError] {
        &self.rejected
    }
}

impl TryFrom<DocumentRecord> for Document {
    type Error = DocumentError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        Document::new(record)
    }
}

fn last_component(path: &Path) -> Option<String> {
    sanitize_component(&path.file_name()?.to_string_lossy())
}

fn normalize_author(author: Author) -> Author {
    Author {
        name: author.name.trim().to_string(),
        email: non_empty(author.email),
        url: non_empty(author.url),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
