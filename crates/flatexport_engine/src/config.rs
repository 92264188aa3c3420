use std::path::PathBuf;

use chrono::{DateTime, Utc};
use flatexport_core::{Comment, ConfigError, DocumentKind, OutputFormat, TransformConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ATTACHMENTS: usize = 100;

/// How comment files are named inside a document directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKey {
    /// `comment_<id>.md`
    #[default]
    Id,
    /// `YYYY-MM-DD-HH-MM-SS.md` from the comment time (UTC).
    Timestamp,
}

impl CommentKey {
    pub fn file_name(self, comment: &Comment) -> String {
        match self {
            CommentKey::Id => format!("comment_{}.md", comment.id()),
            CommentKey::Timestamp => {
                let stamp = DateTime::<Utc>::from_timestamp(comment.date(), 0)
                    .map(|dt| dt.format("%Y-%m-%d-%H-%M-%S").to_string())
                    .unwrap_or_else(|| comment.date().to_string());
                format!("{stamp}.md")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Export root; each document gets `<root>/<slug>/`.
    pub root: PathBuf,
    /// Rewrite every file regardless of timestamps.
    pub force: bool,
    /// Documents with more attachments than this skip attachment reconciliation.
    pub max_attachments: usize,
    pub format: OutputFormat,
    pub comment_key: CommentKey,
    /// Housekeeping kinds a full sweep leaves out.
    pub excluded_kinds: Vec<DocumentKind>,
    pub transform: TransformConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("flat"),
            force: false,
            max_attachments: DEFAULT_MAX_ATTACHMENTS,
            format: OutputFormat::default(),
            comment_key: CommentKey::default(),
            excluded_kinds: vec![
                DocumentKind::Attachment,
                DocumentKind::Revision,
                DocumentKind::NavMenuItem,
            ],
            transform: TransformConfig::default(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transform.validate()
    }

    pub fn is_excluded(&self, kind: DocumentKind) -> bool {
        self.excluded_kinds.contains(&kind)
    }
}
