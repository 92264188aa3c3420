use std::fmt;
use std::path::PathBuf;

use flatexport_core::{ConfigError, RenderError};
use thiserror::Error;

use crate::attachments::AttachmentReport;
use crate::persist::PersistError;

/// What happened to a staleness-gated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Target mtime already matched the source timestamp.
    Fresh,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Written => write!(f, "written"),
            WriteOutcome::Fresh => write!(f, "fresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub slug: String,
    pub body: WriteOutcome,
    pub body_path: PathBuf,
    pub comments_written: usize,
    pub comments_fresh: usize,
    pub attachments: AttachmentReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub slug: String,
    pub message: String,
}

/// Outcome of a full corpus sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusSummary {
    pub reports: Vec<ExportReport>,
    /// Slugs left out because their kind is excluded.
    pub skipped: Vec<String>,
    pub failures: Vec<ExportFailure>,
}

impl CorpusSummary {
    /// Documents whose body file was (re)written.
    pub fn written(&self) -> usize {
        self.count(WriteOutcome::Written)
    }

    /// Documents whose body file was already up to date.
    pub fn fresh(&self) -> usize {
        self.count(WriteOutcome::Fresh)
    }

    fn count(&self, outcome: WriteOutcome) -> usize {
        self.reports
            .iter()
            .filter(|report| report.body == outcome)
            .count()
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot prepare directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error("write failed: {0}")]
    Persist(#[from] PersistError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}
