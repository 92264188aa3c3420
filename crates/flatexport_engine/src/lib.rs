//! Flat export engine: staleness checks, pinned-mtime persistence, attachment
//! reconciliation and the export orchestrator.
mod attachments;
mod config;
mod exporter;
mod persist;
mod staleness;
mod store;
mod types;

pub use attachments::{reconcile_attachments, AttachmentReport, FileLinker, StdFileLinker};
pub use config::{CommentKey, ExportConfig, DEFAULT_MAX_ATTACHMENTS};
pub use exporter::Exporter;
pub use persist::{ensure_output_dir, pin_modified, AtomicFileWriter, PersistError};
pub use staleness::{file_timestamp, StalenessOracle};
pub use store::{DocumentStore, JsonFileStore, StoreError};
pub use types::{CorpusSummary, ExportError, ExportFailure, ExportReport, WriteOutcome};
