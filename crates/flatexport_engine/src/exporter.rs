use std::path::{Path, PathBuf};

use export_logging::{export_debug, export_error, export_info, export_trace, export_warn};
use flatexport_core::{assemble, render, render_comment, Document, TransformChain};

use crate::attachments::{reconcile_attachments, FileLinker, StdFileLinker};
use crate::config::ExportConfig;
use crate::persist::{ensure_output_dir, pin_modified, AtomicFileWriter};
use crate::staleness::StalenessOracle;
use crate::store::{DocumentStore, StoreError};
use crate::types::{CorpusSummary, ExportError, ExportFailure, ExportReport, WriteOutcome};

/// Drives the export of single documents and whole corpora into `root/<slug>/`.
pub struct Exporter {
    config: ExportConfig,
    chain: TransformChain,
    oracle: StalenessOracle,
    linker: Box<dyn FileLinker>,
}

impl Exporter {
    /// Validates the configuration and builds the transform chain once.
    pub fn new(config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        let chain = TransformChain::standard(&config.transform)?;
        Ok(Self {
            oracle: StalenessOracle::new(config.force),
            config,
            chain,
            linker: Box::new(StdFileLinker),
        })
    }

    pub fn with_linker(mut self, linker: impl FileLinker + 'static) -> Self {
        self.linker = Box::new(linker);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn document_dir(&self, document: &Document) -> PathBuf {
        self.config.root.join(document.slug())
    }

    /// Render the body file for `document` without touching the filesystem.
    pub fn render(&self, document: &Document) -> Result<String, ExportError> {
        export_trace!("Rendering {:?}", document.slug());
        let metadata = assemble(document, self.config.transform.site_base());
        let body = self.chain.run(document.body(), document);
        Ok(render(&metadata, &body, self.config.format)?)
    }

    /// Export one document.
    ///
    /// Attachments and comments are reconciled on every call; the body is
    /// rendered and written only when its target is stale.
    pub fn export_one(&self, document: &Document) -> Result<ExportReport, ExportError> {
        let dir = self.document_dir(document);
        for path in [self.config.root.as_path(), dir.as_path()] {
            ensure_output_dir(path).map_err(|source| ExportError::Directory {
                path: path.to_path_buf(),
                source,
            })?;
        }

        for issue in document.rejected() {
            export_warn!("{:?}: skipped invalid record: {}", document.slug(), issue);
        }

        let attachments = reconcile_attachments(
            document.attachments(),
            &dir,
            self.config.max_attachments,
            self.linker.as_ref(),
        );

        let writer = AtomicFileWriter::new(dir.clone());
        let (comments_written, comments_fresh) = self.export_comments(document, &dir, &writer)?;

        let body_name = self.config.format.body_file_name();
        let body_path = dir.join(body_name);
        let body = if self.oracle.is_stale(&body_path, document.modified()) {
            let content = self.render(document)?;
            writer.write(body_name, &content, Some(document.modified()))?;
            export_info!("Exported {:?} to {:?}", document.slug(), body_path);
            WriteOutcome::Written
        } else {
            export_debug!("{:?} is up to date", body_path);
            WriteOutcome::Fresh
        };

        // Last, so the files written above do not move it again.
        if let Err(err) = pin_modified(&dir, document.modified()) {
            export_warn!("Could not set modification time of {:?}: {}", dir, err);
        }

        Ok(ExportReport {
            slug: document.slug().to_string(),
            body,
            body_path,
            comments_written,
            comments_fresh,
            attachments,
        })
    }

    fn export_comments(
        &self,
        document: &Document,
        dir: &Path,
        writer: &AtomicFileWriter,
    ) -> Result<(usize, usize), ExportError> {
        let (mut written, mut fresh) = (0, 0);
        for comment in document.comments() {
            let name = self.config.comment_key.file_name(comment);
            if !self.oracle.is_stale(&dir.join(&name), comment.date()) {
                fresh += 1;
                continue;
            }
            let content = render_comment(comment, document)?;
            writer.write(&name, &content, Some(comment.date()))?;
            export_info!("Exported comment {} of {:?}", comment.id(), document.slug());
            written += 1;
        }
        Ok((written, fresh))
    }

    /// Export every document whose kind is not excluded.
    ///
    /// A failing document is logged and recorded; the sweep carries on.
    pub fn export_all(&self, documents: &[Document]) -> CorpusSummary {
        let mut summary = CorpusSummary::default();
        for document in documents {
            if self.config.is_excluded(document.kind()) {
                export_debug!("Skipping {:?} ({:?})", document.slug(), document.kind());
                summary.skipped.push(document.slug().to_string());
                continue;
            }
            match self.export_one(document) {
                Ok(report) => summary.reports.push(report),
                Err(err) => {
                    export_error!("Export of {:?} failed: {}", document.slug(), err);
                    summary.failures.push(ExportFailure {
                        slug: document.slug().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
        export_info!(
            "Sweep finished: {} written, {} fresh, {} skipped, {} failed",
            summary.written(),
            summary.fresh(),
            summary.skipped.len(),
            summary.failures.len()
        );
        summary
    }

    /// Read the full corpus from `store` and export it.
    pub fn export_store(&self, store: &dyn DocumentStore) -> Result<CorpusSummary, StoreError> {
        let documents = store.documents()?;
        Ok(self.export_all(&documents))
    }
}
