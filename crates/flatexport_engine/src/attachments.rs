use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use export_logging::{export_debug, export_warn};
use flatexport_core::Attachment;

/// Filesystem seam for placing attachment bytes next to an export.
pub trait FileLinker {
    fn hard_link(&self, source: &Path, target: &Path) -> io::Result<()>;
    fn copy(&self, source: &Path, target: &Path) -> io::Result<u64>;
}

/// Plain `std::fs` hard links and copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileLinker;

impl FileLinker for StdFileLinker {
    fn hard_link(&self, source: &Path, target: &Path) -> io::Result<()> {
        fs::hard_link(source, target)
    }

    fn copy(&self, source: &Path, target: &Path) -> io::Result<u64> {
        fs::copy(source, target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentReport {
    pub linked: Vec<PathBuf>,
    pub copied: Vec<PathBuf>,
    /// Targets that already existed; no link or copy was attempted.
    pub present: Vec<PathBuf>,
    /// Sources that could be neither linked nor copied, or had no usable name.
    pub failed: Vec<PathBuf>,
    /// The batch exceeded the configured maximum and was left alone.
    pub skipped_batch: bool,
}

impl AttachmentReport {
    pub fn placed(&self) -> usize {
        self.linked.len() + self.copied.len()
    }
}

/// Make every attachment available inside `dir`.
///
/// Never fails: an existing target is kept as is, a failed hard link falls
/// back to a copy, and a failed copy is logged and skipped.
pub fn reconcile_attachments(
    attachments: &[Attachment],
    dir: &Path,
    max_attachments: usize,
    linker: &dyn FileLinker,
) -> AttachmentReport {
    let mut report = AttachmentReport::default();
    if attachments.len() > max_attachments {
        export_warn!(
            "Skipping {} attachments for {:?}: more than the limit of {}",
            attachments.len(),
            dir,
            max_attachments
        );
        report.skipped_batch = true;
        return report;
    }

    for attachment in attachments {
        let Some(name) = attachment.target_name() else {
            export_warn!("Attachment {:?} has no usable file name", attachment.source);
            report.failed.push(attachment.source.clone());
            continue;
        };
        let target = dir.join(name);
        if target.exists() {
            export_debug!("Attachment {:?} already present", target);
            report.present.push(target);
            continue;
        }

        match linker.hard_link(&attachment.source, &target) {
            Ok(()) => {
                report.linked.push(target);
                continue;
            }
            Err(err) => export_warn!(
                "Hard link {:?} -> {:?} failed, copying instead: {}",
                attachment.source,
                target,
                err
            ),
        }

        match linker.copy(&attachment.source, &target) {
            Ok(_) => report.copied.push(target),
            Err(err) => {
                // A half-written copy would pass as present on the next run.
                let _ = fs::remove_file(&target);
                export_warn!(
                    "Copy {:?} -> {:?} failed, skipping attachment: {}",
                    attachment.source,
                    target,
                    err
                );
                report.failed.push(attachment.source.clone());
            }
        }
    }
    report
}
