use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flatexport_core::Attachment;
use flatexport_engine::{reconcile_attachments, FileLinker, StdFileLinker};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingLinker {
    calls: RefCell<Vec<(&'static str, PathBuf)>>,
}

impl FileLinker for RecordingLinker {
    fn hard_link(&self, source: &Path, target: &Path) -> io::Result<()> {
        self.calls.borrow_mut().push(("link", target.to_path_buf()));
        fs::hard_link(source, target)
    }

    fn copy(&self, source: &Path, target: &Path) -> io::Result<u64> {
        self.calls.borrow_mut().push(("copy", target.to_path_buf()));
        fs::copy(source, target)
    }
}

/// Hard links always fail, as across filesystems.
struct CrossDeviceLinker;

impl FileLinker for CrossDeviceLinker {
    fn hard_link(&self, _source: &Path, _target: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "cross-device link"))
    }

    fn copy(&self, source: &Path, target: &Path) -> io::Result<u64> {
        fs::copy(source, target)
    }
}

struct BrokenLinker;

impl FileLinker for BrokenLinker {
    fn hard_link(&self, _source: &Path, _target: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "no links"))
    }

    fn copy(&self, _source: &Path, target: &Path) -> io::Result<u64> {
        fs::write(target, "partial")?;
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

fn source_file(temp: &TempDir, name: &str, bytes: &[u8]) -> Attachment {
    let dir = temp.path().join("uploads");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    Attachment::new(path)
}

fn target_dir(temp: &TempDir) -> PathBuf {
    let dir = temp.path().join("flat").join("post");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn attachments_are_hard_linked() {
    let temp = TempDir::new().unwrap();
    let attachment = source_file(&temp, "photo.jpg", b"jpeg bytes");
    let dir = target_dir(&temp);

    let report = reconcile_attachments(&[attachment], &dir, 100, &StdFileLinker);

    assert_eq!(report.linked, vec![dir.join("photo.jpg")]);
    assert_eq!(fs::read(dir.join("photo.jpg")).unwrap(), b"jpeg bytes");
}

#[test]
fn existing_target_is_not_touched() {
    let temp = TempDir::new().unwrap();
    let attachment = source_file(&temp, "photo.jpg", b"new bytes");
    let dir = target_dir(&temp);
    fs::write(dir.join("photo.jpg"), b"old bytes").unwrap();
    let linker = RecordingLinker::default();

    let report = reconcile_attachments(&[attachment], &dir, 100, &linker);

    assert!(linker.calls.borrow().is_empty());
    assert_eq!(report.present, vec![dir.join("photo.jpg")]);
    assert_eq!(fs::read(dir.join("photo.jpg")).unwrap(), b"old bytes");
}

#[test]
fn failed_hard_link_falls_back_to_identical_copy() {
    let temp = TempDir::new().unwrap();
    let attachment = source_file(&temp, "paper.pdf", b"%PDF-1.4 content");
    let dir = target_dir(&temp);

    let report = reconcile_attachments(&[attachment.clone()], &dir, 100, &CrossDeviceLinker);

    assert_eq!(report.copied, vec![dir.join("paper.pdf")]);
    assert_eq!(
        fs::read(dir.join("paper.pdf")).unwrap(),
        fs::read(&attachment.source).unwrap()
    );
}

#[test]
fn failed_copy_is_skipped_and_cleaned_up() {
    let temp = TempDir::new().unwrap();
    let broken = source_file(&temp, "a.jpg", b"a");
    let dir = target_dir(&temp);

    let report = reconcile_attachments(&[broken.clone()], &dir, 100, &BrokenLinker);

    assert_eq!(report.failed, vec![broken.source]);
    assert!(!dir.join("a.jpg").exists());
}

#[test]
fn one_failure_does_not_stop_the_rest() {
    let temp = TempDir::new().unwrap();
    let missing = Attachment::new(temp.path().join("uploads").join("gone.jpg"));
    let present = source_file(&temp, "here.jpg", b"here");
    let dir = target_dir(&temp);

    let report = reconcile_attachments(&[missing.clone(), present], &dir, 100, &StdFileLinker);

    assert_eq!(report.failed, vec![missing.source]);
    assert_eq!(report.placed(), 1);
    assert!(dir.join("here.jpg").exists());
}

#[test]
fn oversize_batch_is_skipped() {
    let temp = TempDir::new().unwrap();
    let attachments = vec![
        source_file(&temp, "1.jpg", b"1"),
        source_file(&temp, "2.jpg", b"2"),
        source_file(&temp, "3.jpg", b"3"),
    ];
    let dir = target_dir(&temp);
    let linker = RecordingLinker::default();

    let report = reconcile_attachments(&attachments, &dir, 2, &linker);

    assert!(report.skipped_batch);
    assert!(linker.calls.borrow().is_empty());
    assert!(!dir.join("1.jpg").exists());
}
