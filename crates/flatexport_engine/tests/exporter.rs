use std::fs;
use std::path::Path;

use flatexport_core::{
    Attachment, Author, CommentRecord, Document, DocumentKind, DocumentRecord, OutputFormat,
};
use flatexport_engine::{
    file_timestamp, pin_modified, CommentKey, ExportConfig, ExportError, Exporter, WriteOutcome,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PUBLISHED: i64 = 1_420_070_400;
const MODIFIED: i64 = 1_420_156_800;

fn config(root: &Path) -> ExportConfig {
    let mut config = ExportConfig {
        root: root.to_path_buf(),
        ..ExportConfig::default()
    };
    config.transform.site_url = "https://example.com".to_string();
    config.transform.upload_url = "https://example.com/wp-content/uploads".to_string();
    config
}

fn record(id: u64, slug: &str) -> DocumentRecord {
    DocumentRecord {
        id,
        slug: slug.to_string(),
        title: format!("Post {id}"),
        body: "## Intro\n\nSee [docs](/docs \"Docs\").".to_string(),
        published: PUBLISHED,
        modified: MODIFIED,
        author: Author {
            name: "Jane".into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn document(id: u64, slug: &str) -> Document {
    Document::new(record(id, slug)).unwrap()
}

fn with_comment(id: u64, slug: &str) -> Document {
    let mut record = record(id, slug);
    record.comments = vec![CommentRecord {
        id: 42,
        author: Author {
            name: "Bob".into(),
            ..Default::default()
        },
        body: "Nice post".into(),
        date: 1_420_200_000,
        ..Default::default()
    }];
    Document::new(record).unwrap()
}

#[test]
fn export_writes_body_with_source_timestamp() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();

    let report = exporter.export_one(&document(1, "first")).unwrap();

    let body_path = temp.path().join("first").join("item.md");
    assert_eq!(report.body, WriteOutcome::Written);
    assert_eq!(report.body_path, body_path);
    let content = fs::read_to_string(&body_path).unwrap();
    assert!(content.starts_with("---\ntitle: Post 1\n"));
    assert!(content.contains("Intro\n-----"));
    assert!(content.ends_with("[1]: https://example.com/docs Docs\n"));
    assert_eq!(file_timestamp(&body_path), Some(MODIFIED));
    assert_eq!(file_timestamp(&temp.path().join("first")), Some(MODIFIED));
}

#[test]
fn second_export_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();
    let doc = with_comment(1, "first");

    exporter.export_one(&doc).unwrap();
    let dir = temp.path().join("first");
    let before = fs::read(dir.join("item.md")).unwrap();

    let report = exporter.export_one(&doc).unwrap();

    assert_eq!(report.body, WriteOutcome::Fresh);
    assert_eq!(report.comments_written, 0);
    assert_eq!(report.comments_fresh, 1);
    assert_eq!(fs::read(dir.join("item.md")).unwrap(), before);
    assert_eq!(file_timestamp(&dir.join("item.md")), Some(MODIFIED));
    assert_eq!(file_timestamp(&dir.join("comment_42.md")), Some(1_420_200_000));
}

#[test]
fn timestamp_mismatch_triggers_rewrite() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();
    let doc = document(1, "first");
    exporter.export_one(&doc).unwrap();

    let body_path = temp.path().join("first").join("item.md");
    fs::write(&body_path, "stale").unwrap();
    pin_modified(&body_path, MODIFIED - 1).unwrap();

    let report = exporter.export_one(&doc).unwrap();

    assert_eq!(report.body, WriteOutcome::Written);
    assert_ne!(fs::read_to_string(&body_path).unwrap(), "stale");
    assert_eq!(file_timestamp(&body_path), Some(MODIFIED));
}

#[test]
fn force_rewrites_fresh_files() {
    let temp = TempDir::new().unwrap();
    let mut cfg = config(temp.path());
    Exporter::new(cfg.clone())
        .unwrap()
        .export_one(&with_comment(1, "first"))
        .unwrap();

    cfg.force = true;
    let report = Exporter::new(cfg)
        .unwrap()
        .export_one(&with_comment(1, "first"))
        .unwrap();

    assert_eq!(report.body, WriteOutcome::Written);
    assert_eq!(report.comments_written, 1);
}

#[test]
fn comments_get_their_own_files() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();

    exporter.export_one(&with_comment(1, "first")).unwrap();

    let comment = fs::read_to_string(temp.path().join("first").join("comment_42.md")).unwrap();
    assert!(comment.starts_with("---\nfrom:\n  name: Bob\n"));
    assert!(comment.contains("type: Reply\n"));
    assert!(comment.ends_with("Nice post\n"));
}

#[test]
fn comments_can_be_keyed_by_timestamp() {
    let temp = TempDir::new().unwrap();
    let mut cfg = config(temp.path());
    cfg.comment_key = CommentKey::Timestamp;
    let exporter = Exporter::new(cfg).unwrap();

    exporter.export_one(&with_comment(1, "first")).unwrap();

    assert!(temp
        .path()
        .join("first")
        .join("2015-01-02-12-00-00.md")
        .exists());
}

#[test]
fn fresh_body_still_reconciles_attachments() {
    export_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("photo.jpg");
    fs::write(&source, b"jpeg").unwrap();
    let exporter = Exporter::new(config(&temp.path().join("flat"))).unwrap();
    exporter.export_one(&document(1, "first")).unwrap();

    let mut rec = record(1, "first");
    rec.attachments = vec![Attachment::new(&source)];
    let report = exporter.export_one(&Document::new(rec).unwrap()).unwrap();

    assert_eq!(report.body, WriteOutcome::Fresh);
    assert_eq!(report.attachments.placed(), 1);
    assert!(temp.path().join("flat").join("first").join("photo.jpg").exists());
}

#[test]
fn bad_child_records_do_not_block_the_document() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("ok.jpg");
    fs::write(&source, b"jpeg").unwrap();
    let exporter = Exporter::new(config(&temp.path().join("flat"))).unwrap();

    let mut rec = record(1, "first");
    rec.attachments = vec![Attachment::new(&source), Attachment::new("/")];
    rec.comments = vec![CommentRecord::default()];
    let report = exporter.export_one(&Document::new(rec).unwrap()).unwrap();

    let dir = temp.path().join("flat").join("first");
    assert_eq!(report.body, WriteOutcome::Written);
    assert_eq!(report.attachments.placed(), 1);
    assert_eq!(report.attachments.failed, vec![std::path::PathBuf::from("/")]);
    assert_eq!(report.comments_written, 0);
    assert!(dir.join("ok.jpg").exists());
    assert!(dir.join("item.md").exists());
}

#[test]
fn sectioned_format_writes_text_file() {
    let temp = TempDir::new().unwrap();
    let mut cfg = config(temp.path());
    cfg.format = OutputFormat::Sectioned;
    let exporter = Exporter::new(cfg).unwrap();

    let report = exporter.export_one(&document(1, "first")).unwrap();

    assert_eq!(report.body_path, temp.path().join("first").join("item.txt"));
    let content = fs::read_to_string(&report.body_path).unwrap();
    assert!(content.starts_with("Post 1\n======\n"));
}

#[test]
fn render_returns_text_without_writing() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(&temp.path().join("flat"))).unwrap();
    let doc = document(1, "first");

    let text = exporter.render(&doc).unwrap();

    assert!(text.contains("title: Post 1"));
    assert!(!temp.path().join("flat").exists());

    exporter.export_one(&doc).unwrap();
    assert_eq!(
        fs::read_to_string(temp.path().join("flat").join("first").join("item.md")).unwrap(),
        text
    );
}

#[test]
fn corpus_continues_past_a_failing_document() {
    export_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();
    // A regular file where the second document's directory should go.
    fs::write(temp.path().join("second"), "in the way").unwrap();
    let docs = vec![
        document(1, "first"),
        document(2, "second"),
        document(3, "third"),
    ];

    let summary = exporter.export_all(&docs);

    assert_eq!(summary.written(), 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].slug, "second");
    assert!(temp.path().join("first").join("item.md").exists());
    assert!(temp.path().join("third").join("item.md").exists());
}

#[test]
fn directory_failure_is_reported_for_the_document() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();
    fs::write(temp.path().join("second"), "in the way").unwrap();

    let err = exporter.export_one(&document(2, "second")).unwrap_err();
    assert!(matches!(err, ExportError::Directory { .. }));
}

#[test]
fn housekeeping_kinds_are_skipped_in_a_sweep() {
    let temp = TempDir::new().unwrap();
    let exporter = Exporter::new(config(temp.path())).unwrap();
    let mut revision = record(2, "first-revision-v1");
    revision.kind = DocumentKind::Revision;
    let docs = vec![document(1, "first"), Document::new(revision).unwrap()];

    let summary = exporter.export_all(&docs);

    assert_eq!(summary.skipped, vec!["first-revision-v1".to_string()]);
    assert_eq!(summary.written(), 1);
    assert!(!temp.path().join("first-revision-v1").exists());
}

#[test]
fn invalid_configuration_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut cfg = config(temp.path());
    cfg.transform.site_url = "ftp://example.com".to_string();

    assert!(matches!(Exporter::new(cfg), Err(ExportError::Config(_))));
}
