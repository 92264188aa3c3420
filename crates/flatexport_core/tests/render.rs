use flatexport_core::{
    assemble, render, render_comment, Attachment, Author, Comment, CommentRecord, Document,
    DocumentRecord, GeoPoint, OutputFormat,
};
use pretty_assertions::assert_eq;

const SITE: &str = "https://example.com";

fn plain_document() -> Document {
    Document::new(DocumentRecord {
        id: 7,
        slug: "hello".to_string(),
        title: "Hello".to_string(),
        published: 1_420_070_400,
        ..Default::default()
    })
    .unwrap()
}

fn rich_document() -> Document {
    Document::new(DocumentRecord {
        id: 7,
        slug: "hello".to_string(),
        title: "Hello".to_string(),
        excerpt: Some("Short version.".to_string()),
        published: 1_420_070_400,
        author: Author {
            name: "Jane".into(),
            email: Some("jane@example.com".into()),
            url: None,
        },
        tags: vec!["rust".into(), "blog".into()],
        geo: Some(GeoPoint {
            latitude: Some(51.5),
            longitude: Some(-0.25),
            altitude: None,
        }),
        attachments: vec![Attachment::new("/srv/uploads/2015/01/cover.jpg")],
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn front_matter_precedes_body() {
    let doc = plain_document();
    let meta = assemble(&doc, SITE);
    let out = render(&meta, "Body text", OutputFormat::FrontMatter).unwrap();

    assert!(out.starts_with("---\ntitle: Hello\n"));
    assert!(out.contains("2015-01-01T00:00:00+00:00"));
    assert!(out.contains(&format!("uuid: {}", meta.uuid)));
    assert!(out.ends_with("\n---\n\nBody text\n"));
    assert!(!out.contains("tags:"));
    assert!(!out.contains("location:"));
}

#[test]
fn front_matter_lists_present_fields() {
    let doc = rich_document();
    let meta = assemble(&doc, SITE);
    let out = render(&meta, "Body", OutputFormat::FrontMatter).unwrap();

    assert!(out.contains("excerpt: Short version.\n"));
    assert!(out.contains("tags:\n- rust\n- blog\n"));
    assert!(out.contains("latitude: 51.5\n"));
    assert!(out.contains("attachments:\n- cover.jpg\n"));
}

#[test]
fn sectioned_text_has_fixed_section_order() {
    let doc = rich_document();
    let meta = assemble(&doc, SITE);
    let out = render(&meta, "Body", OutputFormat::Sectioned).unwrap();

    let expected = format!(
        "Hello\n=====\n\nShort version.\n\nBody\n\n\
         Published\n---------\n2015-01-01T00:00:00+00:00\n\n\
         URLs\n----\nhttps://example.com/?p=7\n\n\
         Author\n------\nJane <jane@example.com>\n\n\
         Tags\n----\nrust, blog\n\n\
         Location\n--------\n51.5, -0.25\n\n\
         Attachments\n-----------\ncover.jpg\n\n\
         UUID\n----\n{}\n",
        meta.uuid
    );
    assert_eq!(out, expected);
}

#[test]
fn sectioned_text_omits_empty_sections() {
    let doc = plain_document();
    let meta = assemble(&doc, SITE);
    let out = render(&meta, "", OutputFormat::Sectioned).unwrap();

    for absent in ["Author\n", "Tags\n", "Location\n", "Attachments\n"] {
        assert!(!out.contains(absent), "unexpected section {absent:?} in {out}");
    }
    assert!(out.starts_with("Hello\n=====\n\nPublished\n---------\n"));
}

#[test]
fn raw_format_is_body_only() {
    let meta = assemble(&plain_document(), SITE);
    assert_eq!(
        render(&meta, "  just the body \n", OutputFormat::Raw).unwrap(),
        "just the body\n"
    );
}

#[test]
fn rendering_is_deterministic() {
    let doc = rich_document();
    for format in [
        OutputFormat::FrontMatter,
        OutputFormat::Sectioned,
        OutputFormat::Raw,
    ] {
        let first = render(&assemble(&doc, SITE), "Body", format).unwrap();
        let second = render(&assemble(&doc, SITE), "Body", format).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn comment_carries_author_type_and_parent() {
    let parent = Document::new(DocumentRecord {
        id: 7,
        slug: "hello".into(),
        permalink: Some("https://example.com/hello/".into()),
        ..Default::default()
    })
    .unwrap();
    let comment = Comment::new(CommentRecord {
        id: 12,
        author: Author {
            name: "Bob".into(),
            email: None,
            url: Some("https://bob.example".into()),
        },
        body: "  Nice post!  ".into(),
        date: 1_420_070_400,
        kind: String::new(),
        avatar: None,
    })
    .unwrap();

    let out = render_comment(&comment, &parent).unwrap();

    assert!(out.starts_with("---\nfrom:\n  name: Bob\n  url: https://bob.example\n"));
    assert!(out.contains("type: Reply\n"));
    assert!(out.contains("for: https://example.com/hello/\n"));
    assert!(!out.contains("avatar"));
    assert!(out.ends_with("---\n\nNice post!\n"));
}

#[test]
fn format_names_body_file() {
    assert_eq!(OutputFormat::FrontMatter.body_file_name(), "item.md");
    assert_eq!(OutputFormat::Sectioned.body_file_name(), "item.txt");
    assert_eq!(OutputFormat::Raw.body_file_name(), "content.md");
}
