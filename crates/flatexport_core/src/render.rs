use serde::{Deserialize, Serialize};

use crate::document::{Comment, Document};
use crate::headers::underline;
use crate::metadata::{format_timestamp, AuthorMeta, MetadataRecord};

/// Output encodings for the document body file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// YAML front matter, `---`, then the transformed body.
    #[default]
    FrontMatter,
    /// Plain text: underlined title, excerpt, body, then one section per metadata field.
    Sectioned,
    /// The transformed body only.
    Raw,
}

impl OutputFormat {
    /// File name of the body file inside a document directory.
    pub fn body_file_name(self) -> &'static str {
        match self {
            OutputFormat::FrontMatter => "item.md",
            OutputFormat::Sectioned => "item.txt",
            OutputFormat::Raw => "content.md",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to serialize front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Render the body file. Identical input always yields identical bytes.
pub fn render(
    metadata: &MetadataRecord,
    body: &str,
    format: OutputFormat,
) -> Result<String, RenderError> {
    let body = body.trim();
    match format {
        OutputFormat::FrontMatter => with_front_matter(metadata, body),
        OutputFormat::Sectioned => Ok(sectioned(metadata, body)),
        OutputFormat::Raw => Ok(finish(body.to_string())),
    }
}

#[derive(Debug, Serialize)]
struct CommentFrontMatter<'a> {
    from: AuthorMeta,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "for", skip_serializing_if = "Option::is_none")]
    for_url: Option<&'a str>,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<&'a str>,
}

/// Render a comment file: front matter describing the author and parent, then the body.
pub fn render_comment(comment: &Comment, parent: &Document) -> Result<String, RenderError> {
    let author = comment.author();
    let front_matter = CommentFrontMatter {
        from: AuthorMeta {
            name: author.name.clone(),
            email: author.email.clone(),
            url: author.url.clone(),
        },
        kind: comment.kind().to_string(),
        for_url: parent.permalink(),
        date: format_timestamp(comment.date()),
        avatar: comment.avatar(),
    };
    with_front_matter(&front_matter, comment.body().trim())
}

fn with_front_matter<T: Serialize>(front_matter: &T, body: &str) -> Result<String, RenderError> {
    let yaml = serde_yaml::to_string(front_matter)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str("---\n");
    out.push_str(&yaml);
    out.push_str("---\n");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    Ok(finish(out))
}

fn sectioned(metadata: &MetadataRecord, body: &str) -> String {
    let mut blocks = vec![underline(&metadata.title, '=')];
    if let Some(excerpt) = metadata.excerpt.as_deref() {
        blocks.push(excerpt.trim().to_string());
    }
    if !body.is_empty() {
        blocks.push(body.to_string());
    }

    let mut published = metadata.date.clone();
    if let Some(updated) = metadata.updated.as_deref() {
        published.push_str(&format!("\nUpdated: {updated}"));
    }

    let author = metadata.author.as_ref().map(|author| {
        let mut text = author.name.clone();
        if let Some(email) = author.email.as_deref() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&format!("<{email}>"));
        }
        if let Some(url) = author.url.as_deref() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(url);
        }
        text
    });

    let location = metadata.location.map(|loc| {
        let mut text = format!("{}, {}", loc.latitude, loc.longitude);
        if let Some(altitude) = loc.altitude {
            text.push_str(&format!(", {altitude}"));
        }
        text
    });

    let sections = [
        ("Published", Some(published)),
        ("URLs", non_empty_lines(&metadata.urls)),
        ("Author", author.filter(|a| !a.is_empty())),
        (
            "Tags",
            (!metadata.tags.is_empty()).then(|| metadata.tags.join(", ")),
        ),
        ("Location", location),
        ("Attachments", non_empty_lines(&metadata.attachments)),
        ("UUID", Some(metadata.uuid.clone())),
    ];
    for (name, content) in sections {
        if let Some(content) = content {
            blocks.push(format!("{}\n{content}", underline(name, '-')));
        }
    }

    finish(blocks.join("\n\n"))
}

fn non_empty_lines(items: &[String]) -> Option<String> {
    (!items.is_empty()).then(|| items.join("\n"))
}

fn finish(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
