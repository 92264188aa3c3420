use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use crate::config::{ConfigError, TransformConfig};
use crate::document::Document;
use crate::markup::{map_outside_code_spans, map_prose_lines};
use crate::transform::Transform;

static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(!?)\[([^\[\]]*)\]\(\s*<?([^\s()<>]+)>?(?:\s+(?:"([^"]*)"|'([^']*)'))?\s*\)"#,
    )
    .expect("valid inline link regex")
});

static REFERENCE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}\[([0-9]+)\]:").expect("valid reference definition regex")
});

/// Moves inline link targets into a numbered reference list after the body.
///
/// `[text](url "title")` becomes `[text][n]` and `[n]: url title` is appended,
/// numbered in first-seen order after the highest numeric label the body
/// already defines. A repeated (url, title) pair reuses its number. Images are
/// left inline.
#[derive(Debug, Clone)]
pub struct LinksToFootnotes {
    site: Url,
}

impl LinksToFootnotes {
    pub fn new(config: &TransformConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            site: config.site()?,
        })
    }

    fn absolutize(&self, target: &str) -> String {
        if target.starts_with('#') || Url::parse(target).is_ok() {
            return target.to_string();
        }
        match self.site.join(target) {
            Ok(url) => url.into(),
            Err(_) => target.to_string(),
        }
    }
}

impl Transform for LinksToFootnotes {
    fn name(&self) -> &'static str {
        "links-to-footnotes"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        let offset = highest_numeric_label(body);
        let mut references: Vec<(String, String)> = Vec::new();

        let rewritten = map_prose_lines(body, |line| {
            if !line.contains("](") {
                return line.to_string();
            }
            map_outside_code_spans(line, |text| {
                INLINE_LINK
                    .replace_all(text, |caps: &Captures| {
                        if &caps[1] == "!" {
                            return caps[0].to_string();
                        }
                        let url = self.absolutize(&caps[3]);
                        let title = caps
                            .get(4)
                            .or_else(|| caps.get(5))
                            .map(|m| m.as_str().trim().to_string())
                            .unwrap_or_default();
                        let key = (url, title);
                        let number = match references.iter().position(|r| *r == key) {
                            Some(index) => offset + index + 1,
                            None => {
                                references.push(key);
                                offset + references.len()
                            }
                        };
                        format!("[{}][{number}]", &caps[2])
                    })
                    .into_owned()
            })
        });

        if references.is_empty() {
            return rewritten;
        }

        let mut out = rewritten.trim_end().to_string();
        out.push_str("\n\n");
        let definitions: Vec<String> = references
            .iter()
            .enumerate()
            .map(|(index, (url, title))| {
                if title.is_empty() {
                    format!("[{}]: {url}", offset + index + 1)
                } else {
                    format!("[{}]: {url} {title}", offset + index + 1)
                }
            })
            .collect();
        out.push_str(&definitions.join("\n"));
        out
    }
}

fn highest_numeric_label(body: &str) -> usize {
    let mut highest = 0;
    map_prose_lines(body, |line| {
        if let Some(label) = REFERENCE_DEFINITION
            .captures(line)
            .and_then(|caps| caps[1].parse::<usize>().ok())
        {
            highest = highest.max(label);
        }
        String::new()
    });
    highest
}
