//! Markdown hygiene stages: emphasis style, definition lists, literal artifacts.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::transform::Transform;

static STRONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"__([^_\s*](?:[^_*\n]*?[^_\s*])?)__").expect("valid strong regex")
});
static EM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_([^_\s*](?:[^_*\n]*?[^_\s*])?)_").expect("valid em regex")
});
// Inline link destinations, `<scheme:...>` autolinks and bare `scheme://` URLs.
static URL_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\]\(\s*<?[^\s()<>]*|<[A-Za-z][A-Za-z0-9+.\-]*:[^\s<>]*>|\b[A-Za-z][A-Za-z0-9+.\-]*://[^\s<>()\[\]]*",
    )
    .expect("valid url span regex")
});
static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}:[ \t]+(\S.*)$").expect("valid definition regex"));

const ENTITIES: &[(&str, &str)] = &[
    ("&#039;", "'"),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&#8217;", "\u{2019}"),
    ("&#8216;", "\u{2018}"),
    ("&quot;", "\""),
    ("&#034;", "\""),
    ("&#34;", "\""),
    ("&#8220;", "\u{201C}"),
    ("&#8221;", "\u{201D}"),
    ("&#8211;", "\u{2013}"),
    ("&#8212;", "\u{2014}"),
    ("&#8230;", "\u{2026}"),
    ("&nbsp;", " "),
    ("&#160;", " "),
];

/// Canonical emphasis: `_em_` becomes `*em*` and `__strong__` becomes `**strong**`.
///
/// Intraword underscores, path-like text, URLs and inline code are left alone,
/// and a match never spans another emphasis marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct Emphasis;

impl Transform for Emphasis {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        map_prose_lines(body, |line| {
            if !line.contains('_') {
                return line.to_string();
            }
            map_outside_code_spans(line, |text| {
                map_outside_urls(text, |prose| {
                    let strong = replace_delimited(prose, &STRONG, "**");
                    replace_delimited(&strong, &EM, "*")
                })
            })
        })
    }
}

/// Definition markers (`: text`) continue at a fixed four-column indent.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefinitionLists;

impl Transform for DefinitionLists {
    fn name(&self) -> &'static str {
        "definition-lists"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        map_prose_lines(body, |line| match DEFINITION.captures(line) {
            Some(caps) => format!(":   {}", &caps[1]),
            None => line.to_string(),
        })
    }
}

/// Decodes stray typographic entities and normalises line endings to `\n`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralCleanup;

impl Transform for LiteralCleanup {
    fn name(&self) -> &'static str {
        "literal-cleanup"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        let unified = body.replace("\r\n", "\n").replace('\r', "\n");
        map_prose_lines(&unified, |line| {
            if !line.contains('&') {
                return line.to_string();
            }
            ENTITIES
                .iter()
                .fold(line.to_string(), |acc, (entity, literal)| {
                    acc.replace(entity, literal)
                })
        })
    }
}

/// Apply `f` to every line outside fenced code blocks; fenced lines pass through.
pub(crate) fn map_prose_lines(body: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut fence: Option<&str> = None;
    let mut out = Vec::new();
    for line in body.split('\n') {
        let marker = fence_marker(line);
        match (fence, marker) {
            (None, Some(open)) => {
                fence = Some(open);
                out.push(line.to_string());
            }
            (Some(open), Some(close)) if close == open => {
                fence = None;
                out.push(line.to_string());
            }
            (Some(_), _) => out.push(line.to_string()),
            (None, None) => out.push(f(line)),
        }
    }
    out.join("\n")
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

pub(crate) fn map_outside_code_spans(line: &str, mut f: impl FnMut(&str) -> String) -> String {
    line.split('`')
        .enumerate()
        .map(|(index, segment)| {
            if index % 2 == 0 {
                f(segment)
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("`")
}

fn map_outside_urls(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in URL_SPAN.find_iter(text) {
        out.push_str(&f(&text[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&f(&text[last..]));
    out
}

fn replace_delimited(text: &str, pattern: &Regex, marker: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        if before.is_some_and(blocks_emphasis) || after.is_some_and(blocks_emphasis) {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push_str(marker);
        out.push_str(inner.as_str());
        out.push_str(marker);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

fn blocks_emphasis(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '/' | '\\' | '*')
}
