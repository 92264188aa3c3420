use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::config::TransformConfig;
use crate::document::Document;
use crate::markup::map_prose_lines;
use crate::transform::Transform;

static ATX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid atx header regex")
});

/// Terminal column width of `text`; wide CJK characters count as two.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// `title` followed by a line of `ch` exactly as wide as the title.
pub fn underline(title: &str, ch: char) -> String {
    let width = display_width(title).max(1);
    format!("{title}\n{}", ch.to_string().repeat(width))
}

/// Rewrites ATX headers (`## Title`) to Setext underlines for the configured depths.
#[derive(Debug, Clone)]
pub struct SetextHeaders {
    underlines: BTreeMap<u8, char>,
}

impl SetextHeaders {
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            underlines: config.header_underlines.clone(),
        }
    }
}

impl Transform for SetextHeaders {
    fn name(&self) -> &'static str {
        "setext-headers"
    }

    fn apply(&self, body: &str, _document: &Document) -> String {
        let mut previous_blank = true;
        map_prose_lines(body, |line| {
            let converted = ATX.captures(line).and_then(|caps| {
                let depth = u8::try_from(caps[1].len()).ok()?;
                let ch = self.underlines.get(&depth)?;
                Some(underline(caps[2].trim(), *ch))
            });
            let out = match converted {
                // A Setext underline would otherwise turn the preceding paragraph into the header.
                Some(header) if !previous_blank => format!("\n{header}"),
                Some(header) => header,
                None => line.to_string(),
            };
            previous_blank = line.trim().is_empty();
            out
        })
    }
}
