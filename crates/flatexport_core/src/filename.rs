//! Filesystem-safe path components for slugs and attachment names.

const MAX_COMPONENT_BYTES: usize = 255;

/// Reduce `input` to a single portable path component.
///
/// Path separators, control characters and characters Windows rejects become
/// `_`; leading/trailing spaces and dots are trimmed; reserved device names
/// get a `_` suffix. Returns `None` when nothing usable is left.
pub fn sanitize_component(input: &str) -> Option<String> {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let trimmed = cleaned.trim_matches(&[' ', '.'][..]);
    if trimmed.is_empty() {
        return None;
    }

    let mut name = truncate_at_char_boundary(trimmed, MAX_COMPONENT_BYTES).to_string();
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    Some(name)
}

/// True when `name` survives [`sanitize_component`] unchanged.
pub fn is_safe_component(name: &str) -> bool {
    sanitize_component(name).as_deref() == Some(name)
}

fn truncate_at_char_boundary(input: &str, max_bytes: usize) -> &str {
    if input.len() <= max_bytes {
        return input;
    }
    let mut end = max_bytes;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
