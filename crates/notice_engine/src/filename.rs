use sha2::{Digest, Sha256};

/// `{sanitized_label}--{short_hash(source)}.{extension}`, stable for a given source.
pub fn export_filename(label: Option<&str>, source: &str, extension: &str) -> String {
    let label = sanitize_label(label.unwrap_or_else(|| fallback_label(source)));
    let hash = short_hash(source);
    format!("{label}--{hash}.{extension}")
}

/// Last path segment of the locator without fragment or extension.
fn fallback_label(source: &str) -> &str {
    let without_fragment = source.split('#').next().unwrap_or(source);
    let segment = without_fragment
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_fragment);
    segment.split('.').next().unwrap_or(segment)
}

fn sanitize_label(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let mut label = compacted.trim_matches(&['_', '.'][..]).to_string();
    if label.is_empty() {
        label = "export".to_string();
    }
    if label.len() > 80 {
        let mut cut = 80;
        while !label.is_char_boundary(cut) {
            cut -= 1;
        }
        label.truncate(cut);
    }
    if is_reserved_windows_name(&label) {
        label.push('_');
    }
    label
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '\0'..='\u{1F}')
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().take(4).map(|byte| format!("{byte:02x}")).collect()
}
