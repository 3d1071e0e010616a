//! Escaping for text and paths embedded in engine arguments.
//!
//! Filter descriptions are parsed by the engine, so anything user-supplied
//! that lands inside one goes through these routines first.

use std::path::Path;

/// Escape text for a quoted `drawtext` value: `\`, `:`, `'`, and `%`.
pub fn escape_filter_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            ':' => out.push_str(r"\:"),
            '\'' => out.push_str(r"\'"),
            '%' => out.push_str(r"\%"),
            '\r' | '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Normalize a path for a filter option: forward slashes and an escaped
/// drive-letter colon (`C:/x` becomes `C\:/x`).
pub fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        format!("{}\\:{}", &normalized[..1], &normalized[2..])
    } else {
        normalized
    }
}

/// A filter path wrapped in single quotes, with embedded quotes closed and
/// reopened around an escaped quote.
pub fn quote_filter_path(path: &Path) -> String {
    format!("'{}'", escape_filter_path(path).replace('\'', r"'\''"))
}

/// A `file '...'` line for a concat manifest.
pub fn manifest_entry(path: &Path) -> String {
    format!("file '{}'", path.to_string_lossy().replace('\'', r"'\''"))
}
