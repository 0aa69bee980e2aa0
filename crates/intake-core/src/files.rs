//! Filename and extension helpers used while building a [`FileRecord`](crate::upload::FileRecord).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

// Optional `.tar` segment followed by a mandatory `.<word chars>` suffix.
static EXTENSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:\.tar)?\.[A-Za-z0-9_]+)$").expect("extension pattern is a valid regex")
});

/// Extract the extension of `filename`, lowercased and without the leading dot.
///
/// Compound tarball suffixes are kept whole: `archive.tar.gz` yields `tar.gz`.
/// Returns `None` when the name has no extension.
pub fn extract_extension(filename: &str) -> Option<String> {
    EXTENSION_PATTERN
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str()[1..].to_lowercase())
}

/// Last path component of `path`, ignoring trailing slashes and spaces.
///
/// Works on `char` boundaries, so names starting with a multibyte character
/// come back intact.
pub fn safe_basename(path: &str) -> String {
    path.trim_end_matches(['/', ' '])
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Remove backslash escapes (`\'` becomes `'`, `\\` becomes `\`).
pub fn strip_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Delete the file at `path` if it exists.
///
/// Deletion errors are logged and swallowed; returns whether a file was removed.
pub fn remove_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed file");
            true
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Failed to remove file");
            false
        }
    }
}
