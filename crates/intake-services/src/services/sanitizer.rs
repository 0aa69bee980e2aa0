use uuid::Uuid;

/// Rewrites an untrusted filename into one that is safe to store.
pub trait NameSanitizer: Send + Sync {
    fn sanitize(&self, name: &str) -> String;
}

/// Default sanitizer.
///
/// Keeps letters, digits, `-`, `_`, `+` and `.`; spaces and every other character
/// become `_`. Directory components and leading dots are dropped, `..` runs are
/// collapsed and the extension is lowercased. A name with nothing left gets a
/// random stem.
#[derive(Debug, Clone)]
pub struct SafeNameSanitizer {
    max_len: usize,
}

impl Default for SafeNameSanitizer {
    fn default() -> Self {
        Self { max_len: 255 }
    }
}

impl SafeNameSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit output length in bytes (filesystem limit is usually 255).
    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    fn clean_part(part: &str) -> String {
        let mapped: String = part
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '+' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let mut collapsed = mapped;
        while collapsed.contains("..") {
            collapsed = collapsed.replace("..", ".");
        }
        collapsed
    }

    fn truncate(value: &str, max_len: usize) -> String {
        let mut out = String::with_capacity(value.len().min(max_len));
        for c in value.chars() {
            if out.len() + c.len_utf8() > max_len {
                break;
            }
            out.push(c);
        }
        out
    }
}

impl NameSanitizer for SafeNameSanitizer {
    fn sanitize(&self, name: &str) -> String {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();

        let (stem, extension) = match base.rfind('.') {
            Some(idx) if idx > 0 => (&base[..idx], Some(&base[idx + 1..])),
            _ => (base, None),
        };

        let extension = extension
            .map(|e| Self::clean_part(e).replace('.', "").to_lowercase())
            .filter(|e| !e.is_empty());

        let mut stem = Self::clean_part(stem)
            .trim_start_matches('.')
            .trim_end_matches('.')
            .to_string();
        if stem.trim_matches('_').is_empty() {
            stem = format!("file_{}", &Uuid::new_v4().simple().to_string()[..8]);
        }

        let suffix = extension.map(|e| format!(".{}", e)).unwrap_or_default();
        let stem = Self::truncate(&stem, self.max_len.saturating_sub(suffix.len()).max(1));

        format!("{}{}", stem, suffix)
    }
}
