use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Outcome of a content scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    Clean,
    /// Content rejected; carries a short reason (signature name, virus name).
    Rejected(String),
    /// Scanner could not complete.
    Error(String),
}

impl ScanResult {
    pub fn is_clean(&self) -> bool {
        matches!(self, ScanResult::Clean)
    }
}

/// Checks that a file's actual content is acceptable for its claimed name.
#[async_trait]
pub trait ContentScanner: Send + Sync {
    async fn scan(&self, path: &Path, name: &str, extension: Option<&str>) -> ScanResult;
}

/// Bytes read from the start of a file for signature checks.
const HEAD_LEN: usize = 4096;

/// Extensions allowed to carry executable headers.
const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "dll", "bin", "so", "dylib", "sh", "msi"];

/// Script markers that must not appear in non-script uploads.
const SCRIPT_MARKERS: &[&[u8]] = &[b"<?php", b"<?=", b"<%@"];

/// Leading-byte signatures per extension family.
const SIGNATURES: &[(&[&str], &[&[u8]])] = &[
    (&["jpg", "jpeg"], &[b"\xFF\xD8\xFF"]),
    (&["png"], &[b"\x89PNG\r\n\x1A\n"]),
    (&["gif"], &[b"GIF87a", b"GIF89a"]),
    (&["bmp"], &[b"BM"]),
    (&["pdf"], &[b"%PDF-"]),
    (
        &["zip", "docx", "xlsx", "pptx", "odt"],
        &[b"PK\x03\x04", b"PK\x05\x06"],
    ),
    (&["gz", "tgz", "tar.gz"], &[b"\x1F\x8B"]),
    (&["bz2", "tar.bz2"], &[b"BZh"]),
    (&["7z"], &[b"7z\xBC\xAF\x27\x1C"]),
];

/// Magic-number scanner.
///
/// For known extensions the leading bytes must match the format's signature.
/// Executable headers and server-side script markers are rejected under any
/// non-executable extension, whatever the claimed type.
#[derive(Debug, Clone, Default)]
pub struct SignatureScanner;

impl SignatureScanner {
    pub fn new() -> Self {
        Self
    }

    /// Expected signatures for an extension, or `None` if the format is not checked.
    fn signatures(extension: &str) -> Option<&'static [&'static [u8]]> {
        SIGNATURES
            .iter()
            .find(|(extensions, _)| extensions.contains(&extension))
            .map(|(_, sigs)| *sigs)
    }

    fn executable_header(head: &[u8]) -> Option<&'static str> {
        if head.starts_with(b"MZ") {
            Some("PE executable")
        } else if head.starts_with(b"\x7FELF") {
            Some("ELF executable")
        } else if [
            b"\xFE\xED\xFA\xCE",
            b"\xFE\xED\xFA\xCF",
            b"\xCE\xFA\xED\xFE",
            b"\xCF\xFA\xED\xFE",
        ]
        .iter()
        .any(|magic| head.starts_with(*magic))
        {
            Some("Mach-O executable")
        } else if head.starts_with(b"#!") {
            Some("script")
        } else {
            None
        }
    }

    /// Check already-read leading bytes against the claimed extension.
    pub fn check_head(head: &[u8], extension: Option<&str>) -> ScanResult {
        let extension = extension.unwrap_or_default();

        if !EXECUTABLE_EXTENSIONS.contains(&extension) {
            if let Some(kind) = Self::executable_header(head) {
                return ScanResult::Rejected(format!("{} disguised as .{}", kind, extension));
            }
        }

        if extension != "php" {
            let lowered = head.to_ascii_lowercase();
            if SCRIPT_MARKERS
                .iter()
                .any(|marker| lowered.windows(marker.len()).any(|w| w == *marker))
            {
                return ScanResult::Rejected("embedded server-side script".to_string());
            }
        }

        // webp: RIFF container with a WEBP form type at offset 8
        if extension == "webp" {
            return if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP" {
                ScanResult::Clean
            } else {
                ScanResult::Rejected("signature mismatch for .webp".to_string())
            };
        }

        match Self::signatures(extension) {
            Some(sigs) if !sigs.iter().any(|sig| head.starts_with(sig)) => {
                ScanResult::Rejected(format!("signature mismatch for .{}", extension))
            }
            _ => ScanResult::Clean,
        }
    }
}

#[async_trait]
impl ContentScanner for SignatureScanner {
    async fn scan(&self, path: &Path, name: &str, extension: Option<&str>) -> ScanResult {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to open file for scan");
                return ScanResult::Error(format!("Failed to open {}: {}", path.display(), e));
            }
        };

        let mut head = Vec::with_capacity(HEAD_LEN);
        if let Err(e) = (&mut file).take(HEAD_LEN as u64).read_to_end(&mut head).await {
            tracing::error!(path = %path.display(), error = %e, "Failed to read file for scan");
            return ScanResult::Error(format!("Failed to read {}: {}", path.display(), e));
        }

        let result = Self::check_head(&head, extension);
        if let ScanResult::Rejected(reason) = &result {
            tracing::warn!(filename = %name, reason = %reason, "Signature check rejected file");
        }
        result
    }
}

/// Runs scanners in order; the first non-clean result wins.
#[derive(Clone, Default)]
pub struct ScannerChain {
    scanners: Vec<Arc<dyn ContentScanner>>,
}

impl ScannerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, scanner: Arc<dyn ContentScanner>) -> Self {
        self.scanners.push(scanner);
        self
    }

    pub fn len(&self) -> usize {
        self.scanners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }
}

#[async_trait]
impl ContentScanner for ScannerChain {
    async fn scan(&self, path: &Path, name: &str, extension: Option<&str>) -> ScanResult {
        for scanner in &self.scanners {
            let result = scanner.scan(path, name, extension).await;
            if !result.is_clean() {
                return result;
            }
        }
        ScanResult::Clean
    }
}
