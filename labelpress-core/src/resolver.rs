//! SKU and separator document resolution
//!
//! Maps a SKU string to the pre-rendered label PDF inside the configured
//! SKU directory, and a separator name to its document in the auxiliary
//! directory. A missing document is an expected condition, not a defect.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("document directory missing or not a directory: {}", dir.display())]
    BadDirectory { dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// A label or auxiliary document located on disk. Derived per call, never
/// persisted.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    /// Normalized identifier (suffix stripped)
    pub identifier: String,
    /// Canonical file name (`<identifier>.pdf`)
    pub file_name: String,
    pub path: PathBuf,
    pub byte_size: u64,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    sku_dir: PathBuf,
    aux_dir: PathBuf,
}

impl Resolver {
    pub fn new(config: &Config) -> Self {
        Self {
            sku_dir: config.sku_pdf_dir.clone(),
            aux_dir: config.aux_pdf_dir.clone(),
        }
    }

    /// Strip a trailing `.pdf` (any case) and re-append the canonical suffix.
    pub fn canonical_file_name(identifier: &str) -> String {
        let stem = Self::stem(identifier);
        format!("{stem}.pdf")
    }

    fn stem(identifier: &str) -> &str {
        let len = identifier.len();
        // the boundary check keeps multi-byte names (e.g. 分割72) safe to slice
        if len >= 4
            && identifier.is_char_boundary(len - 4)
            && identifier[len - 4..].eq_ignore_ascii_case(".pdf")
        {
            &identifier[..len - 4]
        } else {
            identifier
        }
    }

    /// Resolve a SKU to its label document.
    pub fn resolve(&self, identifier: &str) -> ResolveResult<ResolvedDocument> {
        self.resolve_in(&self.sku_dir, identifier)
    }

    /// Resolve a separator (or other auxiliary) document by file name.
    pub fn resolve_separator(&self, name: &str) -> ResolveResult<ResolvedDocument> {
        self.resolve_in(&self.aux_dir, name)
    }

    fn resolve_in(&self, dir: &Path, identifier: &str) -> ResolveResult<ResolvedDocument> {
        if !dir.is_dir() {
            return Err(ResolveError::BadDirectory { dir: dir.to_path_buf() });
        }

        let file_name = Self::canonical_file_name(identifier);
        let path = dir.join(&file_name);
        let metadata = fs::metadata(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ResolveError::NotFound { path: path.clone() }
            } else {
                ResolveError::Io(e)
            }
        })?;

        debug!(file = %path.display(), size = metadata.len(), "document resolved");

        Ok(ResolvedDocument {
            identifier: Self::stem(identifier).to_string(),
            file_name,
            path,
            byte_size: metadata.len(),
        })
    }

    /// List the PDF documents in the auxiliary directory, sorted by name.
    ///
    /// Feeds the front end's common-files list; an unreadable directory
    /// yields an empty list.
    pub fn list_aux_documents(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.aux_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(sku_dir: &Path, aux_dir: &Path) -> Resolver {
        let config = Config {
            sku_pdf_dir: sku_dir.to_path_buf(),
            aux_pdf_dir: aux_dir.to_path_buf(),
            ..Config::default()
        };
        Resolver::new(&config)
    }

    #[test]
    fn canonical_name_normalizes_suffix() {
        assert_eq!(Resolver::canonical_file_name("ABC123"), "ABC123.pdf");
        assert_eq!(Resolver::canonical_file_name("ABC123.pdf"), "ABC123.pdf");
        assert_eq!(Resolver::canonical_file_name("ABC123.PDF"), "ABC123.pdf");
        // short names must not panic on the length check
        assert_eq!(Resolver::canonical_file_name("A"), "A.pdf");
        // multi-byte names
        assert_eq!(Resolver::canonical_file_name("分割72"), "分割72.pdf");
        assert_eq!(Resolver::canonical_file_name("分割72.pdf"), "分割72.pdf");
    }

    #[test]
    fn resolves_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ABC123.pdf"), b"%PDF-1.5").unwrap();
        let resolver = resolver(dir.path(), dir.path());

        let doc = resolver.resolve("ABC123").unwrap();
        assert_eq!(doc.identifier, "ABC123");
        assert_eq!(doc.file_name, "ABC123.pdf");
        assert!(doc.path.exists());
        assert_eq!(doc.byte_size, 8);

        // suffixed spelling resolves to the same file
        let doc2 = resolver.resolve("ABC123.PDF").unwrap();
        assert_eq!(doc2.path, doc.path);
    }

    #[test]
    fn missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path(), dir.path());

        match resolver.resolve("MISSING1") {
            Err(ResolveError::NotFound { path }) => {
                assert!(path.ends_with("MISSING1.pdf"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let resolver = resolver(&gone, &gone);

        assert!(matches!(
            resolver.resolve("ABC123"),
            Err(ResolveError::BadDirectory { .. })
        ));
    }

    #[test]
    fn lists_aux_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"").unwrap();
        fs::write(dir.path().join("a.PDF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let resolver = resolver(dir.path(), dir.path());

        assert_eq!(resolver.list_aux_documents(), vec!["a.PDF", "b.pdf"]);
    }
}
