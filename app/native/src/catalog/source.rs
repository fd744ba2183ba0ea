//! Document listing and reading for catalog directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extensions recognized as catalog documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["xml"];

/// Provides catalog documents to the extractor.
///
/// Implementations decide where documents come from; the default one reads
/// the local filesystem.
pub trait DocumentSource {
    /// Lists the documents directly inside `dir`, in natural filename order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn list_documents(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads a document as text. Invalid UTF-8 is replaced, not rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_text(&self, path: &Path) -> io::Result<String>;
}

/// Reads catalog documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentSource;

impl DocumentSource for FsDocumentSource {
    fn list_documents(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut documents: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_catalog_document(path))
            .collect();

        documents.sort_by(|a, b| {
            let a_name = a.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let b_name = b.file_name().and_then(|n| n.to_str()).unwrap_or("");
            natord::compare(a_name, b_name)
        });

        Ok(documents)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Checks whether a path has a catalog document extension (case-insensitive).
#[must_use]
pub fn is_catalog_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
