//! Wallpaper catalog extraction.
//!
//! A catalog document describes one wallpaper entry using the desktop
//! background-properties format:
//!
//! ```xml
//! <wallpapers>
//!   <wallpaper deleted="false">
//!     <name>Adwaita</name>
//!     <filename>/usr/share/backgrounds/adwaita-l.jpg</filename>
//!     <filename-dark>/usr/share/backgrounds/adwaita-d.jpg</filename-dark>
//!     <options>zoom</options>
//!     <shade_type>solid</shade_type>
//!     <pcolor>#3071AE</pcolor>
//!     <scolor>#000000</scolor>
//!   </wallpaper>
//! </wallpapers>
//! ```
//!
//! Only the first entry of a document is read. Documents that do not contain
//! a `<wallpapers>` element are skipped.

pub mod source;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use source::{DocumentSource, FsDocumentSource};

use crate::markup::{self, Element};

/// Tag of the top-level catalog element.
const ROOT_TAG: &str = "wallpapers";

/// One wallpaper entry read from a catalog document.
///
/// Every field except `source_path` may be absent in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperRecord {
    /// The catalog document this record was read from.
    pub source_path: PathBuf,
    pub name: Option<String>,
    pub filename_light: Option<String>,
    pub filename_dark: Option<String>,
    pub options: Option<String>,
    pub shade_type: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
}

impl WallpaperRecord {
    /// Creates a record with every optional field unset.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    /// A human readable label: the entry name, or the document file name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.source_path
                .file_stem()
                .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned())
        })
    }

    fn assign(&mut self, field: &str, value: Option<String>) {
        match field {
            "name" => self.name = value,
            "filename" => self.filename_light = value,
            "filename-dark" => self.filename_dark = value,
            "options" => self.options = value,
            "shade_type" => self.shade_type = value,
            "pcolor" => self.primary_color = value,
            "scolor" => self.secondary_color = value,
            _ => {}
        }
    }
}

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to list catalog directory {}: {source}", .path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read catalog document {}: {source}", .path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extracts the wallpaper record from a parsed document.
///
/// Looks for the first top-level `<wallpapers>` element and reads its first
/// child element. Each known field tag takes the text of its first child.
/// When a field tag repeats, the last occurrence wins. Unknown tags are
/// ignored.
///
/// Returns `None` if there is no `<wallpapers>` element or it has no child
/// element.
#[must_use]
pub fn extract(root: &Element, source_path: &Path) -> Option<WallpaperRecord> {
    let entry = root.child(ROOT_TAG)?.elements().next()?;

    let mut record = WallpaperRecord::new(source_path);
    for field in entry.elements() {
        record.assign(field.name(), field.text().map(str::to_string));
    }

    Some(record)
}

/// Parses `text` and extracts its wallpaper record.
#[must_use]
pub fn extract_from_str(text: &str, source_path: &Path) -> Option<WallpaperRecord> {
    extract(&markup::parse(text), source_path)
}

/// Reads and extracts a single catalog document.
///
/// # Errors
///
/// Returns [`CatalogError::ReadDocument`] if the document cannot be read.
pub fn load_document(
    source: &dyn DocumentSource,
    path: &Path,
) -> Result<Option<WallpaperRecord>, CatalogError> {
    let text = source.read_text(path).map_err(|source| CatalogError::ReadDocument {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(extract_from_str(&text, path))
}

/// Loads every wallpaper record from the catalog documents in `dir`.
///
/// Records keep the listing order. Documents that cannot be read or do not
/// describe a wallpaper are skipped with a warning.
///
/// # Errors
///
/// Returns [`CatalogError::ListDirectory`] if the directory cannot be listed.
pub fn load_catalog(
    source: &dyn DocumentSource,
    dir: &Path,
) -> Result<Vec<WallpaperRecord>, CatalogError> {
    let documents = source.list_documents(dir).map_err(|source| CatalogError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut records = Vec::with_capacity(documents.len());
    for path in documents {
        match load_document(source, &path) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "document has no wallpaper entry, skipping");
            }
            Err(err) => tracing::warn!(error = %err, "skipping unreadable catalog document"),
        }
    }

    tracing::debug!(dir = %dir.display(), count = records.len(), "loaded wallpaper catalog");
    Ok(records)
}
