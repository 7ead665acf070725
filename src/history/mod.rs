//! Durable record of generated codes: `identifier → payload` pairs plus the
//! PNG files they name, all inside one store directory.

mod sqlite;
mod text;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, StudioError};

pub use sqlite::{DB_FILE, SqliteStore};
pub use text::{LOG_FILE, TextLogStore, parse_line};

/// Field separator of the text log.
pub const SEPARATOR: &str = "||";

/// One generated code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HistoryRecord {
    pub identifier: String,
    pub payload: String,
}

impl HistoryRecord {
    pub fn new(identifier: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: payload.into(),
        }
    }
}

/// A log line that could not be parsed into a record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CorruptLine {
    /// 1-based line number in the log file.
    pub line_number: usize,
    pub content: String,
}

/// Result of [`HistoryStore::list_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Listing {
    /// Records in append order.
    pub records: Vec<HistoryRecord>,
    /// Lines skipped because they lack the separator.
    pub corrupt: Vec<CorruptLine>,
}

/// Result of [`HistoryStore::delete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DeleteOutcome {
    pub records_removed: usize,
    /// `false` when the image file was already gone.
    pub image_removed: bool,
}

/// Result of [`HistoryStore::check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Consistency {
    /// Records whose image file does not exist.
    pub missing_images: Vec<String>,
    /// PNG files in the store directory that no record references.
    pub orphan_images: Vec<String>,
}

impl Consistency {
    pub const fn is_consistent(&self) -> bool {
        self.missing_images.is_empty() && self.orphan_images.is_empty()
    }
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Plain `identifier||payload` lines in `qr_data.txt`.
    #[default]
    Text,
    /// Embedded `SQLite` database `history.db`.
    Sqlite,
}

impl Backend {
    /// Parse a backend name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Append/list/delete access to the history of generated codes.
///
/// The store directory holds both the record log and the image files; every
/// record's image lives at `image_dir()/identifier`.
pub trait HistoryStore {
    /// Directory holding the log and the image files.
    fn image_dir(&self) -> &Path;

    /// Add one record at the end of the log. Uniqueness is the caller's job.
    ///
    /// # Errors
    ///
    /// Rejects malformed identifiers and payloads with line breaks; fails on
    /// I/O or database errors.
    fn append(&self, identifier: &str, payload: &str) -> Result<()>;

    /// All records in append order, plus any corrupt lines that were skipped.
    ///
    /// # Errors
    ///
    /// Fails on I/O or database errors. Corrupt lines never fail the listing.
    fn list_all(&self) -> Result<Listing>;

    /// Remove every record with `identifier` and its image file.
    ///
    /// # Errors
    ///
    /// Fails on I/O or database errors. A missing image is not an error.
    fn delete(&self, identifier: &str) -> Result<DeleteOutcome>;

    /// Validated path of the image file for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidIdentifier`] for unusable identifiers.
    fn image_path(&self, identifier: &str) -> Result<PathBuf> {
        validate_identifier(identifier)?;
        Ok(self.image_dir().join(identifier))
    }

    /// First record with `identifier`, if any.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`HistoryStore::list_all`].
    fn find(&self, identifier: &str) -> Result<Option<HistoryRecord>> {
        Ok(self
            .list_all()?
            .records
            .into_iter()
            .find(|r| r.identifier == identifier))
    }

    /// Whether `identifier` is already used by a record or an image file.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`HistoryStore::find`].
    fn is_taken(&self, identifier: &str) -> Result<bool> {
        Ok(self.image_path(identifier)?.exists() || self.find(identifier)?.is_some())
    }

    /// Compare the records against the PNG files on disk.
    ///
    /// # Errors
    ///
    /// Fails if the log or the directory cannot be read.
    fn check(&self) -> Result<Consistency> {
        let listing = self.list_all()?;
        let dir = self.image_dir();
        let referenced: BTreeSet<&str> = listing
            .records
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();

        let missing_images = referenced
            .iter()
            .filter(|id| !dir.join(id).is_file())
            .map(|id| (*id).to_owned())
            .collect();

        let mut orphan_images = Vec::new();
        let entries = std::fs::read_dir(dir).map_err(|e| StudioError::io("read", dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StudioError::io("read", dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_png = Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if is_png && !referenced.contains(name.as_str()) {
                orphan_images.push(name);
            }
        }
        orphan_images.sort();

        Ok(Consistency {
            missing_images,
            orphan_images,
        })
    }
}

/// Open the store in `dir`, creating the directory if it does not exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the database
/// cannot be opened.
pub fn open_store(dir: &Path, backend: Backend) -> Result<Box<dyn HistoryStore>> {
    std::fs::create_dir_all(dir).map_err(|e| StudioError::io("create store dir", dir, e))?;
    tracing::debug!(dir = %dir.display(), backend = backend.as_str(), "opening history store");
    Ok(match backend {
        Backend::Text => Box::new(TextLogStore::new(dir)),
        Backend::Sqlite => Box::new(SqliteStore::open(dir)?),
    })
}

/// An identifier doubles as a file name inside the store directory.
///
/// # Errors
///
/// Returns [`StudioError::InvalidIdentifier`] describing the first problem found.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let reason = if identifier.is_empty() {
        Some("empty")
    } else if identifier.contains(SEPARATOR) {
        Some("contains the field separator")
    } else if identifier.contains(['\n', '\r']) {
        Some("contains a line break")
    } else if identifier.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if identifier == "." || identifier == ".." {
        Some("not a file name")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StudioError::InvalidIdentifier {
            identifier: identifier.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Payloads are stored one per line.
///
/// # Errors
///
/// Returns [`StudioError::InvalidPayload`] if `payload` contains `\n` or `\r`.
pub fn validate_payload(payload: &str) -> Result<()> {
    if payload.contains(['\n', '\r']) {
        return Err(StudioError::InvalidPayload);
    }
    Ok(())
}

/// Remove an image file, treating "already gone" as success.
fn remove_image(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "image already absent");
            Ok(false)
        }
        Err(e) => Err(StudioError::io("remove image", path, e)),
    }
}


#[cfg(test)]
mod tests_sqlite;
