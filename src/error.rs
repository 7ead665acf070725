use std::path::Path;

/// Errors raised by the library half of qrstudio.
///
/// "No QR code in this image" is deliberately absent: decoding reports it as
/// `None` / [`crate::scan::ScanOutcome::NotFound`]. Corrupt log lines and
/// already-missing image files are likewise reported through return values.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("nothing to encode: payload is empty")]
    EmptyInput,

    #[error("invalid identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    #[error("payload must not contain a line break")]
    InvalidPayload,

    #[error("invalid style: {0}")]
    InvalidStyle(String),

    #[error("unsupported {kind} file {path}: expected one of {expected}")]
    UnsupportedSource {
        kind: &'static str,
        path: String,
        expected: &'static str,
    },

    #[error("cannot read image: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot encode payload: {0}")]
    Encode(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("history database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StudioError {
    /// Wrap an I/O error with a short description of what was being done to `path`.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("{action} {}", path.display()),
            source,
        }
    }
}

pub type Result<T, E = StudioError> = std::result::Result<T, E>;
