//! Generate a QR code, store its image and record it in the history.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::codec::{self, QrCodec, StyleOptions};
use crate::error::{Result, StudioError};
use crate::history::{self, HistoryStore};
use crate::identifier;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Where the payload comes from.
///
/// For image and video sources only the file *name* is encoded, not the
/// file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Text(String),
    Image(PathBuf),
    Video(PathBuf),
}

impl PayloadSource {
    /// Resolve the string that will be encoded.
    ///
    /// # Errors
    ///
    /// File sources must exist and carry an accepted extension.
    pub fn payload(&self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Image(path) => file_name_payload(path, "image", IMAGE_EXTENSIONS, "png, jpg, jpeg"),
            Self::Video(path) => file_name_payload(path, "video", VIDEO_EXTENSIONS, "mp4, mov, avi"),
        }
    }
}

fn file_name_payload(
    path: &Path,
    kind: &'static str,
    allowed: &[&str],
    expected: &'static str,
) -> Result<String> {
    let accepted = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)));
    if !accepted {
        return Err(StudioError::UnsupportedSource {
            kind,
            path: path.display().to_string(),
            expected,
        });
    }
    std::fs::metadata(path).map_err(|e| StudioError::io("read", path, e))?;
    Ok(path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default())
}

/// Everything needed to generate one code.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub source: PayloadSource,
    pub style: StyleOptions,
}

/// A generated and persisted code.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedCode {
    pub identifier: String,
    pub payload: String,
    pub image_path: PathBuf,
    /// PNG encoding of the image, for download copies.
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// Encode the request's payload, save the PNG in the store directory and
/// append a history record.
///
/// Nothing touches the disk until the payload is known to be non-empty and
/// encodable. If the record cannot be appended the saved image is removed
/// again.
///
/// # Errors
///
/// [`StudioError::EmptyInput`] for blank payloads, plus any codec, I/O or
/// store error.
pub fn generate<Tz: TimeZone>(
    codec: &dyn QrCodec,
    store: &dyn HistoryStore,
    request: &GenerateRequest,
    now: &DateTime<Tz>,
) -> Result<GeneratedCode>
where
    Tz::Offset: std::fmt::Display,
{
    let payload = request.source.payload()?;
    if payload.trim().is_empty() {
        return Err(StudioError::EmptyInput);
    }
    history::validate_payload(&payload)?;

    let image = codec.encode(&payload, &request.style)?;
    let png = codec::png_bytes(&image)?;

    let identifier = identifier::allocate(store, now)?;
    let image_path = store.image_path(&identifier)?;
    std::fs::write(&image_path, &png).map_err(|e| StudioError::io("write", &image_path, e))?;

    if let Err(e) = store.append(&identifier, &payload) {
        if let Err(cleanup) = std::fs::remove_file(&image_path) {
            tracing::warn!(
                path = %image_path.display(),
                error = %cleanup,
                "could not remove image after failed append"
            );
        }
        return Err(e);
    }

    tracing::info!(identifier = %identifier, bytes = png.len(), "qr code generated");
    Ok(GeneratedCode {
        identifier,
        payload,
        image_path,
        png,
    })
}
