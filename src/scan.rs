//! Decode a QR code from an uploaded image or a captured frame.

use crate::codec::{self, QrCodec};
use crate::error::Result;

/// URL schemes that make a decoded payload clickable.
const LINK_SCHEMES: &[&str] = &["http://", "https://"];

/// What a scan found.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Found {
        payload: String,
        /// Set when the payload is a web link.
        link: Option<String>,
    },
    NotFound,
}

impl ScanOutcome {
    fn from_payload(payload: String) -> Self {
        let link = as_link(&payload).map(ToOwned::to_owned);
        Self::Found { payload, link }
    }
}

/// Returns `payload` when it starts with an `http://` or `https://` scheme.
pub fn as_link(payload: &str) -> Option<&str> {
    let trimmed = payload.trim();
    LINK_SCHEMES
        .iter()
        .any(|scheme| {
            trimmed
                .get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
        })
        .then_some(trimmed)
}

/// Decode the first QR symbol in a PNG or JPEG.
///
/// # Errors
///
/// Returns [`crate::error::StudioError::Image`] when `bytes` is not a readable
/// image. An image without a QR symbol is `Ok(ScanOutcome::NotFound)`.
pub fn scan_bytes(codec: &dyn QrCodec, bytes: &[u8]) -> Result<ScanOutcome> {
    let image = codec::load_image(bytes)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        "scanning image"
    );
    Ok(codec
        .decode(&image)
        .map_or(ScanOutcome::NotFound, ScanOutcome::from_payload))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::codec::{StandardCodec, StyleOptions, png_bytes};
    use crate::error::StudioError;

    #[test]
    fn as_link_accepts_http_and_https() {
        assert_eq!(as_link("https://example.com"), Some("https://example.com"));
        assert_eq!(as_link("HTTP://EXAMPLE.COM"), Some("HTTP://EXAMPLE.COM"));
        assert_eq!(as_link("  http://x.y  "), Some("http://x.y"));
    }

    #[test]
    fn as_link_rejects_other_payloads() {
        assert_eq!(as_link("httpbin"), None);
        assert_eq!(as_link("ftp://example.com"), None);
        assert_eq!(as_link("plain text"), None);
        assert_eq!(as_link(""), None);
    }

    #[test]
    fn scan_finds_url_and_sets_link() {
        let img = StandardCodec
            .encode("https://example.com", &StyleOptions::default())
            .unwrap();
        let outcome = scan_bytes(&StandardCodec, &png_bytes(&img).unwrap()).unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Found {
                payload: "https://example.com".to_owned(),
                link: Some("https://example.com".to_owned()),
            }
        );
    }

    #[test]
    fn scan_plain_text_has_no_link() {
        let img = StandardCodec
            .encode("just words", &StyleOptions::default())
            .unwrap();
        let outcome = scan_bytes(&StandardCodec, &png_bytes(&img).unwrap()).unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Found {
                payload: "just words".to_owned(),
                link: None,
            }
        );
    }

    #[test]
    fn scan_blank_image_is_not_found() {
        let blank = RgbImage::from_pixel(200, 200, Rgb([240, 240, 240]));
        let outcome = scan_bytes(&StandardCodec, &png_bytes(&blank).unwrap()).unwrap();
        assert_eq!(outcome, ScanOutcome::NotFound);
    }

    #[test]
    fn scan_garbage_bytes_is_an_image_error() {
        let err = scan_bytes(&StandardCodec, b"\x00\x01\x02").unwrap_err();
        assert!(matches!(err, StudioError::Image(_)), "got {err:?}");
    }
}
