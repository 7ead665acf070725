//! QR encoding and decoding.
//!
//! Symbol encoding is delegated to the `qrcode` crate and detection to
//! `rqrr`; this module only rasterises modules with the requested style and
//! prepares pixels for the detector.

pub mod style;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use qrcode::QrCode;

use crate::error::{Result, StudioError};

pub use style::{BORDER_RANGE, HexColor, MODULE_SIZE_RANGE, StyleOptions};

/// Light margin added around images before detection, in pixels.
///
/// Lets codes rendered with a one-module border (or cropped tightly by a
/// camera) still show the quiet zone the detector looks for.
const DECODE_MARGIN: usize = 24;

/// The QR capability consumed by the scan and generate flows.
pub trait QrCodec {
    /// Render `payload` as a QR code using `style`.
    ///
    /// # Errors
    ///
    /// Returns an error if the style is out of range or the payload does not
    /// fit in the largest QR version.
    fn encode(&self, payload: &str, style: &StyleOptions) -> Result<RgbImage>;

    /// Find and decode one QR symbol. `None` means no readable symbol.
    fn decode(&self, image: &DynamicImage) -> Option<String>;
}

/// [`QrCodec`] backed by `qrcode` (encode) and `rqrr` (decode).
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl QrCodec for StandardCodec {
    fn encode(&self, payload: &str, style: &StyleOptions) -> Result<RgbImage> {
        style.validate()?;
        let code =
            QrCode::new(payload.as_bytes()).map_err(|e| StudioError::Encode(e.to_string()))?;

        let modules = code.width();
        // QR symbols are at most 177 modules wide.
        #[allow(clippy::cast_possible_truncation)]
        let modules_u32 = modules as u32;
        let size = style.module_size;
        let side = (modules_u32 + 2 * style.border) * size;

        let mut image = RgbImage::from_pixel(side, side, style.background_color.rgb());
        let dark = style.module_color.rgb();

        for (idx, color) in code.to_colors().iter().enumerate() {
            if !matches!(color, qrcode::Color::Dark) {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let (mx, my) = ((idx % modules) as u32, (idx / modules) as u32);
            let x0 = (mx + style.border) * size;
            let y0 = (my + style.border) * size;
            for dy in 0..size {
                for dx in 0..size {
                    image.put_pixel(x0 + dx, y0 + dy, dark);
                }
            }
        }

        tracing::debug!(modules, side, "encoded {} payload bytes", payload.len());
        Ok(image)
    }

    fn decode(&self, image: &DynamicImage) -> Option<String> {
        let luma = image.to_luma8();
        let (w, h) = (luma.width() as usize, luma.height() as usize);
        if w == 0 || h == 0 {
            return None;
        }

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            w + 2 * DECODE_MARGIN,
            h + 2 * DECODE_MARGIN,
            |x, y| {
                if x < DECODE_MARGIN
                    || y < DECODE_MARGIN
                    || x >= DECODE_MARGIN + w
                    || y >= DECODE_MARGIN + h
                {
                    return u8::MAX;
                }
                #[allow(clippy::cast_possible_truncation)]
                let (px, py) = ((x - DECODE_MARGIN) as u32, (y - DECODE_MARGIN) as u32);
                luma.get_pixel(px, py).0[0]
            },
        );

        let grids = prepared.detect_grids();
        tracing::debug!(candidates = grids.len(), "qr detection finished");
        grids.iter().find_map(|grid| match grid.decode() {
            Ok((_meta, content)) => Some(content),
            Err(e) => {
                tracing::debug!(error = ?e, "candidate grid failed to decode");
                None
            }
        })
    }
}

/// Load a PNG or JPEG from memory.
///
/// # Errors
///
/// Returns [`StudioError::Image`] when the bytes are not a supported image.
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Serialize an encoded code as PNG.
///
/// # Errors
///
/// Returns [`StudioError::Image`] if the PNG encoder fails.
pub fn png_bytes(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests;
