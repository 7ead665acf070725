#![allow(clippy::unwrap_used, clippy::expect_used)]

use image::{DynamicImage, Rgb, RgbImage};

use super::*;

fn style(module_size: u32, border: u32) -> StyleOptions {
    StyleOptions {
        module_size,
        border,
        ..StyleOptions::default()
    }
}

// --- HexColor ---

#[test]
fn parses_long_hex_with_and_without_hash() {
    assert_eq!("#1a2B3c".parse::<HexColor>().unwrap(), HexColor([0x1A, 0x2B, 0x3C]));
    assert_eq!("FFFFFF".parse::<HexColor>().unwrap(), HexColor::WHITE);
}

#[test]
fn parses_short_hex() {
    assert_eq!("#f00".parse::<HexColor>().unwrap(), HexColor([0xFF, 0, 0]));
}

#[test]
fn rejects_malformed_colours() {
    for bad in ["", "#", "#12345", "#GGGGGG", "red", "#+12345", "#1234567"] {
        assert!(bad.parse::<HexColor>().is_err(), "accepted {bad:?}");
    }
}

#[test]
fn displays_as_upper_hex() {
    assert_eq!(HexColor([0x0A, 0xBC, 0x01]).to_string(), "#0ABC01");
}

// --- StyleOptions ---

#[test]
fn default_style_matches_generator_defaults() {
    let s = StyleOptions::default();
    assert_eq!(s.module_color, HexColor::BLACK);
    assert_eq!(s.background_color, HexColor::WHITE);
    assert_eq!(s.module_size, 10);
    assert_eq!(s.border, 4);
    s.validate().unwrap();
}

#[test]
fn validate_rejects_out_of_range_values() {
    assert!(style(4, 4).validate().is_err());
    assert!(style(21, 4).validate().is_err());
    assert!(style(10, 0).validate().is_err());
    assert!(style(10, 11).validate().is_err());
    style(5, 1).validate().unwrap();
    style(20, 10).validate().unwrap();
}

// --- encode ---

#[test]
fn encode_size_follows_module_size_and_border() {
    // "hello" fits in a version 1 symbol: 21 modules.
    let img = StandardCodec.encode("hello", &style(5, 2)).unwrap();
    assert_eq!(img.dimensions(), ((21 + 4) * 5, (21 + 4) * 5));
}

#[test]
fn encode_grows_with_payload_length() {
    let short = StandardCodec.encode("a", &style(5, 1)).unwrap();
    let long = StandardCodec.encode(&"a".repeat(300), &style(5, 1)).unwrap();
    assert!(long.width() > short.width());
}

#[test]
fn encode_uses_requested_colours() {
    let s = StyleOptions {
        module_color: HexColor([0x10, 0x20, 0x80]),
        background_color: HexColor([0xFF, 0xEE, 0x99]),
        module_size: 5,
        border: 1,
    };
    let img = StandardCodec.encode("colours", &s).unwrap();
    // Corner pixel is border; the next module in is the finder pattern's dark ring.
    assert_eq!(*img.get_pixel(0, 0), Rgb([0xFF, 0xEE, 0x99]));
    assert_eq!(*img.get_pixel(5, 5), Rgb([0x10, 0x20, 0x80]));
}

#[test]
fn encode_is_deterministic() {
    let a = StandardCodec.encode("same", &StyleOptions::default()).unwrap();
    let b = StandardCodec.encode("same", &StyleOptions::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn encode_rejects_invalid_style_before_encoding() {
    let err = StandardCodec.encode("x", &style(3, 4)).unwrap_err();
    assert!(matches!(err, StudioError::InvalidStyle(_)), "got {err:?}");
}

#[test]
fn encode_rejects_oversized_payload() {
    let err = StandardCodec
        .encode(&"x".repeat(8000), &StyleOptions::default())
        .unwrap_err();
    assert!(matches!(err, StudioError::Encode(_)), "got {err:?}");
}

// --- decode ---

#[test]
fn round_trip_across_sizes_and_borders() {
    let payload = "https://example.com/?q=qr studio";
    for size in [5, 10, 20] {
        for border in [1, 4, 10] {
            let img = StandardCodec.encode(payload, &style(size, border)).unwrap();
            let decoded = StandardCodec.decode(&DynamicImage::ImageRgb8(img));
            assert_eq!(
                decoded.as_deref(),
                Some(payload),
                "size {size}, border {border}"
            );
        }
    }
}

#[test]
fn round_trip_with_custom_colours() {
    let s = StyleOptions {
        module_color: HexColor([0x1E, 0x29, 0x3B]),
        background_color: HexColor([0xFC, 0xF8, 0xE0]),
        ..StyleOptions::default()
    };
    let img = StandardCodec.encode("Grüße, Welt", &s).unwrap();
    assert_eq!(
        StandardCodec.decode(&DynamicImage::ImageRgb8(img)).as_deref(),
        Some("Grüße, Welt")
    );
}

#[test]
fn round_trip_through_png_bytes() {
    let img = StandardCodec.encode("png path", &StyleOptions::default()).unwrap();
    let bytes = png_bytes(&img).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    let loaded = load_image(&bytes).unwrap();
    assert_eq!(StandardCodec.decode(&loaded).as_deref(), Some("png path"));
}

#[test]
fn decode_blank_image_is_not_found() {
    let blank = RgbImage::from_pixel(120, 120, Rgb([255, 255, 255]));
    assert_eq!(StandardCodec.decode(&DynamicImage::ImageRgb8(blank)), None);
}

#[test]
fn decode_empty_image_is_not_found() {
    assert_eq!(StandardCodec.decode(&DynamicImage::new_rgb8(0, 0)), None);
}

#[test]
fn load_image_rejects_non_image_bytes() {
    let err = load_image(b"definitely not a png").unwrap_err();
    assert!(matches!(err, StudioError::Image(_)), "got {err:?}");
}
