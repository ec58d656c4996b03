//! QR artifact rendering.
//!
//! Every exercise has a QR code that deep-links to its AR view. The symbol
//! is rendered here as PNG bytes; writing them to disk is the API layer's
//! concern.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

/// Default deep-link prefix. The slug is appended as the last path segment.
pub const DEFAULT_AR_BASE_URL: &str = "https://gymar.app/ar";

/// Side length of the rendered PNG in pixels.
pub const QR_IMAGE_SIZE: u32 = 256;

/// Quiet zone around the symbol, in modules.
pub const QR_MARGIN_MODULES: usize = 1;

/// File extension of QR artifacts.
pub const QR_EXTENSION: &str = "png";

#[derive(Debug, thiserror::Error)]
pub enum QrRenderError {
    #[error("QR encoding failed: {0}")]
    Encode(String),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Build the deep link encoded in an exercise's QR code.
///
/// A trailing slash on `base_url` is ignored.
pub fn deep_link(base_url: &str, slug: &str) -> String {
    format!("{}/{slug}", base_url.trim_end_matches('/'))
}

/// Artifact file name for a slug (`{slug}.png`).
pub fn artifact_file_name(slug: &str) -> String {
    format!("{slug}.{QR_EXTENSION}")
}

/// Extract the slug from an artifact file name, if it is a `.png` file.
pub fn slug_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(QR_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
}

/// Render `data` as a black-on-white QR code in a square grayscale image.
///
/// Uses error-correction level M and a one-module quiet zone. Each output
/// pixel samples the module it falls in, so module edges stay crisp even
/// when `size` is not a multiple of the module count.
pub fn render_qr(data: &str, size: u32) -> Result<GrayImage, QrRenderError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| QrRenderError::Encode(e.to_string()))?;
    let width = code.width();
    let colors = code.to_colors();
    let total = width + 2 * QR_MARGIN_MODULES;
    let size_px = size as usize;

    let image = GrayImage::from_fn(size, size, |x, y| {
        let mx = (x as usize * total) / size_px;
        let my = (y as usize * total) / size_px;
        let dark = mx >= QR_MARGIN_MODULES
            && my >= QR_MARGIN_MODULES
            && mx < width + QR_MARGIN_MODULES
            && my < width + QR_MARGIN_MODULES
            && colors[(my - QR_MARGIN_MODULES) * width + (mx - QR_MARGIN_MODULES)] == Color::Dark;
        if dark {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    Ok(image)
}

/// Render `data` as a 256x256 QR code and encode it as PNG bytes.
pub fn render_qr_png(data: &str) -> Result<Vec<u8>, QrRenderError> {
    let image = render_qr(data, QR_IMAGE_SIZE)?;
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(image: &GrayImage) -> String {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            image.width() as usize,
            image.height() as usize,
            |x, y| image.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
        let (_meta, content) = grids[0].decode().expect("symbol should decode");
        content
    }

    #[test]
    fn deep_link_appends_slug() {
        assert_eq!(
            deep_link("https://gymar.app/ar", "squat"),
            "https://gymar.app/ar/squat"
        );
    }

    #[test]
    fn deep_link_ignores_trailing_slash() {
        assert_eq!(
            deep_link("https://example.test/ar/", "squat-v2"),
            "https://example.test/ar/squat-v2"
        );
    }

    #[test]
    fn file_name_roundtrip() {
        assert_eq!(artifact_file_name("squat"), "squat.png");
        assert_eq!(slug_from_file_name("squat.png"), Some("squat"));
    }

    #[test]
    fn non_png_names_have_no_slug() {
        assert_eq!(slug_from_file_name("notes.txt"), None);
        assert_eq!(slug_from_file_name("squatpng"), None);
        assert_eq!(slug_from_file_name(".png"), None);
    }

    #[test]
    fn rendered_image_is_256_black_on_white() {
        let image = render_qr("https://gymar.app/ar/squat", QR_IMAGE_SIZE).unwrap();
        assert_eq!(image.dimensions(), (256, 256));
        assert!(image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // Quiet-zone corner is white; the finder pattern corner just inside is black.
        assert_eq!(image.get_pixel(0, 0).0[0], 255);
        assert_eq!(image.get_pixel(12, 12).0[0], 0);
    }

    #[test]
    fn rendered_image_decodes_to_deep_link() {
        let link = deep_link(DEFAULT_AR_BASE_URL, "squat");
        let image = render_qr(&link, QR_IMAGE_SIZE).unwrap();
        assert_eq!(decode(&image), link);
    }

    #[test]
    fn png_bytes_decode_to_deep_link() {
        let link = deep_link(DEFAULT_AR_BASE_URL, "pistol-squat");
        let bytes = render_qr_png(&link).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_luma8();
        assert_eq!(decode(&image), link);
    }
}
