//! QR rendering of verification payloads.

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

use crate::error::SealError;
use crate::types::VerificationPayload;

/// Side of the rendered PNG in pixels.
pub const QR_IMAGE_SIZE: u32 = 200;

/// Light modules required around the symbol by the QR standard.
const QUIET_ZONE: u32 = 4;

/// Encode `payload` as JSON into a square PNG QR image (error correction M).
#[tracing::instrument(skip(payload), fields(code = %payload.code))]
pub fn encode_qr(payload: &VerificationPayload) -> Result<Vec<u8>, SealError> {
    let json = payload
        .to_json()
        .map_err(|e| SealError::QrEncode(format!("payload is not serializable: {e}")))?;
    let code = QrCode::with_error_correction_level(json.as_bytes(), EcLevel::M)
        .map_err(|e| SealError::QrEncode(e.to_string()))?;

    let image = render(&code);
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| SealError::QrEncode(e.to_string()))?;

    tracing::debug!(
        modules = code.width(),
        png_len = png.len(),
        "Rendered verification QR"
    );
    Ok(png)
}

/// Scale modules to whole pixels and center them on a white square canvas.
fn render(code: &QrCode) -> GrayImage {
    let modules = code.width() as u32;
    let span = modules + 2 * QUIET_ZONE;
    let scale = (QR_IMAGE_SIZE / span).max(1);
    let side = QR_IMAGE_SIZE.max(span * scale);
    let offset = (side - modules * scale) / 2;
    let colors = code.to_colors();

    GrayImage::from_fn(side, side, |x, y| {
        let inside = |v: u32| v >= offset && v < offset + modules * scale;
        if !inside(x) || !inside(y) {
            return Luma([255]);
        }
        let mx = ((x - offset) / scale) as usize;
        let my = ((y - offset) / scale) as usize;
        match colors[my * modules as usize + mx] {
            Color::Dark => Luma([0]),
            Color::Light => Luma([255]),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(png: &[u8]) -> String {
        let img = image::load_from_memory(png).unwrap().to_luma8();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(img.width() as usize, img.height() as usize, |x, y| {
                img.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    fn sample() -> VerificationPayload {
        VerificationPayload {
            code: "1700000000000-ABC123".into(),
            url: "https://example.com/verify?code=1700000000000-ABC123&type=certificates&id=doc-1"
                .into(),
            hash: crate::compute_digest(b"original"),
        }
    }

    #[test]
    fn renders_fixed_size_png() {
        let png = encode_qr(&sample()).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (QR_IMAGE_SIZE, QR_IMAGE_SIZE));
    }

    #[test]
    fn decodes_back_to_same_payload() {
        let payload = sample();
        let png = encode_qr(&payload).unwrap();
        let decoded: VerificationPayload = serde_json::from_str(&decode(&png)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn oversized_payload_is_an_encode_error() {
        let payload = VerificationPayload {
            code: "x".repeat(3000),
            url: String::new(),
            hash: String::new(),
        };
        let err = encode_qr(&payload).unwrap_err();
        assert_eq!(err.kind(), "QrEncodeError");
    }
}
