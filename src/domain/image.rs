//! Base64 image decoding for profile pictures and identity documents.
//!
//! Accepts plain base64 payloads or `data:image/...;base64,` URIs. The
//! declared media type is ignored; the actual format is sniffed from the
//! decoded bytes and must be JPEG or PNG.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

use crate::errors::{AppError, AppResult};

/// Image formats accepted for uploads ("jpg" is an alias of JPEG).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedFormat {
    Jpeg,
    Png,
}

impl DecodedFormat {
    /// File extension used when storing the object.
    pub fn extension(&self) -> &'static str {
        match self {
            DecodedFormat::Jpeg => "jpg",
            DecodedFormat::Png => "png",
        }
    }
}

/// A decoded upload: raw bytes plus their sniffed format.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub format: DecodedFormat,
}

/// Decode a base64 image payload, enforcing the allowed-format set.
pub fn decode_base64_image(input: &str) -> AppResult<DecodedImage> {
    let payload = strip_data_uri(input);

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::ImageDecode(format!("invalid base64 image payload: {}", e)))?;

    let format = match image::guess_format(&bytes) {
        Ok(ImageFormat::Jpeg) => DecodedFormat::Jpeg,
        Ok(ImageFormat::Png) => DecodedFormat::Png,
        Ok(other) => {
            return Err(AppError::ImageDecode(format!(
                "unsupported image format {:?}, expected jpeg, png or jpg",
                other
            )))
        }
        Err(_) => {
            return Err(AppError::ImageDecode(
                "payload is not a recognizable image".to_string(),
            ))
        }
    };

    Ok(DecodedImage { bytes, format })
}

/// Strip an optional `data:<media-type>;base64,` prefix.
fn strip_data_uri(input: &str) -> &str {
    if let Some(rest) = input.strip_prefix("data:") {
        if let Some((_, payload)) = rest.split_once(";base64,") {
            return payload;
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    // Magic-byte prefixes are enough for format sniffing
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
    const GIF_MAGIC: &[u8] = b"GIF89a\x01\x00\x01\x00";

    #[test]
    fn decodes_plain_base64_png() {
        let payload = STANDARD.encode(PNG_MAGIC);
        let image = decode_base64_image(&payload).unwrap();

        assert_eq!(image.format, DecodedFormat::Png);
        assert_eq!(image.bytes, PNG_MAGIC);
        assert_eq!(image.format.extension(), "png");
    }

    #[test]
    fn decodes_data_uri_jpeg() {
        let payload = format!("data:image/jpeg;base64,{}", STANDARD.encode(JPEG_MAGIC));
        let image = decode_base64_image(&payload).unwrap();

        assert_eq!(image.format, DecodedFormat::Jpeg);
        assert_eq!(image.format.extension(), "jpg");
    }

    #[test]
    fn rejects_disallowed_format() {
        let payload = STANDARD.encode(GIF_MAGIC);
        let result = decode_base64_image(&payload);

        assert!(matches!(result, Err(AppError::ImageDecode(_))));
    }

    #[test]
    fn rejects_invalid_base64() {
        let result = decode_base64_image("not!!!base64###");
        assert!(matches!(result, Err(AppError::ImageDecode(_))));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let payload = STANDARD.encode(b"just some text");
        let result = decode_base64_image(&payload);

        assert!(matches!(result, Err(AppError::ImageDecode(_))));
    }

    #[test]
    fn declared_media_type_does_not_override_sniffing() {
        // Declared as png, bytes are jpeg: sniffed format wins
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(JPEG_MAGIC));
        let image = decode_base64_image(&payload).unwrap();
        assert_eq!(image.format, DecodedFormat::Jpeg);
    }
}
