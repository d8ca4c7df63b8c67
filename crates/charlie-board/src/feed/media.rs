//! Inline image payloads.
//!
//! Uploaded files are stored inside the post as `data:` URLs. No size limit,
//! re-encoding, or format check is applied.

use base64::{Engine, engine::general_purpose::STANDARD};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode raw file bytes as a `data:<mime>;base64,...` URL
pub fn encode_image(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME);

    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_png_is_sniffed() {
        let url = encode_image(PNG_MAGIC);
        assert!(url.starts_with("data:image/png;base64,"));

        let payload = url.split_once(',').unwrap().1;
        assert_eq!(STANDARD.decode(payload).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn test_unknown_bytes_fall_back() {
        let url = encode_image(b"hello");
        assert_eq!(url, "data:application/octet-stream;base64,aGVsbG8=");
    }
}
