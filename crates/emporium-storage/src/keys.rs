//! Shared key generation and format detection for storage backends.
//!
//! Key format: `media/{kind_tag}/{uuid}.{format}`. All backends must use this
//! format for consistency.

use uuid::Uuid;

/// Generate a storage key for the given kind tag and blob format.
pub fn generate_storage_key(kind_tag: &str, format: &str) -> String {
    format!("media/{}/{}.{}", kind_tag, Uuid::new_v4(), format)
}

/// Detect the blob format from magic bytes, falling back to `bin`.
///
/// Covers the content types the pipeline accepts; anything else has already
/// been rejected by validation, so the fallback is only reachable for blobs
/// stored by other tooling.
pub fn detect_format(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        "mp4"
    } else if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        "webm"
    } else {
        "bin"
    }
}
