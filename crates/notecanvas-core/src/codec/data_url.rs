//! `data:` URLs carrying base64 image payloads.

use super::{CodecError, CodecResult};
use crate::entities::ImageFormat;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode `bytes` as a base64 data URL, typed by the payload's magic bytes.
pub fn encode(bytes: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(bytes)
        .map(|f| f.mime_type())
        .unwrap_or(FALLBACK_MIME);
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// The declared mime type of a data URL.
pub fn mime_type(url: &str) -> Option<&str> {
    let (header, _) = url.strip_prefix("data:")?.split_once(',')?;
    Some(header.split(';').next().unwrap_or(header))
}

/// Decode the payload of a base64 data URL.
pub fn decode(url: &str) -> CodecResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CodecError::DataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CodecError::DataUrl("missing payload separator".to_string()))?;
    if !header.split(';').any(|part| part == "base64") {
        return Err(CodecError::DataUrl(format!(
            "unsupported encoding in header {:?}",
            header
        )));
    }
    Ok(STANDARD.decode(payload.trim())?)
}
