//! `data:` URL and base64 helpers for uploads and captures.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

use crate::error::{CaptureError, EngineError};

/// Decode base64 upload data, with or without a `data:<mime>;base64,` prefix.
pub fn decode_upload(data: &str) -> Result<Vec<u8>, EngineError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| EngineError::InvalidImageData("data URL has no payload".into()))?;
            if !header.ends_with(";base64") {
                return Err(EngineError::InvalidImageData(
                    "only base64 data URLs are supported".into(),
                ));
            }
            body
        }
        None => data,
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| EngineError::InvalidImageData(e.to_string()))?;
    if bytes.is_empty() {
        return Err(EngineError::InvalidImageData("upload is empty".into()));
    }
    Ok(bytes)
}

/// Encode an image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Encode an image as a `data:image/png;base64,...` URL
pub fn png_data_url(image: &RgbaImage) -> Result<String, CaptureError> {
    let png = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Resolve a library design URL against the configured base.
///
/// Absolute `http(s)` URLs are kept; anything else is joined to `base`.
pub fn resolve_library_url(url: &str, base: Option<&str>) -> String {
    if url.starts_with("http") {
        return url.to_string();
    }
    match base {
        Some(base) if !base.is_empty() => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
        _ => url.to_string(),
    }
}
