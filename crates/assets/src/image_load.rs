//! Decal image fetching and decoding.

use garment::ImageSource;
use image::RgbaImage;
use tracing::debug;

use crate::LoadError;

/// Decode PNG/JPEG/WebP bytes into RGBA8
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

/// Download a library design
pub async fn fetch_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, LoadError> {
    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(LoadError::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }
    let bytes = response.bytes().await?;
    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

/// Resolve a decal image source to decoded pixels
pub async fn load_image_source(http: &reqwest::Client, source: ImageSource) -> Result<RgbaImage, LoadError> {
    let bytes = match source {
        ImageSource::Bytes(bytes) => bytes.to_vec(),
        ImageSource::Url(url) => fetch_bytes(http, &url).await?,
    };
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| LoadError::Task(e.to_string()))?
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use image::Rgba;

    use super::*;

    pub fn png_bytes() -> Vec<u8> {
        let image = RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 128]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = decode_image(&png_bytes()).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 128]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_image(&[1, 2, 3]), Err(LoadError::Decode(_))));
    }

    #[tokio::test]
    async fn test_load_inline_source() {
        let http = reqwest::Client::new();
        let bytes: Arc<[u8]> = Arc::from(png_bytes());
        let image = load_image_source(&http, ImageSource::Bytes(bytes)).await.unwrap();
        assert_eq!(image.width(), 3);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let http = reqwest::Client::new();
        let result = load_image_source(&http, ImageSource::Url("http://127.0.0.1:9/missing.png".to_string())).await;
        assert!(matches!(result, Err(LoadError::Http(_))));
    }
}
