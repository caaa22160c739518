use crate::error::ExportError;
use kolreport_traits::ResourceProvider;
use kolreport_types::{Asset, ImageFormat, ResourceUri};
use std::sync::Arc;

/// Loads the branding image stamped on every page. One attempt per export.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    provider: Arc<dyn ResourceProvider>,
}

impl AssetLoader {
    pub fn new(provider: Arc<dyn ResourceProvider>) -> Self {
        Self { provider }
    }

    pub async fn load(&self, source: &ResourceUri) -> Result<Asset, ExportError> {
        log::debug!("Loading asset '{}' via {} provider", source, self.provider.name());
        let data = self
            .provider
            .load(source.as_str())
            .await
            .map_err(|e| ExportError::AssetUnavailable { uri: source.clone(), source: e })?;

        let format = detect_format(&data);
        let decoded = image::load_from_memory(&data).map_err(|e| ExportError::AssetDecode {
            uri: source.clone(),
            message: e.to_string(),
        })?;
        let (pixel_width, pixel_height) = (decoded.width(), decoded.height());
        if pixel_width == 0 || pixel_height == 0 {
            return Err(ExportError::AssetDecode {
                uri: source.clone(),
                message: "image has no pixels".into(),
            });
        }

        log::debug!("Asset '{source}' is {format} {pixel_width}x{pixel_height}");
        Ok(Asset { data, format, pixel_width, pixel_height })
    }
}

/// JPEG when the bytes say so, PNG otherwise.
pub fn detect_format(data: &[u8]) -> ImageFormat {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use kolreport_traits::InMemoryResourceProvider;
    use std::io::Cursor;

    fn encoded(format: image::ImageFormat, w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(w, h, Rgb([1u8, 2, 3])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn loader(path: &str, bytes: Vec<u8>) -> AssetLoader {
        AssetLoader::new(Arc::new(InMemoryResourceProvider::new().with(path, bytes)))
    }

    #[tokio::test]
    async fn png_asset_reports_dimensions() {
        let asset = loader("logo.png", encoded(image::ImageFormat::Png, 200, 100))
            .load(&ResourceUri::from("logo.png"))
            .await
            .unwrap();
        assert_eq!(asset.format, ImageFormat::Png);
        assert_eq!((asset.pixel_width, asset.pixel_height), (200, 100));
        assert_eq!(asset.aspect(), 0.5);
    }

    #[tokio::test]
    async fn jpeg_is_detected_from_content() {
        let asset = loader("logo.png", encoded(image::ImageFormat::Jpeg, 16, 16))
            .load(&ResourceUri::from("logo.png"))
            .await
            .unwrap();
        assert_eq!(asset.format, ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn missing_asset_is_unavailable() {
        let err = loader("other.png", vec![])
            .load(&ResourceUri::from("logo.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssetUnavailable);
    }

    #[tokio::test]
    async fn undecodable_bytes_are_a_decode_error() {
        let err = loader("logo.png", b"definitely not an image".to_vec())
            .load(&ResourceUri::from("logo.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssetDecode);
    }

    #[test]
    fn ambiguous_bytes_default_to_png() {
        assert_eq!(detect_format(b"????"), ImageFormat::Png);
    }
}
