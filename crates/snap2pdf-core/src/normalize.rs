//! Converting source images into encodings the PDF backend embeds
//!
//! PNG and JPEG bytes pass through untouched. Everything else is decoded and
//! re-encoded losslessly as PNG at its native resolution.

use crate::types::*;
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use std::io::Cursor;
use std::sync::Arc;

/// Encodings the document backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedEncoding {
    Png,
    Jpeg,
}

/// Image bytes ready for embedding
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub encoding: NormalizedEncoding,
    pub bytes: Arc<[u8]>,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    /// Downscale (and re-encode) images whose longer side exceeds this
    pub max_dimension: Option<u32>,
}

impl NormalizeOptions {
    fn exceeds_cap(&self, width: u32, height: u32) -> bool {
        self.max_dimension
            .is_some_and(|max| width > max || height > max)
    }
}

/// Normalize an image for embedding.
///
/// Decode failures are reported per image; the caller decides whether to skip
/// the image or abort.
pub fn normalize(asset: &ImageAsset, options: &NormalizeOptions) -> Result<NormalizedImage> {
    let pass_through = match asset.source_encoding() {
        SourceEncoding::Png => Some(NormalizedEncoding::Png),
        SourceEncoding::Jpeg => Some(NormalizedEncoding::Jpeg),
        SourceEncoding::Other => None,
    };

    if let Some(encoding) = pass_through {
        if !options.exceeds_cap(asset.pixel_width(), asset.pixel_height()) {
            return Ok(NormalizedImage {
                encoding,
                bytes: Arc::clone(asset.bytes()),
                pixel_width: asset.pixel_width(),
                pixel_height: asset.pixel_height(),
            });
        }
    }

    let decoded = image::load_from_memory(asset.bytes()).map_err(|e| ConvertError::Decode {
        image_id: asset.id(),
        reason: e.to_string(),
    })?;

    let decoded = match options.max_dimension {
        Some(max) if decoded.width() > max || decoded.height() > max => {
            log::debug!(
                "Downscaling {} from {}x{} to fit {}px",
                asset.id(),
                decoded.width(),
                decoded.height(),
                max
            );
            decoded.resize(max, max, FilterType::Lanczos3)
        }
        _ => decoded,
    };

    let (pixel_width, pixel_height) = (decoded.width(), decoded.height());
    let bytes = encode_png(decoded).map_err(|e| ConvertError::Decode {
        image_id: asset.id(),
        reason: format!("PNG re-encode failed: {}", e),
    })?;

    Ok(NormalizedImage {
        encoding: NormalizedEncoding::Png,
        bytes: bytes.into(),
        pixel_width,
        pixel_height,
    })
}

/// Normalize on the blocking pool; decoding and encoding are CPU-bound
pub async fn normalize_async(
    asset: ImageAsset,
    options: NormalizeOptions,
) -> Result<NormalizedImage> {
    tokio::task::spawn_blocking(move || normalize(&asset, &options)).await?
}

fn encode_png(image: DynamicImage) -> image::ImageResult<Vec<u8>> {
    // The PNG encoder has no floating point color types
    let image = match image {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(image.to_rgb16()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(image.to_rgba16()),
        other => other,
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encoded(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 40) as u8, (y * 60) as u8, ((x + y) * 10) as u8])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    #[test]
    fn test_png_passes_through() {
        let bytes = encoded(ImageFormat::Png, 5, 4);
        let asset = ImageAsset::new("a.png", bytes.clone(), 5, 4, SourceEncoding::Png);

        let normalized = normalize(&asset, &NormalizeOptions::default()).unwrap();
        assert_eq!(normalized.encoding, NormalizedEncoding::Png);
        assert_eq!(&normalized.bytes[..], &bytes[..]);
        assert!(Arc::ptr_eq(&normalized.bytes, asset.bytes()));
    }

    #[test]
    fn test_jpeg_passes_through() {
        let bytes = encoded(ImageFormat::Jpeg, 6, 6);
        let asset = ImageAsset::new("a.jpg", bytes.clone(), 6, 6, SourceEncoding::Jpeg);

        let normalized = normalize(&asset, &NormalizeOptions::default()).unwrap();
        assert_eq!(normalized.encoding, NormalizedEncoding::Jpeg);
        assert_eq!(&normalized.bytes[..], &bytes[..]);
    }

    #[test]
    fn test_bmp_is_reencoded_losslessly() {
        let bytes = encoded(ImageFormat::Bmp, 5, 4);
        let asset = ImageAsset::new("a.bmp", bytes.clone(), 5, 4, SourceEncoding::Other);

        let normalized = normalize(&asset, &NormalizeOptions::default()).unwrap();
        assert_eq!(normalized.encoding, NormalizedEncoding::Png);
        assert_eq!((normalized.pixel_width, normalized.pixel_height), (5, 4));

        let original = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let round_trip = image::load_from_memory_with_format(&normalized.bytes, ImageFormat::Png)
            .unwrap()
            .to_rgb8();
        assert_eq!(original, round_trip);
    }

    #[test]
    fn test_corrupt_image_is_decode_error() {
        let asset = ImageAsset::new("bad.gif", vec![1, 2, 3, 4], 10, 10, SourceEncoding::Other);
        match normalize(&asset, &NormalizeOptions::default()) {
            Err(ConvertError::Decode { image_id, .. }) => assert_eq!(image_id, asset.id()),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_dimension_cap_downscales() {
        let bytes = encoded(ImageFormat::Png, 40, 20);
        let asset = ImageAsset::new("big.png", bytes, 40, 20, SourceEncoding::Png);
        let options = NormalizeOptions {
            max_dimension: Some(10),
        };

        let normalized = normalize(&asset, &options).unwrap();
        assert_eq!(normalized.encoding, NormalizedEncoding::Png);
        assert_eq!((normalized.pixel_width, normalized.pixel_height), (10, 5));
    }

    #[test]
    fn test_dimension_cap_not_reached_keeps_bytes() {
        let bytes = encoded(ImageFormat::Png, 8, 8);
        let asset = ImageAsset::new("small.png", bytes, 8, 8, SourceEncoding::Png);
        let options = NormalizeOptions {
            max_dimension: Some(8),
        };

        let normalized = normalize(&asset, &options).unwrap();
        assert!(Arc::ptr_eq(&normalized.bytes, asset.bytes()));
    }

    #[tokio::test]
    async fn test_normalize_async() {
        let bytes = encoded(ImageFormat::Bmp, 3, 3);
        let asset = ImageAsset::new("a.bmp", bytes, 3, 3, SourceEncoding::Other);
        let normalized = normalize_async(asset, NormalizeOptions::default())
            .await
            .unwrap();
        assert_eq!(normalized.encoding, NormalizedEncoding::Png);
    }
}
