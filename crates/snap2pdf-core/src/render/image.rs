//! Image XObject creation
//!
//! JPEG data is embedded as-is with `DCTDecode`. PNG data is decoded and
//! stored as `FlateDecode` samples, with the alpha channel split into an
//! `SMask` when present.

use crate::normalize::{NormalizedEncoding, NormalizedImage};
use crate::types::Result;
use ::image::{DynamicImage, ImageFormat};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// Frame header fields of a baseline/progressive JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegHeader {
    width: u32,
    height: u32,
    bits_per_component: u8,
    components: u8,
}

/// Add an image XObject to `doc` and return its id
pub(crate) fn add_image_xobject(doc: &mut Document, image: &NormalizedImage) -> Result<ObjectId> {
    match image.encoding {
        NormalizedEncoding::Jpeg => match read_jpeg_header(&image.bytes) {
            Some(header) => Ok(doc.add_object(dct_stream(&image.bytes, header))),
            None => {
                // CMYK, 12-bit or unusual frames: decode and store samples
                let decoded =
                    ::image::load_from_memory_with_format(&image.bytes, ImageFormat::Jpeg)?;
                add_flate_image(doc, &decoded)
            }
        },
        NormalizedEncoding::Png => {
            let decoded = ::image::load_from_memory_with_format(&image.bytes, ImageFormat::Png)?;
            add_flate_image(doc, &decoded)
        }
    }
}

fn dct_stream(bytes: &[u8], header: JpegHeader) -> Stream {
    let color_space = if header.components == 1 {
        "DeviceGray"
    } else {
        "DeviceRGB"
    };
    let dict = image_dict(header.width, header.height, color_space, "DCTDecode");
    Stream::new(dict, bytes.to_vec())
}

fn add_flate_image(doc: &mut Document, image: &DynamicImage) -> Result<ObjectId> {
    let (width, height) = (image.width(), image.height());
    let color = image.color();

    let smask_id = if color.has_alpha() {
        let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
        Some(doc.add_object(flate_stream(width, height, "DeviceGray", &alpha)?))
    } else {
        None
    };

    let (color_space, samples) = if color.has_color() {
        ("DeviceRGB", image.to_rgb8().into_raw())
    } else {
        ("DeviceGray", image.to_luma8().into_raw())
    };

    let mut stream = flate_stream(width, height, color_space, &samples)?;
    if let Some(id) = smask_id {
        stream.dict.set("SMask", Object::Reference(id));
    }
    Ok(doc.add_object(stream))
}

fn flate_stream(width: u32, height: u32, color_space: &str, samples: &[u8]) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(samples)?;
    let compressed = encoder.finish()?;

    let dict = image_dict(width, height, color_space, "FlateDecode");
    Ok(Stream::new(dict, compressed))
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict
}

/// Read the SOF segment of a JPEG that can be embedded without re-encoding.
///
/// Returns `None` for anything other than 8-bit gray or RGB frames with a
/// known height.
fn read_jpeg_header(bytes: &[u8]) -> Option<JpegHeader> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];

        match marker {
            // Fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // Markers without a length field
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // Start of scan before any frame header
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if length < 2 {
            return None;
        }

        let is_frame = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let segment = bytes.get(pos + 4..pos + 2 + length)?;
            if segment.len() < 6 {
                return None;
            }
            let header = JpegHeader {
                bits_per_component: segment[0],
                height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                components: segment[5],
            };
            let supported = header.bits_per_component == 8
                && header.width > 0
                && header.height > 0
                && matches!(header.components, 1 | 3);
            return supported.then_some(header);
        }

        pos += 2 + length;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    fn normalized(encoding: NormalizedEncoding, bytes: Vec<u8>, w: u32, h: u32) -> NormalizedImage {
        NormalizedImage {
            encoding,
            bytes: Arc::from(bytes),
            pixel_width: w,
            pixel_height: h,
        }
    }

    #[test]
    fn test_read_jpeg_header() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(7, 5, Luma([128])));
        let bytes = encode(gray, ImageFormat::Jpeg);

        let header = read_jpeg_header(&bytes).unwrap();
        assert_eq!((header.width, header.height), (7, 5));
        assert_eq!(header.components, 1);
        assert_eq!(header.bits_per_component, 8);
    }

    #[test]
    fn test_read_jpeg_header_rejects_garbage() {
        assert!(read_jpeg_header(b"not a jpeg").is_none());
        assert!(read_jpeg_header(&[0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02]).is_none());
    }

    #[test]
    fn test_jpeg_is_embedded_verbatim() {
        let rgb = DynamicImage::ImageRgb8(::image::RgbImage::new(4, 4));
        let bytes = encode(rgb, ImageFormat::Jpeg);
        let mut doc = Document::with_version("1.7");

        let id = add_image_xobject(
            &mut doc,
            &normalized(NormalizedEncoding::Jpeg, bytes.clone(), 4, 4),
        )
        .unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content, bytes);
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
    }

    #[test]
    fn test_png_with_alpha_gets_smask() {
        let rgba = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);
        let mut doc = Document::with_version("1.7");

        let id = add_image_xobject(&mut doc, &normalized(NormalizedEncoding::Png, bytes, 3, 2))
            .unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 3);
        assert!(stream.dict.get(b"SMask").is_ok());
    }

    #[test]
    fn test_invalid_png_is_error() {
        let mut doc = Document::with_version("1.7");
        let result = add_image_xobject(
            &mut doc,
            &normalized(NormalizedEncoding::Png, vec![0, 1, 2, 3], 1, 1),
        );
        assert!(result.is_err());
    }
}
