use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{ColorType, DynamicImage};
use kolreport_render_core::RenderError;
use kolreport_types::ImageFormat;
use lopdf::{Dictionary, Stream, dictionary};
use std::io::Write;

/// An image XObject ready to be added to the document, plus its optional
/// soft mask.
pub(crate) struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub dict: Dictionary,
    pub data: Vec<u8>,
    pub soft_mask: Option<Stream>,
}

pub(crate) fn encode_image(name: &str, data: &[u8], format: ImageFormat) -> Result<EncodedImage, RenderError> {
    let image_format = match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
    };
    let decoded = image::load_from_memory_with_format(data, image_format).map_err(|e| RenderError::Image {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    if format == ImageFormat::Jpeg
        && let Some(color_space) = dct_color_space(&decoded)
    {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => decoded.width() as i64,
            "Height" => decoded.height() as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        return Ok(EncodedImage {
            width: decoded.width(),
            height: decoded.height(),
            dict,
            data: data.to_vec(),
            soft_mask: None,
        });
    }

    encode_flate(&decoded)
}

/// JPEG data can be passed through untouched for gray and RGB images.
fn dct_color_space(decoded: &DynamicImage) -> Option<&'static str> {
    match decoded.color() {
        ColorType::L8 => Some("DeviceGray"),
        ColorType::Rgb8 => Some("DeviceRGB"),
        _ => None,
    }
}

fn encode_flate(decoded: &DynamicImage) -> Result<EncodedImage, RenderError> {
    let rgba = decoded.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();

    let soft_mask = if has_alpha {
        let alpha: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        Some(Stream::new(dict, compress(&alpha)?))
    } else {
        None
    };

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    Ok(EncodedImage { width, height, dict, data: compress(&rgb)?, soft_mask })
}

fn compress(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
