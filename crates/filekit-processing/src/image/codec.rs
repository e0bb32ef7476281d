//! Decoding uploads and encoding results.

use crate::error::ProcessingResult;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Formats the image tools write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    /// Parse a user-facing format name (`jpg`, `jpeg`, `png`, `webp`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Keep JPEG and WebP inputs in their format; everything else becomes PNG.
    pub fn preserving(input_name: &str) -> Self {
        let ext = input_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        match OutputFormat::from_name(ext) {
            Some(OutputFormat::Jpeg) => OutputFormat::Jpeg,
            Some(OutputFormat::WebP) => OutputFormat::WebP,
            _ => OutputFormat::Png,
        }
    }
}

/// Decode an image, sniffing the format from its bytes rather than its name.
pub fn open(path: &Path) -> ProcessingResult<DynamicImage> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?)
}

/// Detected container format of an image file, if recognizable.
pub fn sniff_format(path: &Path) -> Option<ImageFormat> {
    image::ImageReader::open(path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .format()
}

/// Composite onto white and drop alpha. JPEG has no alpha channel.
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = img.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let p = rgba.get_pixel(x, y);
        let alpha = p[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(p[0]), blend(p[1]), blend(p[2])])
    })
}

pub fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> ProcessingResult<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_on_white(img);
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
        }
        OutputFormat::WebP => {
            let (width, height) = img.dimensions();
            let rgba = img.to_rgba8();
            let encoder = webp::Encoder::from_rgba(&rgba, width, height);
            let webp_data = encoder.encode(quality as f32);
            buffer.extend_from_slice(&webp_data);
        }
    }

    Ok(buffer)
}

pub fn save(img: &DynamicImage, format: OutputFormat, quality: u8, path: &Path) -> ProcessingResult<u64> {
    let data = encode(img, format, quality)?;
    std::fs::write(path, &data)?;
    Ok(data.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_preserving_format() {
        assert_eq!(OutputFormat::preserving("photo.JPEG"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::preserving("photo.webp"), OutputFormat::WebP);
        assert_eq!(OutputFormat::preserving("scan.bmp"), OutputFormat::Png);
        assert_eq!(OutputFormat::preserving("noext"), OutputFormat::Png);
    }

    #[test]
    fn test_flatten_transparent_pixel_becomes_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_on_white(&img);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_encoded_bytes_decode_as_requested_format() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255])));

        for (format, expected) in [
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Jpeg, ImageFormat::Jpeg),
            (OutputFormat::WebP, ImageFormat::WebP),
        ] {
            let data = encode(&img, format, 85).unwrap();
            assert_eq!(image::guess_format(&data).unwrap(), expected);
        }
    }
}
