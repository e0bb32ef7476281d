use crate::error::{ProcessingError, ProcessingResult};
use ab_glyph::{FontRef, PxScale};
use image::imageops;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

static FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

const FONT_SIZE: f32 = 36.0;
const MIN_FONT_SIZE: f32 = 6.0;
const MARGIN: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl WatermarkPosition {
    pub const NAMES: &'static [&'static str] =
        &["top-left", "top-right", "bottom-left", "bottom-right", "center"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "top-left" => WatermarkPosition::TopLeft,
            "top-right" => WatermarkPosition::TopRight,
            "bottom-left" => WatermarkPosition::BottomLeft,
            "center" => WatermarkPosition::Center,
            _ => WatermarkPosition::BottomRight,
        }
    }

    fn offset(self, base: (u32, u32), mark: (u32, u32)) -> (i64, i64) {
        let right = (base.0 as i64 - mark.0 as i64 - MARGIN).max(0);
        let bottom = (base.1 as i64 - mark.1 as i64 - MARGIN).max(0);
        match self {
            WatermarkPosition::TopLeft => (MARGIN, MARGIN),
            WatermarkPosition::TopRight => (right, MARGIN),
            WatermarkPosition::BottomLeft => (MARGIN, bottom),
            WatermarkPosition::BottomRight => (right, bottom),
            WatermarkPosition::Center => (
                ((base.0 as i64 - mark.0 as i64) / 2).max(0),
                ((base.1 as i64 - mark.1 as i64) / 2).max(0),
            ),
        }
    }
}

/// Stamp white `text` on `base`.
///
/// The text is drawn at 36px, shrunk to fit inside the margins of narrow
/// images. `opacity` is the alpha of the lettering.
pub fn stamp_text(
    base: &DynamicImage,
    text: &str,
    position: WatermarkPosition,
    opacity: f32,
) -> ProcessingResult<DynamicImage> {
    let font = FontRef::try_from_slice(FONT)
        .map_err(|e| ProcessingError::Failed(format!("Watermark font unusable: {}", e)))?;

    let (width, height) = base.dimensions();
    let mut canvas = base.to_rgba8();
    if text.trim().is_empty() {
        return Ok(DynamicImage::ImageRgba8(canvas));
    }

    let available = (width as i64 - 2 * MARGIN).max(1) as f32;
    let (natural_width, _) = text_size(PxScale::from(FONT_SIZE), &font, text);
    let size = if natural_width as f32 > available {
        (FONT_SIZE * available / natural_width as f32).max(MIN_FONT_SIZE)
    } else {
        FONT_SIZE
    };
    let scale = PxScale::from(size);
    let mark = text_size(scale, &font, text);

    let alpha = (255.0 * opacity.clamp(0.0, 1.0)) as u8;
    let mut overlay = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    let (x, y) = position.offset((width, height), mark);
    draw_text_mut(
        &mut overlay,
        Rgba([255, 255, 255, alpha]),
        x as i32,
        y as i32,
        scale,
        &font,
        text,
    );
    imageops::overlay(&mut canvas, &overlay, 0, 0);

    Ok(DynamicImage::ImageRgba8(canvas))
}
