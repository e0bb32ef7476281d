//! Size and orientation changes.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn resize(img: &DynamicImage, width: u32, height: u32, maintain_aspect: bool) -> DynamicImage {
    if maintain_aspect {
        img.resize(width, height, FilterType::Lanczos3)
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// Rotate counter-clockwise by `angle` degrees, growing the canvas so no
/// corner is cut off. Uncovered area is white.
pub fn rotate(img: &DynamicImage, angle: i64) -> DynamicImage {
    match angle.rem_euclid(360) {
        0 => img.clone(),
        90 => img.rotate270(),
        180 => img.rotate180(),
        270 => img.rotate90(),
        other => rotate_expanded(img, other as f32),
    }
}

fn rotate_expanded(img: &DynamicImage, degrees: f32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let new_width = (width as f32 * cos + height as f32 * sin).ceil() as u32;
    let new_height = (width as f32 * sin + height as f32 * cos).ceil() as u32;

    let mut canvas = RgbaImage::from_pixel(new_width.max(1), new_height.max(1), WHITE);
    let x = (new_width as i64 - width as i64) / 2;
    let y = (new_height as i64 - height as i64) / 2;
    imageops::overlay(&mut canvas, &img.to_rgba8(), x, y);

    // imageproc rotates clockwise
    let rotated = rotate_about_center(&canvas, -radians, Interpolation::Bilinear, WHITE);
    DynamicImage::ImageRgba8(rotated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

pub fn flip(img: &DynamicImage, direction: FlipDirection) -> DynamicImage {
    match direction {
        FlipDirection::Horizontal => img.fliph(),
        FlipDirection::Vertical => img.flipv(),
    }
}

/// Crop a rectangle; the rectangle is clamped to the image bounds.
pub fn crop(img: &DynamicImage, x: u32, y: u32, width: u32, height: u32) -> DynamicImage {
    let (img_width, img_height) = img.dimensions();
    let x = x.min(img_width.saturating_sub(1));
    let y = y.min(img_height.saturating_sub(1));
    let width = width.clamp(1, img_width - x);
    let height = height.clamp(1, img_height - y);
    img.crop_imm(x, y, width, height)
}

pub fn add_border(img: &DynamicImage, border: u32, color: Rgba<u8>) -> DynamicImage {
    let (width, height) = img.dimensions();
    let mut canvas = RgbaImage::from_pixel(width + 2 * border, height + 2 * border, color);
    imageops::replace(&mut canvas, &img.to_rgba8(), border as i64, border as i64);
    DynamicImage::ImageRgba8(canvas)
}

/// Parse `#rrggbb`, `rrggbb` or `#rgb`. Anything else is black.
pub fn parse_hex_color(value: &str) -> Rgba<u8> {
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return BLACK;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return BLACK,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Rgba([r, g, b, 255]),
        _ => BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])))
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let img = test_image(400, 200);
        assert_eq!(resize(&img, 100, 100, true).dimensions(), (100, 50));
        assert_eq!(resize(&img, 100, 100, false).dimensions(), (100, 100));
    }

    #[test]
    fn test_right_angle_rotation_swaps_dimensions() {
        let img = test_image(40, 20);
        assert_eq!(rotate(&img, 90).dimensions(), (20, 40));
        assert_eq!(rotate(&img, -90).dimensions(), (20, 40));
        assert_eq!(rotate(&img, 360).dimensions(), (40, 20));
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let mut rgba = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        // the right-hand pixel ends up on top
        let rotated = rotate(&DynamicImage::ImageRgba8(rgba), 90).to_rgba8();
        assert_eq!(rotated.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_arbitrary_rotation_expands_canvas_with_white() {
        let img = test_image(100, 50);
        let rotated = rotate(&img, 45).to_rgba8();
        assert!(rotated.width() > 100);
        assert!(rotated.height() > 50);
        assert_eq!(rotated.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn test_crop_is_clamped() {
        let img = test_image(50, 50);
        assert_eq!(crop(&img, 40, 40, 100, 100).dimensions(), (10, 10));
        assert_eq!(crop(&img, 500, 0, 10, 10).dimensions(), (1, 10));
    }

    #[test]
    fn test_border() {
        let img = test_image(10, 10);
        let bordered = add_border(&img, 5, Rgba([255, 0, 0, 255])).to_rgba8();
        assert_eq!(bordered.dimensions(), (20, 20));
        assert_eq!(bordered.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(bordered.get_pixel(10, 10), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("fff"), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("not-a-color"), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_hex_color("12345g"), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_parse_hex_color_non_ascii_falls_back_to_black() {
        // six bytes, five chars: must not slice inside 'é'
        assert_eq!(parse_hex_color("aé123"), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_hex_color("#éé"), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_hex_color("ａｂｃ"), Rgba([0, 0, 0, 255]));
    }
}
