//! Color adjustments and convolution filters.

use image::{DynamicImage, Rgba, RgbaImage};

/// Threshold above which a channel counts as "white" for background removal.
const WHITE_THRESHOLD: u8 = 240;

/// A 3x3 kernel applied as `sum(k * p) / divisor + offset`.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub weights: [f32; 9],
    pub divisor: f32,
    pub offset: f32,
}

impl Kernel {
    const fn new(weights: [f32; 9], divisor: f32, offset: f32) -> Self {
        Self {
            weights,
            divisor,
            offset,
        }
    }

    pub const SMOOTH: Kernel = Kernel::new([1., 1., 1., 1., 5., 1., 1., 1., 1.], 13., 0.);
    pub const SHARPEN: Kernel = Kernel::new([-2., -2., -2., -2., 32., -2., -2., -2., -2.], 16., 0.);
    pub const DETAIL: Kernel = Kernel::new([0., -1., 0., -1., 10., -1., 0., -1., 0.], 6., 0.);
    pub const EDGE_ENHANCE: Kernel =
        Kernel::new([-1., -1., -1., -1., 10., -1., -1., -1., -1.], 2., 0.);
    pub const EMBOSS: Kernel = Kernel::new([-1., 0., 0., 0., 1., 0., 0., 0., 0.], 1., 128.);
    pub const FIND_EDGES: Kernel = Kernel::new([-1., -1., -1., -1., 8., -1., -1., -1., -1.], 1., 0.);
    pub const CONTOUR: Kernel = Kernel::new([-1., -1., -1., -1., 8., -1., -1., -1., -1.], 1., 255.);
}

/// Named artistic filters offered by `image-filters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedFilter {
    Blur,
    Sharpen,
    Smooth,
    Detail,
    EdgeEnhance,
    Emboss,
    FindEdges,
    Contour,
}

impl NamedFilter {
    pub const NAMES: &'static [&'static str] = &[
        "blur",
        "sharpen",
        "smooth",
        "detail",
        "edge_enhance",
        "emboss",
        "find_edges",
        "contour",
    ];

    /// Unknown names fall back to blur.
    pub fn from_name(name: &str) -> Self {
        match name {
            "sharpen" => NamedFilter::Sharpen,
            "smooth" => NamedFilter::Smooth,
            "detail" => NamedFilter::Detail,
            "edge_enhance" => NamedFilter::EdgeEnhance,
            "emboss" => NamedFilter::Emboss,
            "find_edges" => NamedFilter::FindEdges,
            "contour" => NamedFilter::Contour,
            _ => NamedFilter::Blur,
        }
    }

    pub fn apply(self, img: &DynamicImage) -> DynamicImage {
        match self {
            NamedFilter::Blur => blur(img, 2.0),
            NamedFilter::Sharpen => convolve(img, Kernel::SHARPEN),
            NamedFilter::Smooth => convolve(img, Kernel::SMOOTH),
            NamedFilter::Detail => convolve(img, Kernel::DETAIL),
            NamedFilter::EdgeEnhance => convolve(img, Kernel::EDGE_ENHANCE),
            NamedFilter::Emboss => convolve(img, Kernel::EMBOSS),
            NamedFilter::FindEdges => convolve(img, Kernel::FIND_EDGES),
            NamedFilter::Contour => convolve(img, Kernel::CONTOUR),
        }
    }
}

/// Convolve the color channels with edge clamping; alpha is left as is.
pub fn convolve(img: &DynamicImage, kernel: Kernel) -> DynamicImage {
    let src = img.to_rgba8();
    let (width, height) = src.dimensions();
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    let out = RgbaImage::from_fn(width, height, |x, y| {
        let mut acc = [0f32; 3];
        for (i, weight) in kernel.weights.iter().enumerate() {
            if *weight == 0.0 {
                continue;
            }
            let sx = (x as i64 + (i % 3) as i64 - 1).clamp(0, max_x) as u32;
            let sy = (y as i64 + (i / 3) as i64 - 1).clamp(0, max_y) as u32;
            let p = src.get_pixel(sx, sy);
            for c in 0..3 {
                acc[c] += weight * p[c] as f32;
            }
        }
        let alpha = src.get_pixel(x, y)[3];
        let channel = |v: f32| (v / kernel.divisor + kernel.offset).round().clamp(0.0, 255.0) as u8;
        Rgba([channel(acc[0]), channel(acc[1]), channel(acc[2]), alpha])
    });

    DynamicImage::ImageRgba8(out)
}

/// Gaussian blur with standard deviation `radius`.
pub fn blur(img: &DynamicImage, radius: f32) -> DynamicImage {
    let rgba = img.to_rgba8();
    DynamicImage::ImageRgba8(imageproc::filter::gaussian_blur_f32(&rgba, radius.max(0.1)))
}

/// Sharpness enhancement: `factor` 1.0 is the original, 0.0 the smoothed
/// image, above 1.0 extrapolates away from the smoothed image.
pub fn enhance_sharpness(img: &DynamicImage, factor: f32) -> DynamicImage {
    let original = img.to_rgba8();
    let smoothed = convolve(img, Kernel::SMOOTH).to_rgba8();

    let out = RgbaImage::from_fn(original.width(), original.height(), |x, y| {
        let o = original.get_pixel(x, y);
        let s = smoothed.get_pixel(x, y);
        let mix = |c: usize| {
            (s[c] as f32 + factor * (o[c] as f32 - s[c] as f32))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgba([mix(0), mix(1), mix(2), o[3]])
    });

    DynamicImage::ImageRgba8(out)
}

/// Make near-white pixels fully transparent.
pub fn remove_white_background(img: &DynamicImage) -> DynamicImage {
    let mut rgba = img.to_rgba8();
    for pixel in rgba.pixels_mut() {
        if pixel[0] > WHITE_THRESHOLD && pixel[1] > WHITE_THRESHOLD && pixel[2] > WHITE_THRESHOLD {
            pixel[3] = 0;
        }
    }
    DynamicImage::ImageRgba8(rgba)
}
