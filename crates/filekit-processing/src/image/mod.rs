//! Image tools.
//!
//! Each tool decodes one upload, applies a single `image`/`imageproc`
//! operation and re-encodes. Output keeps the input's format where that
//! format is writable, except for explicit conversions.

pub mod adjust;
pub mod codec;
pub mod geometry;
pub mod watermark;

use crate::error::{ProcessingError, ProcessingResult};
use crate::job::{ToolJob, ToolOutput, ToolResult};
use crate::registry::ToolHandler;
use async_trait::async_trait;
use codec::OutputFormat;
use filekit_core::Category;
use filekit_storage::TempStore;
use image::{DynamicImage, GenericImageView};

pub const TOOL_IDS: &[&str] = &[
    "image-resize",
    "image-compress",
    "format-converter",
    "convert-jpg",
    "convert-png",
    "convert-webp",
    "image-grayscale",
    "image-invert",
    "image-blur",
    "image-enhance",
    "image-brightness",
    "image-contrast",
    "image-rotate",
    "image-flip",
    "image-crop",
    "image-border",
    "image-filters",
    "image-watermark",
    "bg-remove",
    "image-metadata",
];

const DEFAULT_WATERMARK: &str = "File Tools";

pub struct ImageToolHandler {
    store: TempStore,
}

impl ImageToolHandler {
    pub fn new(store: TempStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolHandler for ImageToolHandler {
    fn category(&self) -> Category {
        Category::Image
    }

    fn tool_ids(&self) -> &'static [&'static str] {
        TOOL_IDS
    }

    async fn run(&self, job: &ToolJob) -> ProcessingResult<ToolResult> {
        let store = self.store.clone();
        let job = job.clone();
        tokio::task::spawn_blocking(move || process(&store, &job)).await?
    }
}

/// What a tool produced before it is written out.
struct Rendered {
    image: DynamicImage,
    format: OutputFormat,
    prefix: &'static str,
    message: String,
}

impl Rendered {
    fn new(image: DynamicImage, format: OutputFormat, prefix: &'static str, message: impl Into<String>) -> Self {
        Self {
            image,
            format,
            prefix,
            message: message.into(),
        }
    }
}

fn process(store: &TempStore, job: &ToolJob) -> ProcessingResult<ToolResult> {
    let input = job.primary();
    let params = &job.params;
    let img = codec::open(&input.path)?;
    let (width, height) = img.dimensions();
    let keep = OutputFormat::preserving(&input.original_name);
    let quality = params.int("quality", 85, 10, 100) as u8;

    let rendered = match job.tool_id() {
        "image-resize" => {
            let w = params.int("width", width as i64, 10, 5000) as u32;
            let h = params.int("height", height as i64, 10, 5000) as u32;
            let out = geometry::resize(&img, w, h, params.flag("maintainAspect"));
            let (ow, oh) = out.dimensions();
            Rendered::new(out, keep, "resized", format!("Image resized to {}x{}", ow, oh))
        }
        "image-compress" => {
            let name = params.choice("format", &["jpeg", "png", "webp"], "jpeg");
            let format = OutputFormat::from_name(name).unwrap_or(OutputFormat::Jpeg);
            Rendered::new(img, format, "compressed", "Image compressed")
        }
        "format-converter" => {
            let name = params.choice("target_format", &["png", "jpg", "jpeg", "webp"], "png");
            let format = OutputFormat::from_name(name).unwrap_or(OutputFormat::Png);
            Rendered::new(img, format, "converted", format!("Converted to {}", format.extension().to_uppercase()))
        }
        "convert-jpg" => Rendered::new(img, OutputFormat::Jpeg, "converted", "Converted to JPG"),
        "convert-png" => Rendered::new(img, OutputFormat::Png, "converted", "Converted to PNG"),
        "convert-webp" => Rendered::new(img, OutputFormat::WebP, "converted", "Converted to WEBP"),
        "image-grayscale" => Rendered::new(img.grayscale(), keep, "grayscale", "Converted to grayscale"),
        "image-invert" => {
            let mut out = img;
            out.invert();
            Rendered::new(out, keep, "inverted", "Colors inverted")
        }
        "image-blur" => {
            let radius = params.float("radius", 2.0, 0.1, 50.0) as f32;
            Rendered::new(adjust::blur(&img, radius), keep, "blurred", format!("Blur applied (radius {})", radius))
        }
        "image-enhance" => {
            let factor = params.float("enhancement_factor", 2.0, 0.1, 5.0) as f32;
            Rendered::new(adjust::enhance_sharpness(&img, factor), keep, "enhanced", "Image sharpened")
        }
        "image-brightness" => {
            let value = params.int("brightness", 20, -255, 255) as i32;
            Rendered::new(img.brighten(value), keep, "brightness", format!("Brightness adjusted by {}", value))
        }
        "image-contrast" => {
            let value = params.float("contrast", 20.0, -100.0, 100.0) as f32;
            Rendered::new(img.adjust_contrast(value), keep, "contrast", format!("Contrast adjusted by {}", value))
        }
        "image-rotate" => {
            let angle = params.int("angle", 90, -360, 360);
            Rendered::new(geometry::rotate(&img, angle), keep, "rotated", format!("Rotated {} degrees", angle))
        }
        "image-flip" => {
            let direction = match params.choice("direction", &["horizontal", "vertical"], "horizontal") {
                "vertical" => geometry::FlipDirection::Vertical,
                _ => geometry::FlipDirection::Horizontal,
            };
            Rendered::new(geometry::flip(&img, direction), keep, "flipped", "Image flipped")
        }
        "image-crop" => {
            let x = params.int("x", 0, 0, width as i64 - 1) as u32;
            let y = params.int("y", 0, 0, height as i64 - 1) as u32;
            let w = params.int("width", (width - x) as i64, 1, width as i64) as u32;
            let h = params.int("height", (height - y) as i64, 1, height as i64) as u32;
            let out = geometry::crop(&img, x, y, w, h);
            let (ow, oh) = out.dimensions();
            Rendered::new(out, keep, "cropped", format!("Cropped to {}x{}", ow, oh))
        }
        "image-border" => {
            let border = params.int("border_width", 10, 1, 500) as u32;
            let color = geometry::parse_hex_color(&params.text("border_color", "#000000"));
            Rendered::new(geometry::add_border(&img, border, color), keep, "bordered", "Border added")
        }
        "image-filters" => {
            let name = params.choice("filter_type", adjust::NamedFilter::NAMES, "blur");
            let filter = adjust::NamedFilter::from_name(name);
            Rendered::new(filter.apply(&img), keep, "filtered", format!("Applied {} filter", name))
        }
        "image-watermark" => {
            let text = params.text("watermark_text", DEFAULT_WATERMARK);
            let position = watermark::WatermarkPosition::from_name(params.choice(
                "position",
                watermark::WatermarkPosition::NAMES,
                "bottom-right",
            ));
            let opacity = params.float("opacity", 0.5, 0.0, 1.0) as f32;
            let out = watermark::stamp_text(&img, &text, position, opacity)?;
            Rendered::new(out, keep, "watermarked", "Watermark added")
        }
        "bg-remove" => Rendered::new(
            adjust::remove_white_background(&img),
            OutputFormat::Png,
            "bg_removed",
            "Background removed",
        ),
        "image-metadata" => return metadata_report(store, job, &img),
        other => return Err(ProcessingError::UnknownTool(other.to_string())),
    };

    let display_name = format!("{}_{}.{}", rendered.prefix, input.stem(), rendered.format.extension());
    let slot = store.allocate_output(&display_name);
    let written = codec::save(&rendered.image, rendered.format, quality, &slot.path)?;

    tracing::debug!(
        tool_id = job.tool_id(),
        output = %slot.stored_name,
        size_bytes = written,
        "Image written"
    );

    let message = if job.tool_id() == "image-compress" {
        format!(
            "Image compressed from {} KB to {} KB",
            input_size_kb(&input.path),
            written / 1024
        )
    } else {
        rendered.message
    };

    Ok(ToolResult::single(ToolOutput::from(slot), message))
}

fn input_size_kb(path: &std::path::Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len() / 1024).unwrap_or(0)
}

fn metadata_report(store: &TempStore, job: &ToolJob, img: &DynamicImage) -> ProcessingResult<ToolResult> {
    let input = job.primary();
    let (width, height) = img.dimensions();
    let format = codec::sniff_format(&input.path)
        .map(|f| format!("{:?}", f).to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let report = serde_json::json!({
        "filename": input.original_name,
        "format": format,
        "width": width,
        "height": height,
        "color_type": format!("{:?}", img.color()),
        "has_alpha": img.color().has_alpha(),
        "file_size": std::fs::metadata(&input.path).map(|m| m.len()).unwrap_or(0),
    });

    let pretty = serde_json::to_string_pretty(&report)
        .map_err(|e| ProcessingError::Failed(e.to_string()))?;
    let slot = store.allocate_output(&format!("{}_metadata.json", input.stem()));
    std::fs::write(&slot.path, &pretty)?;

    Ok(ToolResult::single(
        ToolOutput::from(slot),
        format!("{} image, {}x{}", format, width, height),
    )
    .with_preview(pretty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::InputFile;
    use crate::params::ToolParams;
    use filekit_core::find_tool;
    use image::{ImageFormat, Rgba, RgbaImage};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, TempStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> InputFile {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        InputFile {
            path,
            original_name: name.to_string(),
        }
    }

    fn job(tool_id: &str, inputs: Vec<InputFile>, params: ToolParams) -> ToolJob {
        ToolJob::new(find_tool(tool_id).unwrap(), inputs, params)
    }

    #[tokio::test]
    async fn test_resize_clamps_width() {
        let (dir, store) = setup().await;
        let handler = ImageToolHandler::new(store);
        let input = write_png(&dir, "photo.png", 40, 20);

        let result = handler
            .run(&job(
                "image-resize",
                vec![input],
                ToolParams::from([("width", "999999"), ("height", "20")]),
            ))
            .await
            .unwrap();

        let out = image::open(&result.outputs[0].path).unwrap();
        assert_eq!(out.dimensions(), (5000, 20));
        assert_eq!(result.outputs[0].display_name, "resized_photo.png");
    }

    #[tokio::test]
    async fn test_convert_twice_still_decodes_as_target() {
        let (dir, store) = setup().await;
        let handler = ImageToolHandler::new(store);
        let input = write_png(&dir, "photo.png", 16, 16);

        let first = handler
            .run(&job("convert-webp", vec![input], ToolParams::default()))
            .await
            .unwrap();
        let first_out = &first.outputs[0];
        assert_eq!(codec::sniff_format(&first_out.path), Some(ImageFormat::WebP));

        let again = InputFile {
            path: first_out.path.clone(),
            original_name: first_out.display_name.clone(),
        };
        let second = handler
            .run(&job("convert-webp", vec![again], ToolParams::default()))
            .await
            .unwrap();
        assert_eq!(codec::sniff_format(&second.outputs[0].path), Some(ImageFormat::WebP));
    }

    #[tokio::test]
    async fn test_bg_remove_always_writes_png() {
        let (dir, store) = setup().await;
        let handler = ImageToolHandler::new(store);
        let path = dir.path().join("scan.jpg");
        RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        let input = InputFile {
            path,
            original_name: "scan.jpg".to_string(),
        };

        let result = handler
            .run(&job("bg-remove", vec![input], ToolParams::default()))
            .await
            .unwrap();
        let out = &result.outputs[0];
        assert_eq!(out.display_name, "bg_removed_scan.png");
        assert_eq!(image::open(&out.path).unwrap().to_rgba8().get_pixel(0, 0)[3], 0);
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_invalid_input() {
        let (dir, store) = setup().await;
        let handler = ImageToolHandler::new(store);
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let input = InputFile {
            path,
            original_name: "broken.png".to_string(),
        };

        let err = handler
            .run(&job("image-grayscale", vec![input], ToolParams::default()))
            .await
            .unwrap_err();
        let app = err.into_app_error("image-grayscale");
        assert!(matches!(app, filekit_core::AppError::InvalidFile(_)));
    }

    #[tokio::test]
    async fn test_metadata_report() {
        let (dir, store) = setup().await;
        let handler = ImageToolHandler::new(store);
        let input = write_png(&dir, "photo.png", 12, 7);

        let result = handler
            .run(&job("image-metadata", vec![input], ToolParams::default()))
            .await
            .unwrap();
        let report: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&result.outputs[0].path).unwrap()).unwrap();
        assert_eq!(report["width"], 12);
        assert_eq!(report["height"], 7);
        assert_eq!(report["format"], "PNG");
    }

    #[tokio::test]
    async fn test_unknown_image_tool() {
        let (dir, store) = setup().await;
        let handler = ImageToolHandler::new(store);
        let input = write_png(&dir, "photo.png", 4, 4);
        let job = ToolJob::new(find_tool("pdf-merger").unwrap(), vec![input], ToolParams::default());

        let err = handler.run(&job).await.unwrap_err();
        assert!(matches!(err, ProcessingError::UnknownTool(_)));
    }
}
