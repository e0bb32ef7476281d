//! Static tool catalog.
//!
//! Every tool the service can run is described here once. The catalog is
//! process-wide constant data; dispatch, page rendering and intake
//! validation all read from it.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pdf,
    Image,
    Video,
    Audio,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Pdf,
        Category::Image,
        Category::Video,
        Category::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pdf => "pdf",
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Pdf => "PDF Tools",
            Category::Image => "Image Tools",
            Category::Video => "Video Tools",
            Category::Audio => "Audio Tools",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Pdf => "fas fa-file-pdf",
            Category::Image => "fas fa-image",
            Category::Video => "fas fa-video",
            Category::Audio => "fas fa-music",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Pdf => "red",
            Category::Image => "blue",
            Category::Video => "purple",
            Category::Audio => "green",
        }
    }

    pub fn tools(self) -> impl Iterator<Item = &'static ToolDescriptor> {
        TOOLS.iter().filter(move |t| t.category == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Category::Pdf),
            "image" => Ok(Category::Image),
            "video" => Ok(Category::Video),
            "audio" => Ok(Category::Audio),
            _ => Err(()),
        }
    }
}

/// How many uploaded files a tool consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputArity {
    Single,
    Multiple { min: usize },
}

impl InputArity {
    pub fn min_files(self) -> usize {
        match self {
            InputArity::Single => 1,
            InputArity::Multiple { min } => min,
        }
    }

    pub fn allows_many(self) -> bool {
        matches!(self, InputArity::Multiple { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: Category,
    /// Lowercase file extensions accepted as input
    pub accepts: &'static [&'static str],
    pub arity: InputArity,
}

impl ToolDescriptor {
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.accepts.iter().any(|a| *a == ext)
    }
}

pub const PDF_INPUT: &[&str] = &["pdf"];
pub const IMAGE_INPUT: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif"];
pub const VIDEO_INPUT: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv"];
pub const AUDIO_INPUT: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma"];
pub const TEXT_INPUT: &[&str] = &["txt", "md", "csv", "log"];

const fn tool(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: Category,
    accepts: &'static [&'static str],
    arity: InputArity,
) -> ToolDescriptor {
    ToolDescriptor {
        id,
        name,
        description,
        icon,
        category,
        accepts,
        arity,
    }
}

use Category::{Audio, Image, Pdf, Video};
use InputArity::{Multiple, Single};

pub static TOOLS: &[ToolDescriptor] = &[
    // PDF
    tool("pdf-merger", "PDF Merger", "Merge multiple PDF files", "fas fa-plus", Pdf, PDF_INPUT, Multiple { min: 2 }),
    tool("pdf-splitter", "PDF Splitter", "Split PDF by pages", "fas fa-cut", Pdf, PDF_INPUT, Single),
    tool("pdf-compressor", "PDF Compressor", "Reduce PDF file size", "fas fa-compress", Pdf, PDF_INPUT, Single),
    tool("pdf-to-text", "PDF to Text", "Extract text from PDF", "fas fa-file-alt", Pdf, PDF_INPUT, Single),
    tool("pdf-to-images", "PDF to Images", "Render each page as PNG", "fas fa-image", Pdf, PDF_INPUT, Single),
    tool("pdf-watermark", "Add Watermark", "Add a text watermark to PDF", "fas fa-stamp", Pdf, PDF_INPUT, Single),
    tool("pdf-rotate", "PDF Rotate", "Rotate PDF pages", "fas fa-redo", Pdf, PDF_INPUT, Single),
    tool("pdf-page-numbers", "Add Page Numbers", "Number PDF pages", "fas fa-sort-numeric-up", Pdf, PDF_INPUT, Single),
    tool("pdf-metadata", "PDF Metadata", "View PDF metadata", "fas fa-info", Pdf, PDF_INPUT, Single),
    tool("image-to-pdf", "Image to PDF", "Convert images to PDF", "fas fa-images", Pdf, IMAGE_INPUT, Multiple { min: 1 }),
    tool("text-to-pdf", "Text to PDF", "Convert text to PDF", "fas fa-file-pdf", Pdf, TEXT_INPUT, Single),
    // Image
    tool("image-resize", "Image Resizer", "Resize images", "fas fa-expand-arrows-alt", Image, IMAGE_INPUT, Single),
    tool("image-compress", "Image Compressor", "Compress images", "fas fa-compress", Image, IMAGE_INPUT, Single),
    tool("format-converter", "Format Converter", "Convert between image formats", "fas fa-exchange-alt", Image, IMAGE_INPUT, Single),
    tool("convert-jpg", "Convert to JPG", "Convert to JPG format", "fas fa-exchange-alt", Image, IMAGE_INPUT, Single),
    tool("convert-png", "Convert to PNG", "Convert to PNG format", "fas fa-exchange-alt", Image, IMAGE_INPUT, Single),
    tool("convert-webp", "Convert to WebP", "Convert to WebP format", "fas fa-exchange-alt", Image, IMAGE_INPUT, Single),
    tool("image-grayscale", "Grayscale Filter", "Convert to black & white", "fas fa-adjust", Image, IMAGE_INPUT, Single),
    tool("image-invert", "Image Inverter", "Invert colors", "fas fa-adjust", Image, IMAGE_INPUT, Single),
    tool("image-blur", "Blur Image", "Add blur effect", "fas fa-eye-slash", Image, IMAGE_INPUT, Single),
    tool("image-enhance", "Image Enhancer", "Sharpen image details", "fas fa-magic", Image, IMAGE_INPUT, Single),
    tool("image-brightness", "Brightness", "Adjust image brightness", "fas fa-sun", Image, IMAGE_INPUT, Single),
    tool("image-contrast", "Contrast", "Adjust image contrast", "fas fa-circle-half-stroke", Image, IMAGE_INPUT, Single),
    tool("image-rotate", "Image Rotator", "Rotate images", "fas fa-redo", Image, IMAGE_INPUT, Single),
    tool("image-flip", "Image Flip", "Flip images", "fas fa-arrows-alt-h", Image, IMAGE_INPUT, Single),
    tool("image-crop", "Image Cropper", "Crop images", "fas fa-crop", Image, IMAGE_INPUT, Single),
    tool("image-border", "Add Border", "Add border to image", "fas fa-square", Image, IMAGE_INPUT, Single),
    tool("image-filters", "Image Filters", "Apply artistic filters", "fas fa-sliders-h", Image, IMAGE_INPUT, Single),
    tool("image-watermark", "Add Watermark", "Add a text watermark to an image", "fas fa-stamp", Image, IMAGE_INPUT, Single),
    tool("bg-remove", "Background Remover", "Make a white background transparent", "fas fa-magic", Image, IMAGE_INPUT, Single),
    tool("image-metadata", "Image Metadata", "View image properties", "fas fa-info", Image, IMAGE_INPUT, Single),
    // Video
    tool("audio-extractor", "Audio Extractor", "Extract MP3 audio from video", "fas fa-music", Video, VIDEO_INPUT, Single),
    tool("video-converter", "Video Converter", "Convert video formats", "fas fa-exchange-alt", Video, VIDEO_INPUT, Single),
    tool("video-compress", "Video Compressor", "Reduce video size", "fas fa-compress", Video, VIDEO_INPUT, Single),
    tool("video-trim", "Video Cutter", "Trim video files", "fas fa-cut", Video, VIDEO_INPUT, Single),
    tool("video-mute", "Mute Video", "Remove audio from video", "fas fa-volume-mute", Video, VIDEO_INPUT, Single),
    tool("gif-creator", "GIF Creator", "Turn a video clip into a GIF", "fas fa-film", Video, VIDEO_INPUT, Single),
    // Audio
    tool("audio-converter", "Audio Converter", "Convert audio formats", "fas fa-exchange-alt", Audio, AUDIO_INPUT, Single),
    tool("audio-speed", "Audio Speed", "Speed up or slow down audio", "fas fa-tachometer-alt", Audio, AUDIO_INPUT, Single),
    tool("audio-volume", "Volume Booster", "Change audio volume", "fas fa-volume-up", Audio, AUDIO_INPUT, Single),
    tool("audio-trim", "Audio Cutter", "Trim audio files", "fas fa-cut", Audio, AUDIO_INPUT, Single),
    tool("audio-normalize", "Audio Normalizer", "Normalize audio levels", "fas fa-sliders-h", Audio, AUDIO_INPUT, Single),
    tool("audio-fade", "Audio Fade", "Fade audio in and out", "fas fa-wave-square", Audio, AUDIO_INPUT, Single),
    tool("audio-merger", "Audio Joiner", "Merge audio files", "fas fa-plus", Audio, AUDIO_INPUT, Multiple { min: 2 }),
];

/// Look up a tool by identifier.
pub fn find_tool(tool_id: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|t| t.id == tool_id)
}

pub fn tool_count() -> usize {
    TOOLS.len()
}
