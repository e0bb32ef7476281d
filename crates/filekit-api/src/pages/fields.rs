//! Parameter inputs rendered on each tool page.
//!
//! Names and ranges mirror what the processing handlers read; a value the
//! form lets through is still clamped server side.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Number {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    /// Empty default means the parameter is optional.
    OptionalNumber { min: f64, max: f64, step: f64 },
    Select {
        options: &'static [&'static str],
        default: &'static str,
    },
    Text { default: &'static str },
    Color { default: &'static str },
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn number(name: &'static str, label: &'static str, default: f64, min: f64, max: f64, step: f64) -> FormField {
    FormField {
        name,
        label,
        kind: FieldKind::Number { default, min, max, step },
    }
}

const fn optional(name: &'static str, label: &'static str, min: f64, max: f64) -> FormField {
    FormField {
        name,
        label,
        kind: FieldKind::OptionalNumber { min, max, step: 0.1 },
    }
}

const fn select(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
    default: &'static str,
) -> FormField {
    FormField {
        name,
        label,
        kind: FieldKind::Select { options, default },
    }
}

const fn text(name: &'static str, label: &'static str, default: &'static str) -> FormField {
    FormField {
        name,
        label,
        kind: FieldKind::Text { default },
    }
}

const QUALITY: &[&str] = &["high", "medium", "low"];
const POSITIONS: &[&str] = &["top-left", "top-right", "bottom-left", "bottom-right", "center"];
const FILTERS: &[&str] = &[
    "blur",
    "sharpen",
    "smooth",
    "detail",
    "edge_enhance",
    "emboss",
    "find_edges",
    "contour",
];
const HOURS: f64 = 24.0 * 3600.0;

const TRIM: &[FormField] = &[
    number("start", "Start (seconds)", 0.0, 0.0, HOURS, 0.1),
    optional("end", "End (seconds)", 0.0, HOURS),
];

static TOOL_FIELDS: &[(&str, &[FormField])] = &[
    ("pdf-splitter", &[
        number("pages_per_split", "Pages per file", 1.0, 1.0, 500.0, 1.0),
        text("pageRange", "Page range (e.g. 2-5, overrides pages per file)", ""),
    ]),
    ("pdf-compressor", &[number("compression_level", "Compression level", 0.7, 0.1, 1.0, 0.1)]),
    ("pdf-to-images", &[number("dpi", "Resolution (DPI)", 150.0, 36.0, 600.0, 1.0)]),
    ("pdf-watermark", &[
        text("watermark_text", "Watermark text", "CONFIDENTIAL"),
        select("position", "Position", &["center", "bottom-right", "top-left"], "center"),
    ]),
    ("pdf-rotate", &[select("angle", "Angle", &["90", "180", "270"], "90")]),
    ("image-resize", &[
        number("width", "Width (px)", 800.0, 10.0, 5000.0, 1.0),
        number("height", "Height (px)", 600.0, 10.0, 5000.0, 1.0),
        FormField {
            name: "maintainAspect",
            label: "Keep aspect ratio",
            kind: FieldKind::Checkbox,
        },
    ]),
    ("image-compress", &[
        select("format", "Format", &["jpeg", "png", "webp"], "jpeg"),
        number("quality", "Quality", 85.0, 10.0, 100.0, 1.0),
    ]),
    ("format-converter", &[select("target_format", "Target format", &["png", "jpg", "webp"], "png")]),
    ("image-blur", &[number("radius", "Blur radius", 2.0, 0.1, 50.0, 0.1)]),
    ("image-enhance", &[number("enhancement_factor", "Sharpness", 2.0, 0.1, 5.0, 0.1)]),
    ("image-brightness", &[number("brightness", "Brightness", 20.0, -255.0, 255.0, 1.0)]),
    ("image-contrast", &[number("contrast", "Contrast", 20.0, -100.0, 100.0, 1.0)]),
    ("image-rotate", &[number("angle", "Angle (degrees)", 90.0, -360.0, 360.0, 1.0)]),
    ("image-flip", &[select("direction", "Direction", &["horizontal", "vertical"], "horizontal")]),
    ("image-crop", &[
        number("x", "Left (px)", 0.0, 0.0, 5000.0, 1.0),
        number("y", "Top (px)", 0.0, 0.0, 5000.0, 1.0),
        number("width", "Width (px)", 100.0, 1.0, 5000.0, 1.0),
        number("height", "Height (px)", 100.0, 1.0, 5000.0, 1.0),
    ]),
    ("image-border", &[
        number("border_width", "Border width (px)", 10.0, 1.0, 500.0, 1.0),
        FormField {
            name: "border_color",
            label: "Border color",
            kind: FieldKind::Color { default: "#000000" },
        },
    ]),
    ("image-filters", &[select("filter_type", "Filter", FILTERS, "blur")]),
    ("image-watermark", &[
        text("watermark_text", "Watermark text", "File Tools"),
        select("position", "Position", POSITIONS, "bottom-right"),
        number("opacity", "Opacity", 0.5, 0.0, 1.0, 0.05),
    ]),
    ("video-converter", &[
        select("output_format", "Output format", &["mp4", "avi", "mov", "webm", "gif"], "mp4"),
        select("quality", "Quality", QUALITY, "medium"),
    ]),
    ("video-compress", &[number("scale", "Scale", 0.5, 0.1, 1.0, 0.05)]),
    ("video-trim", TRIM),
    ("audio-trim", TRIM),
    ("gif-creator", &[
        number("fps", "Frames per second", 10.0, 1.0, 30.0, 1.0),
        optional("start", "Start (seconds)", 0.0, 60.0),
        optional("duration", "Duration (seconds)", 0.1, 60.0),
    ]),
    ("audio-converter", &[select("output_format", "Output format", &["mp3", "wav", "ogg", "flac", "aac"], "mp3")]),
    ("audio-speed", &[number("speed_factor", "Speed", 1.0, 0.5, 2.0, 0.05)]),
    ("audio-volume", &[number("volume_db", "Volume change (dB)", 6.0, -30.0, 30.0, 0.5)]),
    ("audio-fade", &[
        number("fade_in", "Fade in (seconds)", 2.0, 0.0, 30.0, 0.1),
        number("fade_out", "Fade out (seconds)", 2.0, 0.0, 30.0, 0.1),
    ]),
];

/// Form inputs for a tool; tools without parameters get an empty slice.
pub fn fields_for(tool_id: &str) -> &'static [FormField] {
    TOOL_FIELDS
        .iter()
        .find(|(id, _)| *id == tool_id)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use filekit_core::catalog::TOOLS;

    #[test]
    fn test_defaults_lie_within_ranges() {
        for tool in TOOLS {
            for field in fields_for(tool.id) {
                match field.kind {
                    FieldKind::Number { default, min, max, .. } => {
                        assert!((min..=max).contains(&default), "{}.{}", tool.id, field.name)
                    }
                    FieldKind::Select { options, default } => {
                        assert!(options.contains(&default), "{}.{}", tool.id, field.name)
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_parameterless_tools() {
        assert!(fields_for("pdf-merger").is_empty());
        assert!(fields_for("unknown").is_empty());
        assert_eq!(fields_for("video-trim"), fields_for("audio-trim"));
    }
}
