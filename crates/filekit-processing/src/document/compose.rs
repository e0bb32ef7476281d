//! Building new PDFs from text or images.

use super::pdf::{stamp_font, win_ansi};
use crate::error::ProcessingResult;
use crate::image::codec;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const A4: (f32, f32) = (595.0, 842.0);
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 11.0;
const LEADING: f32 = 14.0;
const WRAP_COLUMNS: usize = 90;
const FONT_NAME: &str = "F1";
/// Longest side of an image page, in points.
const MAX_IMAGE_PAGE: f32 = 842.0;

/// Break text into display lines no wider than `WRAP_COLUMNS` characters,
/// preferring to break at spaces.
pub fn wrap_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for raw in text.lines() {
        let raw = raw.replace('\t', "    ");
        let mut current = String::new();

        for word in raw.split(' ') {
            let needed = if current.is_empty() { word.chars().count() } else { current.chars().count() + 1 + word.chars().count() };
            if needed > WRAP_COLUMNS && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            let mut word: &str = word;
            while word.chars().count() > WRAP_COLUMNS {
                let split_at = word.char_indices().nth(WRAP_COLUMNS).map(|(i, _)| i).unwrap_or(word.len());
                lines.push(word[..split_at].to_string());
                word = &word[split_at..];
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct PageTree {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PageTree {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn add_page(&mut self, size: (f32, f32), resources: lopdf::Dictionary, operations: Vec<Operation>) -> ProcessingResult<()> {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, Content { operations }.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), size.0.into(), size.1.into()],
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.kids.push(Object::Reference(page_id));
        Ok(())
    }

    fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();
        self.doc
    }
}

/// Lay plain text out on A4 pages in 11pt Helvetica.
pub fn text_to_pdf(text: &str) -> ProcessingResult<Document> {
    let mut tree = PageTree::new();
    let font_id = stamp_font(&mut tree.doc);
    let lines = wrap_lines(text);
    let per_page = ((A4.1 - 2.0 * MARGIN) / LEADING).floor() as usize;

    for chunk in lines.chunks(per_page.max(1)) {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new("Td", vec![MARGIN.into(), (A4.1 - MARGIN).into()]),
        ];
        for line in chunk {
            operations.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(line))]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
        };
        tree.add_page(A4, resources, operations)?;
    }

    Ok(tree.finish())
}

fn jpeg_bytes(img: &DynamicImage) -> ProcessingResult<(Vec<u8>, u32, u32)> {
    let rgb = codec::flatten_on_white(img);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 90).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok((buffer, rgb.width(), rgb.height()))
}

/// One page per image, each page sized to its image.
pub fn images_to_pdf(images: &[DynamicImage]) -> ProcessingResult<Document> {
    let mut tree = PageTree::new();

    for img in images {
        let (data, width, height) = jpeg_bytes(img)?;
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            data,
        )
        .with_compression(false);
        let image_id = tree.doc.add_object(image_stream);

        let scale = (MAX_IMAGE_PAGE / width.max(height) as f32).min(1.0);
        let (page_w, page_h) = (width as f32 * scale, height as f32 * scale);

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![page_w.into(), 0.into(), 0.into(), page_h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ];
        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        };
        tree.add_page((page_w, page_h), resources, operations)?;
    }

    Ok(tree.finish())
}
