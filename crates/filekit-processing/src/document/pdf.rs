//! Structural PDF operations on `lopdf` documents.

use crate::error::{ProcessingError, ProcessingResult};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

/// Page attributes a page may inherit from its `Pages` ancestors.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const STAMP_FONT: &[u8] = b"FkHelv";
const LETTER: (f32, f32) = (612.0, 792.0);
const INFO_KEYS: [&str; 8] = [
    "Title",
    "Author",
    "Subject",
    "Keywords",
    "Creator",
    "Producer",
    "CreationDate",
    "ModDate",
];

pub fn load(path: &Path) -> ProcessingResult<Document> {
    let doc = Document::load(path).map_err(|e| {
        tracing::debug!(error = %e, "PDF failed to parse");
        ProcessingError::InvalidInput("Could not read PDF".to_string())
    })?;
    if doc.is_encrypted() {
        return Err(ProcessingError::InvalidInput(
            "Encrypted PDFs are not supported".to_string(),
        ));
    }
    Ok(doc)
}

pub fn save(doc: &mut Document, path: &Path) -> ProcessingResult<()> {
    doc.save(path)?;
    Ok(())
}

pub fn page_count(doc: &Document) -> u32 {
    doc.get_pages().len() as u32
}

fn type_of(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    match dict.get(b"Type") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        depth += 1;
        if depth > 32 {
            return None;
        }
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

/// Copy inherited attributes onto each page so pages can be moved to a new
/// parent without changing how they render.
pub fn flatten_inherited(doc: &mut Document) -> ProcessingResult<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let missing: Vec<(&[u8], Object)> = {
            let page = doc.get_dictionary(page_id)?;
            INHERITABLE
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| inherited(doc, page, key).map(|value| (*key, value)))
                .collect()
        };

        if !missing.is_empty() {
            let page = doc.get_dictionary_mut(page_id)?;
            for (key, value) in missing {
                page.set(key.to_vec(), value);
            }
        }
    }

    Ok(())
}

/// Concatenate documents in order into a new document.
pub fn merge(docs: Vec<Document>) -> ProcessingResult<Document> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in docs {
        flatten_inherited(&mut doc)?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            pages.push((page_id, doc.get_object(page_id)?.clone()));
        }
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut pages_root: Option<(ObjectId, Dictionary)> = None;

    for (id, object) in objects {
        match type_of(&object) {
            Some(b"Catalog") => {
                if catalog.is_none() {
                    catalog = object.as_dict().ok().map(|d| (id, d.clone()));
                }
            }
            Some(b"Pages") => {
                if pages_root.is_none() {
                    pages_root = object.as_dict().ok().map(|d| (id, d.clone()));
                }
            }
            // pages are re-added below; outlines point at pages of the old trees
            Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                merged.objects.insert(id, object);
            }
        }
    }

    let (catalog_id, mut catalog) =
        catalog.ok_or_else(|| ProcessingError::InvalidInput("PDF has no catalog".to_string()))?;
    let (pages_id, mut pages_dict) =
        pages_root.ok_or_else(|| ProcessingError::InvalidInput("PDF has no page tree".to_string()))?;

    for (page_id, page) in &pages {
        if let Ok(dict) = page.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", Object::Reference(pages_id));
            merged.objects.insert(*page_id, Object::Dictionary(dict));
        }
    }

    pages_dict.remove(b"Parent");
    pages_dict.set("Count", Object::Integer(pages.len() as i64));
    pages_dict.set(
        "Kids",
        Object::Array(pages.iter().map(|(id, _)| Object::Reference(*id)).collect()),
    );
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    catalog.set("Pages", Object::Reference(pages_id));
    catalog.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));

    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged.max_id = merged.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();

    Ok(merged)
}

/// Parse a 1-based `a-b` (or single `a`) page range and clamp its end to
/// `total`.
pub fn parse_page_range(value: &str, total: u32) -> ProcessingResult<RangeInclusive<u32>> {
    let invalid = || ProcessingError::InvalidInput("Invalid page range".to_string());

    let (start, end) = match value.trim().split_once('-') {
        Some((a, b)) => (a.trim().parse::<u32>(), b.trim().parse::<u32>()),
        None => (value.trim().parse::<u32>(), value.trim().parse::<u32>()),
    };
    let (start, end) = (start.map_err(|_| invalid())?, end.map_err(|_| invalid())?);

    if start == 0 || start > end || start > total {
        return Err(invalid());
    }
    Ok(start..=end.min(total))
}

/// A copy of `doc` holding only the pages in `keep`.
pub fn extract_pages(doc: &Document, keep: RangeInclusive<u32>) -> Document {
    let mut part = doc.clone();
    let total = page_count(&part);
    let delete: Vec<u32> = (1..=total).filter(|n| !keep.contains(n)).collect();
    if !delete.is_empty() {
        part.delete_pages(&delete);
    }
    part.prune_objects();
    part.renumber_objects();
    part.compress();
    part
}

/// Split into consecutive chunks of `pages_per_split` pages.
pub fn split_every(doc: &Document, pages_per_split: u32) -> Vec<(RangeInclusive<u32>, Document)> {
    let total = page_count(doc);
    let step = pages_per_split.max(1);

    (1..=total)
        .step_by(step as usize)
        .map(|start| {
            let range = start..=(start + step - 1).min(total);
            let part = extract_pages(doc, range.clone());
            (range, part)
        })
        .collect()
}

/// Drop unreferenced objects and deflate streams. With `strip_metadata`,
/// the Info dictionary and XMP metadata are removed too.
pub fn compress(doc: &mut Document, strip_metadata: bool) {
    if strip_metadata {
        doc.trailer.remove(b"Info");
        if let Ok(root) = doc.trailer.get(b"Root").and_then(|r| r.as_reference()) {
            if let Ok(catalog) = doc.get_dictionary_mut(root) {
                catalog.remove(b"Metadata");
            }
        }
    }
    doc.prune_objects();
    doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();
}

/// Add `angle` degrees (clockwise) to every page's rotation.
pub fn rotate_pages(doc: &mut Document, angle: i64) -> ProcessingResult<()> {
    flatten_inherited(doc)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let page = doc.get_dictionary_mut(page_id)?;
        let current = page.get(b"Rotate").ok().and_then(number).unwrap_or(0.0) as i64;
        page.set("Rotate", Object::Integer((current + angle).rem_euclid(360)));
    }
    Ok(())
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|obj| match obj {
            Object::Reference(id) => doc.get_object(*id).ok(),
            other => Some(other),
        })
        .and_then(|obj| obj.as_array().ok())
        .map(|items| items.iter().filter_map(number).collect::<Vec<f32>>());

    match media_box.as_deref() {
        Some([x0, y0, x1, y1]) => ((x1 - x0).abs(), (y1 - y0).abs()),
        _ => LETTER,
    }
}

/// Register the Helvetica stamp font in a page's resources.
fn add_stamp_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> ProcessingResult<()> {
    let resources = doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
    let resources_id = match resources {
        Some(Object::Reference(id)) => id,
        Some(Object::Dictionary(dict)) => doc.add_object(dict),
        _ => doc.add_object(Dictionary::new()),
    };
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Reference(resources_id));

    let fonts = doc.get_dictionary(resources_id)?.get(b"Font").ok().cloned();
    match fonts {
        Some(Object::Reference(fonts_id)) => {
            doc.get_dictionary_mut(fonts_id)?
                .set(STAMP_FONT.to_vec(), Object::Reference(font_id));
        }
        Some(Object::Dictionary(mut fonts)) => {
            fonts.set(STAMP_FONT.to_vec(), Object::Reference(font_id));
            doc.get_dictionary_mut(resources_id)?
                .set("Font", Object::Dictionary(fonts));
        }
        _ => {
            doc.get_dictionary_mut(resources_id)?.set(
                "Font",
                dictionary! { STAMP_FONT.to_vec() => Object::Reference(font_id) },
            );
        }
    }
    Ok(())
}

/// Wrap the existing content in `q`/`Q` and draw `operations` on top.
fn append_content(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>) -> ProcessingResult<()> {
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));

    let mut stamp = vec![Operation::new("Q", vec![])];
    stamp.extend(operations);
    let stamp_id = doc.add_object(Stream::new(
        Dictionary::new(),
        Content { operations: stamp }.encode()?,
    ));

    let existing = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
    let mut contents = vec![Object::Reference(save_id)];
    match existing {
        Some(Object::Array(items)) => contents.extend(items),
        Some(Object::Reference(id)) => match doc.get_object(id) {
            Ok(Object::Array(items)) => contents.extend(items.clone()),
            _ => contents.push(Object::Reference(id)),
        },
        _ => {}
    }
    contents.push(Object::Reference(stamp_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

fn text_operations(text: &str, size: f32, x: f32, y: f32, gray: f32) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("g", vec![gray.into()]),
        Operation::new("Tf", vec![Object::Name(STAMP_FONT.to_vec()), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Rough Helvetica advance width, good enough to place a stamp.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.6
}

/// Encode for a WinAnsi font; characters outside Latin-1 become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 && !c.is_control() { c as u8 } else { b'?' })
        .collect()
}

pub fn stamp_font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampPosition {
    Center,
    BottomRight,
    TopLeft,
}

impl StampPosition {
    pub const NAMES: &'static [&'static str] = &["center", "bottom-right", "top-left"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "bottom-right" => StampPosition::BottomRight,
            "top-left" => StampPosition::TopLeft,
            _ => StampPosition::Center,
        }
    }
}

pub fn watermark(doc: &mut Document, text: &str, position: StampPosition) -> ProcessingResult<()> {
    flatten_inherited(doc)?;
    let font_id = stamp_font(doc);
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let (width, height) = page_size(doc, page_id);
        let size = match position {
            StampPosition::Center => 48.0,
            _ => 18.0,
        };
        let text_w = text_width(text, size);
        let (x, y) = match position {
            StampPosition::Center => (((width - text_w) / 2.0).max(0.0), height / 2.0),
            StampPosition::BottomRight => ((width - text_w - 36.0).max(0.0), 36.0),
            StampPosition::TopLeft => (36.0, height - 36.0 - size),
        };

        add_stamp_font(doc, page_id, font_id)?;
        append_content(doc, page_id, text_operations(text, size, x, y, 0.6))?;
    }
    Ok(())
}

/// Draw `n / N` centered in each page footer.
pub fn number_pages(doc: &mut Document) -> ProcessingResult<()> {
    flatten_inherited(doc)?;
    let font_id = stamp_font(doc);
    let pages = doc.get_pages();
    let total = pages.len();

    for (number, page_id) in pages {
        let (width, _) = page_size(doc, page_id);
        let label = format!("{} / {}", number, total);
        let x = (width - text_width(&label, 10.0)) / 2.0;

        add_stamp_font(doc, page_id, font_id)?;
        append_content(doc, page_id, text_operations(&label, 10.0, x.max(0.0), 20.0, 0.0))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PdfReport {
    pub pages: u32,
    pub version: String,
    pub encrypted: bool,
    pub page_width: f32,
    pub page_height: f32,
    pub info: BTreeMap<String, String>,
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|b| *b as char).collect()
}

pub fn report(doc: &Document) -> PdfReport {
    let info_dict = doc
        .trailer
        .get(b"Info")
        .and_then(|obj| obj.as_reference())
        .and_then(|id| doc.get_dictionary(id))
        .ok()
        .or_else(|| doc.trailer.get(b"Info").and_then(|obj| obj.as_dict()).ok());

    let mut info = BTreeMap::new();
    if let Some(dict) = info_dict {
        for key in INFO_KEYS {
            if let Ok(Object::String(bytes, _)) = dict.get(key.as_bytes()) {
                info.insert(key.to_string(), decode_pdf_string(bytes));
            }
        }
    }

    let (page_width, page_height) = doc
        .get_pages()
        .values()
        .next()
        .map(|id| page_size(doc, *id))
        .unwrap_or(LETTER);

    PdfReport {
        pages: page_count(doc),
        version: doc.version.clone(),
        encrypted: doc.is_encrypted(),
        page_width,
        page_height,
        info,
    }
}
