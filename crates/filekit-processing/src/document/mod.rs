//! PDF tools.
//!
//! Structure edits go through `lopdf`, text extraction through
//! `pdf-extract`, and rasterizing through the `pdftoppm` binary.

pub mod compose;
pub mod extract;
pub mod pdf;

use crate::error::{ProcessingError, ProcessingResult};
use crate::image::codec;
use crate::job::{ToolJob, ToolOutput, ToolResult};
use crate::registry::ToolHandler;
use async_trait::async_trait;
use filekit_core::Category;
use filekit_storage::TempStore;
use lopdf::Document;
use std::path::Path;

pub const TOOL_IDS: &[&str] = &[
    "pdf-merger",
    "pdf-splitter",
    "pdf-compressor",
    "pdf-to-text",
    "pdf-to-images",
    "pdf-watermark",
    "pdf-rotate",
    "pdf-page-numbers",
    "pdf-metadata",
    "image-to-pdf",
    "text-to-pdf",
];

pub struct PdfToolHandler {
    store: TempStore,
    pdftoppm_path: String,
}

impl PdfToolHandler {
    pub fn new(store: TempStore, pdftoppm_path: String) -> Self {
        Self {
            store,
            pdftoppm_path,
        }
    }

    async fn pdf_to_images(&self, job: &ToolJob) -> ProcessingResult<ToolResult> {
        let input = job.primary();
        let dpi = job.params.int("dpi", 150, 36, 600);

        // scratch dir inside the temp root so renames stay on one filesystem
        let scratch = tempfile::Builder::new()
            .prefix(".pages-")
            .tempdir_in(self.store.root())?;
        let pages = extract::render_pages(&self.pdftoppm_path, &input.path, scratch.path(), dpi).await?;

        let mut outputs = Vec::with_capacity(pages.len());
        for (number, path) in pages {
            let slot = self
                .store
                .allocate_output(&format!("{}_page_{}.png", input.stem(), number));
            tokio::fs::rename(&path, &slot.path).await?;
            outputs.push(ToolOutput::from(slot));
        }

        let message = format!("Rendered {} pages at {} DPI", outputs.len(), dpi);
        Ok(ToolResult::many(outputs, message))
    }
}

#[async_trait]
impl ToolHandler for PdfToolHandler {
    fn category(&self) -> Category {
        Category::Pdf
    }

    fn tool_ids(&self) -> &'static [&'static str] {
        TOOL_IDS
    }

    async fn run(&self, job: &ToolJob) -> ProcessingResult<ToolResult> {
        if job.tool_id() == "pdf-to-images" {
            return self.pdf_to_images(job).await;
        }

        let store = self.store.clone();
        let job = job.clone();
        tokio::task::spawn_blocking(move || process(&store, &job)).await?
    }
}

fn write_pdf(store: &TempStore, doc: &mut Document, display_name: &str) -> ProcessingResult<ToolOutput> {
    let slot = store.allocate_output(display_name);
    pdf::save(doc, &slot.path)?;
    Ok(ToolOutput::from(slot))
}

fn size_kb(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len() / 1024).unwrap_or(0)
}

fn process(store: &TempStore, job: &ToolJob) -> ProcessingResult<ToolResult> {
    let input = job.primary();
    let params = &job.params;
    let stem = input.stem();

    match job.tool_id() {
        "pdf-merger" => {
            let docs = job
                .inputs
                .iter()
                .map(|i| pdf::load(&i.path))
                .collect::<ProcessingResult<Vec<_>>>()?;
            let mut merged = pdf::merge(docs)?;
            let pages = pdf::page_count(&merged);
            let output = write_pdf(store, &mut merged, "merged_document.pdf")?;
            Ok(ToolResult::single(
                output,
                format!("Merged {} PDFs into {} pages", job.inputs.len(), pages),
            ))
        }
        "pdf-splitter" => {
            let doc = pdf::load(&input.path)?;
            let total = pdf::page_count(&doc);
            if total == 0 {
                return Err(ProcessingError::InvalidInput("PDF has no pages".to_string()));
            }

            if params.has("pageRange") {
                let range = pdf::parse_page_range(&params.text("pageRange", ""), total)?;
                let name = format!("{}_pages_{}-{}.pdf", stem, range.start(), range.end());
                let message = format!("Extracted pages {} to {}", range.start(), range.end());
                let mut part = pdf::extract_pages(&doc, range);
                let output = write_pdf(store, &mut part, &name)?;
                return Ok(ToolResult::single(output, message));
            }

            let per_split = params.int("pages_per_split", 1, 1, 500) as u32;
            let mut outputs = Vec::new();
            for (index, (_, mut part)) in pdf::split_every(&doc, per_split).into_iter().enumerate() {
                outputs.push(write_pdf(store, &mut part, &format!("{}_part_{}.pdf", stem, index + 1))?);
            }
            let message = format!("Split {} pages into {} files", total, outputs.len());
            Ok(ToolResult::many(outputs, message))
        }
        "pdf-compressor" => {
            let level = params.float("compression_level", 0.7, 0.1, 1.0);
            let mut doc = pdf::load(&input.path)?;
            pdf::compress(&mut doc, level <= 0.5);
            let output = write_pdf(store, &mut doc, &format!("compressed_{}.pdf", stem))?;
            let message = format!(
                "PDF compressed from {} KB to {} KB",
                size_kb(&input.path),
                size_kb(&output.path)
            );
            Ok(ToolResult::single(output, message))
        }
        "pdf-to-text" => {
            let text = extract::extract_text(&input.path)?;
            let slot = store.allocate_output("extracted_text.txt");
            std::fs::write(&slot.path, &text)?;
            let message = format!("Extracted {} characters", text.chars().count());
            Ok(ToolResult::single(ToolOutput::from(slot), message).with_preview(extract::preview(&text)))
        }
        "pdf-watermark" => {
            let text = params.text("watermark_text", "CONFIDENTIAL");
            let position =
                pdf::StampPosition::from_name(params.choice("position", pdf::StampPosition::NAMES, "center"));
            let mut doc = pdf::load(&input.path)?;
            pdf::watermark(&mut doc, &text, position)?;
            let output = write_pdf(store, &mut doc, &format!("watermarked_{}.pdf", stem))?;
            Ok(ToolResult::single(output, "Watermark added"))
        }
        "pdf-rotate" => {
            let angle: i64 = params
                .choice("angle", &["90", "180", "270"], "90")
                .parse()
                .unwrap_or(90);
            let mut doc = pdf::load(&input.path)?;
            pdf::rotate_pages(&mut doc, angle)?;
            let output = write_pdf(store, &mut doc, &format!("rotated_{}.pdf", stem))?;
            Ok(ToolResult::single(output, format!("Pages rotated {} degrees", angle)))
        }
        "pdf-page-numbers" => {
            let mut doc = pdf::load(&input.path)?;
            pdf::number_pages(&mut doc)?;
            let output = write_pdf(store, &mut doc, &format!("numbered_{}.pdf", stem))?;
            Ok(ToolResult::single(output, "Page numbers added"))
        }
        "pdf-metadata" => {
            let doc = pdf::load(&input.path)?;
            let report = pdf::report(&doc);
            let pretty = serde_json::to_string_pretty(&report)
                .map_err(|e| ProcessingError::Failed(e.to_string()))?;
            let slot = store.allocate_output(&format!("{}_metadata.json", stem));
            std::fs::write(&slot.path, &pretty)?;
            let message = format!("{} pages, PDF {}", report.pages, report.version);
            Ok(ToolResult::single(ToolOutput::from(slot), message).with_preview(pretty))
        }
        "image-to-pdf" => {
            let images = job
                .inputs
                .iter()
                .map(|i| codec::open(&i.path))
                .collect::<ProcessingResult<Vec<_>>>()?;
            let mut doc = compose::images_to_pdf(&images)?;
            let name = if images.len() == 1 {
                format!("{}.pdf", stem)
            } else {
                "images.pdf".to_string()
            };
            let output = write_pdf(store, &mut doc, &name)?;
            Ok(ToolResult::single(output, format!("Converted {} images to PDF", images.len())))
        }
        "text-to-pdf" => {
            let raw = std::fs::read(&input.path)?;
            let text = String::from_utf8_lossy(&raw);
            let mut doc = compose::text_to_pdf(&text)?;
            let pages = pdf::page_count(&doc);
            let output = write_pdf(store, &mut doc, &format!("{}.pdf", stem))?;
            Ok(ToolResult::single(output, format!("Created a {} page PDF", pages)))
        }
        other => Err(ProcessingError::UnknownTool(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::InputFile;
    use crate::params::ToolParams;
    use filekit_core::find_tool;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, PdfToolHandler) {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path()).await.unwrap();
        (dir, PdfToolHandler::new(store, "pdftoppm".to_string()))
    }

    fn write_pdf_fixture(dir: &TempDir, name: &str, label: &str, pages: usize) -> InputFile {
        let path = dir.path().join(name);
        let mut doc = pdf::tests::sample_pdf(label, pages);
        doc.save(&path).unwrap();
        InputFile {
            path,
            original_name: name.to_string(),
        }
    }

    fn job(tool_id: &str, inputs: Vec<InputFile>, params: ToolParams) -> ToolJob {
        ToolJob::new(find_tool(tool_id).unwrap(), inputs, params)
    }

    #[tokio::test]
    async fn test_merger_writes_all_pages_in_order() {
        let (dir, handler) = setup().await;
        let a = write_pdf_fixture(&dir, "a.pdf", "A", 2);
        let b = write_pdf_fixture(&dir, "b.pdf", "B", 3);

        let result = handler
            .run(&job("pdf-merger", vec![a, b], ToolParams::default()))
            .await
            .unwrap();

        let merged = Document::load(&result.outputs[0].path).unwrap();
        assert_eq!(pdf::page_count(&merged), 5);
        assert!(merged.extract_text(&[3]).unwrap().contains("B page 1"));
        assert_eq!(result.outputs[0].display_name, "merged_document.pdf");
    }

    #[tokio::test]
    async fn test_splitter_invalid_range_is_rejected() {
        let (dir, handler) = setup().await;
        let input = write_pdf_fixture(&dir, "doc.pdf", "S", 3);

        let err = handler
            .run(&job("pdf-splitter", vec![input], ToolParams::from([("pageRange", "5-2")])))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(ref m) if m == "Invalid page range"));
    }

    #[tokio::test]
    async fn test_splitter_default_is_one_file_per_page() {
        let (dir, handler) = setup().await;
        let input = write_pdf_fixture(&dir, "doc.pdf", "S", 3);

        let result = handler
            .run(&job("pdf-splitter", vec![input], ToolParams::default()))
            .await
            .unwrap();
        assert_eq!(result.outputs.len(), 3);
        assert_eq!(result.outputs[2].display_name, "doc_part_3.pdf");
    }

    #[tokio::test]
    async fn test_pdf_to_text_preview_is_prefix_of_output() {
        let (dir, handler) = setup().await;
        let input = write_pdf_fixture(&dir, "hello.pdf", "Hello", 1);

        let result = handler
            .run(&job("pdf-to-text", vec![input], ToolParams::default()))
            .await
            .unwrap();

        let full = std::fs::read_to_string(&result.outputs[0].path).unwrap();
        let preview = result.text_preview.unwrap();
        assert!(full.starts_with(preview.trim_end_matches("...")));
        assert!(full.contains("Hello page 1"));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_invalid_input() {
        let (dir, handler) = setup().await;
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        let input = InputFile {
            path,
            original_name: "junk.pdf".to_string(),
        };

        let err = handler
            .run(&job("pdf-rotate", vec![input], ToolParams::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_text_to_pdf() {
        let (dir, handler) = setup().await;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "first line\nsecond line").unwrap();
        let input = InputFile {
            path,
            original_name: "notes.txt".to_string(),
        };

        let result = handler
            .run(&job("text-to-pdf", vec![input], ToolParams::default()))
            .await
            .unwrap();
        let doc = Document::load(&result.outputs[0].path).unwrap();
        assert_eq!(pdf::page_count(&doc), 1);
        assert_eq!(result.outputs[0].display_name, "notes.pdf");
    }

    #[tokio::test]
    async fn test_pdf_to_images_without_binary_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path()).await.unwrap();
        let handler = PdfToolHandler::new(store, "filekit-missing-pdftoppm".to_string());
        let input = write_pdf_fixture(&dir, "doc.pdf", "P", 1);

        let err = handler
            .run(&job("pdf-to-images", vec![input], ToolParams::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::DependencyMissing(ref d) if d == "pdftoppm"));
    }
}
