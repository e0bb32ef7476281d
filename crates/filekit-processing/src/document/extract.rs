//! Getting content out of PDFs: text via `pdf-extract`, page images via
//! poppler's `pdftoppm`.

use crate::command;
use crate::error::{ProcessingError, ProcessingResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub const PREVIEW_CHARS: usize = 500;

pub fn extract_text(path: &Path) -> ProcessingResult<String> {
    match pdf_extract::extract_text(path) {
        Ok(text) => {
            let trimmed = text.trim();
            tracing::debug!(text_len = trimmed.len(), "PDF text extracted");
            Ok(trimmed.to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "PDF text extraction failed");
            Err(ProcessingError::InvalidInput(
                "Could not extract text from PDF".to_string(),
            ))
        }
    }
}

/// First `PREVIEW_CHARS` characters, with `...` appended when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Render every page to `{dir}/page-N.png` and return the files in page order.
pub async fn render_pages(pdftoppm: &str, input: &Path, dir: &Path, dpi: i64) -> ProcessingResult<Vec<(u32, PathBuf)>> {
    let prefix = dir.join("page");
    let dpi = dpi.to_string();
    let args: [&OsStr; 5] = [
        OsStr::new("-png"),
        OsStr::new("-r"),
        OsStr::new(&dpi),
        input.as_os_str(),
        prefix.as_os_str(),
    ];
    command::run("pdftoppm", pdftoppm, args).await?;

    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if let Some(number) = page_number(&name.to_string_lossy()) {
            pages.push((number, entry.path()));
        }
    }
    pages.sort_by_key(|(number, _)| *number);

    if pages.is_empty() {
        return Err(ProcessingError::Failed("pdftoppm produced no pages".to_string()));
    }
    Ok(pages)
}

/// `page-07.png` → 7. pdftoppm zero-pads to the width of the page count.
fn page_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("page-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let long = "a".repeat(600);
        let cut = preview(&long);
        assert_eq!(cut.len(), 503);
        assert!(cut.ends_with("..."));
        assert!(long.starts_with(cut.trim_end_matches("...")));

        assert_eq!(preview("short text"), "short text");
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let text = "é".repeat(500);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn test_page_number() {
        assert_eq!(page_number("page-1.png"), Some(1));
        assert_eq!(page_number("page-012.png"), Some(12));
        assert_eq!(page_number("page-x.png"), None);
        assert_eq!(page_number("other.png"), None);
    }
}
