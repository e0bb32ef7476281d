//! File naming rules for the temp directory.

use uuid::Uuid;

const MAX_NAME_LEN: usize = 200;
const UUID_LEN: usize = 36;

/// Reduce an uploaded filename to a safe single path component.
///
/// Keeps only the final component, turns whitespace into `_`, drops every
/// character outside `[A-Za-z0-9._-]` and strips leading dots. Returns `"file"`
/// when nothing usable is left.
pub fn sanitize_filename(original: &str) -> String {
    let last = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    let mut name: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() || name.chars().all(|c| c == '_' || c == '-') {
        name = "file".to_string();
    }
    name
}

/// Build a fresh stored name `{uuid}_{sanitized}`.
pub fn stored_name(display_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(display_name))
}

/// Recover the user-facing name from a stored name.
///
/// Names without a uuid prefix are returned unchanged.
pub fn display_name_of(stored: &str) -> &str {
    if stored.len() > UUID_LEN + 1
        && stored.as_bytes()[UUID_LEN] == b'_'
        && Uuid::parse_str(&stored[..UUID_LEN]).is_ok()
    {
        &stored[UUID_LEN + 1..]
    } else {
        stored
    }
}

/// Lowercase extension of a file name, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type served for a stored file, derived from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        Some("m4a") => "audio/mp4",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
