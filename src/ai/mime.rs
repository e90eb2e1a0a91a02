//! MIME type lookup for files handed to the AI

use std::path::Path;

/// Fallback when the extension is unknown
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME types accepted for inline file generation unless configured otherwise
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/gif",
    "audio/wav",
    "audio/mp3",
    "audio/x-m4a",
    "video/mp4",
    "video/mov",
    "text/plain",
];

/// Derive a MIME type from a file's extension
///
/// Unknown or missing extensions map to [`OCTET_STREAM`].
#[must_use]
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mp3",
        Some("m4a") => "audio/x-m4a",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/mov",
        Some("txt") => "text/plain",
        _ => OCTET_STREAM,
    }
}
