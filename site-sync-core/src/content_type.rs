//! Extension-based content type lookup.
//!
//! Types come from the extension table only; file contents are never
//! sniffed, so the same name always maps to the same type.

use std::path::Path;

/// Returned for unknown or missing extensions.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Resolve the MIME type for an extension (without the leading dot). Case-insensitive.
pub fn content_type_for_extension(extension: &str) -> String {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    if extension.is_empty() {
        return FALLBACK_CONTENT_TYPE.to_string();
    }
    mime_guess::from_ext(&extension)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// Resolve the MIME type for a path or object name from the text after its last `.`.
pub fn content_type_for_path(path: impl AsRef<Path>) -> String {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) => content_type_for_extension(ext),
        None => FALLBACK_CONTENT_TYPE.to_string(),
    }
}
