//! Extension to MIME type lookup

/// Content type served when the extension is unknown
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Look up the content type for a filename by its extension.
///
/// The match is case-insensitive. Unknown or missing extensions yield
/// [`DEFAULT_MIME`].
pub fn mime_for(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return DEFAULT_MIME,
    };

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        _ => DEFAULT_MIME,
    }
}
