//! Infrastructure adapters. Implement ports.
//!
//! Recommendation service, Mastodon, Twitter, text extraction. Map errors to DomainError.

pub mod mastodon;
pub mod recommend;
pub mod streaming;
pub mod text;
pub mod twitter;

use std::path::Path;

/// MIME type for an image upload, from the file extension.
pub fn media_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
