//! Text extractors. Implement TextExtractor per platform.

pub mod html;

pub use html::HtmlTextExtractor;

use crate::domain::InboundStatus;
use crate::ports::TextExtractor;

/// Twitter bodies are already plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, status: &InboundStatus) -> String {
        status.body.trim().to_string()
    }
}
