//! HTML to plain text for Mastodon status bodies.
//!
//! Mastodon delivers `content` as a small HTML fragment (`<p>`, `<br>`, links and spans around
//! hashtags and mentions). Paragraphs become blank-line separated, links keep their text.

use crate::domain::InboundStatus;
use crate::ports::TextExtractor;
use regex::{Captures, Regex};

pub struct HtmlTextExtractor {
    line_break: Regex,
    paragraph_end: Regex,
    tag: Regex,
    numeric_entity: Regex,
    blank_lines: Regex,
}

impl HtmlTextExtractor {
    pub fn new() -> Self {
        Self {
            line_break: Regex::new(r"(?i)<br\s*/?>").expect("static regex"),
            paragraph_end: Regex::new(r"(?i)</p>\s*").expect("static regex"),
            tag: Regex::new(r"<[^>]*>").expect("static regex"),
            numeric_entity: Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("static regex"),
            blank_lines: Regex::new(r"\n{3,}").expect("static regex"),
        }
    }

    pub fn to_text(&self, html: &str) -> String {
        let text = self.line_break.replace_all(html, "\n");
        let text = self.paragraph_end.replace_all(&text, "\n\n");
        let text = self.tag.replace_all(&text, "");
        let text = self.decode_entities(&text);

        let text = text
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
        self.blank_lines
            .replace_all(&text, "\n\n")
            .trim()
            .to_string()
    }

    fn decode_entities(&self, text: &str) -> String {
        let text = self.numeric_entity.replace_all(text, |caps: &Captures| {
            let raw = &caps[1];
            let code = match raw.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => raw.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        });
        // &amp; last so "&amp;lt;" stays "&lt;"
        text.replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }
}

impl Default for HtmlTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn extract_text(&self, status: &InboundStatus) -> String {
        self.to_text(&status.body)
    }
}
