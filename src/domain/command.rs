//! Command parser. Finds `#RecommendGames for <user>` in free-form status text.
//!
//! Normalisation order: capture the rest of the line, trim, lower-case, then reject `me`.
//! Trailing punctuation on the line stays part of the username.

use regex::Regex;

/// Mastodon: the hashtag is what the stream subscribes to, so it is required.
pub const HASHTAG_PATTERN: &str = r"(?im)#Recommend.?Games\s+(for|to)\s+(.+)$";

/// Twitter: also matches `@recommend_games for <user>` mentions.
pub const MENTION_PATTERN: &str = r"(?im)Recommend.?Games\s+(for|to)\s+(.+)$";

#[derive(Debug, Clone)]
pub struct CommandParser {
    regex: Regex,
}

impl CommandParser {
    pub fn hashtag() -> Self {
        Self {
            regex: Regex::new(HASHTAG_PATTERN).expect("hashtag pattern compiles"),
        }
    }

    pub fn mention() -> Self {
        Self {
            regex: Regex::new(MENTION_PATTERN).expect("mention pattern compiles"),
        }
    }

    /// Returns the lower-cased target username of the first command in `text`, if any.
    pub fn parse(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let username = caps.get(2)?.as_str().trim().to_lowercase();
        if username.is_empty() || username == "me" {
            return None;
        }
        Some(username)
    }
}
