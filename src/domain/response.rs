//! Response composer. Turns recommendations into the reply text.

use crate::domain::RecommendationItem;

/// Longest game name shown in a reply, in characters.
pub const MAX_NAME_CHARS: usize = 40;

const PLACEHOLDER: &str = "…";

/// Shorten `text` to at most `max_chars` characters, cutting at a word boundary when possible.
///
/// Truncated output ends with `…`. A single word longer than the limit is cut hard.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let budget = max_chars.saturating_sub(PLACEHOLDER.chars().count());
    let head: String = chars[..budget].iter().collect();

    // If the char right after the budget is whitespace the last word fits completely.
    let cut = if chars[budget].is_whitespace() {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) if idx > 0 => &head[..idx],
            _ => head.as_str(),
        }
    };

    format!("{}{}", cut.trim_end(), PLACEHOLDER)
}

/// Builds replies of the form header / bullet list / optional results link.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    base_url: String,
    add_link: bool,
}

impl ResponseComposer {
    pub fn new(base_url: impl Into<String>, add_link: bool) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, add_link }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Compose the reply for `username`. `None` when there is nothing to recommend.
    pub fn compose(&self, items: &[RecommendationItem], username: &str) -> Option<String> {
        if items.is_empty() {
            return None;
        }

        let list = items
            .iter()
            .map(|item| format!("- {}", truncate(&item.name, MAX_NAME_CHARS)))
            .collect::<Vec<_>>()
            .join("\n");

        let mut sections = vec![
            format!("🤖 #RecommendGames for {}:", username.to_uppercase()),
            list,
        ];

        if self.add_link {
            sections.push(format!("Full results: {}", self.results_link(username)));
        }

        Some(sections.join("\n\n"))
    }

    /// Link to the full result page, e.g. `https://recommend.games/#/?for=markus+shepherd`.
    ///
    /// Escaping follows the site's own links: `~` stays literal, `*` becomes `%2A`.
    pub fn results_link(&self, username: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("for", username)
            .finish()
            .replace('*', "%2A")
            .replace("%7E", "~");
        format!("{}/#/?{}", self.base_url, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<RecommendationItem> {
        names.iter().map(|n| RecommendationItem::new(*n)).collect()
    }

    #[test]
    fn test_truncate_short_name_untouched() {
        assert_eq!(truncate("Brass: Birmingham", 40), "Brass: Birmingham");
        assert_eq!(truncate("  Catan  ", 40), "Catan");
    }

    #[test]
    fn test_truncate_cuts_at_word_boundary() {
        let out = truncate("Pandemic Legacy: Season 1 with a very long subtitle", 40);
        assert_eq!(out, "Pandemic Legacy: Season 1 with a very…");
        assert!(out.chars().count() <= 40);
    }

    #[test]
    fn test_truncate_single_long_word_is_cut_hard() {
        let out = truncate("Supercalifragilisticexpialidociousgamewithnospaces", 40);
        assert_eq!(out, "Supercalifragilisticexpialidociousgamew…");
        assert_eq!(out.chars().count(), 40);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let name = "Ärger ".repeat(12);
        let out = truncate(&name, 40);
        assert!(out.chars().count() <= 40);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_truncate_never_exceeds_limit() {
        let names = vec![
            "A Feast for Odin: The Norwegians expansion pack".to_string(),
            "Through the Ages: A New Story of Civilization".to_string(),
            "x y z".repeat(20),
        ];
        for name in &names {
            assert!(truncate(name, 40).chars().count() <= 40, "{}", name);
        }
    }

    #[test]
    fn test_compose_full_reply() {
        let composer = ResponseComposer::new("https://recommend.games", true);
        let reply = composer
            .compose(&items(&["Catan", "Carcassonne"]), "markus shepherd")
            .unwrap();
        assert_eq!(
            reply,
            "🤖 #RecommendGames for MARKUS SHEPHERD:\n\n- Catan\n- Carcassonne\n\nFull results: https://recommend.games/#/?for=markus+shepherd"
        );
    }

    #[test]
    fn test_compose_without_link() {
        let composer = ResponseComposer::new("https://recommend.games", false);
        let reply = composer.compose(&items(&["Catan"]), "alice").unwrap();
        assert_eq!(reply, "🤖 #RecommendGames for ALICE:\n\n- Catan");
        assert!(!reply.contains("Full results"));
    }

    #[test]
    fn test_compose_empty_is_none() {
        let composer = ResponseComposer::new("https://recommend.games", true);
        assert!(composer.compose(&[], "alice").is_none());
    }

    #[test]
    fn test_results_link_encodes_query_and_strips_slash() {
        let composer = ResponseComposer::new("https://recommend.games/", true);
        assert_eq!(
            composer.results_link("erin, please!"),
            "https://recommend.games/#/?for=erin%2C+please%21"
        );
    }

    #[test]
    fn test_results_link_tilde_literal_star_escaped() {
        let composer = ResponseComposer::new("https://recommend.games", true);
        assert_eq!(
            composer.results_link("~bob*"),
            "https://recommend.games/#/?for=~bob%2A"
        );
    }
}
