//! Application configuration. Service URLs, platform credentials, image cache.

use crate::adapters::recommend::http_client::{
    DEFAULT_BASE_URL, DEFAULT_RECOMMEND_PATH, DEFAULT_TIMEOUT_SECS,
};
use crate::adapters::twitter::DEFAULT_API_URL as DEFAULT_TWITTER_API_URL;
use crate::usecases::image_resolver::DEFAULT_IMAGE_SUFFIX;
use serde::Deserialize;

/// Environment prefix, e.g. `BOARD_GAME_BOT_MASTODON_API_URL`.
pub const ENV_PREFIX: &str = "BOARD_GAME_BOT";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Recommendation service
    // ─────────────────────────────────────────────────────────────────────────
    /// Recommendation service root. Falls back to RECOMMEND_GAMES_BASE_URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Endpoint path below the base URL (default "/recommend").
    #[serde(default)]
    pub recommend_path: Option<String>,

    /// Timeout in seconds for non-streaming HTTP requests (default 30).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Append the "Full results" link (default true).
    #[serde(default)]
    pub add_link: Option<bool>,

    /// Prefix Mastodon replies with `@acct` (default true).
    #[serde(default)]
    pub add_mention: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Image cache
    // ─────────────────────────────────────────────────────────────────────────
    /// Directory of covers named `<sha1(url)>.<ext>`.
    #[serde(default)]
    pub image_base_path: Option<String>,

    /// Fixed suffix (default ".jpg"). Empty string: accept any extension.
    #[serde(default)]
    pub image_suffix: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Mastodon
    // ─────────────────────────────────────────────────────────────────────────
    /// Instance URL. Falls back to MASTODON_API_URL.
    #[serde(default)]
    pub mastodon_api_url: Option<String>,

    /// Bot access token. Falls back to MASTODON_ACCESS_TOKEN.
    #[serde(default)]
    pub mastodon_access_token: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Twitter
    // ─────────────────────────────────────────────────────────────────────────
    /// API root (default "https://api.twitter.com").
    #[serde(default)]
    pub twitter_api_url: Option<String>,

    /// App bearer token for the filtered stream. Falls back to TWITTER_BEARER_TOKEN.
    #[serde(default)]
    pub twitter_bearer_token: Option<String>,

    /// OAuth 2.0 user access token for posting. Falls back to TWITTER_ACCESS_TOKEN.
    #[serde(default)]
    pub twitter_access_token: Option<String>,
}

impl AppConfig {
    /// Load from `BOARD_GAME_BOT_*` variables and the optional file named by
    /// `BOARD_GAME_BOT_CONFIG`. Expects `.env` to be loaded by the caller.
    pub fn load() -> Result<Self, config::ConfigError> {
        let file = std::env::var(format!("{}_CONFIG", ENV_PREFIX)).ok();
        Self::load_from(file.as_deref())
    }

    /// Environment variables override values from `file`.
    pub fn load_from(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        c = c.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| std::env::var("RECOMMEND_GAMES_BASE_URL").ok())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn recommend_path_or_default(&self) -> String {
        self.recommend_path
            .clone()
            .unwrap_or_else(|| DEFAULT_RECOMMEND_PATH.to_string())
    }

    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn add_link_or_default(&self) -> bool {
        self.add_link.unwrap_or(true)
    }

    pub fn add_mention_or_default(&self) -> bool {
        self.add_mention.unwrap_or(true)
    }

    /// `None` means "any extension".
    pub fn image_suffix_or_default(&self) -> Option<String> {
        match self.image_suffix.as_deref() {
            None => Some(DEFAULT_IMAGE_SUFFIX.to_string()),
            Some("") => None,
            Some(s) => Some(s.to_string()),
        }
    }

    pub fn mastodon_api_url(&self) -> Option<String> {
        self.mastodon_api_url
            .clone()
            .or_else(|| std::env::var("MASTODON_API_URL").ok())
    }

    pub fn mastodon_access_token(&self) -> Option<String> {
        self.mastodon_access_token
            .clone()
            .or_else(|| std::env::var("MASTODON_ACCESS_TOKEN").ok())
    }

    pub fn twitter_api_url_or_default(&self) -> String {
        self.twitter_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_TWITTER_API_URL.to_string())
    }

    pub fn twitter_bearer_token(&self) -> Option<String> {
        self.twitter_bearer_token
            .clone()
            .or_else(|| std::env::var("TWITTER_BEARER_TOKEN").ok())
    }

    pub fn twitter_access_token(&self) -> Option<String> {
        self.twitter_access_token
            .clone()
            .or_else(|| std::env::var("TWITTER_ACCESS_TOKEN").ok())
    }
}
