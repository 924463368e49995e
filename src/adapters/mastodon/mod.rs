//! Mastodon adapter: REST client (replies, media, account) and hashtag streaming.

pub mod client;
pub mod mapper;
pub mod stream;

pub use client::{MINIMUM_VERSION, MastodonClient};
pub use stream::MastodonHashtagStream;

/// Hashtag the bot listens to (without `#`).
pub const HASHTAG: &str = "RecommendGames";
