//! Twitter adapter: API v2 client (replies, media, rules) and the filtered stream.

pub mod client;
pub mod mapper;
pub mod stream;

pub use client::{DEFAULT_API_URL, RULE_TAG, TRACK_RULE, TwitterClient};
pub use stream::TwitterFilteredStream;
