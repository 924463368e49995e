//! Map Mastodon REST/streaming JSON to domain entities.

use crate::domain::InboundStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAccount {
    pub id: String,
    /// `user` for local accounts, `user@domain` for remote ones.
    pub acct: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    pub id: String,
    /// HTML body.
    #[serde(default)]
    pub content: String,
    pub account: ApiAccount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiInstance {
    pub version: String,
    #[serde(default)]
    pub urls: Option<ApiInstanceUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiInstanceUrls {
    #[serde(default)]
    pub streaming_api: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMedia {
    pub id: String,
}

/// Body of `POST /api/v1/statuses`.
#[derive(Debug, Serialize)]
pub struct NewStatus<'a> {
    pub status: &'a str,
    pub in_reply_to_id: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_ids: Vec<String>,
    pub visibility: &'static str,
    pub language: &'static str,
}

pub fn status_to_domain(status: ApiStatus) -> InboundStatus {
    InboundStatus {
        id: status.id,
        author_id: status.account.id,
        author_handle: status.account.acct,
        body: status.content,
    }
}

/// Leading `major.minor.patch` of a version string such as `4.2.1+glitch`
/// or `2.7.2 (compatible; Pleroma 2.0.0)`. Missing parts count as 0.
pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let head = version
        .trim()
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .next()?;
    let mut parts = head.split('.').map(|p| p.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some((major, minor, patch))
}

/// The websocket URL advertised by the instance as an HTTP(S) base for SSE.
pub fn streaming_http_base(streaming_api: &str) -> String {
    let url = streaming_api.trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        url.to_string()
    }
}
