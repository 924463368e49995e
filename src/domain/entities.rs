//! Domain entities. Pure data structures for the core business.
//!
//! No Mastodon/Twitter types here; adapters map into these.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Number of recommendations the bot asks for per request.
pub const MAX_RESULTS: usize = 5;

/// One game returned by the recommendation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub name: String,
    /// Candidate cover URLs. The service sends a string, a list or nothing.
    #[serde(default, deserialize_with = "one_or_many")]
    pub image_url: Vec<String>,
}

impl RecommendationItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: Vec::new(),
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url.push(url.into());
        self
    }

    pub fn first_image_url(&self) -> Option<&str> {
        self.image_url.first().map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(url)) => vec![url],
        Some(OneOrMany::Many(urls)) => urls,
    })
}

/// Parameters sent to the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub user: String,
    pub max_results: usize,
    pub exclude_known: bool,
    pub exclude_owned: bool,
    pub exclude_clusters: bool,
}

impl RecommendationQuery {
    /// The bot's fixed policy: five results, never games the user already knows or owns,
    /// and no variants of games already listed.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            max_results: MAX_RESULTS,
            exclude_known: true,
            exclude_owned: true,
            exclude_clusters: true,
        }
    }
}

/// Outcome of processing one status text. Built fresh per call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessResult {
    pub reply: Option<String>,
    pub items: Vec<RecommendationItem>,
    pub image_file: Option<PathBuf>,
}

impl ProcessResult {
    /// Nothing to reply: no command, `me`, or no recommendations.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.reply.is_none() && self.items.is_empty() && self.image_file.is_none()
    }
}

/// A status received from a platform stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundStatus {
    pub id: String,
    pub author_id: String,
    /// Handle used for mentions (`acct` on Mastodon, `username` on Twitter).
    pub author_handle: String,
    /// Raw platform body: HTML on Mastodon, plain text on Twitter.
    pub body: String,
}

/// A local file to attach to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub path: PathBuf,
    pub description: Option<String>,
}

/// Platform-assigned id of an uploaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaId(pub String);

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
