//! Map Twitter API v2 JSON to domain entities.
//!
//! Full text: the retweeted original if this is a retweet, long-form `note_tweet` text when
//! present, the plain `text` otherwise.

use crate::domain::InboundStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub note_tweet: Option<ApiNoteTweet>,
    #[serde(default)]
    pub referenced_tweets: Vec<ApiReferencedTweet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiNoteTweet {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiIncludes {
    #[serde(default)]
    pub users: Vec<ApiUser>,
    #[serde(default)]
    pub tweets: Vec<ApiTweet>,
}

/// One line of the filtered stream.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEnvelope {
    #[serde(default)]
    pub data: Option<ApiTweet>,
    #[serde(default)]
    pub includes: ApiIncludes,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// `{"data": ...}` wrapper of most v2 responses.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMedia {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiRule {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesResponse {
    #[serde(default)]
    pub data: Vec<ApiRule>,
}

/// Body of `POST /2/tweets`.
#[derive(Debug, Serialize)]
pub struct NewTweet<'a> {
    pub text: &'a str,
    pub reply: ReplyTo<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<TweetMedia>,
}

#[derive(Debug, Serialize)]
pub struct ReplyTo<'a> {
    pub in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TweetMedia {
    pub media_ids: Vec<String>,
}

fn own_text(tweet: &ApiTweet) -> &str {
    tweet
        .note_tweet
        .as_ref()
        .map(|n| n.text.as_str())
        .unwrap_or(&tweet.text)
}

/// Full text of `tweet`, looking through to the original for retweets.
pub fn full_text<'a>(tweet: &'a ApiTweet, includes: &'a ApiIncludes) -> &'a str {
    let retweeted = tweet
        .referenced_tweets
        .iter()
        .find(|r| r.kind == "retweeted")
        .and_then(|r| includes.tweets.iter().find(|t| t.id == r.id));
    match retweeted {
        Some(original) => own_text(original),
        None => own_text(tweet),
    }
}

pub fn envelope_to_domain(envelope: StreamEnvelope) -> Option<InboundStatus> {
    let tweet = envelope.data.as_ref()?;
    let author_id = tweet.author_id.clone().unwrap_or_default();
    let author_handle = envelope
        .includes
        .users
        .iter()
        .find(|u| u.id == author_id)
        .map(|u| u.username.clone())
        .unwrap_or_default();
    Some(InboundStatus {
        id: tweet.id.clone(),
        author_id,
        author_handle,
        body: full_text(tweet, &envelope.includes).to_string(),
    })
}
