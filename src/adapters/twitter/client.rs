//! Twitter API v2 client. Implements ReplyPoster and opens the filtered stream.
//!
//! Two credentials: an app bearer token for stream rules and the stream itself, and a
//! user-context OAuth 2.0 access token for everything posted as the bot.

use crate::adapters::media_mime_type;
use crate::adapters::streaming::byte_stream;
use crate::adapters::twitter::mapper::{
    ApiMedia, ApiUser, DataEnvelope, NewTweet, ReplyTo, RulesResponse, TweetMedia,
};
use crate::adapters::twitter::stream::TwitterFilteredStream;
use crate::domain::{DomainError, InboundStatus, MediaAttachment, MediaId};
use crate::ports::ReplyPoster;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// Stream rule matching every spelling the bot answers to.
pub const TRACK_RULE: &str = r#"RecommendGames OR Recommend_Games OR "Recommend.Games""#;

/// Tag identifying rules installed by this bot.
pub const RULE_TAG: &str = "board-game-bot";

pub struct TwitterClient {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    api_base_url: String,
    bearer_token: String,
    user_token: String,
    me: OnceCell<ApiUser>,
}

impl TwitterClient {
    /// # Arguments
    /// * `api_base_url` - API root, normally "https://api.twitter.com"
    /// * `bearer_token` - App-only bearer token (filtered stream)
    /// * `user_token` - OAuth 2.0 user access token of the bot (`tweet.write media.write users.read`)
    /// * `timeout` - Timeout for non-streaming requests
    pub fn new(
        api_base_url: &str,
        bearer_token: String,
        user_token: String,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            stream_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bearer_token,
            user_token,
            me: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %text, "Twitter API returned error");
        Err(DomainError::Platform(format!(
            "Twitter API error {}: {}",
            status,
            text.chars().take(200).collect::<String>()
        )))
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DomainError> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Platform(format!("Failed to parse response: {}", e)))
    }

    /// The bot's own user (`GET /2/users/me`), fetched once.
    pub async fn me(&self) -> Result<&ApiUser, DomainError> {
        self.me
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(self.url("/2/users/me"))
                    .bearer_auth(&self.user_token)
                    .send()
                    .await
                    .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
                let me: DataEnvelope<ApiUser> = Self::parse(response).await?;
                info!(id = %me.data.id, username = %me.data.username, "authentication OK");
                Ok::<_, DomainError>(me.data)
            })
            .await
    }

    /// Make sure exactly one rule tagged `RULE_TAG` with value `rule` is installed.
    pub async fn ensure_stream_rule(&self, rule: &str) -> Result<(), DomainError> {
        let url = self.url("/2/tweets/search/stream/rules");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
        let current: RulesResponse = Self::parse(response).await?;

        let (ours, stale): (Vec<_>, Vec<_>) = current
            .data
            .into_iter()
            .filter(|r| r.tag.as_deref() == Some(RULE_TAG))
            .partition(|r| r.value == rule);

        if !stale.is_empty() {
            let ids: Vec<String> = stale.into_iter().map(|r| r.id).collect();
            info!(count = ids.len(), "removing stale stream rules");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.bearer_token)
                .json(&serde_json::json!({ "delete": { "ids": ids } }))
                .send()
                .await
                .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
            Self::check(response).await?;
        }

        if ours.is_empty() {
            info!(rule, "installing stream rule");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.bearer_token)
                .json(&serde_json::json!({ "add": [{ "value": rule, "tag": RULE_TAG }] }))
                .send()
                .await
                .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
            Self::check(response).await?;
        } else {
            debug!(rule, "stream rule already installed");
        }
        Ok(())
    }

    /// Connect to the filtered stream (`GET /2/tweets/search/stream`).
    pub async fn filtered_stream(&self) -> Result<TwitterFilteredStream, DomainError> {
        let url = self.url("/2/tweets/search/stream");
        info!(url = %url, "opening Twitter filtered stream");
        let response = self
            .stream_client
            .get(&url)
            .query(&[
                ("tweet.fields", "author_id,note_tweet,referenced_tweets"),
                ("expansions", "author_id,referenced_tweets.id"),
                ("user.fields", "username"),
            ])
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| DomainError::Stream(format!("connect failed: {}", e)))?;
        let response = Self::check(response).await?;
        Ok(TwitterFilteredStream::new(byte_stream(response)))
    }

    async fn set_alt_text(&self, media_id: &str, text: &str) -> Result<(), DomainError> {
        let response = self
            .client
            .post(self.url("/2/media/metadata"))
            .bearer_auth(&self.user_token)
            .json(&serde_json::json!({
                "id": media_id,
                "metadata": { "alt_text": { "text": text } }
            }))
            .send()
            .await
            .map_err(|e| DomainError::Media(format!("HTTP request failed: {}", e)))?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReplyPoster for TwitterClient {
    async fn account_id(&self) -> Result<String, DomainError> {
        Ok(self.me().await?.id.clone())
    }

    async fn upload_media(&self, media: &MediaAttachment) -> Result<MediaId, DomainError> {
        let bytes = tokio::fs::read(&media.path)
            .await
            .map_err(|e| DomainError::Media(format!("read {}: {}", media.path.display(), e)))?;
        let file_name = media
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("cover.jpg")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(media_mime_type(&media.path))
            .map_err(|e| DomainError::Media(e.to_string()))?;
        let form = Form::new()
            .part("media", part)
            .text("media_category", "tweet_image");

        let response = self
            .client
            .post(self.url("/2/media/upload"))
            .bearer_auth(&self.user_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::Media(format!("HTTP request failed: {}", e)))?;
        let uploaded: DataEnvelope<ApiMedia> = Self::parse(response)
            .await
            .map_err(|e| DomainError::Media(e.to_string()))?;
        let id = uploaded.data.id;

        if let Some(description) = &media.description {
            if let Err(e) = self.set_alt_text(&id, description).await {
                warn!(media_id = %id, error = %e, "could not set alt text");
            }
        }

        debug!(media_id = %id, "media uploaded to Twitter");
        Ok(MediaId(id))
    }

    async fn post_reply(
        &self,
        to: &InboundStatus,
        text: &str,
        media: Option<MediaId>,
    ) -> Result<(), DomainError> {
        let body = NewTweet {
            text,
            reply: ReplyTo {
                in_reply_to_tweet_id: &to.id,
            },
            media: media.map(|m| TweetMedia {
                media_ids: vec![m.0],
            }),
        };
        let response = self
            .client
            .post(self.url("/2/tweets"))
            .bearer_auth(&self.user_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
        Self::check(response).await?;
        Ok(())
    }
}
