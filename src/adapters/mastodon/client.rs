//! Mastodon REST client. Implements ReplyPoster and opens hashtag streams.
//!
//! Authenticates with a bearer access token. Replies are unlisted, English, and threaded
//! to the triggering status.

use crate::adapters::mastodon::mapper::{
    self, ApiAccount, ApiInstance, ApiMedia, NewStatus,
};
use crate::adapters::mastodon::stream::MastodonHashtagStream;
use crate::adapters::media_mime_type;
use crate::adapters::streaming::byte_stream;
use crate::domain::{DomainError, InboundStatus, MediaAttachment, MediaId};
use crate::ports::ReplyPoster;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Oldest API version with everything the bot needs.
pub const MINIMUM_VERSION: (u32, u32, u32) = (1, 1, 0);

const REPLY_VISIBILITY: &str = "unlisted";
const REPLY_LANGUAGE: &str = "en";

pub struct MastodonClient {
    /// Requests with a timeout.
    client: reqwest::Client,
    /// Long-lived streaming requests; connect timeout only.
    stream_client: reqwest::Client,
    api_base_url: String,
    access_token: String,
    instance: OnceCell<ApiInstance>,
    account: OnceCell<ApiAccount>,
}

impl MastodonClient {
    /// # Arguments
    /// * `api_base_url` - Instance URL, e.g. "https://boardgames.social"
    /// * `access_token` - Token of the bot account (scopes `read write`)
    /// * `timeout` - Timeout for non-streaming requests
    pub fn new(
        api_base_url: &str,
        access_token: String,
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
            access_token,
            instance: OnceCell::new(),
            account: OnceCell::new(),
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
        warn!(status = %status, body = %text, "Mastodon API returned error");
        Err(DomainError::Platform(format!(
            "Mastodon API error {}: {}",
            status,
            text.chars().take(200).collect::<String>()
        )))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Platform(format!("Failed to parse response: {}", e)))
    }

    /// Instance metadata (`GET /api/v1/instance`), fetched once.
    pub async fn instance(&self) -> Result<&ApiInstance, DomainError> {
        self.instance
            .get_or_try_init(|| self.get_json("/api/v1/instance"))
            .await
    }

    /// Fails unless the instance runs at least `minimum`.
    pub async fn verify_minimum_version(
        &self,
        minimum: (u32, u32, u32),
    ) -> Result<(), DomainError> {
        let instance = self.instance().await?;
        let version = mapper::parse_version(&instance.version).ok_or_else(|| {
            DomainError::Platform(format!("unparseable version {:?}", instance.version))
        })?;
        if version < minimum {
            return Err(DomainError::Platform(format!(
                "Mastodon API needs to be at least v{}.{}.{}, server runs {}",
                minimum.0, minimum.1, minimum.2, instance.version
            )));
        }
        info!(version = %instance.version, "Mastodon instance version OK");
        Ok(())
    }

    /// The bot's own account (`GET /api/v1/accounts/verify_credentials`), fetched once.
    pub async fn verify_credentials(&self) -> Result<&ApiAccount, DomainError> {
        self.account
            .get_or_try_init(|| self.get_json("/api/v1/accounts/verify_credentials"))
            .await
    }

    /// Open the public hashtag stream for `tag` (without `#`).
    pub async fn stream_hashtag(&self, tag: &str) -> Result<MastodonHashtagStream, DomainError> {
        let base = match self
            .instance()
            .await
            .ok()
            .and_then(|i| i.urls.as_ref())
            .and_then(|u| u.streaming_api.as_deref())
        {
            Some(streaming) => mapper::streaming_http_base(streaming),
            None => self.api_base_url.clone(),
        };
        let url = format!("{}/api/v1/streaming/hashtag", base);
        info!(url = %url, tag, "opening Mastodon hashtag stream");

        let response = self
            .stream_client
            .get(&url)
            .query(&[("tag", tag)])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| DomainError::Stream(format!("connect failed: {}", e)))?;
        let response = Self::check(response).await?;

        Ok(MastodonHashtagStream::new(byte_stream(response)))
    }
}

#[async_trait::async_trait]
impl ReplyPoster for MastodonClient {
    async fn account_id(&self) -> Result<String, DomainError> {
        Ok(self.verify_credentials().await?.id.clone())
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
        let mut form = Form::new().part("file", part);
        if let Some(description) = &media.description {
            form = form.text("description", description.clone());
        }

        let response = self
            .client
            .post(self.url("/api/v2/media"))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::Media(format!("HTTP request failed: {}", e)))?;
        let uploaded: ApiMedia = Self::check(response)
            .await
            .map_err(|e| DomainError::Media(e.to_string()))?
            .json()
            .await
            .map_err(|e| DomainError::Media(format!("Failed to parse response: {}", e)))?;

        debug!(media_id = %uploaded.id, "media uploaded to Mastodon");
        Ok(MediaId(uploaded.id))
    }

    async fn post_reply(
        &self,
        to: &InboundStatus,
        text: &str,
        media: Option<MediaId>,
    ) -> Result<(), DomainError> {
        let body = NewStatus {
            status: text,
            in_reply_to_id: &to.id,
            media_ids: media.into_iter().map(|m| m.0).collect(),
            visibility: REPLY_VISIBILITY,
            language: REPLY_LANGUAGE,
        };
        let response = self
            .client
            .post(self.url("/api/v1/statuses"))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Platform(format!("HTTP request failed: {}", e)))?;
        Self::check(response).await?;
        Ok(())
    }
}
