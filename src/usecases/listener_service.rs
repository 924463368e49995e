//! Listener use case: one status at a time from a platform stream, answered in place.
//!
//! Platform specifics (text extraction, posting, threading) sit behind ports, so the same
//! listener drives both Mastodon and Twitter.

use crate::domain::{DomainError, InboundStatus, MediaAttachment, MediaId};
use crate::ports::{ReplyPoster, StatusSource, TextExtractor};
use crate::usecases::StatusProcessor;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to a single status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Authored by the bot itself.
    OwnStatus,
    /// No command, `me`, or no recommendations.
    NoReply,
    Replied { with_media: bool },
}

pub struct RecommendListener {
    processor: StatusProcessor,
    extractor: Arc<dyn TextExtractor>,
    poster: Arc<dyn ReplyPoster>,
    /// Bot account id, fetched once.
    me_id: String,
    /// Prefix replies with `@handle`.
    add_mention: bool,
}

impl RecommendListener {
    /// Resolves the bot's account id up front; fails if credentials are wrong.
    pub async fn new(
        processor: StatusProcessor,
        extractor: Arc<dyn TextExtractor>,
        poster: Arc<dyn ReplyPoster>,
        add_mention: bool,
    ) -> Result<Self, DomainError> {
        let me_id = poster.account_id().await?;
        info!(me_id = %me_id, "authenticated");
        Ok(Self {
            processor,
            extractor,
            poster,
            me_id,
            add_mention,
        })
    }

    /// Handle one inbound status. Errors come from the recommendation service or the reply post.
    pub async fn handle_status(&self, status: &InboundStatus) -> Result<HandleOutcome, DomainError> {
        let text = self.extractor.extract_text(status);

        info!(
            status_id = %status.id,
            author = %status.author_handle,
            text = %text,
            "processing status"
        );

        if status.author_id == self.me_id {
            debug!(status_id = %status.id, "own status, ignoring");
            return Ok(HandleOutcome::OwnStatus);
        }

        let result = self.processor.process_text(&text).await?;

        let Some(mut reply) = result.reply else {
            return Ok(HandleOutcome::NoReply);
        };

        let media = match result.image_file {
            Some(path) => {
                let attachment = MediaAttachment {
                    path,
                    description: result
                        .items
                        .first()
                        .map(|item| format!("Cover of \"{}\"", item.name)),
                };
                self.upload(&attachment).await
            }
            None => None,
        };
        let with_media = media.is_some();

        if self.add_mention {
            reply = format!("@{}\n\n{}", status.author_handle, reply);
        }

        self.poster.post_reply(status, &reply, media).await?;
        info!(status_id = %status.id, with_media, "reply posted");

        Ok(HandleOutcome::Replied { with_media })
    }

    /// Upload failures are logged; the reply goes out without the cover.
    async fn upload(&self, attachment: &MediaAttachment) -> Option<MediaId> {
        match self.poster.upload_media(attachment).await {
            Ok(id) => {
                debug!(media_id = %id, path = %attachment.path.display(), "media uploaded");
                Some(id)
            }
            Err(e) => {
                error!(path = %attachment.path.display(), error = %e, "unable to upload file");
                None
            }
        }
    }

    /// Consume `source` until it ends. Per-status failures are logged and skipped;
    /// a stream failure is returned.
    pub async fn run(&self, source: &mut dyn StatusSource) -> Result<(), DomainError> {
        info!("listening for statuses");
        while let Some(status) = source.next_status().await? {
            if let Err(e) = self.handle_status(&status).await {
                warn!(status_id = %status.id, error = %e, "failed to answer status");
            }
        }
        info!("status stream ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recommend::StaticRecommendations;
    use crate::adapters::text::PlainTextExtractor;
    use crate::domain::{CommandParser, RecommendationItem, RecommendationQuery, ResponseComposer};
    use crate::ports::RecommendationPort;
    use crate::usecases::ImageResolver;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    const BOT_ID: &str = "42";

    #[derive(Debug, Clone)]
    struct Posted {
        to: String,
        text: String,
        media: Option<MediaId>,
    }

    #[derive(Default)]
    struct FakePoster {
        fail_upload: bool,
        fail_post: bool,
        uploads: Mutex<Vec<MediaAttachment>>,
        posts: Mutex<Vec<Posted>>,
    }

    #[async_trait::async_trait]
    impl ReplyPoster for FakePoster {
        async fn account_id(&self) -> Result<String, DomainError> {
            Ok(BOT_ID.to_string())
        }

        async fn upload_media(&self, media: &MediaAttachment) -> Result<MediaId, DomainError> {
            self.uploads.lock().await.push(media.clone());
            if self.fail_upload {
                return Err(DomainError::Media("413 too large".into()));
            }
            Ok(MediaId("m-1".into()))
        }

        async fn post_reply(
            &self,
            to: &InboundStatus,
            text: &str,
            media: Option<MediaId>,
        ) -> Result<(), DomainError> {
            if self.fail_post {
                return Err(DomainError::Platform("500".into()));
            }
            self.posts.lock().await.push(Posted {
                to: to.id.clone(),
                text: text.to_string(),
                media,
            });
            Ok(())
        }
    }

    struct QueueSource {
        items: VecDeque<Result<InboundStatus, DomainError>>,
    }

    #[async_trait::async_trait]
    impl StatusSource for QueueSource {
        async fn next_status(&mut self) -> Result<Option<InboundStatus>, DomainError> {
            self.items.pop_front().transpose()
        }
    }

    struct FailingRecommender;

    #[async_trait::async_trait]
    impl RecommendationPort for FailingRecommender {
        async fn recommend(
            &self,
            _query: &RecommendationQuery,
        ) -> Result<Vec<RecommendationItem>, DomainError> {
            Err(DomainError::Recommendation("connection refused".into()))
        }
    }

    fn status(id: &str, author_id: &str, body: &str) -> InboundStatus {
        InboundStatus {
            id: id.into(),
            author_id: author_id.into(),
            author_handle: "alice@example.social".into(),
            body: body.into(),
        }
    }

    fn processor(recommender: Arc<dyn RecommendationPort>, images: ImageResolver) -> StatusProcessor {
        StatusProcessor::new(
            CommandParser::hashtag(),
            ResponseComposer::new("https://recommend.games", true),
            images,
            recommender,
        )
    }

    fn catan() -> Arc<dyn RecommendationPort> {
        Arc::new(StaticRecommendations::new(vec![
            RecommendationItem::new("Catan").with_image_url("https://img/catan.jpg"),
        ]))
    }

    async fn listener(
        recommender: Arc<dyn RecommendationPort>,
        images: ImageResolver,
        poster: Arc<FakePoster>,
        add_mention: bool,
    ) -> RecommendListener {
        RecommendListener::new(
            processor(recommender, images),
            Arc::new(PlainTextExtractor),
            poster,
            add_mention,
        )
        .await
        .unwrap()
    }

    fn cache_with_cover() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let name = format!("{}.jpg", ImageResolver::digest("https://img/catan.jpg"));
        std::fs::write(dir.path().join(name), b"jpeg").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_own_status_is_ignored() {
        let poster = Arc::new(FakePoster::default());
        let l = listener(catan(), ImageResolver::disabled(), poster.clone(), true).await;
        let outcome = l
            .handle_status(&status("1", BOT_ID, "#RecommendGames for alice"))
            .await
            .unwrap();
        assert_eq!(outcome, HandleOutcome::OwnStatus);
        assert!(poster.posts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reply_with_mention() {
        let poster = Arc::new(FakePoster::default());
        let l = listener(catan(), ImageResolver::disabled(), poster.clone(), true).await;
        let outcome = l
            .handle_status(&status("7", "99", "#RecommendGames for alice"))
            .await
            .unwrap();
        assert_eq!(outcome, HandleOutcome::Replied { with_media: false });

        let posts = poster.posts.lock().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].to, "7");
        assert!(posts[0]
            .text
            .starts_with("@alice@example.social\n\n🤖 #RecommendGames for ALICE:"));
        assert!(posts[0].media.is_none());
    }

    #[tokio::test]
    async fn test_no_command_no_reply() {
        let poster = Arc::new(FakePoster::default());
        let l = listener(catan(), ImageResolver::disabled(), poster.clone(), false).await;
        let outcome = l
            .handle_status(&status("7", "99", "I love #RecommendGames"))
            .await
            .unwrap();
        assert_eq!(outcome, HandleOutcome::NoReply);
        assert!(poster.posts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reply_with_cover() {
        let dir = cache_with_cover();
        let poster = Arc::new(FakePoster::default());
        let images = ImageResolver::new(Some(dir.path()), Some(".jpg".into()));
        let l = listener(catan(), images, poster.clone(), false).await;

        let outcome = l
            .handle_status(&status("7", "99", "#RecommendGames for alice"))
            .await
            .unwrap();
        assert_eq!(outcome, HandleOutcome::Replied { with_media: true });

        let uploads = poster.uploads.lock().await;
        assert_eq!(uploads[0].description.as_deref(), Some("Cover of \"Catan\""));
        let posts = poster.posts.lock().await;
        assert_eq!(posts[0].media, Some(MediaId("m-1".into())));
        assert!(posts[0].text.starts_with("🤖"));
    }

    #[tokio::test]
    async fn test_upload_failure_still_replies() {
        let dir = cache_with_cover();
        let poster = Arc::new(FakePoster {
            fail_upload: true,
            ..Default::default()
        });
        let images = ImageResolver::new(Some(dir.path()), Some(".jpg".into()));
        let l = listener(catan(), images, poster.clone(), false).await;

        let outcome = l
            .handle_status(&status("7", "99", "#RecommendGames for alice"))
            .await
            .unwrap();
        assert_eq!(outcome, HandleOutcome::Replied { with_media: false });
        assert_eq!(poster.uploads.lock().await.len(), 1);
        assert!(poster.posts.lock().await[0].media.is_none());
    }

    #[tokio::test]
    async fn test_run_survives_failed_status() {
        let poster = Arc::new(FakePoster::default());
        let l = listener(
            Arc::new(FailingRecommender),
            ImageResolver::disabled(),
            poster.clone(),
            false,
        )
        .await;
        let mut source = QueueSource {
            items: VecDeque::from(vec![
                Ok(status("1", "99", "#RecommendGames for alice")),
                Ok(status("2", "99", "#RecommendGames for bob")),
            ]),
        };
        l.run(&mut source).await.unwrap();
        assert!(source.items.is_empty());
        assert!(poster.posts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_survives_failed_post() {
        let poster = Arc::new(FakePoster {
            fail_post: true,
            ..Default::default()
        });
        let l = listener(catan(), ImageResolver::disabled(), poster.clone(), false).await;
        let mut source = QueueSource {
            items: VecDeque::from(vec![
                Ok(status("1", "99", "#RecommendGames for alice")),
                Ok(status("2", "99", "#RecommendGames for bob")),
            ]),
        };
        assert!(l.run(&mut source).await.is_ok());
        assert!(source.items.is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_stream_error() {
        let poster = Arc::new(FakePoster::default());
        let l = listener(catan(), ImageResolver::disabled(), poster.clone(), false).await;
        let mut source = QueueSource {
            items: VecDeque::from(vec![
                Ok(status("1", "99", "#RecommendGames for alice")),
                Err(DomainError::Stream("connection reset".into())),
                Ok(status("3", "99", "#RecommendGames for carol")),
            ]),
        };
        let err = l.run(&mut source).await.unwrap_err();
        assert!(matches!(err, DomainError::Stream(_)));
        assert_eq!(poster.posts.lock().await.len(), 1);
        assert_eq!(source.items.len(), 1);
    }
}
