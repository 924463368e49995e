//! Implements StatusSource over the Mastodon streaming API (server-sent events).
//!
//! Only `update` events carry new statuses; deletes, notifications and heartbeats are skipped.

use crate::adapters::mastodon::mapper::{self, ApiStatus};
use crate::adapters::streaming::{ByteStream, DecodedStream, SseDecoder, SseEvent};
use crate::domain::{DomainError, InboundStatus};
use crate::ports::StatusSource;
use tracing::{debug, warn};

pub struct MastodonHashtagStream {
    events: DecodedStream<SseEvent>,
    decoder: SseDecoder,
}

impl MastodonHashtagStream {
    pub fn new(body: ByteStream) -> Self {
        Self {
            events: DecodedStream::new(body),
            decoder: SseDecoder::new(),
        }
    }

    fn to_status(event: &SseEvent) -> Option<InboundStatus> {
        if event.event != "update" {
            debug!(event = %event.event, "skipping stream event");
            return None;
        }
        match serde_json::from_str::<ApiStatus>(&event.data) {
            Ok(status) => Some(mapper::status_to_domain(status)),
            Err(e) => {
                warn!(error = %e, "malformed status in update event");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl StatusSource for MastodonHashtagStream {
    async fn next_status(&mut self) -> Result<Option<InboundStatus>, DomainError> {
        loop {
            let decoder = &mut self.decoder;
            let Some(event) = self.events.next_with(|chunk| decoder.push(chunk)).await? else {
                return Ok(None);
            };
            if let Some(status) = Self::to_status(&event) {
                return Ok(Some(status));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn stream_of(chunks: Vec<&'static [u8]>) -> MastodonHashtagStream {
        let body = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, DomainError>(c.to_vec())),
        )
        .boxed();
        MastodonHashtagStream::new(body)
    }

    #[tokio::test]
    async fn test_update_events_become_statuses() {
        let mut stream = stream_of(vec![
            b":thump\n\nevent: delete\ndata: 109\n\nevent: update\ndata: {\"id\":\"110\",",
            b"\"content\":\"<p>#RecommendGames for Alice</p>\",\"account\":{\"id\":\"7\",\"acct\":\"alice\"}}\n\n",
            b"event: update\ndata: not json\n\n",
        ]);

        let status = stream.next_status().await.unwrap().unwrap();
        assert_eq!(status.id, "110");
        assert_eq!(status.author_handle, "alice");
        assert!(stream.next_status().await.unwrap().is_none());
    }
}
