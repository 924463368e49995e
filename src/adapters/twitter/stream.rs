//! Implements StatusSource over the Twitter v2 filtered stream (newline-delimited JSON).
//!
//! Blank keep-alive lines and error payloads are skipped.

use crate::adapters::streaming::{ByteStream, DecodedStream, LineBuffer};
use crate::adapters::twitter::mapper::{self, StreamEnvelope};
use crate::domain::{DomainError, InboundStatus};
use crate::ports::StatusSource;
use tracing::warn;

pub struct TwitterFilteredStream {
    lines: DecodedStream<String>,
    buffer: LineBuffer,
}

impl TwitterFilteredStream {
    pub fn new(body: ByteStream) -> Self {
        Self {
            lines: DecodedStream::new(body),
            buffer: LineBuffer::new(),
        }
    }

    fn to_status(line: &str) -> Option<InboundStatus> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let envelope: StreamEnvelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "malformed stream line");
                return None;
            }
        };
        if !envelope.errors.is_empty() {
            warn!(errors = ?envelope.errors, "error payload on filtered stream");
        }
        mapper::envelope_to_domain(envelope)
    }
}

#[async_trait::async_trait]
impl StatusSource for TwitterFilteredStream {
    async fn next_status(&mut self) -> Result<Option<InboundStatus>, DomainError> {
        loop {
            let buffer = &mut self.buffer;
            let Some(line) = self.lines.next_with(|chunk| buffer.push(chunk)).await? else {
                return Ok(None);
            };
            if let Some(status) = Self::to_status(&line) {
                return Ok(Some(status));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_keepalives_and_errors_are_skipped() {
        let chunks: Vec<&'static [u8]> = vec![
            b"\r\n\r\n{\"errors\":[{\"title\":\"x\"}]}\r\n{\"data\":{\"id\":\"1\",",
            b"\"text\":\"@recommend_games for Bob\",\"author_id\":\"2\"}}\r\n",
        ];
        let body = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, DomainError>(c.to_vec())),
        )
        .boxed();
        let mut stream = TwitterFilteredStream::new(body);

        let status = stream.next_status().await.unwrap().unwrap();
        assert_eq!(status.id, "1");
        assert_eq!(status.body, "@recommend_games for Bob");
        assert!(stream.next_status().await.unwrap().is_none());
    }
}
