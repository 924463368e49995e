//! Incremental decoders for long-lived HTTP streams.
//!
//! Network chunks arrive at arbitrary boundaries; `LineBuffer` turns them into complete
//! lines and `SseDecoder` assembles server-sent events from those lines.

use crate::domain::DomainError;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::VecDeque;

/// Body of a streaming response as owned chunks.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, DomainError>>;

/// Wrap a reqwest streaming body. Transport errors become `DomainError::Stream`.
pub fn byte_stream(response: reqwest::Response) -> ByteStream {
    response
        .bytes_stream()
        .map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| DomainError::Stream(e.to_string()))
        })
        .boxed()
}

/// Splits a byte stream into lines. Accepts `\n` and `\r\n` terminators.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns every line completed by it, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Bytes received after the last complete line.
    pub fn remainder(&self) -> &[u8] {
        &self.pending
    }
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `message` when the server sent no `event:` field.
    pub event: String,
    pub data: String,
}

/// Server-sent events decoder (fields `event` and `data`; comments and other fields ignored).
#[derive(Debug, Default)]
pub struct SseDecoder {
    lines: LineBuffer,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        for line in self.lines.push(chunk) {
            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                // heartbeat / comment
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line.as_str(), ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
        events
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// Pulls chunks from a `ByteStream` through a decoder and hands out decoded items in order.
pub struct DecodedStream<T> {
    body: ByteStream,
    ready: VecDeque<T>,
}

impl<T> DecodedStream<T> {
    pub fn new(body: ByteStream) -> Self {
        Self {
            body,
            ready: VecDeque::new(),
        }
    }

    /// Next decoded item. `decode` is called for every chunk and may yield zero or more items.
    /// `Ok(None)` once the body has ended.
    pub async fn next_with<F>(&mut self, mut decode: F) -> Result<Option<T>, DomainError>
    where
        F: FnMut(&[u8]) -> Vec<T>,
    {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Ok(Some(item));
            }
            match self.body.next().await {
                Some(chunk) => self.ready.extend(decode(&chunk?)),
                None => return Ok(None),
            }
        }
    }
}
