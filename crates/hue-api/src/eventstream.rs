//! Server-sent event stream from the bridge.
//!
//! `GET /eventstream/clip/v2` stays open indefinitely and delivers one SSE
//! event per change set. Each event's `data` is a JSON array of
//! [`StreamBatch`](crate::model::StreamBatch) values. This module only does
//! the framing: it turns the raw byte stream into [`EventFrame`]s and leaves
//! JSON decoding to the consumer, so a malformed payload never ends the
//! stream.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures_util::StreamExt;
//!
//! let mut frames = client.event_stream().await?;
//! while let Some(frame) = frames.next().await {
//!     let frame = frame?;
//!     match hue_api::model::decode_frame(&frame.data) {
//!         Ok(batches) => println!("{} batches", batches.len()),
//!         Err(e) => eprintln!("skipping frame: {e}"),
//!     }
//! }
//! ```

use std::fmt::Display;
use std::pin::Pin;

use futures_core::Stream;
use futures_util::StreamExt;
use tracing::{debug, trace};

use crate::client::{BridgeClient, EVENT_STREAM_PATH, check_status};
use crate::error::Error;

/// Boxed stream of decoded SSE frames.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventFrame, Error>> + Send>>;

// ── EventFrame ───────────────────────────────────────────────────────

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFrame {
    /// Last `id:` field seen on the stream, if any.
    pub id: Option<String>,
    /// `event:` field of this frame; `None` means the default `message`.
    pub event: Option<String>,
    /// All `data:` lines of the frame joined with `\n`.
    pub data: String,
}

// ── SseDecoder ───────────────────────────────────────────────────────

/// Incremental `text/event-stream` parser.
///
/// Feed it arbitrary byte chunks; it buffers partial lines (including
/// split UTF-8 sequences) and emits a frame at every blank line that
/// follows at least one `data:` field. Comment lines and `retry:` are
/// ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    last_id: Option<String>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk, returning every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<EventFrame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<EventFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            trace!(comment = line, "event stream comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_owned()),
            "event" => self.event = Some(value.to_owned()),
            "id" => self.last_id = Some(value.to_owned()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<EventFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(EventFrame {
            id: self.last_id.clone(),
            event,
            data,
        })
    }
}

// ── Stream adapters ──────────────────────────────────────────────────

/// Frame a byte stream. The first transport error is yielded and ends the
/// stream; a trailing incomplete frame is discarded.
pub fn frames_from_bytes<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut bytes = Box::pin(bytes);
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for frame in decoder.push(chunk.as_ref()) {
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    yield Err(Error::EventStream(e.to_string()));
                    break;
                }
            }
        }
        debug!("event stream ended");
    })
}

impl BridgeClient {
    /// Open the event stream.
    ///
    /// Fails up front with [`Error::Forbidden`] or [`Error::Bridge`] if the
    /// bridge rejects the request; afterwards errors arrive in-stream.
    pub async fn event_stream(&self) -> Result<EventStream, Error> {
        let url = self.url(EVENT_STREAM_PATH)?;
        debug!("GET {} (event stream)", url);

        let resp = self
            .authorize(self.http().get(url))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let resp = check_status(resp).await?;

        Ok(frames_from_bytes(resp.bytes_stream()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
