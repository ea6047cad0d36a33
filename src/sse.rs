//! Incremental framing for the commentary event stream.
//!
//! The service delivers server-sent events: frames separated by a blank
//! line, payload carried on `data:` lines as JSON. Transport chunks can
//! split a frame anywhere, so the framer buffers bytes and only emits
//! complete frames. Malformed framing is a hard error; the session treats
//! it as a transport failure.

use anyhow::{Context, Result};
use bytes::BytesMut;
use serde::Deserialize;

/// One decoded commentary event. Fields are independent; a single event
/// may carry several of them at once.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommentaryEvent {
    /// Base64 PCM16 audio payload
    #[serde(default)]
    pub audio: Option<String>,

    /// Incremental transcript chunk
    #[serde(default)]
    pub text: Option<String>,

    /// Presence marks successful completion of the session
    #[serde(default)]
    pub done: Option<serde_json::Value>,

    /// Presence marks a service-side failure
    #[serde(default)]
    pub error: Option<String>,
}

impl CommentaryEvent {
    pub fn is_done(&self) -> bool {
        self.done.is_some()
    }
}

#[derive(Default)]
pub struct EventFramer {
    buf: BytesMut,
}

impl EventFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a transport chunk and collect every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<CommentaryEvent>> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();

        while let Some((frame_len, separator_len)) = find_frame_boundary(&self.buf) {
            let frame = self.buf.split_to(frame_len + separator_len);
            let frame = std::str::from_utf8(&frame[..frame_len])
                .context("Event stream is not valid UTF-8")?;

            if let Some(event) = parse_frame(frame)? {
                events.push(event);
            }
        }

        Ok(events)
    }
}

/// Locate the first blank-line frame boundary, tolerating CRLF endings.
/// Returns (frame length, separator length).
fn find_frame_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len().saturating_sub(1) {
        if buf[i] != b'\n' {
            continue;
        }
        if buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if buf[i + 1] == b'\r' && buf.get(i + 2) == Some(&b'\n') {
            return Some((i, 3));
        }
    }
    None
}

/// Extract the JSON payload of one frame. Frames with no `data:` line
/// (comments, bare event names) decode to nothing.
fn parse_frame(frame: &str) -> Result<Option<CommentaryEvent>> {
    let mut payload = String::new();

    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            if !payload.is_empty() {
                payload.push('\n');
            }
            payload.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if payload.is_empty() {
        return Ok(None);
    }

    let event = serde_json::from_str(&payload)
        .with_context(|| format!("Malformed event payload: {payload}"))?;

    Ok(Some(event))
}
