// src/stream.rs
//! Incremental NDJSON parser for streaming search responses.
//!
//! Accumulates raw bytes and yields one [`StreamEvent`] per complete line.
//! The buffer holds bytes rather than decoded text, so a read chunk may end
//! in the middle of a multi-byte UTF-8 character without corrupting the
//! stream: decoding happens per complete line, never per chunk.

use crate::types::StreamEvent;

/// Streaming NDJSON parser that accumulates bytes and yields complete events.
pub struct NdjsonParser {
    /// Bytes of the trailing line not yet terminated by a newline.
    buffer: Vec<u8>,
}

impl NdjsonParser {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed bytes into the parser and return the events on any complete lines.
    ///
    /// Blank lines are skipped. Lines that fail to decode (malformed JSON or
    /// an unrecognized `type` tag) are logged and skipped; a single bad line
    /// must not abort the stream.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Some(event) = parse_line(&line[..newline_pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the trailing unterminated line, if any.
    ///
    /// The backend newline-terminates every event, but a stream truncated
    /// mid-connection may still end with one decodable line worth keeping.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

impl Default for NdjsonParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_line(line: &[u8]) -> Option<StreamEvent> {
    // Tolerate CRLF line endings.
    let line = match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    };
    if line.iter().all(|b| b.is_ascii_whitespace()) {
        return None;
    }
    match serde_json::from_slice::<StreamEvent>(line) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(
                error = %e,
                line = %String::from_utf8_lossy(line),
                "Skipping malformed stream line"
            );
            None
        }
    }
}
