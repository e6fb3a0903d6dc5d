//! Event decoder: Reassembles protocol lines from arbitrary byte chunks.
//!
//! The transport hands over chunks wherever the network happened to split
//! them. The decoder keeps the unterminated tail between calls, so the
//! sequence of decoded events depends only on the concatenated bytes.
//!
//! Lines are split on the `\n` byte before UTF-8 decoding. A newline byte
//! never occurs inside a multi-byte UTF-8 sequence, so characters split
//! across chunks are reassembled for free.

use super::{StreamEvent, EVENT_PREFIX};
use tracing::trace;

/// Incremental decoder for the line-delimited event stream.
#[derive(Debug, Default)]
pub struct EventDecoder {
    /// Bytes of the current, not yet terminated line.
    pending: Vec<u8>,
    /// Prefix of `pending` already known to contain no newline.
    scanned: usize,
}

impl EventDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        self.feed_into(chunk, &mut events);
        events
    }

    /// Feed a chunk, pushing completed events onto `out`.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<StreamEvent>) {
        self.pending.extend_from_slice(chunk);

        let mut start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.pending[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + offset;
            if let Some(event) = decode_line(&self.pending[start..end]) {
                out.push(event);
            }
            start = end + 1;
            search_from = start;
        }

        self.pending.drain(..start);
        self.scanned = self.pending.len();
    }

    /// Flush the unterminated tail at end of stream.
    ///
    /// The tail is parsed as one final event under the same discard rules
    /// as any other line. The decoder is empty afterwards.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let tail = std::mem::take(&mut self.pending);
        self.scanned = 0;
        decode_line(&tail)
    }

    /// Drop any buffered partial line.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.scanned = 0;
    }

    /// Number of buffered bytes belonging to an unterminated line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Decode a single line. Non-event lines and malformed payloads yield `None`.
fn decode_line(line: &[u8]) -> Option<StreamEvent> {
    let text = String::from_utf8_lossy(line);
    let payload = text.trim().strip_prefix(EVENT_PREFIX)?;

    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            trace!(error = %err, len = payload.len(), "discarding malformed event line");
            None
        }
    }
}
