//! Incremental frame decoder for streamed chat responses.
//!
//! The server emits frames separated by the literal byte sequence
//! `\n\ndata: `, each carrying one JSON-encoded stream event. Network chunks
//! cut the byte stream at arbitrary positions, so a chunk boundary may fall
//! inside a frame, inside the delimiter, or inside a multi-byte UTF-8
//! character. The decoder buffers raw bytes and only splits on complete
//! delimiters, so all of those cases reassemble correctly.
//!
//! Everything here is pure: no I/O, no async. Both the blocking and async
//! stream façades drive the same decoder.

use std::mem;

use crate::errors::ClientError;
use crate::types::MessageStreamEvent;

const FRAME_DELIMITER: &[u8] = b"\n\ndata: ";
const DATA_PREFIX: &str = "data: ";

/// Splits a raw byte stream into frames and decodes each into an event.
///
/// Only the trailing bytes after the last complete delimiter may be an
/// unfinished frame; anything bounded by delimiters on both sides must parse,
/// and a frame that does not is a protocol error.
#[derive(Default)]
pub(crate) struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Feeds one network chunk and returns every event completed by it.
    pub(crate) fn push_chunk(
        &mut self,
        chunk: &[u8],
    ) -> Result<Vec<MessageStreamEvent>, ClientError> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(idx) = find_delimiter(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..idx + 2).take(idx).collect();
            // The drain consumed the frame plus "\n\n"; the next frame's
            // "data: " prefix stays in the buffer.
            if let Some(event) = decode_frame(&frame)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flushes the trailing frame once the byte stream is exhausted.
    pub(crate) fn finish(&mut self) -> Result<Option<MessageStreamEvent>, ClientError> {
        let rest = mem::take(&mut self.buf);
        decode_frame(&rest)
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(FRAME_DELIMITER.len())
        .position(|w| w == FRAME_DELIMITER)
}

fn decode_frame(frame: &[u8]) -> Result<Option<MessageStreamEvent>, ClientError> {
    let text = std::str::from_utf8(frame)
        .map_err(|e| ClientError::protocol(format!("stream frame is not valid UTF-8: {e}")))?;
    let payload = text.strip_prefix(DATA_PREFIX).unwrap_or(text).trim();
    if payload.is_empty() {
        return Ok(None);
    }
    let event: MessageStreamEvent = serde_json::from_str(payload)
        .map_err(|e| ClientError::protocol(format!("malformed stream event: {e}")))?;
    if event.message.references.is_some() && !event.stream_ended {
        return Err(ClientError::protocol(
            "non-terminal stream event carries references",
        ));
    }
    Ok(Some(event))
}

/// Stateful view over [`FrameDecoder`] that enforces stream-level invariants:
/// exactly one terminal event, emitted last, with nothing after it.
pub(crate) struct EventAssembler {
    decoder: FrameDecoder,
    saw_terminal: bool,
}

impl EventAssembler {
    pub(crate) fn new() -> Self {
        Self {
            decoder: FrameDecoder::default(),
            saw_terminal: false,
        }
    }

    /// Decodes a chunk, discarding anything past the terminal event.
    pub(crate) fn on_chunk(
        &mut self,
        chunk: &[u8],
    ) -> Result<Vec<MessageStreamEvent>, ClientError> {
        if self.saw_terminal {
            return Ok(Vec::new());
        }
        let mut events = self.decoder.push_chunk(chunk)?;
        if let Some(pos) = events.iter().position(|e| e.stream_ended) {
            events.truncate(pos + 1);
            self.saw_terminal = true;
        }
        Ok(events)
    }

    /// Handles the end of the byte stream.
    ///
    /// Returns the terminal event if it was still buffered, or an error if
    /// the stream closed without ever emitting one.
    pub(crate) fn on_end(&mut self) -> Result<Option<MessageStreamEvent>, ClientError> {
        if self.saw_terminal {
            return Ok(None);
        }
        match self.decoder.finish()? {
            Some(event) if event.stream_ended => {
                self.saw_terminal = true;
                Ok(Some(event))
            }
            _ => Err(ClientError::protocol(
                "stream ended without a terminal event",
            )),
        }
    }

    pub(crate) fn terminal_seen(&self) -> bool {
        self.saw_terminal
    }
}
