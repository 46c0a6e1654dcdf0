//! Newline-delimited JSON framing over a byte stream

use futures::{Stream, StreamExt, stream};
use std::collections::VecDeque;
use std::pin::Pin;

use super::http_client::ByteStream;
use crate::domain::DomainError;

pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// Splits arbitrary byte chunks into complete, non-blank lines
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and take every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(line) = decode_line(&line) {
                lines.push(line);
            }
        }
        lines
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

struct LineState {
    bytes: ByteStream,
    decoder: LineDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turn a response body into a stream of lines; a transport error ends the stream
pub fn lines(bytes: ByteStream) -> LineStream {
    let state = LineState {
        bytes,
        decoder: LineDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    let stream = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.decoder.push(&chunk);
                    state.pending.extend(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.finished = true;
                    state.pending.extend(state.decoder.finish());
                }
            }
        }
    });

    Box::pin(stream)
}
