use crate::{ApiError, StageFrame};

/// Incremental decoder for the `text/event-stream` progress response.
///
/// Events are UTF-8 text blocks separated by a blank line; within a block,
/// a line prefixed `data: ` carries one JSON-encoded frame. Chunk boundaries
/// may fall anywhere, including inside a multi-byte UTF-8 sequence, so the
/// carry-over buffer is kept as raw bytes and decoding happens per complete
/// block.
#[derive(Debug, Default)]
pub struct FrameReader {
    buffer: Vec<u8>,
}

const BLOCK_SEPARATOR: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns every frame completed by it. The trailing
    /// (possibly incomplete) fragment is retained for the next chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StageFrame>, ApiError> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = find_separator(&self.buffer) {
            let rest = self.buffer.split_off(end + BLOCK_SEPARATOR.len());
            let block = std::mem::replace(&mut self.buffer, rest);
            if let Some(frame) = decode_block(&block[..end])? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(BLOCK_SEPARATOR.len())
        .position(|window| window == BLOCK_SEPARATOR)
}

fn decode_block(block: &[u8]) -> Result<Option<StageFrame>, ApiError> {
    let text = std::str::from_utf8(block)
        .map_err(|err| ApiError::Protocol(format!("invalid utf-8 in event block: {err}")))?;

    for line in text.lines() {
        if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
            let frame = serde_json::from_str(payload)
                .map_err(|err| ApiError::Protocol(err.to_string()))?;
            return Ok(Some(frame));
        }
    }
    // Blocks without a data line (comments, keep-alives) are skipped.
    Ok(None)
}
