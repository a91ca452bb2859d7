//! # Stream Decoder
//!
//! Turns a chunked byte stream from the backend's streaming endpoint into
//! opportunity records, emitted as early as the bytes allow. The decoder
//! owns one growing text buffer for the stream's lifetime and rescans it
//! cumulatively after every chunk, so a record split across chunk
//! boundaries is recovered as soon as its closing brace arrives.

/// Depth-balanced top-level object extraction
pub mod extract;

use crate::models::batch::ScanBatch;
use crate::models::opportunity::Opportunity;

/// Incremental decoder for one streaming response body.
///
/// Feed chunks with [`push_chunk`](Self::push_chunk) as they arrive; call
/// [`finish`](Self::finish) once the stream ends to pick up the trailing
/// batch wrapper. Malformed candidates never surface as errors; they are
/// logged and skipped.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Cumulative decoded text for the stream's lifetime
    buf: String,
    /// Trailing bytes of an incomplete UTF-8 sequence, carried to the next chunk
    pending: Vec<u8>,
    /// Buffer offset up to which complete objects have already been reported
    reported_upto: usize,
}

impl StreamDecoder {
    /// A fresh decoder with an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk and return every opportunity record that became
    /// complete with it. Records already reported by an earlier call are not
    /// repeated, but callers must still absorb duplicates idempotently: the
    /// backend itself may resend a record, and the trailing batch from
    /// [`finish`](Self::finish) overlaps everything emitted incrementally.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<Opportunity> {
        self.decode_utf8(chunk);
        self.scan()
    }

    /// Consume the decoder at end of stream. When the full buffer parses as
    /// the canonical batch wrapper `{ "opportunities": [...] }`, that batch
    /// is returned and supersedes the incremental emissions; otherwise
    /// `None`, and the caller keeps what was emitted incrementally.
    #[must_use]
    pub fn finish(self) -> Option<ScanBatch> {
        let text = self.buf.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str::<ScanBatch>(text) {
            Ok(mut batch) => {
                // The wrapper's records get the same structural checks as
                // incrementally decoded ones
                batch.retain_valid();
                Some(batch)
            }
            Err(e) => {
                log::debug!("decode: stream tail is not a batch wrapper: {e}");
                None
            }
        }
    }

    /// Whether any text has been buffered so far
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty() && self.pending.is_empty()
    }

    /// Decode `chunk` into the text buffer. A multi-byte character split by
    /// the chunk boundary is held back in `pending` until its remaining
    /// bytes arrive; invalid interior bytes become U+FFFD.
    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let mut bytes = std::mem::take(&mut self.pending);

        loop {
            match std::str::from_utf8(&bytes) {
                Ok(valid) => {
                    self.buf.push_str(valid);
                    return;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    // Safe split: everything before valid_up_to is valid UTF-8
                    self.buf
                        .push_str(std::str::from_utf8(&bytes[..valid_up_to]).unwrap_or(""));
                    match e.error_len() {
                        // Truncated sequence at the end: wait for more bytes
                        None => {
                            self.pending = bytes.split_off(valid_up_to);
                            return;
                        }
                        Some(bad) => {
                            self.buf.push(char::REPLACEMENT_CHARACTER);
                            bytes.drain(..valid_up_to + bad);
                        }
                    }
                }
            }
        }
    }

    /// Rescan the whole buffer and parse every newly completed object that
    /// looks like an opportunity record.
    fn scan(&mut self) -> Vec<Opportunity> {
        let mut records = Vec::new();

        for (start, end) in extract::balanced_objects(&self.buf) {
            if end <= self.reported_upto {
                continue;
            }
            self.reported_upto = end;

            let candidate = &self.buf[start..end];
            if !candidate.contains("\"path\"") {
                continue;
            }
            match serde_json::from_str::<Opportunity>(candidate) {
                Ok(opp) => match opp.validate() {
                    Ok(()) => records.push(opp),
                    Err(e) => log::debug!("decode: dropping invalid record: {e}"),
                },
                Err(e) => log::debug!("decode: skipping malformed candidate: {e}"),
            }
        }

        records
    }
}
