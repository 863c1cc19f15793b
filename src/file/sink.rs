//! Ready-made stream consumers: in-memory capture and file extraction.

use std::io::{self, Write};

use bytes::Bytes;
use tracing::warn;

use super::FileConsumer;

/// One observation recorded by a [`CaptureSink`], in stream order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A contiguous chunk of reconstructed content.
    Delivered(Bytes),
    /// A permanently missing span `[at, at + len)`.
    Gap { at: u64, len: u64 },
}

/// Consumer that records every delivery and gap in memory.
///
/// The event list preserves the exact order the engine resolved the stream
/// in, which makes this the natural consumer for small captures and for
/// asserting reassembly behaviour in tests.
///
/// # Examples
///
/// ```
/// use reflow::{ByteRange, CaptureSink, FileReassembler};
///
/// let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
/// reassembler.insert(ByteRange::new(0, &b"hello"[..]).expect("valid range"));
/// assert_eq!(reassembler.consumer().delivered(), b"hello");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
    events: Vec<StreamEvent>,
}

impl CaptureSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Every recorded event, in the order it was observed.
    #[must_use]
    pub fn events(&self) -> &[StreamEvent] { &self.events }

    /// All delivered chunks concatenated in stream order.
    #[must_use]
    pub fn delivered(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for event in &self.events {
            if let StreamEvent::Delivered(chunk) = event {
                out.extend_from_slice(chunk);
            }
        }
        out
    }

    /// All reported gaps as `(at, len)` pairs, in the order observed.
    #[must_use]
    pub fn gaps(&self) -> Vec<(u64, u64)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Gap { at, len } => Some((*at, *len)),
                StreamEvent::Delivered(_) => None,
            })
            .collect()
    }
}

impl FileConsumer for CaptureSink {
    fn deliver_stream(&mut self, data: &[u8]) {
        self.events
            .push(StreamEvent::Delivered(Bytes::copy_from_slice(data)));
    }

    fn gap(&mut self, at: u64, len: u64) { self.events.push(StreamEvent::Gap { at, len }); }
}

const FILL_CHUNK: [u8; 4096] = [0; 4096];

/// Consumer that extracts the stream to a writer.
///
/// Delivered bytes are written as-is and gaps are zero-filled, so every
/// byte of the output sits at its true stream offset. The consumer contract
/// forbids surfacing failures to the engine, so the first I/O error is
/// logged and recorded, and all subsequent output is discarded; callers
/// inspect [`last_error`](ExtractSink::last_error) once the stream is done.
#[derive(Debug)]
pub struct ExtractSink<W> {
    writer: W,
    written: u64,
    zero_filled: u64,
    error: Option<io::Error>,
}

impl<W: Write> ExtractSink<W> {
    /// Extract into `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            zero_filled: 0,
            error: None,
        }
    }

    /// Total bytes written, zero-fill included.
    #[must_use]
    pub fn written(&self) -> u64 { self.written }

    /// Bytes written as gap fill.
    #[must_use]
    pub fn zero_filled(&self) -> u64 { self.zero_filled }

    /// The first I/O error encountered, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&io::Error> { self.error.as_ref() }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W { self.writer }

    fn write_chunk(&mut self, data: &[u8]) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.writer.write_all(data) {
            Ok(()) => {
                self.written += data.len() as u64;
                true
            }
            Err(err) => {
                warn!(error = %err, "extraction write failed; discarding the rest of the stream");
                self.error = Some(err);
                false
            }
        }
    }
}

impl<W: Write> FileConsumer for ExtractSink<W> {
    fn deliver_stream(&mut self, data: &[u8]) { self.write_chunk(data); }

    fn gap(&mut self, _at: u64, len: u64) {
        let mut remaining = len;
        while remaining > 0 {
            let chunk = remaining.min(FILL_CHUNK.len() as u64);
            if !self.write_chunk(&FILL_CHUNK[..chunk as usize]) {
                return;
            }
            self.zero_filled += chunk;
            remaining -= chunk;
        }
    }
}
