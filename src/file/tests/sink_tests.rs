//! Tests for the shipped consumers.

use std::io::{self, Write};

use crate::file::{CaptureSink, ExtractSink, FileConsumer};

#[test]
fn capture_sink_records_events_in_order() {
    let mut sink = CaptureSink::new();
    sink.deliver_stream(b"ab");
    sink.gap(2, 3);
    sink.deliver_stream(b"cd");

    assert_eq!(sink.delivered(), b"abcd");
    assert_eq!(sink.gaps(), vec![(2, 3)]);
    assert_eq!(sink.events().len(), 3);
}

#[test]
fn extract_sink_zero_fills_gaps() {
    let mut sink = ExtractSink::new(Vec::new());
    sink.deliver_stream(b"ab");
    sink.gap(2, 3);
    sink.deliver_stream(b"cd");

    assert_eq!(sink.written(), 7);
    assert_eq!(sink.zero_filled(), 3);
    assert!(sink.last_error().is_none());
    assert_eq!(sink.into_inner(), b"ab\x00\x00\x00cd");
}

#[test]
fn extract_sink_fills_gaps_larger_than_one_chunk() {
    let mut sink = ExtractSink::new(Vec::new());
    sink.gap(0, 10_000);

    assert_eq!(sink.zero_filled(), 10_000);
    assert_eq!(sink.into_inner().len(), 10_000);
}

/// Writer that fails every write after a byte budget is spent.
struct FlakyWriter {
    accepted: Vec<u8>,
    budget: usize,
}

impl Write for FlakyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.accepted.len() + buf.len() > self.budget {
            return Err(io::Error::other("disk full"));
        }
        self.accepted.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

#[test]
fn extract_sink_records_the_first_error_and_discards_the_rest() {
    let mut sink = ExtractSink::new(FlakyWriter {
        accepted: Vec::new(),
        budget: 4,
    });
    sink.deliver_stream(b"abcd");
    sink.deliver_stream(b"efgh");
    sink.deliver_stream(b"ijkl");

    assert_eq!(sink.written(), 4);
    assert_eq!(
        sink.last_error().expect("error must be recorded").kind(),
        io::ErrorKind::Other
    );
    assert_eq!(sink.into_inner().accepted, b"abcd");
}
