//! End-to-end reassembly scenarios driven through the public API.

use bytes::Bytes;
use reflow::{
    Ascii,
    ByteRange,
    CaptureSink,
    ExtractSink,
    FileReassembler,
    RecordFormatter,
    StreamEvent,
};
use rstest::rstest;

fn range(start: u64, payload: &'static [u8]) -> ByteRange {
    ByteRange::new(start, payload).expect("valid range")
}

#[test]
fn in_order_stream_is_delivered_without_gaps() {
    let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
    reassembler.insert(range(0, b"hello"));

    assert_eq!(reassembler.frontier(), 5);
    assert_eq!(reassembler.consumer().delivered(), b"hello");
    assert!(reassembler.consumer().gaps().is_empty());
}

#[test]
fn missing_prefix_is_resolved_by_flush() {
    let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
    reassembler.insert(range(5, b"world"));
    assert_eq!(reassembler.frontier(), 0);
    assert_eq!(reassembler.pending_ranges(), 1);

    assert_eq!(reassembler.flush(), 5);
    assert_eq!(reassembler.frontier(), 10);
    assert_eq!(
        reassembler.consumer().events(),
        &[
            StreamEvent::Gap { at: 0, len: 5 },
            StreamEvent::Delivered(Bytes::from_static(b"world")),
        ]
    );
}

#[test]
fn overlapping_retransmission_still_tiles_the_stream() {
    let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
    reassembler.insert(range(0, b"hello"));
    reassembler.insert(range(3, b"LOwor"));

    assert_eq!(reassembler.stats().overlaps(), 1);
    assert_eq!(reassembler.stats().overlap_bytes(), 2);

    // Delivered spans and gaps tile [0, frontier) exactly.
    assert_eq!(reassembler.consumer().delivered(), b"hellowor");
    assert!(reassembler.consumer().gaps().is_empty());
    assert_eq!(reassembler.frontier(), 8);
}

#[test]
fn flush_to_far_ahead_brackets_buffered_data_with_gaps() {
    let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
    reassembler.insert(range(10, b"abcde"));

    assert_eq!(reassembler.flush_to(20), 5);
    assert_eq!(reassembler.frontier(), 20);
    assert_eq!(reassembler.consumer().gaps(), vec![(0, 10), (15, 5)]);
    assert_eq!(reassembler.consumer().delivered(), b"abcde");
}

#[rstest]
#[case(&[(0, &b"hello"[..])], 5, b"hello".to_vec())]
#[case(&[(5, &b"world"[..]), (0, &b"hello"[..])], 10, b"helloworld".to_vec())]
#[case(&[(2, &b"c"[..]), (0, &b"ab"[..]), (3, &b"d"[..])], 4, b"abcd".to_vec())]
fn frontier_tracks_the_contiguous_prefix(
    #[case] inserts: &[(u64, &'static [u8])],
    #[case] expected_frontier: u64,
    #[case] expected_content: Vec<u8>,
) {
    let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
    let mut last_frontier = 0;
    for (start, payload) in inserts.iter().copied() {
        reassembler.insert(range(start, payload));
        assert!(reassembler.frontier() >= last_frontier, "frontier regressed");
        last_frontier = reassembler.frontier();
    }

    assert_eq!(reassembler.frontier(), expected_frontier);
    assert_eq!(reassembler.consumer().delivered(), expected_content);
}

#[test]
fn extraction_pipeline_zero_fills_and_reports() {
    let mut reassembler = FileReassembler::new(ExtractSink::new(Vec::new()), 100);
    reassembler.insert(range(100, b"head"));
    reassembler.insert(range(110, b"tail"));
    reassembler.flush();

    assert_eq!(reassembler.stream_position(), 14);

    let line = Ascii::default().format(&reassembler.stats().to_record(Some("Fdeadbeef")));
    assert_eq!(line, "Fdeadbeef\t8\t2\t6\t104+6\t0\t0");

    let sink = reassembler.into_consumer();
    assert!(sink.last_error().is_none());
    assert_eq!(sink.zero_filled(), 6);
    assert_eq!(sink.into_inner(), b"head\x00\x00\x00\x00\x00\x00tail");
}

#[test]
fn sequence_space_may_start_anywhere() {
    let origin = u64::MAX - 64;
    let mut reassembler = FileReassembler::new(CaptureSink::new(), origin);
    reassembler.insert(range(origin + 4, b"late"));
    reassembler.flush();

    assert_eq!(reassembler.consumer().gaps(), vec![(origin, 4)]);
    assert_eq!(reassembler.stream_position(), 8);
}
