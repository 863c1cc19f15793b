//! Contiguous-prefix delivery, gap synthesis, and flush control.

use tracing::{debug, trace};

use super::{FileConsumer, stats::ReassemblyStats};
use crate::{
    buffer::{NodeIndex, OverlapSpan, RangeBuffer},
    engine::{Reassembler, ReassemblyPolicy},
    range::ByteRange,
};

/// The file-delivery hooks: deliver what is contiguous, synthesize gaps on
/// forced trims, observe overlaps without correcting them.
#[derive(Debug)]
struct FilePolicy<C> {
    consumer: C,
    stats: ReassemblyStats,
    flushing: bool,
}

impl<C: FileConsumer> FilePolicy<C> {
    fn report_gap(&mut self, at: u64, len: u64) {
        debug!(at, len, "reporting unrecoverable gap");
        self.consumer.gap(at, len);
        self.stats.record_gap(at, len);
        #[cfg(feature = "metrics")]
        crate::metrics::inc_gap(len);
    }
}

impl<C: FileConsumer> ReassemblyPolicy for FilePolicy<C> {
    fn block_inserted(&mut self, buffer: &mut RangeBuffer, node: NodeIndex) {
        {
            let frontier = buffer.frontier();
            let Some(first) = buffer.range(node) else {
                return;
            };
            // Nothing new is contiguous unless the range covers the frontier.
            if first.start() > frontier || first.end() <= frontier {
                return;
            }
        }

        let mut cursor = Some(node);
        while let Some(idx) = cursor {
            let frontier = buffer.frontier();
            let Some(range) = buffer.range(idx) else { break };
            if range.start() > frontier {
                break;
            }
            if range.start() == frontier {
                let data = range.data().clone();
                let end = range.end();
                self.consumer.deliver_stream(&data);
                self.stats.record_delivered(data.len() as u64);
                #[cfg(feature = "metrics")]
                crate::metrics::add_delivered(data.len() as u64);
                trace!(at = frontier, len = data.len(), "delivered contiguous range");
                buffer.advance_frontier(end);
            }
            cursor = buffer.next(idx);
        }

        // Everything below the frontier has been handed over; release it.
        let frontier = buffer.frontier();
        buffer.trim_below(frontier);
    }

    fn undelivered(&mut self, buffer: &mut RangeBuffer, up_to: u64) {
        loop {
            // Delivery below mutates the collection, so each iteration must
            // start over from the current head; a node link captured before
            // the mutation may no longer be valid.
            let mut node = buffer.head();
            while let Some(idx) = node {
                match buffer.range(idx) {
                    Some(range) if range.end() <= buffer.frontier() => node = buffer.next(idx),
                    _ => break,
                }
            }
            let Some(start) = node.and_then(|idx| buffer.range(idx)).map(ByteRange::start)
            else {
                break;
            };
            if start >= up_to {
                break;
            }
            if start > buffer.frontier() {
                let at = buffer.frontier();
                self.report_gap(at, start - at);
                buffer.advance_frontier(start);
            }
            if let Some(idx) = node {
                self.block_inserted(buffer, idx);
            }
        }

        if up_to > buffer.frontier() {
            let at = buffer.frontier();
            self.report_gap(at, up_to - at);
            buffer.advance_frontier(up_to);
        }
    }

    fn overlap(&mut self, span: &OverlapSpan) {
        debug!(
            at = span.start,
            len = span.len(),
            "overlapping retransmission; first-seen copy retained"
        );
        self.stats.record_overlap(span.len());
        #[cfg(feature = "metrics")]
        crate::metrics::inc_overlap(span.len());
    }
}

/// Reassembles one file or stream and feeds it to a [`FileConsumer`].
///
/// `insert` delivers whatever each new range makes contiguous; [`flush`]
/// and [`flush_to`] force delivery past missing data, reporting each
/// unfilled span as a gap exactly once. The frontier never moves backwards,
/// no byte is delivered twice, and delivered chunks plus reported gaps tile
/// `[origin, frontier)` exactly.
///
/// The reassembler is single-threaded by design: it is owned by the
/// analysis context driving it and runs every operation to completion on
/// the calling thread.
///
/// [`flush`]: FileReassembler::flush
/// [`flush_to`]: FileReassembler::flush_to
///
/// # Examples
///
/// ```
/// use reflow::{ByteRange, CaptureSink, FileReassembler};
///
/// let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
///
/// // [5, 10) arrives first; nothing is contiguous yet.
/// reassembler.insert(ByteRange::new(5, &b"world"[..]).expect("valid range"));
/// assert_eq!(reassembler.frontier(), 0);
///
/// // Flushing declares [0, 5) lost and delivers the rest.
/// reassembler.flush();
/// assert_eq!(reassembler.frontier(), 10);
/// assert_eq!(reassembler.consumer().gaps(), vec![(0, 5)]);
/// assert_eq!(reassembler.consumer().delivered(), b"world");
/// ```
#[derive(Debug)]
pub struct FileReassembler<C> {
    engine: Reassembler<FilePolicy<C>>,
}

impl<C: FileConsumer> FileReassembler<C> {
    /// Create a reassembler bound to `consumer`, with `origin_offset` as
    /// the absolute sequence number of logical stream position 0.
    #[must_use]
    pub fn new(consumer: C, origin_offset: u64) -> Self {
        Self {
            engine: Reassembler::new(
                FilePolicy {
                    consumer,
                    stats: ReassemblyStats::default(),
                    flushing: false,
                },
                origin_offset,
            ),
        }
    }

    /// Insert a newly observed range, delivering whatever it completes.
    ///
    /// Sequence numbers are absolute (the same space as `origin_offset`).
    /// Bytes at or below the frontier are stale retransmissions and are
    /// dropped; spans colliding with buffered data keep the first-seen
    /// copy.
    pub fn insert(&mut self, range: ByteRange) { self.engine.insert(range); }

    /// Force delivery of everything currently buffered, reporting gaps up
    /// to the highest buffered byte.
    ///
    /// Returns the number of buffered bytes resolved. An empty buffer and a
    /// flush triggered from inside another flush both return 0.
    pub fn flush(&mut self) -> u64 {
        if self.engine.policy().flushing {
            return 0;
        }
        let Some(end) = self.engine.buffer().last_end() else {
            return 0;
        };
        self.engine.policy_mut().flushing = true;
        let trimmed = self.engine.trim_to_seq(end);
        self.engine.policy_mut().flushing = false;
        trimmed
    }

    /// Force the frontier to at least `seq`, delivering buffered data below
    /// it and reporting every unfilled span as a gap.
    ///
    /// The frontier moves to `seq` even when nothing was ever buffered
    /// there, letting a caller abandon interest in early bytes of a
    /// stream. Returns the number of buffered bytes resolved; a reentrant
    /// call returns 0.
    pub fn flush_to(&mut self, seq: u64) -> u64 {
        if self.engine.policy().flushing {
            return 0;
        }
        self.engine.policy_mut().flushing = true;
        let trimmed = self.engine.trim_to_seq(seq);
        self.engine.policy_mut().flushing = false;
        self.engine.buffer_mut().advance_frontier(seq);
        trimmed
    }

    /// The delivery frontier: every byte below it has been delivered or
    /// reported as a gap. Monotonically non-decreasing.
    #[must_use]
    pub fn frontier(&self) -> u64 { self.engine.frontier() }

    /// Absolute sequence number of logical stream position 0.
    #[must_use]
    pub fn origin_offset(&self) -> u64 { self.engine.buffer().origin() }

    /// The frontier translated to a stream-relative position: how many
    /// bytes of the logical stream have been resolved.
    #[must_use]
    pub fn stream_position(&self) -> u64 { self.frontier() - self.origin_offset() }

    /// Bytes buffered but not yet delivered.
    #[must_use]
    pub fn pending_bytes(&self) -> u64 { self.engine.buffer().buffered_bytes() }

    /// Number of pending ranges.
    #[must_use]
    pub fn pending_ranges(&self) -> usize { self.engine.buffer().len() }

    /// Per-stream delivery/gap/overlap accounting.
    #[must_use]
    pub fn stats(&self) -> &ReassemblyStats { &self.engine.policy().stats }

    /// Borrow the consumer.
    #[must_use]
    pub fn consumer(&self) -> &C { &self.engine.policy().consumer }

    /// Mutably borrow the consumer.
    pub fn consumer_mut(&mut self) -> &mut C { &mut self.engine.policy_mut().consumer }

    /// Tear down the reassembler, releasing all pending ranges and
    /// returning the consumer.
    #[must_use]
    pub fn into_consumer(self) -> C { self.engine.into_policy().consumer }
}
