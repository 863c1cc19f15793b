//! Per-stream reassembly accounting.

use crate::format::{Record, Value};

/// A missing span `[at, at + len)` that was reported to the consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapSpan {
    /// Absolute sequence position where the gap begins.
    pub at: u64,
    /// Number of missing bytes.
    pub len: u64,
}

/// What a [`FileReassembler`](crate::FileReassembler) has resolved so far:
/// delivered versus missing versus overlapping bytes, the per-stream fields
/// a capture platform carries into its analysis log.
#[derive(Clone, Debug, Default)]
pub struct ReassemblyStats {
    delivered_bytes: u64,
    delivered_chunks: u64,
    missing_bytes: u64,
    gaps: Vec<GapSpan>,
    overlap_bytes: u64,
    overlaps: u64,
}

impl ReassemblyStats {
    pub(crate) fn record_delivered(&mut self, len: u64) {
        self.delivered_bytes += len;
        self.delivered_chunks += 1;
    }

    pub(crate) fn record_gap(&mut self, at: u64, len: u64) {
        self.missing_bytes += len;
        self.gaps.push(GapSpan { at, len });
    }

    pub(crate) fn record_overlap(&mut self, len: u64) {
        self.overlap_bytes += len;
        self.overlaps += 1;
    }

    /// Bytes handed to the consumer.
    #[must_use]
    pub const fn delivered_bytes(&self) -> u64 { self.delivered_bytes }

    /// Number of contiguous chunks delivered.
    #[must_use]
    pub const fn delivered_chunks(&self) -> u64 { self.delivered_chunks }

    /// Bytes declared permanently missing.
    #[must_use]
    pub const fn missing_bytes(&self) -> u64 { self.missing_bytes }

    /// Every reported gap, in the order it was reported.
    #[must_use]
    pub fn gaps(&self) -> &[GapSpan] { &self.gaps }

    /// Bytes discarded because a buffered copy already covered them.
    #[must_use]
    pub const fn overlap_bytes(&self) -> u64 { self.overlap_bytes }

    /// Number of overlapping insertions observed.
    #[must_use]
    pub const fn overlaps(&self) -> u64 { self.overlaps }

    /// Render the tallies as an analysis record.
    ///
    /// `stream_id` fills the `fid` field; pass `None` to leave it unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use reflow::{Ascii, ByteRange, CaptureSink, FileReassembler, RecordFormatter};
    ///
    /// let mut reassembler = FileReassembler::new(CaptureSink::new(), 0);
    /// reassembler.insert(ByteRange::new(0, &b"hello"[..]).expect("valid range"));
    ///
    /// let record = reassembler.stats().to_record(Some("Fa1b2c"));
    /// let line = Ascii::default().format(&record);
    /// assert!(line.starts_with("Fa1b2c\t5\t1\t0"));
    /// ```
    #[must_use]
    pub fn to_record(&self, stream_id: Option<&str>) -> Record {
        let gaps = self
            .gaps
            .iter()
            .map(|gap| Value::Text(format!("{}+{}", gap.at, gap.len)))
            .collect();

        let record = match stream_id {
            Some(id) => Record::new().field("fid", Value::Text(id.to_owned())),
            None => Record::new().unset("fid"),
        };
        record
            .field("delivered_bytes", Value::Count(self.delivered_bytes))
            .field("delivered_chunks", Value::Count(self.delivered_chunks))
            .field("missing_bytes", Value::Count(self.missing_bytes))
            .field("gaps", Value::Set(gaps))
            .field("overlap_bytes", Value::Count(self.overlap_bytes))
            .field("overlaps", Value::Count(self.overlaps))
    }
}
