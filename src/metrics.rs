//! Metric helpers for `reflow`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate.

use metrics::counter;

/// Name of the counter tracking bytes delivered to consumers.
pub const BYTES_DELIVERED: &str = "reflow_bytes_delivered_total";
/// Name of the counter tracking reported gap spans.
pub const GAPS_REPORTED: &str = "reflow_gaps_reported_total";
/// Name of the counter tracking bytes declared missing.
pub const GAP_BYTES: &str = "reflow_gap_bytes_total";
/// Name of the counter tracking overlapping insertions.
pub const OVERLAPS: &str = "reflow_overlaps_total";
/// Name of the counter tracking bytes discarded as overlapping.
pub const OVERLAP_BYTES: &str = "reflow_overlap_bytes_total";

/// Record bytes delivered to a consumer.
pub fn add_delivered(len: u64) { counter!(BYTES_DELIVERED).increment(len); }

/// Record a reported gap span of `len` bytes.
pub fn inc_gap(len: u64) {
    counter!(GAPS_REPORTED).increment(1);
    counter!(GAP_BYTES).increment(len);
}

/// Record an overlapping insertion discarding `len` incoming bytes.
pub fn inc_overlap(len: u64) {
    counter!(OVERLAPS).increment(1);
    counter!(OVERLAP_BYTES).increment(len);
}
