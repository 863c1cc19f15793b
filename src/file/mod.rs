//! File-delivery specialization of the reassembly engine.
//!
//! A [`FileReassembler`] feeds a [`FileConsumer`] the reconstructed stream:
//! contiguous prefixes are delivered as soon as an insertion completes them,
//! and `flush`/`flush_to` force delivery past missing data, turning every
//! unfilled span into exactly one gap notification. Two consumers ship with
//! the crate: [`CaptureSink`] records events in memory, [`ExtractSink`]
//! writes the stream out with gaps zero-filled.

mod reassembler;
mod sink;
mod stats;

pub use reassembler::FileReassembler;
pub use sink::{CaptureSink, ExtractSink, StreamEvent};
pub use stats::{GapSpan, ReassemblyStats};

/// Consumer of reconstructed stream content.
///
/// The reassembler guarantees `deliver_stream` chunks arrive in strictly
/// increasing, non-overlapping, contiguous order, and that each distinct
/// missing span is reported through `gap` at most once. Together the two
/// call sequences tile the stream from the origin up to the frontier with
/// no overlap and no holes.
///
/// Callbacks must not fail in a way the engine needs to observe; a consumer
/// with fallible output records its own errors (see
/// [`ExtractSink::last_error`]).
pub trait FileConsumer {
    /// Receive the next contiguous, in-order chunk of the stream.
    fn deliver_stream(&mut self, data: &[u8]);

    /// Observe the permanently missing span `[at, at + len)`.
    fn gap(&mut self, at: u64, len: u64);
}
