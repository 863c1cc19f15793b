//! Public API for the `reflow` library.
//!
//! This crate reconstructs linear file/stream content from discontiguous,
//! possibly overlapping byte ranges observed on a wire: out-of-order
//! arrival, retransmission, and loss are all expected input. The ordered
//! range buffer and generic engine live in [`buffer`] and [`engine`]; the
//! file-delivery specialization, consumers, and per-stream accounting live
//! in [`file`]; [`format`] renders analysis records for downstream logs.

pub mod buffer;
pub mod engine;
pub mod file;
pub mod format;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod range;

pub use buffer::{InsertOutcome, NodeIndex, OverlapSpan, RangeBuffer, RangeIter};
pub use engine::{Reassembler, ReassemblyPolicy};
pub use file::{
    CaptureSink,
    ExtractSink,
    FileConsumer,
    FileReassembler,
    GapSpan,
    ReassemblyStats,
    StreamEvent,
};
pub use format::{
    Ascii,
    Field,
    Json,
    Record,
    RecordFormatter,
    SeparatorConfig,
    TimeFormat,
    Value,
};
pub use range::{ByteRange, RangeError};
