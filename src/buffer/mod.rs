//! Ordered range buffer: the pending collection behind the reassemblers.
//!
//! The buffer owns a sequence-ordered set of byte ranges plus the delivery
//! frontier. It makes no delivery decisions itself; the engine layer drives
//! it and routes the interesting events to a policy (see
//! [`crate::engine::ReassemblyPolicy`]).

mod arena;
mod list;

pub use arena::NodeIndex;
pub use list::{InsertOutcome, OverlapSpan, RangeBuffer, RangeIter};

#[cfg(test)]
mod tests;
