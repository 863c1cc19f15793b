//! Base reassembler: a [`RangeBuffer`] driven through policy hooks.
//!
//! The engine layer owns the ordered buffer and delegates the decision
//! points of reassembly to a [`ReassemblyPolicy`]: what to do after an
//! insertion, how to force progress past missing data, and what to make of
//! an overlap. The file-delivery specialization lives in [`crate::file`];
//! other delivery disciplines implement the same trait.

mod reassembler;

pub use reassembler::Reassembler;

use crate::buffer::{NodeIndex, OverlapSpan, RangeBuffer};

/// Decision hooks a reassembler specialization supplies to the engine.
///
/// Hooks receive the buffer mutably and are free to deliver, trim, and
/// advance the frontier. A hook that mutates the collection must re-fetch
/// [`RangeBuffer::head`] instead of trusting node links captured before the
/// mutation; see [`crate::file`]'s gap walk for the canonical example.
pub trait ReassemblyPolicy {
    /// A range was structurally inserted at (or next to) `node`; the policy
    /// may now deliver whatever has become contiguous.
    fn block_inserted(&mut self, buffer: &mut RangeBuffer, node: NodeIndex);

    /// A trim target lies beyond the frontier. The policy must force the
    /// frontier toward `up_to`, reporting a gap for every span no buffered
    /// range covers.
    fn undelivered(&mut self, buffer: &mut RangeBuffer, up_to: u64);

    /// An inserted range collided with a buffered one. The buffer has
    /// already resolved the collision (first-seen copy retained); this hook
    /// only observes it.
    fn overlap(&mut self, span: &OverlapSpan);
}
