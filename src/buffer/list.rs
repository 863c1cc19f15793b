//! Sequence-ordered range collection plus the delivery frontier.
//!
//! [`RangeBuffer`] keeps pending ranges strictly ordered by start and
//! pairwise disjoint: `insert` drops bytes at or below the frontier (stale
//! retransmissions) and splits the remainder against buffered data,
//! retaining the first-seen copy of any overlapping span. Delivery policies
//! depend on that shape; the contiguous-prefix walk matches range starts
//! against the frontier exactly.

use bytes::Bytes;

use super::arena::{Arena, NodeIndex, RangeNode};
use crate::range::ByteRange;

/// Span where an inserted range collided with bytes already observed.
///
/// Both copies of the span are exposed so a policy can byte-compare them;
/// the buffer itself keeps `existing` and discards `incoming`. When the
/// collision is with data below the frontier (a retransmission of bytes
/// already delivered or declared missing), the original copy has been
/// released and `existing` is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlapSpan {
    /// Absolute sequence position where the overlap begins.
    pub start: u64,
    /// The buffered copy (retained); empty when the span lies below the
    /// frontier and its bytes are gone.
    pub existing: Bytes,
    /// The incoming copy (discarded).
    pub incoming: Bytes,
}

impl OverlapSpan {
    /// Number of overlapping bytes.
    #[must_use]
    pub fn len(&self) -> u64 { self.incoming.len() as u64 }

    /// Always `false`; zero-length overlaps are never reported.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.incoming.is_empty() }

    /// Whether the buffered copy is still available for comparison.
    #[must_use]
    pub fn existing_available(&self) -> bool { !self.existing.is_empty() }
}

/// Result of [`RangeBuffer::insert`].
#[derive(Debug)]
pub struct InsertOutcome {
    /// First node inserted by this call, or the buffered node covering the
    /// incoming start when every surviving byte was already present.
    /// `None` when the whole range was stale (at or below the frontier).
    pub node: Option<NodeIndex>,
    /// Spans where the incoming range collided with already-observed data,
    /// in ascending order.
    pub overlaps: Vec<OverlapSpan>,
    /// Bytes actually added to the buffer.
    pub added: u64,
}

/// Ordered collection of pending byte ranges with a monotonic frontier.
///
/// # Examples
///
/// ```
/// use reflow::{ByteRange, RangeBuffer};
///
/// let mut buffer = RangeBuffer::new(0);
/// let outcome = buffer.insert(ByteRange::new(5, &b"world"[..]).expect("valid range"));
/// assert!(outcome.node.is_some());
/// assert_eq!(buffer.buffered_bytes(), 5);
/// assert_eq!(buffer.last_end(), Some(10));
/// ```
#[derive(Debug)]
pub struct RangeBuffer {
    arena: Arena,
    head: Option<NodeIndex>,
    tail: Option<NodeIndex>,
    origin: u64,
    frontier: u64,
    buffered: u64,
}

impl RangeBuffer {
    /// Create an empty buffer whose frontier starts at `origin`.
    #[must_use]
    pub fn new(origin: u64) -> Self {
        Self {
            arena: Arena::default(),
            head: None,
            tail: None,
            origin,
            frontier: origin,
            buffered: 0,
        }
    }

    /// Absolute sequence number of logical stream position 0.
    #[must_use]
    pub const fn origin(&self) -> u64 { self.origin }

    /// The delivery frontier: everything below it has been delivered or
    /// declared permanently missing.
    #[must_use]
    pub const fn frontier(&self) -> u64 { self.frontier }

    /// Total bytes currently buffered.
    #[must_use]
    pub const fn buffered_bytes(&self) -> u64 { self.buffered }

    /// Number of buffered ranges.
    #[must_use]
    pub const fn len(&self) -> usize { self.arena.len() }

    /// Whether no ranges are buffered.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.arena.len() == 0 }

    /// First node in ascending start order.
    #[must_use]
    pub const fn head(&self) -> Option<NodeIndex> { self.head }

    /// Last node in ascending start order.
    #[must_use]
    pub const fn tail(&self) -> Option<NodeIndex> { self.tail }

    /// The range held by `node`, or `None` if the node was removed.
    #[must_use]
    pub fn range(&self, node: NodeIndex) -> Option<&ByteRange> {
        self.arena.get(node).map(|n| &n.range)
    }

    /// Successor of `node` in ascending start order.
    #[must_use]
    pub fn next(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.arena.get(node).and_then(|n| n.next)
    }

    /// End of the highest buffered range, if any.
    #[must_use]
    pub fn last_end(&self) -> Option<u64> { self.tail.and_then(|t| self.range(t)).map(ByteRange::end) }

    /// Move the frontier forward to `to`; requests below the current
    /// frontier are ignored, so the frontier never regresses.
    pub fn advance_frontier(&mut self, to: u64) { self.frontier = self.frontier.max(to); }

    /// Insert `range`, keeping start order and pairwise disjointness.
    ///
    /// Bytes at or below the frontier are dropped (already delivered or
    /// declared missing) and reported as an overlap with a released
    /// original. The remainder is split against buffered ranges: every
    /// colliding span is reported in the outcome and the first-seen copy is
    /// retained; only uncovered sub-ranges are added.
    pub fn insert(&mut self, range: ByteRange) -> InsertOutcome {
        let mut overlaps = Vec::new();
        if range.start() < self.frontier {
            let stale_end = range.end().min(self.frontier);
            overlaps.push(OverlapSpan {
                start: range.start(),
                existing: Bytes::new(),
                incoming: range.slice_abs(range.start(), stale_end),
            });
        }
        let Some(range) = range.clip_below(self.frontier) else {
            return InsertOutcome {
                node: None,
                overlaps,
                added: 0,
            };
        };

        let new_start = range.start();
        let new_end = range.end();

        // Locate the first buffered node that can collide with the incoming
        // range, remembering its predecessor. In-order arrival lands past
        // the tail, so that case skips the walk.
        let mut prev: Option<NodeIndex> = None;
        let mut node = self.head;
        if let Some(tail_end) = self.last_end() {
            if new_start >= tail_end {
                prev = self.tail;
                node = None;
            }
        }
        while let Some(idx) = node {
            let Some((_, end)) = self.span(idx) else { break };
            if end > new_start {
                break;
            }
            prev = Some(idx);
            node = self.next(idx);
        }

        let mut cur = new_start;
        let mut first_inserted: Option<NodeIndex> = None;
        let mut covering: Option<NodeIndex> = None;
        let mut added = 0;
        while cur < new_end {
            match node.and_then(|idx| self.span(idx).map(|span| (idx, span))) {
                Some((idx, (n_start, n_end))) if n_start < new_end => {
                    if n_start > cur {
                        let piece = ByteRange::from_parts(cur, range.slice_abs(cur, n_start));
                        let new_idx = self.link_after(prev, Some(idx), piece);
                        first_inserted.get_or_insert(new_idx);
                        added += n_start - cur;
                        cur = n_start;
                    }
                    let overlap_end = n_end.min(new_end);
                    if let Some(existing) = self.range(idx).map(|r| r.slice_abs(cur, overlap_end))
                    {
                        overlaps.push(OverlapSpan {
                            start: cur,
                            existing,
                            incoming: range.slice_abs(cur, overlap_end),
                        });
                    }
                    covering.get_or_insert(idx);
                    cur = overlap_end;
                    prev = Some(idx);
                    node = self.next(idx);
                }
                _ => {
                    let piece = ByteRange::from_parts(cur, range.slice_abs(cur, new_end));
                    let new_idx = self.link_after(prev, node, piece);
                    first_inserted.get_or_insert(new_idx);
                    added += new_end - cur;
                    cur = new_end;
                }
            }
        }

        self.buffered += added;
        InsertOutcome {
            node: first_inserted.or(covering),
            overlaps,
            added,
        }
    }

    /// Discard every buffered range entirely at or below `seq` and shrink a
    /// range straddling it. Returns the number of bytes removed.
    ///
    /// This is the structural trim only: it never touches the frontier and
    /// never invokes policy hooks (the engine's `trim_to_seq` layers those
    /// on top).
    pub fn trim_below(&mut self, seq: u64) -> u64 {
        let mut removed = 0;
        while let Some(idx) = self.head {
            let Some((start, end)) = self.span(idx) else { break };
            if end <= seq {
                removed += end - start;
                self.head = self.arena.release(idx).and_then(|n| n.next);
                if self.head.is_none() {
                    self.tail = None;
                }
            } else if start < seq {
                if let Some(node) = self.arena.get_mut(idx) {
                    node.range.advance_to(seq);
                }
                removed += seq - start;
                break;
            } else {
                break;
            }
        }
        self.buffered -= removed;
        removed
    }

    /// Iterate buffered ranges in ascending start order.
    #[must_use]
    pub fn iter(&self) -> RangeIter<'_> {
        RangeIter {
            buffer: self,
            node: self.head,
        }
    }

    fn span(&self, idx: NodeIndex) -> Option<(u64, u64)> {
        self.range(idx).map(|r| (r.start(), r.end()))
    }

    /// Link a new node between `prev` and `next`.
    fn link_after(
        &mut self,
        prev: Option<NodeIndex>,
        next: Option<NodeIndex>,
        range: ByteRange,
    ) -> NodeIndex {
        let idx = self.arena.alloc(RangeNode { range, next });
        match prev {
            Some(p) => {
                if let Some(node) = self.arena.get_mut(p) {
                    node.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        if next.is_none() {
            self.tail = Some(idx);
        }
        idx
    }
}

/// Iterator over buffered ranges in ascending start order.
#[derive(Debug)]
pub struct RangeIter<'a> {
    buffer: &'a RangeBuffer,
    node: Option<NodeIndex>,
}

impl<'a> Iterator for RangeIter<'a> {
    type Item = &'a ByteRange;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.node?;
        let node = self.buffer.arena.get(idx)?;
        self.node = node.next;
        Some(&node.range)
    }
}

impl<'a> IntoIterator for &'a RangeBuffer {
    type Item = &'a ByteRange;
    type IntoIter = RangeIter<'a>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}
