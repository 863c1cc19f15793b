//! Byte-range value type shared by the reassembly layers.
//!
//! A [`ByteRange`] couples an absolute sequence position with its backing
//! payload. Construction is the crate's validation boundary: the layers
//! above assume well-formed input and never signal errors mid-delivery.

use bytes::Bytes;
use thiserror::Error;

/// Errors rejected at the [`ByteRange`] construction boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// The payload was empty; a zero-length range carries no information.
    #[error("empty byte range at sequence {start}")]
    Empty { start: u64 },
    /// `start + len` does not fit in the sequence space.
    #[error("byte range at sequence {start} of {len} bytes overflows u64")]
    Overflow { start: u64, len: u64 },
}

/// A contiguous span of bytes `[start, end)` at absolute sequence positions.
///
/// The upper bound is derived from the payload, so `end - start == len(data)`
/// holds by construction. The payload is a [`Bytes`] handle: clipping and
/// splitting during insertion share the backing buffer instead of copying.
///
/// # Examples
///
/// ```
/// use reflow::ByteRange;
///
/// let range = ByteRange::new(5, &b"world"[..]).expect("non-empty payload");
/// assert_eq!(range.start(), 5);
/// assert_eq!(range.end(), 10);
/// assert_eq!(range.data().as_ref(), b"world");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    data: Bytes,
}

impl ByteRange {
    /// Create a range starting at `start` backed by `data`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Empty`] for a zero-length payload and
    /// [`RangeError::Overflow`] when the span does not fit in the `u64`
    /// sequence space.
    pub fn new(start: u64, data: impl Into<Bytes>) -> Result<Self, RangeError> {
        let data = data.into();
        if data.is_empty() {
            return Err(RangeError::Empty { start });
        }
        let len = data.len() as u64;
        if start.checked_add(len).is_none() {
            return Err(RangeError::Overflow { start, len });
        }
        Ok(Self { start, data })
    }

    /// Internal constructor for sub-ranges produced by splitting; callers
    /// guarantee the payload is non-empty and the span fits.
    pub(crate) fn from_parts(start: u64, data: Bytes) -> Self {
        debug_assert!(!data.is_empty());
        debug_assert!(start.checked_add(data.len() as u64).is_some());
        Self { start, data }
    }

    /// First sequence number covered by this range.
    #[must_use]
    pub const fn start(&self) -> u64 { self.start }

    /// One past the last sequence number covered by this range.
    #[must_use]
    pub fn end(&self) -> u64 { self.start + self.data.len() as u64 }

    /// Number of bytes in the range.
    #[must_use]
    pub fn len(&self) -> u64 { self.data.len() as u64 }

    /// Always `false`; empty ranges are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Borrow the backing payload.
    #[must_use]
    pub fn data(&self) -> &Bytes { &self.data }

    /// Whether `seq` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, seq: u64) -> bool { seq >= self.start && seq < self.end() }

    /// Slice the payload by absolute sequence positions `[from, to)`.
    pub(crate) fn slice_abs(&self, from: u64, to: u64) -> Bytes {
        debug_assert!(from >= self.start && to <= self.end() && from < to);
        self.data
            .slice(payload_index(from - self.start)..payload_index(to - self.start))
    }

    /// Drop the payload prefix below `seq`, keeping `[seq, end)`.
    pub(crate) fn advance_to(&mut self, seq: u64) {
        debug_assert!(seq > self.start && seq < self.end());
        self.data = self.data.slice(payload_index(seq - self.start)..);
        self.start = seq;
    }

    /// Discard the part of the range at or below `seq`.
    ///
    /// Returns `None` when the whole range lies at or below `seq`.
    pub(crate) fn clip_below(mut self, seq: u64) -> Option<Self> {
        if self.end() <= seq {
            return None;
        }
        if self.start < seq {
            self.advance_to(seq);
        }
        Some(self)
    }
}

fn payload_index(offset: u64) -> usize { usize::try_from(offset).unwrap_or(usize::MAX) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_payload() {
        let err = ByteRange::new(7, Bytes::new()).expect_err("empty payload must be rejected");
        assert_eq!(err, RangeError::Empty { start: 7 });
    }

    #[test]
    fn rejects_sequence_overflow() {
        let err = ByteRange::new(u64::MAX - 1, &b"abc"[..])
            .expect_err("span past u64::MAX must be rejected");
        assert_eq!(
            err,
            RangeError::Overflow {
                start: u64::MAX - 1,
                len: 3,
            }
        );
    }

    #[test]
    fn derives_end_from_payload() {
        let range = ByteRange::new(10, &b"hello"[..]).expect("valid range");
        assert_eq!(range.end(), 15);
        assert_eq!(range.len(), 5);
        assert!(range.contains(10));
        assert!(range.contains(14));
        assert!(!range.contains(15));
    }

    #[test]
    fn clip_below_drops_stale_prefix() {
        let range = ByteRange::new(10, &b"hello"[..]).expect("valid range");

        let clipped = range.clone().clip_below(12).expect("tail survives");
        assert_eq!(clipped.start(), 12);
        assert_eq!(clipped.data().as_ref(), b"llo");

        assert_eq!(range.clone().clip_below(10).expect("untouched"), range);
        assert!(range.clip_below(15).is_none());
    }

    #[test]
    fn slice_abs_uses_sequence_positions() {
        let range = ByteRange::new(10, &b"hello"[..]).expect("valid range");
        assert_eq!(range.slice_abs(11, 14).as_ref(), b"ell");
    }
}
