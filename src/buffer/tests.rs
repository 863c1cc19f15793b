//! Unit tests for the ordered range buffer.
//!
//! Split into focused submodules: the slot arena on its own, then the
//! ordered list's insertion, overlap, and trim behaviour.
