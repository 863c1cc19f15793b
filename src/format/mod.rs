//! Analysis-record formatting.
//!
//! The reassembly engine's downstream consumers serialize per-stream
//! analysis entries as text. A [`Record`] is an ordered list of named
//! [`Value`]s; a [`RecordFormatter`] renders one record per line. Two
//! formatters ship with the crate: [`Ascii`] (separated columns with
//! configurable unset/empty markers) and [`Json`] (one object per record).

mod ascii;
mod json;
mod value;

pub use ascii::{Ascii, SeparatorConfig};
pub use json::{Json, TimeFormat};
pub use value::{Field, Record, Value};

/// Render analysis records into a line-oriented textual form.
pub trait RecordFormatter {
    /// Format one record as a single line (without the trailing newline).
    fn format(&self, record: &Record) -> String;
}

#[cfg(test)]
mod tests;
