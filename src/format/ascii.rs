//! Column-oriented rendering in the classic tab-separated log style.

use serde::{Deserialize, Serialize};

use super::{Record, RecordFormatter, Value};

/// Separators and markers for the ASCII form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparatorConfig {
    /// Separator between fields.
    pub separator: String,
    /// Separator between the elements of a set value.
    pub set_separator: String,
    /// Marker for a field with no value.
    pub unset_field: String,
    /// Marker for a set that is present but empty.
    pub empty_field: String,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            separator: "\t".to_owned(),
            set_separator: ",".to_owned(),
            unset_field: "-".to_owned(),
            empty_field: "(empty)".to_owned(),
        }
    }
}

/// Formatter producing one separated line per record.
///
/// # Examples
///
/// ```
/// use reflow::{Ascii, Record, RecordFormatter, Value};
///
/// let record = Record::new()
///     .field("delivered_bytes", Value::Count(10))
///     .unset("fid")
///     .field("gaps", Value::Set(vec![]));
/// assert_eq!(Ascii::default().format(&record), "10\t-\t(empty)");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Ascii {
    separators: SeparatorConfig,
    size_limit: Option<usize>,
}

impl Ascii {
    /// Create a formatter with the given separators.
    #[must_use]
    pub fn new(separators: SeparatorConfig) -> Self {
        Self {
            separators,
            size_limit: None,
        }
    }

    /// Soft cap on the rendered line length.
    ///
    /// Oversized values are cut to keep the line near the limit while the
    /// column structure stays intact; the result may still run slightly
    /// past the limit. Numeric fields are never cut.
    #[must_use]
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    fn describe(&self, value: &Value) -> String {
        match value {
            Value::Count(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Double(v) | Value::Time(v) => format!("{v:.6}"),
            Value::Text(text) => text.clone(),
            Value::Set(values) => {
                if values.is_empty() {
                    self.separators.empty_field.clone()
                } else {
                    values
                        .iter()
                        .map(|v| self.describe(v))
                        .collect::<Vec<_>>()
                        .join(&self.separators.set_separator)
                }
            }
        }
    }
}

impl RecordFormatter for Ascii {
    fn format(&self, record: &Record) -> String {
        let mut out = String::new();
        for (position, field) in record.fields().iter().enumerate() {
            if position > 0 {
                out.push_str(&self.separators.separator);
            }
            let mut cell = field.value().map_or_else(
                || self.separators.unset_field.clone(),
                |value| self.describe(value),
            );
            if let Some(limit) = self.size_limit {
                let budget = limit.saturating_sub(out.len());
                let can_cut = matches!(field.value(), Some(Value::Text(_) | Value::Set(_)));
                if can_cut && cell.len() > budget {
                    truncate_on_boundary(&mut cell, budget);
                }
            }
            out.push_str(&cell);
        }
        out
    }
}

fn truncate_on_boundary(text: &mut String, mut at: usize) {
    while at < text.len() && !text.is_char_boundary(at) {
        at += 1;
    }
    text.truncate(at);
}
