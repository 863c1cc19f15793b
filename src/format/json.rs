//! JSON rendering, one object per record.

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};

use super::{Record, RecordFormatter, Value};

/// How time values are rendered in JSON output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    /// Seconds since the Unix epoch, as a double.
    #[default]
    Epoch,
    /// ISO 8601 timestamp string.
    Iso8601,
    /// Milliseconds since the Unix epoch, as an integer; some consumers
    /// (e.g. Elasticsearch) require this.
    Millis,
}

/// Formatter producing one JSON object per record.
///
/// Unset fields are omitted from the object rather than emitted as null,
/// so a record always parses back into exactly the fields that were set.
///
/// # Examples
///
/// ```
/// use reflow::{Json, Record, RecordFormatter, Value};
///
/// let record = Record::new()
///     .field("fid", Value::Text("Fa1b2c".to_owned()))
///     .field("delivered_bytes", Value::Count(10))
///     .unset("parent");
/// assert_eq!(
///     Json::default().format(&record),
///     r#"{"fid":"Fa1b2c","delivered_bytes":10}"#
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Json {
    timestamps: TimeFormat,
}

impl Json {
    /// Create a formatter rendering time values with `timestamps`.
    #[must_use]
    pub const fn new(timestamps: TimeFormat) -> Self { Self { timestamps } }

    fn convert(&self, value: &Value) -> serde_json::Value {
        match value {
            Value::Count(v) => (*v).into(),
            Value::Int(v) => (*v).into(),
            Value::Double(v) => number_or_null(*v),
            Value::Time(v) => self.convert_time(*v),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::Set(values) => {
                serde_json::Value::Array(values.iter().map(|v| self.convert(v)).collect())
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn convert_time(&self, seconds: f64) -> serde_json::Value {
        match self.timestamps {
            TimeFormat::Epoch => number_or_null(seconds),
            TimeFormat::Millis => {
                if seconds.is_finite() {
                    serde_json::Value::Number(((seconds * 1000.0).round() as i64).into())
                } else {
                    serde_json::Value::Null
                }
            }
            TimeFormat::Iso8601 => {
                if !seconds.is_finite() {
                    return serde_json::Value::Null;
                }
                let secs = seconds.div_euclid(1.0) as i64;
                let nanos = ((seconds.rem_euclid(1.0)) * 1e9).round() as u32;
                DateTime::from_timestamp(secs, nanos.min(999_999_999)).map_or(
                    serde_json::Value::Null,
                    |timestamp| {
                        serde_json::Value::String(
                            timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                        )
                    },
                )
            }
        }
    }
}

impl RecordFormatter for Json {
    fn format(&self, record: &Record) -> String {
        let mut object = Map::new();
        for field in record.fields() {
            if let Some(value) = field.value() {
                object.insert(field.name().to_owned(), self.convert(value));
            }
        }
        serde_json::Value::Object(object).to_string()
    }
}

fn number_or_null(value: f64) -> serde_json::Value {
    Number::from_f64(value).map_or(serde_json::Value::Null, serde_json::Value::Number)
}
