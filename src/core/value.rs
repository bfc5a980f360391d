//! Scalar values carried by records.
//!
//! A `Value` is what one field of a flat record holds after extraction.
//! Each value knows how to render itself as a CSV cell and how to be
//! parsed back from one, given the declared `FieldKind` of its column.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

/// Rendering format for timestamps (ISO-8601 without offset). Fractional
/// seconds are written only when present.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Rendering format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Rendering format for times of day.
pub const TIME_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Field kinds
// =============================================================================

/// Declared type of a record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    Date,
    Time,
}

impl FieldKind {
    /// Coerce a raw JSON scalar into this kind.
    ///
    /// Numeric strings become numbers, numbers become text for `Text`
    /// columns, and blank strings become `Null`. Returns `None` when the
    /// value cannot be represented (objects, arrays, garbage strings).
    pub fn coerce(&self, raw: &serde_json::Value) -> Option<Value> {
        use serde_json::Value as Json;

        match raw {
            Json::Null => Some(Value::Null),
            Json::String(s) if s.trim().is_empty() => Some(Value::Null),
            Json::Object(_) | Json::Array(_) => None,
            _ => match self {
                Self::Bool => match raw {
                    Json::Bool(b) => Some(Value::Bool(*b)),
                    Json::Number(n) => n.as_i64().map(|i| Value::Bool(i != 0)),
                    Json::String(s) => parse_bool(s).map(Value::Bool),
                    _ => None,
                },
                Self::Int => match raw {
                    Json::Number(n) => n
                        .as_i64()
                        .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                        .map(Value::Int),
                    Json::String(s) => s.trim().parse::<i64>().ok().map(Value::Int),
                    Json::Bool(b) => Some(Value::Int(i64::from(*b))),
                    _ => None,
                },
                Self::Float => match raw {
                    Json::Number(n) => n.as_f64().map(Value::Float),
                    Json::String(s) => s
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(Value::Float),
                    _ => None,
                },
                Self::Text => match raw {
                    Json::String(s) => Some(Value::Text(s.trim().to_string())),
                    Json::Number(n) => Some(Value::Text(n.to_string())),
                    Json::Bool(b) => Some(Value::Text(b.to_string())),
                    _ => None,
                },
                Self::Timestamp | Self::Date | Self::Time => match raw {
                    Json::String(s) => self.parse_cell(s).ok(),
                    _ => None,
                },
            },
        }
    }

    /// Parse a CSV cell produced by `Value::to_cell` back into a value.
    pub fn parse_cell(&self, cell: &str) -> Result<Value, String> {
        if cell.is_empty() {
            return Ok(Value::Null);
        }
        let parsed = match self {
            Self::Bool => parse_bool(cell).map(Value::Bool),
            Self::Int => cell.parse().ok().map(Value::Int),
            Self::Float => cell.parse().ok().map(Value::Float),
            Self::Text => Some(Value::Text(cell.to_string())),
            Self::Timestamp => NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT)
                .ok()
                .map(Value::Timestamp),
            Self::Date => NaiveDate::parse_from_str(cell, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            Self::Time => NaiveTime::parse_from_str(cell, TIME_FORMAT)
                .ok()
                .map(Value::Time),
        };
        parsed.ok_or_else(|| format!("invalid {:?} cell: {cell:?}", self))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Value
// =============================================================================

/// One scalar field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render as a CSV cell. Null renders as the empty string.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::Time(t) => t.format(TIME_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Timestamp(_) | Self::Date(_) | Self::Time(_) => {
                serializer.serialize_str(&self.to_cell())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(FieldKind::Float.coerce(&json!("6.0")), Some(Value::Float(6.0)));
        assert_eq!(FieldKind::Int.coerce(&json!("12")), Some(Value::Int(12)));
        assert_eq!(FieldKind::Int.coerce(&json!(3.0)), Some(Value::Int(3)));
        assert_eq!(FieldKind::Float.coerce(&json!("-.--")), None);
    }

    #[test]
    fn test_coerce_blank_is_null() {
        assert_eq!(FieldKind::Text.coerce(&json!("   ")), Some(Value::Null));
        assert_eq!(FieldKind::Int.coerce(&json!(null)), Some(Value::Null));
    }

    #[test]
    fn test_coerce_rejects_containers() {
        assert_eq!(FieldKind::Text.coerce(&json!({"a": 1})), None);
        assert_eq!(FieldKind::Int.coerce(&json!([1, 2])), None);
    }

    #[test]
    fn test_cell_round_trip_per_kind() {
        let ts = NaiveDate::from_ymd_opt(2019, 3, 28)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap();
        let cases = [
            (FieldKind::Bool, Value::Bool(true)),
            (FieldKind::Int, Value::Int(-4)),
            (FieldKind::Float, Value::Float(0.333)),
            (FieldKind::Text, Value::Text("Top, 1st".into())),
            (FieldKind::Timestamp, Value::Timestamp(ts)),
            (FieldKind::Date, Value::Date(ts.date())),
            (FieldKind::Time, Value::Time(ts.time())),
            (FieldKind::Int, Value::Null),
        ];
        for (kind, value) in cases {
            assert_eq!(kind.parse_cell(&value.to_cell()).unwrap(), value);
        }
    }

    #[test]
    fn test_timestamp_keeps_milliseconds() {
        let ts = NaiveDate::from_ymd_opt(2020, 9, 12)
            .unwrap()
            .and_hms_milli_opt(20, 26, 40, 123)
            .unwrap();
        let cell = Value::Timestamp(ts).to_cell();
        assert_eq!(cell, "2020-09-12T20:26:40.123");
        assert_eq!(FieldKind::Timestamp.parse_cell(&cell), Ok(Value::Timestamp(ts)));
        // whole seconds render without a fraction
        assert_eq!(
            FieldKind::Timestamp.parse_cell("2020-09-12T20:26:40").unwrap().to_cell(),
            "2020-09-12T20:26:40"
        );
    }

    #[test]
    fn test_serialize_scalars() {
        let v = serde_json::to_value(Value::Text("W".into())).unwrap();
        assert_eq!(v, json!("W"));
        let v = serde_json::to_value(Value::Null).unwrap();
        assert_eq!(v, json!(null));
    }
}
