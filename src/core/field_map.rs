//! Declarative field maps.
//!
//! A `FieldMap` is the schema of one entity kind: an ordered list of
//! output columns, each pointing at a location in the raw document with
//! a declared kind, a default, and an optional transform.

use chrono::{Duration, NaiveDateTime};
use serde_json::Value as Json;
use thiserror::Error;

use super::path::FieldPath;
use super::value::{FieldKind, Value};

// =============================================================================
// Transforms
// =============================================================================

/// Why a transform could not produce a value. Never surfaced to callers:
/// the extractor substitutes the field default.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("not a number: {0}")]
    NotANumber(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unexpected shape: {0}")]
    Unexpected(String),
}

/// Which part of a parsed timestamp to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPart {
    DateTime,
    Date,
    Time,
}

/// Post-resolution transform applied to a field's raw value.
#[derive(Debug, Clone)]
pub enum Transform {
    /// `numerator / denominator`, both paths relative to the resolved value.
    Ratio {
        numerator: FieldPath,
        denominator: FieldPath,
    },
    /// `minuend - subtrahend`, both paths relative to the resolved value.
    Difference {
        minuend: FieldPath,
        subtrahend: FieldPath,
    },
    /// Parse with `format`, shift by `shift`, keep `part`.
    Timestamp {
        format: &'static str,
        shift: Duration,
        part: TimestampPart,
    },
    /// Remove everything except alphanumerics, whitespace and hyphens.
    StripPunctuation,
    /// Packed lineup slot: `300` → 3, `301` → null.
    PackedBattingOrder,
    /// True iff the resolved value equals the literal.
    Equals(Json),
    /// Leading year of a season string (`"20192020"` → 2019).
    SeasonPrefix,
    /// Leading integer of a `"W-L"` record string; index 0 wins, 1 losses.
    RecordPart(usize),
    Custom(fn(&Json) -> Result<Value, TransformError>),
}

impl Transform {
    pub fn ratio(numerator: &str, denominator: &str) -> Self {
        Self::Ratio {
            numerator: FieldPath::parse(numerator),
            denominator: FieldPath::parse(denominator),
        }
    }

    pub fn difference(minuend: &str, subtrahend: &str) -> Self {
        Self::Difference {
            minuend: FieldPath::parse(minuend),
            subtrahend: FieldPath::parse(subtrahend),
        }
    }

    pub fn apply(&self, raw: &Json) -> Result<Value, TransformError> {
        match self {
            Self::Ratio {
                numerator,
                denominator,
            } => {
                let n = number_at(raw, numerator)?;
                let d = number_at(raw, denominator)?;
                if d == 0.0 {
                    return Err(TransformError::DivisionByZero);
                }
                Ok(Value::Float(n / d))
            }
            Self::Difference {
                minuend,
                subtrahend,
            } => {
                let a = number_at(raw, minuend)?;
                let b = number_at(raw, subtrahend)?;
                let diff = a - b;
                if diff.fract() == 0.0 {
                    Ok(Value::Int(diff as i64))
                } else {
                    Ok(Value::Float(diff))
                }
            }
            Self::Timestamp {
                format,
                shift,
                part,
            } => {
                let text = raw
                    .as_str()
                    .ok_or_else(|| TransformError::InvalidTimestamp(raw.to_string()))?;
                let parsed = NaiveDateTime::parse_from_str(text, format)
                    .map_err(|e| TransformError::InvalidTimestamp(format!("{text}: {e}")))?;
                let shifted = parsed + *shift;
                Ok(match part {
                    TimestampPart::DateTime => Value::Timestamp(shifted),
                    TimestampPart::Date => Value::Date(shifted.date()),
                    TimestampPart::Time => Value::Time(shifted.time()),
                })
            }
            Self::StripPunctuation => {
                let text = raw
                    .as_str()
                    .ok_or_else(|| TransformError::Unexpected(raw.to_string()))?;
                let cleaned: String = text
                    .chars()
                    .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
                    .collect();
                let cleaned = cleaned.trim();
                if cleaned.is_empty() {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Text(cleaned.to_string()))
                }
            }
            Self::PackedBattingOrder => {
                let packed = as_number(raw)?;
                if packed.fract() != 0.0 {
                    return Err(TransformError::NotANumber(raw.to_string()));
                }
                Ok(crate::core::derive::batting_order(packed as i64)
                    .map(|slot| Value::Int(i64::from(slot)))
                    .unwrap_or(Value::Null))
            }
            Self::Equals(expected) => Ok(Value::Bool(raw == expected)),
            Self::SeasonPrefix => {
                let text = match raw {
                    Json::String(s) => s.clone(),
                    Json::Number(n) => n.to_string(),
                    _ => return Err(TransformError::Unexpected(raw.to_string())),
                };
                text.get(..4)
                    .and_then(|y| y.parse::<i64>().ok())
                    .map(Value::Int)
                    .ok_or(TransformError::NotANumber(text))
            }
            Self::RecordPart(index) => {
                let text = raw
                    .as_str()
                    .ok_or_else(|| TransformError::Unexpected(raw.to_string()))?;
                text.split('-')
                    .nth(*index)
                    .and_then(|p| p.trim().parse::<i64>().ok())
                    .map(Value::Int)
                    .ok_or_else(|| TransformError::NotANumber(text.to_string()))
            }
            Self::Custom(f) => f(raw),
        }
    }
}

fn number_at(raw: &Json, path: &FieldPath) -> Result<f64, TransformError> {
    let value = path
        .resolve(raw)
        .ok_or_else(|| TransformError::Unexpected(format!("missing {path}")))?;
    as_number(value)
}

fn as_number(raw: &Json) -> Result<f64, TransformError> {
    match raw {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| TransformError::NotANumber(n.to_string())),
        Json::String(s) => s
            .trim()
            .trim_matches('"')
            .parse()
            .map_err(|_| TransformError::NotANumber(s.clone())),
        other => Err(TransformError::NotANumber(other.to_string())),
    }
}

// =============================================================================
// Field specs
// =============================================================================

/// Where a field's value comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Resolved from the raw document.
    Path(FieldPath),
    /// Filled by the entity composer after extraction.
    Derived,
}

/// One output column.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub source: Source,
    pub kind: FieldKind,
    pub default: Value,
    pub transform: Option<Transform>,
}

impl FieldSpec {
    pub fn new(name: &str, path: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            source: Source::Path(FieldPath::parse(path)),
            kind,
            default: Value::Null,
            transform: None,
        }
    }

    /// A column computed by a derived-field rule rather than extracted.
    pub fn derived(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            source: Source::Derived,
            kind,
            default: Value::Null,
            transform: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

// =============================================================================
// Field map
// =============================================================================

/// Ordered schema for one entity kind.
#[derive(Debug, Clone)]
pub struct FieldMap {
    entity: &'static str,
    specs: Vec<FieldSpec>,
}

impl FieldMap {
    /// Build a map. Panics on duplicate column names, which is a
    /// programming error in a static declaration.
    pub fn new(entity: &'static str, specs: Vec<FieldSpec>) -> Self {
        for (i, spec) in specs.iter().enumerate() {
            assert!(
                specs[..i].iter().all(|s| s.name != spec.name),
                "duplicate field {} in {entity}",
                spec.name
            );
        }
        Self { entity, specs }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Column names in declared order.
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.clone()).collect()
    }
}
