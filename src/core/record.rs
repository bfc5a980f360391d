//! Flat and nested records.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::value::Value;

/// Ordered mapping from field name to scalar value.
///
/// Field order is fixed at construction. `with` replaces the value of an
/// existing field and hands back a new record; it never adds or removes
/// columns, so the schema of a record is stable for its whole life.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn from_fields(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Field values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// True when both records carry the same names in the same order.
    pub fn same_schema(&self, names: &[String]) -> bool {
        self.fields.len() == names.len()
            && self.fields.iter().zip(names).all(|((n, _), m)| n == m)
    }

    /// Replace the value of `name`. Unknown names are ignored.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.into();
        }
        self
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A parent record with named child collections embedded as arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedRecord {
    pub parent: Record,
    pub children: Vec<(String, Vec<Record>)>,
}

impl NestedRecord {
    pub fn child(&self, name: &str) -> Option<&[Record]> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.as_slice())
    }
}

impl Serialize for NestedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map =
            serializer.serialize_map(Some(self.parent.len() + self.children.len()))?;
        for (name, value) in self.parent.fields() {
            map.serialize_entry(name, value)?;
        }
        for (name, rows) in &self.children {
            map.serialize_entry(name, rows)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::from_fields(vec![
            ("GameId".into(), Value::Int(1)),
            ("TeamResult".into(), Value::Null),
        ])
    }

    #[test]
    fn test_with_replaces_without_reshaping() {
        let r = record().with("TeamResult", "W").with("Unknown", 5i64);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("TeamResult"), Some(&Value::Text("W".into())));
        assert!(r.get("Unknown").is_none());
    }

    #[test]
    fn test_serialize_preserves_order() {
        let text = serde_json::to_string(&record()).unwrap();
        assert_eq!(text, r#"{"GameId":1,"TeamResult":null}"#);
    }

    #[test]
    fn test_nested_serialization() {
        let nested = NestedRecord {
            parent: record(),
            children: vec![("AwayPlayers".into(), vec![record()])],
        };
        let text = serde_json::to_string(&nested).unwrap();
        assert_eq!(
            text,
            r#"{"GameId":1,"TeamResult":null,"AwayPlayers":[{"GameId":1,"TeamResult":null}]}"#
        );
    }
}
