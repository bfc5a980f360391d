//! Field paths into raw documents.

use std::fmt;

use serde_json::Value as Json;

/// One step of a path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a scalar inside a raw document.
///
/// Parsed from dotted text. A purely numeric segment is an array index,
/// so `"players.0.player.id"` walks into the first element of `players`.
/// The empty path refers to the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(dotted: &str) -> Self {
        let segments = dotted
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(i) => Segment::Index(i),
                Err(_) => Segment::Key(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk the document. Missing keys, out-of-range indices, container
    /// mismatches and JSON `null` all resolve to `None`.
    pub fn resolve<'a>(&self, doc: &'a Json) -> Option<&'a Json> {
        let mut current = doc;
        for segment in &self.segments {
            current = match (segment, current) {
                (Segment::Key(key), Json::Object(map)) => map.get(key)?,
                (Segment::Index(i), Json::Array(items)) => items.get(*i)?,
                // Objects keyed by numeric strings.
                (Segment::Index(i), Json::Object(map)) => map.get(&i.to_string())?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// True when the path resolves to something with content: a non-empty
    /// object or array, or any non-null scalar.
    pub fn is_present(&self, doc: &Json) -> bool {
        match self.resolve(doc) {
            Some(Json::Object(map)) => !map.is_empty(),
            Some(Json::Array(items)) => !items.is_empty(),
            Some(_) => true,
            None => false,
        }
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Key(k) => k.clone(),
                Segment::Index(i) => i.to_string(),
            })
            .collect();
        f.write_str(&parts.join("."))
    }
}
