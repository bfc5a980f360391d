//! Field extractor: raw document + field map → flat record.

use serde_json::Value as Json;
use tracing::trace;

use super::field_map::{FieldMap, FieldSpec, Source};
use super::record::Record;
use super::value::Value;

/// Extract one record from one document.
///
/// The result has exactly `map.len()` fields in the map's order. Missing
/// paths, transform failures and coercion failures all fall back to the
/// field's default; this function never fails and has no side effects.
pub fn extract(doc: &Json, map: &FieldMap) -> Record {
    let fields = map
        .specs()
        .iter()
        .map(|spec| (spec.name.clone(), extract_field(doc, spec)))
        .collect();
    Record::from_fields(fields)
}

/// Extract every document of a sequence with the same map.
pub fn extract_all<'a, I>(docs: I, map: &FieldMap) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Json>,
{
    docs.into_iter().map(|doc| extract(doc, map)).collect()
}

fn extract_field(doc: &Json, spec: &FieldSpec) -> Value {
    let path = match &spec.source {
        Source::Path(path) => path,
        Source::Derived => return spec.default.clone(),
    };

    let Some(raw) = path.resolve(doc) else {
        return spec.default.clone();
    };

    let value = match &spec.transform {
        Some(transform) => match transform.apply(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                trace!(field = %spec.name, error = %e, "transform fell back to default");
                None
            }
        },
        None => spec.kind.coerce(raw),
    };

    match value {
        Some(Value::Null) | None => spec.default.clone(),
        Some(v) => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field_map::Transform;
    use crate::core::value::FieldKind;
    use serde_json::json;

    fn map() -> FieldMap {
        FieldMap::new(
            "test",
            vec![
                FieldSpec::new("PlayerId", "person.id", FieldKind::Int),
                FieldSpec::new("HomeRuns", "stats.batting.homeRuns", FieldKind::Int),
                FieldSpec::new("Era", "stats.pitching.runsScoredPer9", FieldKind::Float),
                FieldSpec::new("Hits", "stats.batting.hits", FieldKind::Int).with_default(0i64),
                FieldSpec::new("FtPct", "stats.shooting", FieldKind::Float)
                    .with_transform(Transform::ratio("FTM", "FTA")),
                FieldSpec::derived("TeamResult", FieldKind::Text),
            ],
        )
    }

    #[test]
    fn test_extract_order_and_cardinality() {
        let r = extract(&json!({}), &map());
        let names: Vec<&str> = r.names().collect();
        assert_eq!(names, ["PlayerId", "HomeRuns", "Era", "Hits", "FtPct", "TeamResult"]);
    }

    #[test]
    fn test_extract_defaults_on_missing() {
        let r = extract(&json!({"person": {"id": 7}, "stats": {"batting": null}}), &map());
        assert_eq!(r.get("PlayerId"), Some(&Value::Int(7)));
        assert_eq!(r.get("HomeRuns"), Some(&Value::Null));
        assert_eq!(r.get("Hits"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_extract_sentinel_and_failed_transform() {
        let doc = json!({
            "stats": {
                "pitching": {"runsScoredPer9": "-.--"},
                "shooting": {"FTM": 0, "FTA": 0}
            }
        });
        let r = extract(&doc, &map());
        assert_eq!(r.get("Era"), Some(&Value::Null));
        assert_eq!(r.get("FtPct"), Some(&Value::Null));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = json!({"person": {"id": 1}, "stats": {"batting": {"homeRuns": 2}}});
        assert_eq!(extract(&doc, &map()), extract(&doc, &map()));
    }
}
