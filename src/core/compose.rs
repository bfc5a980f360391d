//! Entity composer.
//!
//! Assembles a parent record with its child tables into the nested form
//! posted to the ingestion endpoint, and decides which child candidates
//! actually took part in the game.

use serde_json::Value as Json;
use tracing::debug;

use super::error::CoreError;
use super::extract::extract;
use super::field_map::FieldMap;
use super::path::FieldPath;
use super::record::{NestedRecord, Record};
use super::table::Table;

/// Statistic groups that make a candidate "real". A candidate with none of
/// them present in its source document did not participate.
#[derive(Debug, Clone)]
pub struct ParticipationRule {
    groups: Vec<FieldPath>,
}

impl ParticipationRule {
    pub fn new(groups: &[&str]) -> Self {
        Self {
            groups: groups.iter().map(|g| FieldPath::parse(g)).collect(),
        }
    }

    /// True when at least one statistic group has content.
    pub fn participated(&self, doc: &Json) -> bool {
        self.groups.iter().any(|g| g.is_present(doc))
    }
}

/// Extract the candidates that participated into a table for `map`.
pub fn filter_participants<'a, I>(
    candidates: I,
    rule: &ParticipationRule,
    map: &FieldMap,
) -> Result<Table, CoreError>
where
    I: IntoIterator<Item = &'a Json>,
{
    let mut table = Table::for_map(map);
    let mut dropped = 0usize;
    for doc in candidates {
        if rule.participated(doc) {
            table.append(extract(doc, map))?;
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!(entity = map.entity(), dropped, kept = table.len(), "Dropped non-participants");
    }
    Ok(table)
}

/// Record-level check: at least one of `fields` is non-null.
pub fn has_any_stat(record: &Record, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|f| record.get(f).is_some_and(|v| !v.is_null()))
}

/// Parent fields followed by one array per named child table.
pub fn compose(parent: Record, children: Vec<(String, &Table)>) -> NestedRecord {
    let children = children
        .into_iter()
        .map(|(name, table)| (name, table.records().to_vec()))
        .collect();
    NestedRecord { parent, children }
}
