//! Injury reports scraped from the basketball and hockey reference sites.
//!
//! Both sites publish a single `table#injuries` whose cells carry a
//! `data-stat` attribute. Each body row becomes one object keyed by those
//! attributes and is extracted like any other document.

use chrono::NaiveDate;
use scraper::Html;
use serde_json::{Map, Value as Json};

use super::{entity_kind, selector, text_of, EntityKind};
use crate::core::field_map::{Transform, TransformError};
use crate::core::{CoreError, FieldKind, FieldMap, FieldSpec, Table, Value};

entity_kind!(NbaInjury, "nba_injuries", nba_map);
entity_kind!(NhlInjury, "nhl_injuries", nhl_map);

fn nba_map() -> FieldMap {
    FieldMap::new(
        "nba injury",
        vec![
            FieldSpec::derived("ReportDate", FieldKind::Date),
            FieldSpec::new("PlayerName", "player", FieldKind::Text),
            FieldSpec::new("NbaTeam", "team_name", FieldKind::Text),
            FieldSpec::new("InjuryUpdateDate", "date_update", FieldKind::Text),
            FieldSpec::new("InjuryStatus", "note", FieldKind::Text)
                .with_transform(Transform::Custom(note_status)),
            FieldSpec::new("InjuryType", "note", FieldKind::Text)
                .with_transform(Transform::Custom(note_type)),
            FieldSpec::new("Details", "note", FieldKind::Text)
                .with_transform(Transform::Custom(note_details)),
        ],
    )
}

fn nhl_map() -> FieldMap {
    FieldMap::new(
        "nhl injury",
        vec![
            FieldSpec::derived("ReportDate", FieldKind::Date),
            FieldSpec::new("PlayerName", "player", FieldKind::Text),
            FieldSpec::new("NhlTeam", "team_name", FieldKind::Text),
            FieldSpec::new("DateOfInjury", "date_injury", FieldKind::Text),
            FieldSpec::new("InjuryType", "injury_type", FieldKind::Text),
            FieldSpec::new("Details", "injury_note", FieldKind::Text),
        ],
    )
}

// =============================================================================
// Notes
// =============================================================================

/// A basketball injury note split into its parts, e.g.
/// `"Day To Day (Illness) - Walker is questionable for Friday"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjuryNote<'a> {
    pub status: Option<&'a str>,
    pub injury_type: Option<&'a str>,
    pub details: Option<&'a str>,
}

impl<'a> InjuryNote<'a> {
    /// Details follow the first `" - "`; the type is the parenthesized
    /// part of what precedes it.
    pub fn parse(note: &'a str) -> Self {
        let non_empty = |s: &'a str| Some(s.trim()).filter(|s| !s.is_empty());
        let (head, details) = match note.split_once(" - ") {
            Some((head, details)) => (head, non_empty(details)),
            None => (note, None),
        };
        let (status, injury_type) = match head.split_once('(') {
            Some((status, rest)) => (status, non_empty(rest.split(')').next().unwrap_or_default())),
            None => (head, None),
        };
        Self {
            status: non_empty(status),
            injury_type,
            details,
        }
    }
}

fn parse_note_cell(raw: &Json) -> Result<InjuryNote<'_>, TransformError> {
    raw.as_str()
        .map(InjuryNote::parse)
        .ok_or_else(|| TransformError::Unexpected(raw.to_string()))
}

fn text(part: Option<&str>) -> Value {
    part.map(Value::from).unwrap_or_default()
}

fn note_status(raw: &Json) -> Result<Value, TransformError> {
    parse_note_cell(raw).map(|n| text(n.status))
}

fn note_type(raw: &Json) -> Result<Value, TransformError> {
    parse_note_cell(raw).map(|n| text(n.injury_type))
}

fn note_details(raw: &Json) -> Result<Value, TransformError> {
    parse_note_cell(raw).map(|n| text(n.details))
}

// =============================================================================
// Page parsing
// =============================================================================

/// One object per body row of `table#injuries`, keyed by each cell's
/// `data-stat` attribute. Repeated header rows inside the body are skipped.
pub fn injury_rows(html: &str) -> Result<Vec<Json>, CoreError> {
    let document = Html::parse_document(html);
    let rows = selector("table#injuries > tbody > tr:not(.thead)")?;
    let cells = selector("th[data-stat], td[data-stat]")?;

    let mut out = Vec::new();
    for row in document.select(&rows) {
        let doc: Map<String, Json> = row
            .select(&cells)
            .filter_map(|cell| {
                let key = cell.value().attr("data-stat")?;
                Some((key.to_string(), Json::String(text_of(cell))))
            })
            .collect();
        if !doc.is_empty() {
            out.push(Json::Object(doc));
        }
    }
    Ok(out)
}

fn injury_table<E: EntityKind>(html: &str, report_date: NaiveDate) -> Result<Table, CoreError> {
    let mut table = E::empty_table();
    for row in injury_rows(html)? {
        let record = E::extract(&row);
        if record.get("PlayerName").map_or(true, Value::is_null) {
            continue;
        }
        table.append(record.with("ReportDate", Value::Date(report_date)))?;
    }
    Ok(table)
}

/// Basketball injury report as of `report_date`.
pub fn nba_injuries(html: &str, report_date: NaiveDate) -> Result<Table, CoreError> {
    injury_table::<NbaInjury>(html, report_date)
}

/// Hockey injury report as of `report_date`.
pub fn nhl_injuries(html: &str, report_date: NaiveDate) -> Result<Table, CoreError> {
    injury_table::<NhlInjury>(html, report_date)
}
