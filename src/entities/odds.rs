//! Game-line odds from the sportsbook event feed.
//!
//! An event carries its markets inside display groups. The moneyline,
//! spread and total markets for the full match are pulled out into one
//! flat document per event before extraction, keyed by outcome side.

use chrono::{DateTime, Duration};
use serde_json::{json, Map, Value as Json};

use super::{children_at, entity_kind, EntityKind, DISPLAY_OFFSET_HOURS};
use crate::core::field_map::{Transform, TransformError};
use crate::core::{CoreError, FieldKind, FieldMap, FieldSpec, Sport, Table, Value};

const SPREAD_MARKETS: [&str; 2] = ["Point Spread", "Puck Line"];

entity_kind!(GameOdds, "odds", odds_map);

fn start_time(raw: &Json) -> Result<Value, TransformError> {
    let millis = raw
        .as_i64()
        .ok_or_else(|| TransformError::NotANumber(raw.to_string()))?;
    DateTime::from_timestamp_millis(millis)
        .map(|utc| Value::Timestamp(utc.naive_utc() + Duration::hours(DISPLAY_OFFSET_HOURS)))
        .ok_or_else(|| TransformError::InvalidTimestamp(millis.to_string()))
}

fn odds_map() -> FieldMap {
    let mut specs = vec![
        FieldSpec::new("EventDescription", "description", FieldKind::Text),
        FieldSpec::new("EventStartTime", "startTime", FieldKind::Timestamp)
            .with_transform(Transform::Custom(start_time)),
    ];
    for (side, prefix) in [("A", "Away"), ("H", "Home")] {
        specs.extend([
            FieldSpec::new(
                &format!("{prefix}TeamName"),
                &format!("moneyline.{side}.description"),
                FieldKind::Text,
            ),
            FieldSpec::new(
                &format!("{prefix}MoneylineOddsAmerican"),
                &format!("moneyline.{side}.price.american"),
                FieldKind::Int,
            ),
            FieldSpec::new(
                &format!("{prefix}MoneylineOddsDecimal"),
                &format!("moneyline.{side}.price.decimal"),
                FieldKind::Float,
            ),
            FieldSpec::new(
                &format!("{prefix}Handicap"),
                &format!("spread.{side}.price.handicap"),
                FieldKind::Float,
            ),
        ]);
    }
    specs.push(FieldSpec::new("OverUnder", "total.Over.price.handicap", FieldKind::Float));
    FieldMap::new("game odds", specs)
}

/// Feed path segments for a sport, if the book carries it.
pub fn feed_path(sport: Sport) -> Option<(&'static str, &'static str)> {
    match sport {
        Sport::Mlb => Some(("baseball", "mlb")),
        Sport::Nhl => Some(("hockey", "nhl")),
        Sport::Nba => Some(("basketball", "nba")),
        Sport::Nfl => Some(("football", "nfl")),
        Sport::Xfl => None,
    }
}

/// Reduce an event to its match-period game lines.
pub fn game_lines(event: &Json) -> Json {
    let mut moneyline = Map::new();
    let mut spread = Map::new();
    let mut total = Map::new();
    for group in children_at(event, "displayGroups") {
        if group.get("description").and_then(Json::as_str) != Some("Game Lines") {
            continue;
        }
        for market in children_at(group, "markets") {
            if market.pointer("/period/description").and_then(Json::as_str) != Some("Match") {
                continue;
            }
            let description = market.get("description").and_then(Json::as_str).unwrap_or_default();
            let (target, key) = if description == "Moneyline" {
                (&mut moneyline, "type")
            } else if SPREAD_MARKETS.contains(&description) {
                (&mut spread, "type")
            } else if description == "Total" {
                (&mut total, "description")
            } else {
                continue;
            };
            for outcome in children_at(market, "outcomes") {
                if let Some(side) = outcome.get(key).and_then(Json::as_str) {
                    target.insert(side.to_string(), outcome.clone());
                }
            }
        }
    }
    json!({
        "description": event.get("description"),
        "startTime": event.get("startTime"),
        "moneyline": moneyline,
        "spread": spread,
        "total": total,
    })
}

/// Upcoming game events from a feed response; season-long futures and
/// events that already started are skipped.
pub fn upcoming_events(feed: &Json, now_millis: i64) -> Vec<&Json> {
    let Some(first) = feed.as_array().and_then(|a| a.first()) else {
        return Vec::new();
    };
    children_at(first, "events")
        .into_iter()
        .filter(|e| e.get("type").and_then(Json::as_str) == Some("GAMEEVENT"))
        .filter(|e| e.get("startTime").and_then(Json::as_i64).is_some_and(|t| t > now_millis))
        .collect()
}

/// Odds table for one feed response. Events without a named away side
/// carry no usable line.
pub fn odds_table(feed: &Json, now_millis: i64) -> Result<Table, CoreError> {
    let mut table = GameOdds::empty_table();
    for event in upcoming_events(feed, now_millis) {
        let record = GameOdds::extract(&game_lines(event));
        if record.get("AwayTeamName").is_some_and(Value::is_null) {
            continue;
        }
        table.append(record)?;
    }
    Ok(table)
}
