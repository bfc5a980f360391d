//! NBA entities: schedule games from the league schedule file and player
//! box scores from the stats API.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value as Json};

use super::{apply_context, children_at, entity_kind, game_context, EntityKind, GameBundle};
use crate::core::field_map::{TimestampPart, Transform};
use crate::core::{
    filter_participants, CoreError, FieldKind, FieldMap, FieldSpec, ParticipationRule, Record, Table,
    Value,
};

/// Local timestamp format of the schedule file (`etm`).
const SCHEDULE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Schedule times are Eastern; shift to Pacific for display.
const SCHEDULE_SHIFT_HOURS: i64 = -3;

const PLAYER_CONTEXT: [&str; 4] = ["NbaGameId", "Season", "AwayTeamId", "HomeTeamId"];

entity_kind!(NbaGame, "nba_games", game_map);
entity_kind!(NbaPlayerBoxscore, "nba_player_boxscores", player_map);

fn schedule_time(part: TimestampPart) -> Transform {
    Transform::Timestamp {
        format: SCHEDULE_FORMAT,
        shift: Duration::hours(SCHEDULE_SHIFT_HOURS),
        part,
    }
}

fn game_map() -> FieldMap {
    let mut specs = vec![
        FieldSpec::new("NbaGameId", "gid", FieldKind::Int),
        FieldSpec::new("NbaGameIdString", "gid", FieldKind::Text),
        FieldSpec::derived("Season", FieldKind::Int),
        FieldSpec::new("GameDateTime", "etm", FieldKind::Timestamp)
            .with_transform(schedule_time(TimestampPart::DateTime)),
        FieldSpec::new("GameDate", "etm", FieldKind::Date).with_transform(schedule_time(TimestampPart::Date)),
        FieldSpec::new("GameTime", "etm", FieldKind::Time).with_transform(schedule_time(TimestampPart::Time)),
        FieldSpec::new("GameStatus", "stt", FieldKind::Text),
    ];
    for (side, prefix) in [("v", "Away"), ("h", "Home")] {
        specs.extend([
            FieldSpec::new(&format!("{prefix}TeamId"), &format!("{side}.tid"), FieldKind::Int),
            FieldSpec::new(&format!("{prefix}TeamScore"), &format!("{side}.s"), FieldKind::Int),
            FieldSpec::new(&format!("{prefix}TeamRecordWins"), &format!("{side}.re"), FieldKind::Int)
                .with_transform(Transform::RecordPart(0)),
            FieldSpec::new(&format!("{prefix}TeamRecordLosses"), &format!("{side}.re"), FieldKind::Int)
                .with_transform(Transform::RecordPart(1)),
        ]);
    }
    specs.push(FieldSpec::new("NbaVenueName", "an", FieldKind::Text));
    FieldMap::new("nba game", specs)
}

fn player_map() -> FieldMap {
    let int = |name: &str, column: &str| FieldSpec::new(name, column, FieldKind::Int);
    let float = |name: &str, column: &str| FieldSpec::new(name, column, FieldKind::Float);
    FieldMap::new(
        "nba player boxscore",
        vec![
            int("NbaPlayerId", "PLAYER_ID"),
            int("NbaGameId", "GAME_ID"),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::derived("AwayTeamId", FieldKind::Int),
            FieldSpec::derived("HomeTeamId", FieldKind::Int),
            FieldSpec::derived("IsAway", FieldKind::Bool),
            FieldSpec::new("MinutesPlayed", "MIN", FieldKind::Text),
            int("FieldGoals", "FGM"),
            int("FieldGoalAttempts", "FGA"),
            float("FieldGoalPct", "FG_PCT"),
            int("ThreePointFieldGoals", "FG3M"),
            int("ThreePointFieldGoalAttempts", "FG3A"),
            float("ThreePointFieldGoalPct", "FG3_PCT"),
            int("FreeThrows", "FTM"),
            int("FreeThrowAttempts", "FTA"),
            FieldSpec::new("FreeThrowPct", "", FieldKind::Float).with_transform(Transform::ratio("FTM", "FTA")),
            int("OffensiveRebounds", "OREB"),
            int("DefensiveRebounds", "DREB"),
            int("Rebounds", "REB"),
            int("Assists", "AST"),
            int("Steals", "STL"),
            int("Blocks", "BLK"),
            int("Turnovers", "TO"),
            int("PersonalFouls", "PF"),
            int("Points", "PTS"),
            int("PlusMinus", "PLUS_MINUS"),
        ],
    )
}

// =============================================================================
// Schedule
// =============================================================================

/// Every game in the full-season schedule file (`lscd[].mscd.g[]`).
pub fn schedule_games(schedule: &Json) -> Vec<&Json> {
    children_at(schedule, "lscd")
        .into_iter()
        .flat_map(|month| children_at(month, "mscd.g"))
        .collect()
}

/// Calendar date of the game as listed, before any display shift.
pub fn listed_date(game: &Json) -> Option<NaiveDate> {
    let etm = game.get("etm")?.as_str()?;
    NaiveDateTime::parse_from_str(etm, SCHEDULE_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

pub fn is_postponed(game: &Json) -> bool {
    game.get("stt").and_then(Json::as_str) == Some("PPD")
}

/// Game id as the stats API expects it, leading zeros included.
pub fn game_id_string(game: &Json) -> Option<&str> {
    game.get("gid").and_then(Json::as_str)
}

// =============================================================================
// Result sets
// =============================================================================

/// Zip the headers and rows of the named result set into one object per
/// row. A missing result set yields no rows.
pub fn result_set_rows(doc: &Json, name: &str) -> Vec<Json> {
    let Some(set) = children_at(doc, "resultSets")
        .into_iter()
        .find(|s| s.get("name").and_then(Json::as_str) == Some(name))
    else {
        return Vec::new();
    };
    let headers: Vec<&str> = children_at(set, "headers")
        .into_iter()
        .filter_map(Json::as_str)
        .collect();
    children_at(set, "rowSet")
        .into_iter()
        .filter_map(Json::as_array)
        .map(|row| {
            let object: Map<String, Json> = headers
                .iter()
                .zip(row)
                .map(|(h, v)| (h.to_string(), v.clone()))
                .collect();
            Json::Object(object)
        })
        .collect()
}

// =============================================================================
// Game bundle
// =============================================================================

/// Build the game record from its schedule entry and the player table
/// from the traditional box score.
pub fn game_bundle(schedule_game: &Json, boxscore: &Json, season: i32) -> Result<GameBundle, CoreError> {
    let game = NbaGame::extract(schedule_game).with("Season", i64::from(season));
    let away_team = game.get("AwayTeamId").and_then(Value::as_i64);
    let context = game_context(&game, &PLAYER_CONTEXT);

    let rule = ParticipationRule::new(&["MIN"]);
    let rows = result_set_rows(boxscore, "PlayerStats");
    let (away_rows, home_rows): (Vec<&Json>, Vec<&Json>) = rows.iter().partition(|row| {
        let team = row
            .get("TEAM_ID")
            .and_then(|t| FieldKind::Int.coerce(t))
            .and_then(|v| v.as_i64());
        team.is_some() && team == away_team
    });
    let side = |rows: Vec<&Json>, is_away: bool| -> Result<Table, CoreError> {
        filter_participants(rows, &rule, NbaPlayerBoxscore::field_map())?
            .map_records(|r| finish_player(apply_context(r, &context).with("IsAway", is_away)))
    };
    let away = side(away_rows, true)?;
    let home = side(home_rows, false)?;

    Ok(GameBundle::new(NbaGame::NAME, game)
        .with_child("AwayPlayers", NbaPlayerBoxscore::NAME, away)
        .with_child("HomePlayers", NbaPlayerBoxscore::NAME, home))
}

/// Shooting percentages are null when there were no attempts.
fn finish_player(record: Record) -> Record {
    let no_attempts = |r: &Record, field: &str| r.get(field).and_then(Value::as_i64) == Some(0);
    let fg = no_attempts(&record, "FieldGoalAttempts");
    let fg3 = no_attempts(&record, "ThreePointFieldGoalAttempts");
    let mut record = record;
    if fg {
        record = record.with("FieldGoalPct", Value::Null);
    }
    if fg3 {
        record = record.with("ThreePointFieldGoalPct", Value::Null);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule_game() -> Json {
        json!({
            "gid": "0021900001", "etm": "2019-10-22T20:00:00", "stt": "Final", "an": "Scotiabank Arena",
            "v": {"tid": 1610612740, "s": "122", "re": "0-1"},
            "h": {"tid": 1610612761, "s": "130", "re": "1-0"}
        })
    }

    fn boxscore() -> Json {
        json!({"resultSets": [
            {"name": "TeamStats", "headers": ["TEAM_ID"], "rowSet": [[1]]},
            {"name": "PlayerStats",
             "headers": ["GAME_ID", "TEAM_ID", "PLAYER_ID", "MIN", "FGM", "FGA", "FG_PCT", "FG3M", "FG3A", "FG3_PCT", "FTM", "FTA", "PTS", "PLUS_MINUS"],
             "rowSet": [
                ["0021900001", 1610612740, 203078, "35:12", 8, 17, 0.471, 0, 0, 0.0, 3, 4, 19, -6.0],
                ["0021900001", 1610612761, 202695, "36:40", 12, 22, 0.545, 2, 5, 0.4, 0, 0, 26, 8.0],
                ["0021900001", 1610612761, 1629000, null, 0, 0, 0.0, 0, 0, 0.0, 0, 0, 0, null]
             ]}
        ]})
    }

    #[test]
    fn test_schedule_game_fields() {
        let game = NbaGame::extract(&schedule_game());
        assert_eq!(game.get("NbaGameId"), Some(&Value::Int(21900001)));
        assert_eq!(game.get("NbaGameIdString"), Some(&Value::Text("0021900001".into())));
        assert_eq!(game.get("GameTime").unwrap().to_cell(), "17:00:00");
        assert_eq!(game.get("AwayTeamRecordLosses"), Some(&Value::Int(1)));
        assert_eq!(game.get("HomeTeamScore"), Some(&Value::Int(130)));
        assert_eq!(listed_date(&schedule_game()), NaiveDate::from_ymd_opt(2019, 10, 22));
    }

    #[test]
    fn test_result_set_rows() {
        let rows = result_set_rows(&boxscore(), "PlayerStats");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["PLAYER_ID"], json!(203078));
        assert!(result_set_rows(&boxscore(), "Missing").is_empty());
    }

    #[test]
    fn test_player_rows() {
        let bundle = game_bundle(&schedule_game(), &boxscore(), 2019).unwrap();
        assert_eq!(bundle.game.get("Season"), Some(&Value::Int(2019)));

        let away = bundle.children[0].table.records();
        assert_eq!(away.len(), 1);
        assert_eq!(away[0].get("IsAway"), Some(&Value::Bool(true)));
        assert_eq!(away[0].get("FreeThrowPct"), Some(&Value::Float(0.75)));
        assert_eq!(away[0].get("ThreePointFieldGoalPct"), Some(&Value::Null));
        assert_eq!(away[0].get("PlusMinus"), Some(&Value::Int(-6)));

        // The player without minutes is dropped.
        let home = bundle.children[1].table.records();
        assert_eq!(home.len(), 1);
        assert_eq!(home[0].get("FreeThrowPct"), Some(&Value::Null));
        assert_eq!(home[0].get("Season"), Some(&Value::Int(2019)));
    }

    #[test]
    fn test_non_participants_dropped_on_both_sides() {
        let mut boxscore = boxscore();
        let rows = boxscore["resultSets"][1]["rowSet"].as_array_mut().unwrap();
        rows.push(json!(["0021900001", 1610612740, 1628000, null, 0, 0, 0.0, 0, 0, 0.0, 0, 0, 0, null]));
        rows.push(json!(["0021900001", 1610612740, 1628001, "4:02", 1, 1, 1.0, 0, 0, 0.0, 0, 0, 2, 1.0]));

        let bundle = game_bundle(&schedule_game(), &boxscore, 2019).unwrap();
        let away: Vec<_> = bundle.children[0]
            .table
            .records()
            .iter()
            .map(|r| r.get("NbaPlayerId").and_then(Value::as_i64))
            .collect();
        assert_eq!(away, vec![Some(203078), Some(1628001)]);
        assert_eq!(bundle.children[1].table.len(), 1);
        assert!(bundle.children[0].table.records().iter().all(|r| r.get("IsAway") == Some(&Value::Bool(true))));
    }

    #[test]
    fn test_postponed() {
        assert!(!is_postponed(&schedule_game()));
        assert!(is_postponed(&json!({"stt": "PPD"})));
    }
}
