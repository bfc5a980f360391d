//! End-to-end extraction tests.
//!
//! Documents are built inline with `json!`; nothing here touches the
//! network.
//!
//! Areas under test:
//!   1. Field extraction            (src/core/extract.rs)
//!   2. Composition and filtering   (src/core/compose.rs)
//!   3. Derived fields              (src/core/derive.rs)
//!   4. Tables and CSV              (src/core/table.rs, src/sink/csv_sink.rs)
//!   5. Season resolution           (src/core/season.rs)
//!   6. Accumulating games          (src/pipeline/mod.rs)

use serde_json::{json, Value as Json};

use sportsdata::core::derive::{quality_start, scored_side_result, side_result, TeamResult};
use sportsdata::core::{
    compose, extract, extract_all, filter_participants, has_any_stat, FieldKind, FieldMap,
    FieldSpec, ParticipationRule, Record, SeasonCalendar, Selector, Sport, Table, Transform, Value,
};
use sportsdata::entities::mlb::{self, MlbGame, MlbPlay, MlbPlayerBoxscore};
use sportsdata::entities::EntityKind;
use sportsdata::pipeline::{Extraction, Window};
use sportsdata::sink::CsvSink;

// =============================================================================
// Helpers
// =============================================================================

fn skater_map() -> FieldMap {
    FieldMap::new(
        "skater",
        vec![
            FieldSpec::new("PlayerId", "person.id", FieldKind::Int),
            FieldSpec::new("FullName", "person.fullName", FieldKind::Text),
            FieldSpec::new("Goals", "stats.skaterStats.goals", FieldKind::Int).with_default(0i64),
            FieldSpec::new("Shots", "stats.skaterStats.shots", FieldKind::Int),
            FieldSpec::new("ShootingPct", "stats.skaterStats", FieldKind::Float)
                .with_transform(Transform::ratio("goals", "shots")),
            FieldSpec::derived("IsAway", FieldKind::Bool),
        ],
    )
}

fn skater(id: i64, goals: Option<i64>, shots: i64) -> Json {
    let mut stats = json!({"shots": shots});
    if let Some(goals) = goals {
        stats["goals"] = json!(goals);
    }
    json!({"person": {"id": id, "fullName": format!("Player {id}")}, "stats": {"skaterStats": stats}})
}

fn id_table(ids: std::ops::Range<i64>) -> Table {
    let map = FieldMap::new("ids", vec![FieldSpec::new("Id", "id", FieldKind::Int)]);
    let docs: Vec<Json> = ids.map(|id| json!({"id": id})).collect();
    Table::from_records(&map, extract_all(&docs, &map)).unwrap()
}

fn ids(table: &Table) -> Vec<i64> {
    table
        .records()
        .iter()
        .filter_map(|r| r.get("Id").and_then(Value::as_i64))
        .collect()
}

// =============================================================================
// 1. Field extraction
// =============================================================================

#[test]
fn extraction_has_one_field_per_spec_in_order() {
    let map = skater_map();
    let record = extract(&skater(8478402, Some(1), 4), &map);

    let names: Vec<&str> = record.names().collect();
    assert_eq!(names, vec!["PlayerId", "FullName", "Goals", "Shots", "ShootingPct", "IsAway"]);
    assert_eq!(record.get("PlayerId"), Some(&Value::Int(8478402)));
    assert_eq!(record.get("ShootingPct"), Some(&Value::Float(0.25)));
    assert_eq!(record.get("IsAway"), Some(&Value::Null));
}

#[test]
fn missing_paths_fall_back_to_defaults() {
    let map = skater_map();
    let record = extract(&json!({"person": {"id": 1}}), &map);

    assert_eq!(record.len(), map.len());
    assert_eq!(record.get("Goals"), Some(&Value::Int(0)));
    assert_eq!(record.get("Shots"), Some(&Value::Null));
    assert_eq!(record.get("FullName"), Some(&Value::Null));
    // zero shots: the ratio has no value
    let record = extract(&skater(1, Some(0), 0), &map);
    assert_eq!(record.get("ShootingPct"), Some(&Value::Null));
}

#[test]
fn extraction_is_idempotent() {
    let map = skater_map();
    let doc = skater(7, Some(2), 5);
    assert_eq!(extract(&doc, &map), extract(&doc, &map));
    assert_eq!(doc, skater(7, Some(2), 5));
}

// =============================================================================
// 2. Composition and filtering
// =============================================================================

#[test]
fn participation_filter_drops_empty_stat_groups() {
    let map = skater_map();
    let rule = ParticipationRule::new(&["stats.skaterStats", "stats.goalieStats"]);
    let docs = vec![
        skater(1, Some(0), 2),
        json!({"person": {"id": 2}, "stats": {"skaterStats": {}, "goalieStats": {}}}),
        json!({"person": {"id": 3}, "stats": {"goalieStats": {"saves": 30}}}),
        json!({"person": {"id": 4}}),
    ];

    let table = filter_participants(&docs, &rule, &map).unwrap();
    let kept: Vec<_> = table
        .records()
        .iter()
        .map(|r| r.get("PlayerId").and_then(Value::as_i64))
        .collect();
    assert_eq!(kept, vec![Some(1), Some(3)]);

    assert!(has_any_stat(&table.records()[0], &["Shots"]));
    assert!(!has_any_stat(&table.records()[1], &["Shots", "ShootingPct"]));
}

#[test]
fn compose_embeds_children_under_their_keys() {
    let game = Record::from_fields(vec![("GameId".into(), Value::Int(1))]);
    let away = id_table(0..2);
    let home = id_table(2..3);
    let nested = compose(game, vec![("AwayPlayers".into(), &away), ("HomePlayers".into(), &home)]);

    let text = serde_json::to_value(&nested).unwrap();
    assert_eq!(
        text,
        json!({"GameId": 1, "AwayPlayers": [{"Id": 0}, {"Id": 1}], "HomePlayers": [{"Id": 2}]})
    );
}

// =============================================================================
// 3. Derived fields
// =============================================================================

#[test]
fn team_result_from_both_sides() {
    assert_eq!(side_result(true, 2, 5), TeamResult::Loss);
    assert_eq!(side_result(false, 2, 5), TeamResult::Win);
    assert_eq!(side_result(true, 3, 3), TeamResult::Tie);
    assert_eq!(side_result(false, 3, 3).code(), "T");
}

#[test]
fn team_result_needs_both_scores() {
    assert_eq!(scored_side_result(true, Some(4), Some(1)), Some(TeamResult::Win));
    assert_eq!(scored_side_result(true, None, Some(1)), None);
    assert_eq!(scored_side_result(false, Some(0), None), None);
}

#[test]
fn quality_start_thresholds() {
    assert!(quality_start(6.0, 3));
    assert!(quality_start(7.1, 0));
    // 5.2 is five and two-thirds innings
    assert!(!quality_start(5.2, 0));
    assert!(!quality_start(8.0, 4));
}

// =============================================================================
// 4. Tables and CSV
// =============================================================================

#[test]
fn concat_keeps_input_order() {
    let joined = Table::concat(&[id_table(0..3), id_table(3..8)]).unwrap();
    assert_eq!(joined.len(), 8);
    assert_eq!(ids(&joined), (0..8).collect::<Vec<_>>());
}

#[test]
fn concat_rejects_mismatched_schemas() {
    let map = skater_map();
    let players = Table::from_records(&map, vec![extract(&skater(1, None, 1), &map)]).unwrap();
    let err = Table::concat(&[id_table(0..3), players]).unwrap_err();
    assert!(err.is_schema_mismatch());
}

#[test]
fn csv_round_trip_through_sink() {
    let map = skater_map();
    let docs = vec![skater(1, Some(1), 4), skater(2, None, 0)];
    let table = Table::from_records(&map, extract_all(&docs, &map))
        .unwrap()
        .map_records(|r| r.with("IsAway", true))
        .unwrap();

    let dir = std::env::temp_dir().join(format!("sportsdata-it-{}", std::process::id()));
    let sink = CsvSink::new(&dir);
    let path = sink.write("nhl_player_boxscores", &table).unwrap();

    let back = Table::read_csv(std::fs::File::open(&path).unwrap(), &map).unwrap();
    assert_eq!(back, table);
    std::fs::remove_dir_all(&dir).unwrap();
}

// =============================================================================
// 5. Season resolution
// =============================================================================

#[test]
fn mlb_2019_resolves_to_calendar_dates() {
    let calendar = SeasonCalendar::builtin();
    let interval = calendar.resolve(Sport::Mlb, &Selector::Season(2019)).unwrap();
    assert_eq!(interval.start_str(), "03/28/2019");
    assert_eq!(interval.end_str(), "11/01/2019");
}

#[test]
fn calendar_overlay_and_unknown_seasons() {
    let calendar = SeasonCalendar::builtin()
        .overlay_json(r#"{"nhl": [{"season": 2019, "start_date": "10/02/2019", "end_date": "04/04/2020"}]}"#)
        .unwrap();
    let interval = calendar.resolve(Sport::Nhl, &Selector::Season(2019)).unwrap();
    assert_eq!(interval.to_string(), "10/02/2019 - 04/04/2020");

    assert!(calendar.resolve(Sport::Mlb, &Selector::Season(1999)).is_err());
    assert!(Selector::from_parts(None, None, None).is_err());
}

// =============================================================================
// 6. Accumulating games
// =============================================================================

fn mlb_game(game_pk: i64, away_runs: i64, home_runs: i64) -> (Json, Json, Json) {
    let feed = json!({
        "gamePk": game_pk,
        "gameData": {
            "game": {"season": "2019"},
            "datetime": {"dateTime": "2019-04-01T23:05:00Z"},
            "status": {"detailedState": "Final"}
        }
    });
    let boxscore = json!({
        "teams": {
            "away": {
                "team": {"id": 137},
                "teamStats": {"batting": {"runs": away_runs}},
                "players": {
                    "ID1": {"person": {"id": 1}, "battingOrder": "100",
                            "stats": {"batting": {"atBats": 4, "hits": 2}, "pitching": {}}},
                    "ID9": {"person": {"id": 9}, "stats": {"batting": {}, "pitching": {}}}
                }
            },
            "home": {
                "team": {"id": 119},
                "teamStats": {"batting": {"runs": home_runs}},
                "players": {
                    "ID4": {"person": {"id": 4}, "battingOrder": "200",
                            "stats": {"batting": {"atBats": 3}, "pitching": {}}}
                }
            }
        }
    });
    let pbp = json!({"allPlays": [
        {"result": {"event": "Single"}, "about": {"atBatIndex": 0}},
        {"result": {"event": "Strikeout"}, "about": {"atBatIndex": 1}}
    ]});
    (feed, boxscore, pbp)
}

#[test]
fn extraction_accumulates_games_in_schedule_order() {
    let mut extraction = Extraction::new(Sport::Mlb, Window::WholeSeason(2019));
    for (pk, away, home) in [(10, 2, 5), (11, 4, 4)] {
        let (feed, boxscore, pbp) = mlb_game(pk, away, home);
        extraction
            .add_bundle(mlb::game_bundle(&feed, &boxscore, &pbp).unwrap())
            .unwrap();
    }

    let games = extraction.table(MlbGame::NAME).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games.header(), MlbGame::field_map().names().as_slice());

    let players = extraction.table(MlbPlayerBoxscore::NAME).unwrap();
    assert_eq!(players.len(), 4);
    let results: Vec<String> = players
        .records()
        .iter()
        .map(|r| r.get("TeamResult").map(Value::to_cell).unwrap_or_default())
        .collect();
    assert_eq!(results, vec!["L", "W", "T", "T"]);

    assert_eq!(extraction.table(MlbPlay::NAME).unwrap().len(), 4);
    assert_eq!(extraction.games().len(), 2);
    assert_eq!(extraction.games()[0].child("AwayPlayers").map(<[_]>::len), Some(1));
}

#[test]
fn empty_schedule_yields_empty_tables() {
    let extraction = Extraction::new(Sport::Nhl, Window::WholeSeason(2019));
    for (_, table) in extraction.tables() {
        assert!(table.is_empty());
        assert!(!table.header().is_empty());
    }
}
