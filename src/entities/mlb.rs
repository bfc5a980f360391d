//! MLB Stats API entities: schedule games, game box scores, player box
//! scores and play-by-play, plus the team and player listings.

use serde_json::{json, Map, Value as Json};

use super::{apply_context, children_at, display_time, entity_kind, game_context, EntityKind, GameBundle};
use crate::core::derive::{quality_start, scored_side_result};
use crate::core::field_map::{TimestampPart, Transform};
use crate::core::{
    extract_all, filter_participants, CoreError, FieldKind, FieldMap, FieldSpec, ParticipationRule, Record,
    Table, Value,
};

const OFFICIAL_TYPES: [(&str, &str); 4] = [
    ("Home Plate", "HomePlateOfficialId"),
    ("First Base", "FirstBaseOfficialId"),
    ("Second Base", "SecondBaseOfficialId"),
    ("Third Base", "ThirdBaseOfficialId"),
];

/// Game fields copied onto each player row.
const PLAYER_CONTEXT: [&str; 4] = ["MlbGameId", "Season", "AwayTeamId", "HomeTeamId"];

entity_kind!(
    /// One game from the schedule endpoint.
    MlbScheduleGame,
    "mlb_schedule",
    schedule_game_map
);
entity_kind!(MlbGame, "mlb_games", game_map);
entity_kind!(MlbPlayerBoxscore, "mlb_player_boxscores", player_map);
entity_kind!(MlbPlay, "mlb_plays", play_map);
entity_kind!(MlbTeam, "mlb_teams", team_map);
entity_kind!(
    /// A player listed for a season, with the current team.
    MlbPlayer,
    "mlb_players",
    roster_player_map
);

// =============================================================================
// Field maps
// =============================================================================

fn schedule_game_map() -> FieldMap {
    FieldMap::new(
        "mlb schedule game",
        vec![
            FieldSpec::new("MlbGameId", "gamePk", FieldKind::Int),
            FieldSpec::new("Season", "seasonDisplay", FieldKind::Int),
            FieldSpec::new("GameDate", "gameDate", FieldKind::Date)
                .with_transform(display_time(TimestampPart::Date)),
            FieldSpec::new("GameDateTime", "gameDate", FieldKind::Timestamp)
                .with_transform(display_time(TimestampPart::DateTime)),
            FieldSpec::new("AwayTeamId", "teams.away.team.id", FieldKind::Int),
            FieldSpec::new("HomeTeamId", "teams.home.team.id", FieldKind::Int),
            FieldSpec::new("MlbVenueId", "venue.id", FieldKind::Int),
            FieldSpec::new("DayNight", "dayNight", FieldKind::Text),
            FieldSpec::new("SeriesDescription", "seriesDescription", FieldKind::Text),
            FieldSpec::new("SeriesGameNumber", "seriesGameNumber", FieldKind::Int),
            FieldSpec::new("GamesInSeries", "gamesInSeries", FieldKind::Int),
            FieldSpec::new("GameState", "status.codedGameState", FieldKind::Text),
        ],
    )
}

fn game_map() -> FieldMap {
    let mut specs = vec![
        FieldSpec::new("MlbGameId", "feed.gamePk", FieldKind::Int),
        FieldSpec::new("Season", "feed.gameData.game.season", FieldKind::Int),
        FieldSpec::new("GameDateTime", "feed.gameData.datetime.dateTime", FieldKind::Timestamp)
            .with_transform(display_time(TimestampPart::DateTime)),
        FieldSpec::new("GameDate", "feed.gameData.datetime.dateTime", FieldKind::Date)
            .with_transform(display_time(TimestampPart::Date)),
        FieldSpec::new("GameTime", "feed.gameData.datetime.dateTime", FieldKind::Time)
            .with_transform(display_time(TimestampPart::Time)),
        FieldSpec::new("DayNight", "feed.gameData.datetime.dayNight", FieldKind::Text),
        FieldSpec::new("GameStatus", "feed.gameData.status.detailedState", FieldKind::Text),
    ];
    specs.extend(team_fields("away", "Away"));
    specs.extend(team_fields("home", "Home"));
    for (official, column) in OFFICIAL_TYPES {
        specs.push(FieldSpec::new(column, &format!("officials.{official}"), FieldKind::Int));
    }
    specs.push(FieldSpec::new("MlbVenueId", "feed.gameData.venue.id", FieldKind::Int));
    FieldMap::new("mlb game", specs)
}

fn team_fields(side: &str, prefix: &str) -> Vec<FieldSpec> {
    let team = format!("box.teams.{side}.team");
    let batting = format!("box.teams.{side}.teamStats.batting");
    let mut specs = vec![
        FieldSpec::new(&format!("{prefix}TeamId"), &format!("{team}.id"), FieldKind::Int),
        FieldSpec::new(
            &format!("{prefix}RecordWins"),
            &format!("{team}.record.leagueRecord.wins"),
            FieldKind::Int,
        ),
        FieldSpec::new(
            &format!("{prefix}RecordLosses"),
            &format!("{team}.record.leagueRecord.losses"),
            FieldKind::Int,
        ),
        FieldSpec::new(
            &format!("{prefix}RecordPct"),
            &format!("{team}.record.leagueRecord.pct"),
            FieldKind::Float,
        ),
    ];
    let stats = [
        ("Runs", "runs"),
        ("FlyOuts", "flyOuts"),
        ("GroundOuts", "groundOuts"),
        ("Doubles", "doubles"),
        ("Triples", "triples"),
        ("HomeRuns", "homeRuns"),
        ("Strikeouts", "strikeOuts"),
        ("BaseOnBalls", "baseOnBalls"),
        ("IntentionalBaseOnBalls", "intentionalWalks"),
        ("Hits", "hits"),
        ("HitByPitch", "hitByPitch"),
        ("AtBats", "atBats"),
        ("CaughtStealing", "caughtStealing"),
        ("StolenBases", "stolenBases"),
        ("LeftOnBase", "leftOnBase"),
    ];
    specs.extend(stats.iter().map(|(column, key)| {
        FieldSpec::new(&format!("{prefix}{column}"), &format!("{batting}.{key}"), FieldKind::Int)
    }));
    specs
}

fn player_map() -> FieldMap {
    let int = |name: &str, path: &str| FieldSpec::new(name, path, FieldKind::Int);
    FieldMap::new(
        "mlb player boxscore",
        vec![
            int("MlbPlayerId", "person.id"),
            FieldSpec::derived("MlbGameId", FieldKind::Int),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::derived("AwayTeamId", FieldKind::Int),
            FieldSpec::derived("HomeTeamId", FieldKind::Int),
            FieldSpec::derived("IsAway", FieldKind::Bool),
            FieldSpec::derived("TeamResult", FieldKind::Text),
            int("BattingOrder", "battingOrder").with_transform(Transform::PackedBattingOrder),
            int("AtBats", "stats.batting.atBats"),
            int("Runs", "stats.batting.runs"),
            int("Hits", "stats.batting.hits"),
            int("Doubles", "stats.batting.doubles"),
            int("Triples", "stats.batting.triples"),
            int("HomeRuns", "stats.batting.homeRuns"),
            int("RunsBattedIn", "stats.batting.rbi"),
            int("BasesOnBalls", "stats.batting.baseOnBalls"),
            int("IntentionalBasesOnBalls", "stats.batting.intentionalWalks"),
            int("Strikeouts", "stats.batting.strikeOuts"),
            int("HitByPitch", "stats.batting.hitByPitch"),
            int("SacrificeHits", "stats.batting.sacBunts"),
            int("SacrificeFlies", "stats.batting.sacFlies"),
            int("GroundedIntoDoublePlay", "stats.batting.groundIntoDoublePlay"),
            int("StolenBases", "stats.batting.stolenBases"),
            int("CaughtStealing", "stats.batting.caughtStealing"),
            int("StartingPitcher", "stats.pitching.gamesStarted"),
            FieldSpec::new("PitchingWin", "stats.pitching.wins", FieldKind::Bool)
                .with_transform(Transform::Equals(json!(1)))
                .with_default(false),
            FieldSpec::new("InningsPitched", "stats.pitching.inningsPitched", FieldKind::Float),
            int("AllowedHits", "stats.pitching.hits"),
            int("AllowedRuns", "stats.pitching.runs"),
            int("EarnedRuns", "stats.pitching.earnedRuns"),
            FieldSpec::new("EarnedRunAverage", "stats.pitching.runsScoredPer9", FieldKind::Float),
            int("PitchedStrikeouts", "stats.pitching.strikeOuts"),
            int("AllowedHomeRuns", "stats.pitching.homeRuns"),
            int("AllowedBasesOnBalls", "stats.pitching.baseOnBalls"),
            int("BattersHitByPitch", "stats.pitching.hitBatsmen"),
            FieldSpec::new("CompleteGame", "stats.pitching.completeGames", FieldKind::Bool)
                .with_transform(Transform::Equals(json!(1)))
                .with_default(false),
            FieldSpec::new("Shutout", "stats.pitching.shutouts", FieldKind::Bool)
                .with_transform(Transform::Equals(json!(1)))
                .with_default(false),
            FieldSpec::derived("QualityStart", FieldKind::Bool),
        ],
    )
}

fn play_map() -> FieldMap {
    FieldMap::new(
        "mlb play",
        vec![
            FieldSpec::derived("MlbGameId", FieldKind::Int),
            FieldSpec::new("ResultType", "result.type", FieldKind::Text),
            FieldSpec::new("Event", "result.event", FieldKind::Text),
            FieldSpec::new("EventType", "result.eventType", FieldKind::Text),
            FieldSpec::new("Description", "result.description", FieldKind::Text),
            FieldSpec::new("Rbi", "result.rbi", FieldKind::Int),
            FieldSpec::new("AwayScore", "result.awayScore", FieldKind::Int),
            FieldSpec::new("HomeScore", "result.homeScore", FieldKind::Int),
            FieldSpec::new("AtBatIndex", "about.atBatIndex", FieldKind::Int),
            FieldSpec::new("HalfInning", "about.halfInning", FieldKind::Text),
            FieldSpec::new("IsTopInning", "about.isTopInning", FieldKind::Bool),
            FieldSpec::new("Inning", "about.inning", FieldKind::Int),
            FieldSpec::new("IsScoringPlay", "about.isScoringPlay", FieldKind::Bool),
            FieldSpec::new("HasOut", "about.hasOut", FieldKind::Bool),
            FieldSpec::new("CountBalls", "count.balls", FieldKind::Int),
            FieldSpec::new("CountStrikes", "count.strikes", FieldKind::Int),
            FieldSpec::new("CountOuts", "count.outs", FieldKind::Int),
            FieldSpec::new("BatterId", "matchup.batter.id", FieldKind::Int),
            FieldSpec::new("BatSide", "matchup.batSide.code", FieldKind::Text),
            FieldSpec::new("PitcherId", "matchup.pitcher.id", FieldKind::Int),
            FieldSpec::new("PitchHand", "matchup.pitchHand.code", FieldKind::Text),
            FieldSpec::new("MenOnBase", "matchup.splits.menOnBase", FieldKind::Text),
        ],
    )
}

fn team_map() -> FieldMap {
    FieldMap::new(
        "mlb team",
        vec![
            FieldSpec::new("MlbTeamId", "id", FieldKind::Int),
            FieldSpec::new("TeamName", "teamName", FieldKind::Text),
            FieldSpec::new("MlbVenueId", "venue.id", FieldKind::Int),
            FieldSpec::new("TeamCode", "teamCode", FieldKind::Text),
            FieldSpec::new("TeamAbbreviation", "abbreviation", FieldKind::Text),
            FieldSpec::new("LocationName", "locationName", FieldKind::Text),
            FieldSpec::new("MlbLeagueId", "league.id", FieldKind::Int),
            FieldSpec::new("MlbDivisionId", "division.id", FieldKind::Int),
        ],
    )
}

fn roster_player_map() -> FieldMap {
    FieldMap::new(
        "mlb player",
        vec![
            FieldSpec::new("MlbPlayerId", "id", FieldKind::Int),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::new("FullName", "fullName", FieldKind::Text),
            FieldSpec::new("FirstName", "firstName", FieldKind::Text),
            FieldSpec::new("LastName", "lastName", FieldKind::Text),
            FieldSpec::new("BirthDate", "birthDate", FieldKind::Date),
            FieldSpec::new("PlayerHeight", "height", FieldKind::Text),
            FieldSpec::new("PlayerWeight", "weight", FieldKind::Int),
            FieldSpec::new("MlbTeamId", "currentTeam.id", FieldKind::Int),
            FieldSpec::new("Position", "primaryPosition.abbreviation", FieldKind::Text),
            FieldSpec::new("DebutDate", "mlbDebutDate", FieldKind::Date),
            FieldSpec::new("BatSide", "batSide.code", FieldKind::Text),
            FieldSpec::new("PitchHand", "pitchHand.code", FieldKind::Text),
        ],
    )
}

// =============================================================================
// Teams and players
// =============================================================================

/// Every team in the `teams` listing.
pub fn team_table(teams: &Json) -> Result<Table, CoreError> {
    let rows = extract_all(children_at(teams, "teams"), MlbTeam::field_map());
    Table::from_records(MlbTeam::field_map(), rows)
}

/// Every player in the season's `people` listing.
pub fn player_table(players: &Json, season: i32) -> Result<Table, CoreError> {
    let rows = extract_all(children_at(players, "people"), MlbPlayer::field_map());
    Table::from_records(MlbPlayer::field_map(), rows)?
        .map_records(|r| r.with("Season", i64::from(season)))
}

// =============================================================================
// Schedule
// =============================================================================

/// One schedule row per game listed under `dates[].games[]`.
pub fn schedule_games(schedule: &Json) -> Vec<Record> {
    let games = children_at(schedule, "dates")
        .into_iter()
        .flat_map(|date| children_at(date, "games"));
    extract_all(games, MlbScheduleGame::field_map())
}

/// Completed regular-season games only: spring training, exhibitions and
/// the All-Star game are skipped, as is anything not yet final.
pub fn is_final_regular_season(game: &Record) -> bool {
    let series = game
        .get("SeriesDescription")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if ["Training", "Exhibition", "All-Star"]
        .iter()
        .any(|skip| series.contains(skip))
    {
        return false;
    }
    game.get("GameState").and_then(Value::as_str) == Some("F")
}

pub fn game_pk(game: &Record) -> Option<i64> {
    game.get("MlbGameId").and_then(Value::as_i64)
}

// =============================================================================
// Game bundle
// =============================================================================

/// Combine the live feed and the box score into the document the game
/// map reads. Officials are re-keyed by their type so each umpire is a
/// plain path.
pub fn game_document(feed: &Json, boxscore: &Json) -> Json {
    let mut officials = Map::new();
    for official in children_at(boxscore, "officials") {
        let kind = official.get("officialType").and_then(Json::as_str);
        let id = official.pointer("/official/id");
        if let (Some(kind), Some(id)) = (kind, id) {
            officials.entry(kind.to_string()).or_insert_with(|| id.clone());
        }
    }
    json!({
        "feed": feed,
        "box": boxscore,
        "officials": officials,
    })
}

/// Build the game record with its player and play tables.
pub fn game_bundle(feed: &Json, boxscore: &Json, play_by_play: &Json) -> Result<GameBundle, CoreError> {
    let game = MlbGame::extract(&game_document(feed, boxscore));
    let away_runs = game.get("AwayRuns").and_then(Value::as_i64);
    let home_runs = game.get("HomeRuns").and_then(Value::as_i64);
    let context = game_context(&game, &PLAYER_CONTEXT);

    let rule = ParticipationRule::new(&["stats.batting", "stats.pitching"]);
    let mut bundle = GameBundle::new(MlbGame::NAME, game.clone());
    for (side, key) in [("away", "AwayPlayers"), ("home", "HomePlayers")] {
        let is_away = side == "away";
        let candidates = children_at(boxscore, &format!("teams.{side}.players"));
        let players = filter_participants(candidates, &rule, MlbPlayerBoxscore::field_map())?
            .map_records(|r| {
                let quality = quality_start_of(&r);
                apply_context(r, &context)
                    .with("IsAway", is_away)
                    .with(
                        "TeamResult",
                        scored_side_result(is_away, away_runs, home_runs).map(|r| r.code()),
                    )
                    .with("QualityStart", quality)
            })?;
        bundle = bundle.with_child(key, MlbPlayerBoxscore::NAME, players);
    }

    let plays = play_table(&game, play_by_play)?;
    Ok(bundle.with_child("Plays", MlbPlay::NAME, plays))
}

fn quality_start_of(player: &Record) -> Option<bool> {
    let innings = player.get("InningsPitched").and_then(Value::as_f64)?;
    let earned = player.get("EarnedRuns").and_then(Value::as_i64)?;
    Some(quality_start(innings, earned))
}

fn play_table(game: &Record, play_by_play: &Json) -> Result<Table, CoreError> {
    let game_id = game.get("MlbGameId").cloned().unwrap_or_default();
    let plays = extract_all(children_at(play_by_play, "allPlays"), MlbPlay::field_map());
    Table::from_records(MlbPlay::field_map(), plays)?
        .map_records(|r| r.with("MlbGameId", game_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> Json {
        json!({
            "gamePk": 565895,
            "gameData": {
                "game": {"season": "2019"},
                "datetime": {"dateTime": "2019-07-04T02:10:00Z", "dayNight": "night"},
                "status": {"detailedState": "Final"},
                "venue": {"id": 2395}
            }
        })
    }

    fn boxscore() -> Json {
        json!({
            "officials": [
                {"officialType": "Home Plate", "official": {"id": 427}},
                {"officialType": "First Base", "official": {"id": 501}}
            ],
            "teams": {
                "away": {
                    "team": {"id": 137, "record": {"leagueRecord": {"wins": 50, "losses": 36, "pct": ".581"}}},
                    "teamStats": {"batting": {"runs": 2, "hits": 6}},
                    "players": {
                        "ID1": {"person": {"id": 1}, "battingOrder": "100",
                                "stats": {"batting": {"atBats": 4, "hits": 1}, "pitching": {}}},
                        "ID2": {"person": {"id": 2},
                                "stats": {"batting": {}, "pitching": {
                                    "gamesStarted": 1, "inningsPitched": "6.0", "earnedRuns": 2,
                                    "runs": 2, "wins": 0, "runsScoredPer9": "3.00"}}},
                        "ID3": {"person": {"id": 3}, "stats": {"batting": {}, "pitching": {}}}
                    }
                },
                "home": {
                    "team": {"id": 119, "record": {"leagueRecord": {"wins": 60, "losses": 28, "pct": ".682"}}},
                    "teamStats": {"batting": {"runs": 5, "hits": 9}},
                    "players": {
                        "ID4": {"person": {"id": 4}, "battingOrder": "301",
                                "stats": {"batting": {"atBats": 1}, "pitching": {
                                    "inningsPitched": "0.0", "earnedRuns": 0, "runsScoredPer9": "-.--"}}}
                    }
                }
            }
        })
    }

    fn pbp() -> Json {
        json!({"allPlays": [
            {"result": {"event": "Single", "rbi": 0}, "about": {"atBatIndex": 0, "isTopInning": true},
             "matchup": {"batter": {"id": 1}, "batSide": {"code": "R"}}}
        ]})
    }

    #[test]
    fn test_game_fields() {
        let bundle = game_bundle(&feed(), &boxscore(), &pbp()).unwrap();
        let g = &bundle.game;
        assert_eq!(g.get("Season"), Some(&Value::Int(2019)));
        assert_eq!(g.get("GameDate").unwrap().to_cell(), "2019-07-03");
        assert_eq!(g.get("GameTime").unwrap().to_cell(), "18:10:00");
        assert_eq!(g.get("HomeTeamId"), Some(&Value::Int(119)));
        assert_eq!(g.get("HomeRecordPct"), Some(&Value::Float(0.682)));
        assert_eq!(g.get("HomePlateOfficialId"), Some(&Value::Int(427)));
        assert_eq!(g.get("ThirdBaseOfficialId"), Some(&Value::Null));
        assert_eq!(g.get("MlbVenueId"), Some(&Value::Int(2395)));
    }

    #[test]
    fn test_player_rows() {
        let bundle = game_bundle(&feed(), &boxscore(), &pbp()).unwrap();
        let away = &bundle.children[0].table;
        assert_eq!(away.len(), 2);

        let batter = &away.records()[0];
        assert_eq!(batter.get("BattingOrder"), Some(&Value::Int(1)));
        assert_eq!(batter.get("TeamResult"), Some(&Value::Text("L".into())));
        assert_eq!(batter.get("MlbGameId"), Some(&Value::Int(565895)));
        assert_eq!(batter.get("QualityStart"), Some(&Value::Null));

        let pitcher = &away.records()[1];
        assert_eq!(pitcher.get("QualityStart"), Some(&Value::Bool(true)));
        assert_eq!(pitcher.get("PitchingWin"), Some(&Value::Bool(false)));
        assert_eq!(pitcher.get("EarnedRunAverage"), Some(&Value::Float(3.0)));

        let home = &bundle.children[1].table.records()[0];
        assert_eq!(home.get("BattingOrder"), Some(&Value::Null));
        assert_eq!(home.get("EarnedRunAverage"), Some(&Value::Null));
        assert_eq!(home.get("TeamResult"), Some(&Value::Text("W".into())));
        assert_eq!(home.get("IsAway"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_plays_and_nested_form() {
        let bundle = game_bundle(&feed(), &boxscore(), &pbp()).unwrap();
        let plays = &bundle.children[2].table;
        assert_eq!(plays.len(), 1);
        assert_eq!(plays.records()[0].get("MlbGameId"), Some(&Value::Int(565895)));

        let nested = serde_json::to_value(bundle.nested()).unwrap();
        assert_eq!(nested["AwayPlayers"].as_array().unwrap().len(), 2);
        assert_eq!(nested["Plays"][0]["BatSide"], json!("R"));
    }

    #[test]
    fn test_team_table() {
        let teams = json!({"teams": [
            {"id": 137, "teamName": "Giants", "venue": {"id": 2395}, "teamCode": "sfn",
             "abbreviation": "SF", "locationName": "San Francisco",
             "league": {"id": 104}, "division": {"id": 203}},
            {"id": 119, "teamName": "Dodgers"}
        ]});
        let table = team_table(&teams).unwrap();
        assert_eq!(table.len(), 2);
        let giants = &table.records()[0];
        assert_eq!(giants.get("MlbVenueId"), Some(&Value::Int(2395)));
        assert_eq!(giants.get("MlbDivisionId"), Some(&Value::Int(203)));
        assert_eq!(table.records()[1].get("LocationName"), Some(&Value::Null));
    }

    #[test]
    fn test_player_table() {
        let players = json!({"people": [
            {"id": 605141, "fullName": "Mookie Betts", "firstName": "Mookie", "lastName": "Betts",
             "birthDate": "1992-10-07", "height": "5' 9\"", "weight": 180,
             "currentTeam": {"id": 111}, "primaryPosition": {"abbreviation": "RF"},
             "mlbDebutDate": "2014-06-29", "batSide": {"code": "R"}, "pitchHand": {"code": "R"}},
            {"id": 1, "fullName": "Free Agent", "currentTeam": {}}
        ]});
        let table = player_table(&players, 2019).unwrap();
        let betts = &table.records()[0];
        assert_eq!(betts.get("Season"), Some(&Value::Int(2019)));
        assert_eq!(betts.get("BirthDate").unwrap().to_cell(), "1992-10-07");
        assert_eq!(betts.get("PlayerHeight"), Some(&Value::Text("5' 9\"".into())));
        assert_eq!(betts.get("MlbTeamId"), Some(&Value::Int(111)));
        assert_eq!(table.records()[1].get("MlbTeamId"), Some(&Value::Null));
        assert!(player_table(&json!({}), 2019).unwrap().is_empty());
    }

    #[test]
    fn test_schedule_filter() {
        let schedule = json!({"dates": [{"games": [
            {"gamePk": 1, "seriesDescription": "Regular Season", "status": {"codedGameState": "F"}},
            {"gamePk": 2, "seriesDescription": "Spring Training", "status": {"codedGameState": "F"}},
            {"gamePk": 3, "seriesDescription": "Regular Season", "status": {"codedGameState": "S"}}
        ]}]});
        let games = schedule_games(&schedule);
        assert_eq!(games.len(), 3);
        assert_eq!(games[1].get("SeriesDescription"), Some(&Value::Text("Spring Training".into())));
        let kept: Vec<i64> = games
            .iter()
            .filter(|g| is_final_regular_season(g))
            .filter_map(game_pk)
            .collect();
        assert_eq!(kept, vec![1]);
    }

    #[test]
    fn test_schedule_row_fields() {
        let schedule = json!({"dates": [{"games": [{
            "gamePk": 565895, "seasonDisplay": "2019", "gameDate": "2019-07-04T02:10:00Z",
            "teams": {"away": {"team": {"id": 137}}, "home": {"team": {"id": 119}}},
            "dayNight": "night", "seriesGameNumber": 2, "gamesInSeries": 3
        }]}]});
        let game = &schedule_games(&schedule)[0];
        assert_eq!(game.len(), MlbScheduleGame::field_map().len());
        assert_eq!(game.get("GameDate").unwrap().to_cell(), "2019-07-03");
        assert_eq!(game.get("AwayTeamId"), Some(&Value::Int(137)));
        assert_eq!(game.get("GameState"), Some(&Value::Null));
        assert!(!is_final_regular_season(game));
    }

    #[test]
    fn test_missing_team_runs_leave_result_null() {
        let mut boxscore = boxscore();
        boxscore["teams"]["away"].as_object_mut().unwrap().remove("teamStats");
        boxscore["teams"]["home"].as_object_mut().unwrap().remove("teamStats");

        let bundle = game_bundle(&feed(), &boxscore, &pbp()).unwrap();
        assert_eq!(bundle.game.get("AwayRuns"), Some(&Value::Null));
        for side in &bundle.children[..2] {
            for player in side.table.records() {
                assert_eq!(player.get("TeamResult"), Some(&Value::Null));
            }
        }
    }

    #[test]
    fn test_pitching_flags_default_false() {
        let bundle = game_bundle(&feed(), &boxscore(), &pbp()).unwrap();
        // the home pitcher's line has no wins, completeGames or shutouts keys
        let home = &bundle.children[1].table.records()[0];
        assert_eq!(home.get("PitchingWin"), Some(&Value::Bool(false)));
        assert_eq!(home.get("CompleteGame"), Some(&Value::Bool(false)));
        assert_eq!(home.get("Shutout"), Some(&Value::Bool(false)));
    }
}
