//! NFL entities from the league's game feeds: the game record, one row per
//! skill player and one defense/special-teams row per side.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde_json::{json, Map, Value as Json};

use super::{apply_context, children_at, entity_kind, game_context, EntityKind, GameBundle};
use crate::core::derive::{dst_points_allowed, scored_side_result, ReturnScoring};
use crate::core::field_map::{Transform, TransformError};
use crate::core::{CoreError, FieldKind, FieldMap, FieldSpec, FieldPath, Record, Value};

/// Date format of `gameSchedule.gameDate`.
const GAME_DATE_FORMAT: &str = "%m/%d/%Y";

const PLAYER_CONTEXT: [&str; 4] = ["NflGameId", "Season", "AwayTeamId", "HomeTeamId"];

/// Player stat lists of a side's box score. Each entry names the stat
/// objects an item may carry and the key they are merged under.
const PLAYER_STAT_LISTS: [(&str, &[(&str, &str)]); 5] = [
    ("playerBoxScorePassingStats", &[("playerPassingStat", "passing")]),
    ("playerBoxScoreRushingStats", &[("playerRushingStat", "rushing")]),
    ("playerBoxScoreReceivingStats", &[("playerReceivingStat", "receiving")]),
    ("playerBoxScoreFumbleStats", &[("playerFumbleStat", "fumbles")]),
    (
        "playerBoxScoreReturnStats",
        &[
            ("playerKickReturnsStat", "kickReturns"),
            ("playerPuntReturnsStat", "puntReturns"),
        ],
    ),
];

entity_kind!(NflGame, "nfl_games", game_map);
entity_kind!(NflPlayerBoxscore, "nfl_player_boxscores", player_map);
entity_kind!(
    /// A team's defense and special teams, scored like a player.
    NflDst,
    "nfl_dst_boxscores",
    dst_map
);

fn game_date(raw: &Json) -> Result<Value, TransformError> {
    let text = raw
        .as_str()
        .ok_or_else(|| TransformError::Unexpected(raw.to_string()))?;
    NaiveDate::parse_from_str(text, GAME_DATE_FORMAT)
        .map(Value::Date)
        .map_err(|e| TransformError::InvalidTimestamp(format!("{text}: {e}")))
}

fn game_map() -> FieldMap {
    let schedule = |name: &str, key: &str, kind: FieldKind| {
        FieldSpec::new(name, &format!("gameSchedule.{key}"), kind)
    };
    let mut specs = vec![
        schedule("NflGameId", "gameId", FieldKind::Int),
        schedule("Season", "season", FieldKind::Int),
        schedule("SeasonType", "seasonType", FieldKind::Text),
        schedule("Week", "week", FieldKind::Int),
        schedule("GameDate", "gameDate", FieldKind::Date).with_transform(Transform::Custom(game_date)),
        schedule("GameTimeEastern", "gameTimeEastern", FieldKind::Time),
    ];
    for (side, prefix) in [("visitor", "Away"), ("home", "Home")] {
        let id_key = if side == "home" { "homeTeamId" } else { "visitorTeamId" };
        specs.push(schedule(&format!("{prefix}TeamId"), id_key, FieldKind::Int));
        let score = format!("score.{side}TeamScore");
        for (column, key) in [
            ("Score", "pointTotal"),
            ("ScoreQ1", "pointQ1"),
            ("ScoreQ2", "pointQ2"),
            ("ScoreQ3", "pointQ3"),
            ("ScoreQ4", "pointQ4"),
            ("ScoreOT", "pointOT"),
        ] {
            specs.push(FieldSpec::new(
                &format!("{prefix}Team{column}"),
                &format!("{score}.{key}"),
                FieldKind::Int,
            ));
        }
        specs.push(FieldSpec::new(
            &format!("{prefix}TeamTimeOfPossession"),
            &format!("{side}TeamStats.avgTimeOfPossession"),
            FieldKind::Text,
        ));
    }
    specs.push(schedule("NflSiteId", "site.siteId", FieldKind::Int));
    FieldMap::new("nfl game", specs)
}

/// Read from one merged player document (see `player_documents`).
fn player_map() -> FieldMap {
    let int = |name: &str, path: &str| FieldSpec::new(name, path, FieldKind::Int);
    FieldMap::new(
        "nfl player boxscore",
        vec![
            int("NflPlayerId", "nflId"),
            FieldSpec::derived("NflGameId", FieldKind::Int),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::derived("AwayTeamId", FieldKind::Int),
            FieldSpec::derived("HomeTeamId", FieldKind::Int),
            FieldSpec::derived("IsAway", FieldKind::Bool),
            FieldSpec::derived("TeamResult", FieldKind::Text),
            FieldSpec::derived("ResultNote", FieldKind::Text),
            int("PassingAttempts", "passing.passingAttempts"),
            int("PassingCompletions", "passing.passingCompletions"),
            int("PassingYards", "passing.passingYards"),
            int("PassingTouchdowns", "passing.passingTouchdowns"),
            int("PassingInterceptions", "passing.passingInterceptions"),
            int("PassingLong", "passing.passingLong"),
            FieldSpec::new("PassingRating", "passing.passingRating", FieldKind::Float),
            int("RushingAttempts", "rushing.rushingAttempts"),
            int("RushingYards", "rushing.rushingYards"),
            int("RushingTouchdowns", "rushing.rushingTouchdowns"),
            int("RushingLong", "rushing.rushingLong"),
            int("ReceivingReceptions", "receiving.receivingReceptions"),
            int("ReceivingYards", "receiving.receivingYards"),
            int("ReceivingTouchdowns", "receiving.receivingTouchdowns"),
            int("ReceivingLong", "receiving.receivingLong"),
            int("Fumbles", "fumbles.fumbles"),
            int("FumblesLost", "fumbles.fumblesLost"),
            int("FumbleReturnTouchdowns", "fumbles.touchdownsFumbleReturns"),
            int("OffensiveFumbleRecoveryTd", "fumbles.teammateFumbleTd"),
            int("KickReturnTouchdowns", "kickReturns.kickReturnsTouchdowns"),
            int("PuntReturnTouchdowns", "puntReturns.puntReturnsTouchdowns"),
        ],
    )
}

/// Read from one side's team-stats object.
fn dst_map() -> FieldMap {
    let int = |name: &str, key: &str| FieldSpec::new(name, key, FieldKind::Int);
    FieldMap::new(
        "nfl dst",
        vec![
            FieldSpec::derived("NflPlayerId", FieldKind::Int),
            FieldSpec::derived("NflGameId", FieldKind::Int),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::derived("IsAway", FieldKind::Bool),
            FieldSpec::derived("TeamResult", FieldKind::Text),
            FieldSpec::derived("ResultNote", FieldKind::Text),
            FieldSpec::derived("IsDefense", FieldKind::Bool).with_default(true),
            int("DstPuntReturnTouchdowns", "touchdownsPuntReturns").with_default(0i64),
            int("DstKickReturnTouchdowns", "touchdownsKickoffReturns").with_default(0i64),
            int("DstFumbleReturnTouchdowns", "touchdownsFumbleReturns").with_default(0i64),
            int("DefensiveSacks", "defensiveSacks"),
            int("DefensiveForcedFumbles", "defensiveForcedFumble"),
            int("DefensiveInterceptions", "defensiveInterceptions"),
            int("DefensiveInterceptionTds", "defensiveInterceptionsTds").with_default(0i64),
            int("DefensiveSafeties", "defensiveSafeties").with_default(0i64),
            FieldSpec::derived("DstPointsAllowed", FieldKind::Int),
        ],
    )
}

// =============================================================================
// Schedule
// =============================================================================

/// Season a date falls in: January and February games belong to the
/// previous year's season.
pub fn season_of(date: NaiveDate) -> i32 {
    if date.month() <= 2 {
        date.year() - 1
    } else {
        date.year()
    }
}

/// `(gameId, gameDate)` for every game of a season schedule.
pub fn schedule_games(schedule: &Json) -> Vec<(i64, Option<NaiveDate>)> {
    children_at(schedule, "gameSchedules")
        .into_iter()
        .filter_map(|g| {
            let id = FieldKind::Int.coerce(g.get("gameId")?)?.as_i64()?;
            let date = g
                .get("gameDate")
                .and_then(|d| game_date(d).ok())
                .and_then(|v| match v {
                    Value::Date(d) => Some(d),
                    _ => None,
                });
            Some((id, date))
        })
        .collect()
}

// =============================================================================
// Game bundle
// =============================================================================

fn return_scoring(dst: &Record) -> ReturnScoring {
    let n = |name: &str| dst.get(name).and_then(Value::as_i64).unwrap_or(0);
    ReturnScoring {
        punt_return_tds: n("DstPuntReturnTouchdowns"),
        kick_return_tds: n("DstKickReturnTouchdowns"),
        fumble_return_tds: n("DstFumbleReturnTouchdowns"),
        interception_return_tds: n("DefensiveInterceptionTds"),
        safeties: n("DefensiveSafeties"),
    }
}

/// One document per player of a side (`"visitor"` or `"home"`), each
/// stat object under its group key. Players keep the order they first
/// appear in across the stat lists.
pub fn player_documents(boxscore: &Json, side: &str) -> Vec<Json> {
    let mut order = Vec::new();
    let mut players: HashMap<i64, Map<String, Json>> = HashMap::new();
    for (list, groups) in PLAYER_STAT_LISTS {
        for item in children_at(boxscore, &format!("{side}TeamBoxScoreStat.{list}")) {
            let Some(id) = item
                .pointer("/teamPlayer/nflId")
                .and_then(|v| FieldKind::Int.coerce(v))
                .and_then(|v| v.as_i64())
            else {
                continue;
            };
            let doc = players.entry(id).or_insert_with(|| {
                order.push(id);
                let mut doc = Map::new();
                doc.insert("nflId".into(), json!(id));
                doc
            });
            for &(stat, key) in groups {
                if let Some(stats) = item.get("playerGameStat").and_then(|g| g.get(stat)) {
                    doc.insert(key.to_string(), stats.clone());
                }
            }
        }
    }
    order
        .into_iter()
        .filter_map(|id| players.remove(&id))
        .map(Json::Object)
        .collect()
}

/// Build the game record, the skill-player rows and both DST rows from
/// one box score feed.
pub fn game_bundle(boxscore: &Json) -> Result<GameBundle, CoreError> {
    let game = NflGame::extract(boxscore);
    let score = |name: &str| game.get(name).and_then(Value::as_i64);
    let (away_points, home_points) = (score("AwayTeamScore"), score("HomeTeamScore"));
    let overtime = [score("AwayTeamScoreOT"), score("HomeTeamScoreOT")]
        .into_iter()
        .any(|points| points.is_some_and(|p| p > 0));
    let note = overtime.then_some("OT");
    let result = |is_away| scored_side_result(is_away, away_points, home_points).map(|r| r.code());

    let side_stats = |side: &str| {
        FieldPath::parse(&format!("{side}TeamStats"))
            .resolve(boxscore)
            .cloned()
            .unwrap_or(Json::Null)
    };
    let away = NflDst::extract(&side_stats("visitor"));
    let home = NflDst::extract(&side_stats("home"));
    let away_returns = return_scoring(&away);
    let home_returns = return_scoring(&home);

    let game_id = game.get("NflGameId").cloned().unwrap_or_default();
    let season = game.get("Season").cloned().unwrap_or_default();
    let mut defenses = NflDst::empty_table();
    for (is_away, dst, opponent_points, opponent_returns) in [
        (true, away, home_points, &home_returns),
        (false, home, away_points, &away_returns),
    ] {
        let team_id = game
            .get(if is_away { "AwayTeamId" } else { "HomeTeamId" })
            .cloned()
            .unwrap_or_default();
        defenses.append(
            dst.with("NflPlayerId", team_id)
                .with("NflGameId", game_id.clone())
                .with("Season", season.clone())
                .with("IsAway", is_away)
                .with("TeamResult", result(is_away))
                .with("ResultNote", note)
                .with(
                    "DstPointsAllowed",
                    opponent_points.map(|p| dst_points_allowed(p, opponent_returns)),
                ),
        )?;
    }

    let context = game_context(&game, &PLAYER_CONTEXT);
    let mut players = NflPlayerBoxscore::empty_table();
    for (is_away, side) in [(true, "visitor"), (false, "home")] {
        for doc in player_documents(boxscore, side) {
            players.append(
                apply_context(NflPlayerBoxscore::extract(&doc), &context)
                    .with("IsAway", is_away)
                    .with("TeamResult", result(is_away))
                    .with("ResultNote", note),
            )?;
        }
    }

    Ok(GameBundle::new(NflGame::NAME, game)
        .with_child("Defenses", NflDst::NAME, defenses)
        .with_child("Players", NflPlayerBoxscore::NAME, players))
}
