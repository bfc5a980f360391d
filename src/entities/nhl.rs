//! NHL Stats API entities. One live-feed document carries the whole game:
//! linescore, box score and play-by-play. The team listing, fetched with
//! rosters expanded, yields the teams and their players.

use serde_json::Value as Json;

use super::{apply_context, children_at, display_time, entity_kind, game_context, EntityKind, GameBundle};
use crate::core::derive::{
    only_goalie, overtime_note, scored_side_result, shootout_goals, Period, ShootoutAttempt,
};
use crate::core::field_map::{TimestampPart, Transform};
use crate::core::{
    extract_all, filter_participants, CoreError, FieldKind, FieldMap, FieldSpec, FieldPath, ParticipationRule,
    Table, Value,
};

const PLAYER_CONTEXT: [&str; 7] = [
    "NhlGameId",
    "Season",
    "AwayTeamId",
    "HomeTeamId",
    "ResultNote",
    "Overtime",
    "Shootout",
];

entity_kind!(NhlGame, "nhl_games", game_map);
entity_kind!(NhlPlayerBoxscore, "nhl_player_boxscores", player_map);
entity_kind!(NhlPlay, "nhl_plays", play_map);
entity_kind!(NhlTeam, "nhl_teams", team_map);
entity_kind!(NhlPlayer, "nhl_players", roster_player_map);

fn game_map() -> FieldMap {
    let mut specs = vec![
        FieldSpec::new("NhlGameId", "gamePk", FieldKind::Int),
        FieldSpec::new("Season", "gameData.game.season", FieldKind::Int)
            .with_transform(Transform::SeasonPrefix),
        FieldSpec::new("GameDateTime", "gameData.datetime.dateTime", FieldKind::Timestamp)
            .with_transform(display_time(TimestampPart::DateTime)),
        FieldSpec::new("GameDate", "gameData.datetime.dateTime", FieldKind::Date)
            .with_transform(display_time(TimestampPart::Date)),
        FieldSpec::new("GameTime", "gameData.datetime.dateTime", FieldKind::Time)
            .with_transform(display_time(TimestampPart::Time)),
        FieldSpec::new("GameStatus", "gameData.status.detailedState", FieldKind::Text),
    ];
    for (side, prefix) in [("away", "Away"), ("home", "Home")] {
        specs.push(FieldSpec::new(
            &format!("{prefix}TeamId"),
            &format!("gameData.teams.{side}.id"),
            FieldKind::Int,
        ));
        let stats = format!("liveData.boxscore.teams.{side}.teamStats.teamSkaterStats");
        for (column, key, kind) in [
            ("Goals", "goals", FieldKind::Int),
            ("Pim", "pim", FieldKind::Int),
            ("Shots", "shots", FieldKind::Int),
            ("PowerPlayPct", "powerPlayPercentage", FieldKind::Float),
            ("PowerPlayGoals", "powerPlayGoals", FieldKind::Int),
            ("PowerPlayOpportunities", "powerPlayOpportunities", FieldKind::Int),
            ("FaceOffWinPct", "faceOffWinPercentage", FieldKind::Float),
            ("Blocked", "blocked", FieldKind::Int),
            ("Takeaways", "takeaways", FieldKind::Int),
            ("Giveaways", "giveaways", FieldKind::Int),
            ("Hits", "hits", FieldKind::Int),
        ] {
            specs.push(FieldSpec::new(&format!("{prefix}{column}"), &format!("{stats}.{key}"), kind));
        }
    }
    specs.extend([
        FieldSpec::new("NhlVenueId", "gameData.venue.id", FieldKind::Int),
        FieldSpec::new("NhlVenueName", "gameData.venue.name", FieldKind::Text),
        FieldSpec::derived("ResultNote", FieldKind::Text),
        FieldSpec::derived("Overtime", FieldKind::Bool),
        FieldSpec::new("Shootout", "liveData.linescore.hasShootout", FieldKind::Bool).with_default(false),
    ]);
    FieldMap::new("nhl game", specs)
}

fn player_map() -> FieldMap {
    let skater = |name: &str, key: &str, kind: FieldKind| {
        FieldSpec::new(name, &format!("stats.skaterStats.{key}"), kind)
    };
    let goalie = |name: &str, key: &str, kind: FieldKind| {
        FieldSpec::new(name, &format!("stats.goalieStats.{key}"), kind)
    };
    use FieldKind::{Float, Int, Text};

    FieldMap::new(
        "nhl player boxscore",
        vec![
            FieldSpec::new("NhlPlayerId", "person.id", Int),
            FieldSpec::derived("NhlGameId", Int),
            FieldSpec::derived("Season", Int),
            FieldSpec::derived("AwayTeamId", Int),
            FieldSpec::derived("HomeTeamId", Int),
            FieldSpec::derived("IsAway", FieldKind::Bool),
            FieldSpec::derived("TeamResult", Text),
            FieldSpec::derived("ResultNote", Text),
            FieldSpec::derived("Overtime", FieldKind::Bool),
            FieldSpec::derived("Shootout", FieldKind::Bool),
            skater("SkaterTimeOnIce", "timeOnIce", Text),
            skater("SkaterAssists", "assists", Int),
            skater("SkaterGoals", "goals", Int),
            skater("SkaterShots", "shots", Int),
            skater("SkaterHits", "hits", Int),
            skater("SkaterPowerPlayGoals", "powerPlayGoals", Int),
            skater("SkaterPowerPlayAssists", "powerPlayAssists", Int),
            skater("SkaterPenaltyMins", "penaltyMinutes", Int),
            skater("SkaterTakeaways", "takeaways", Int),
            skater("SkaterGiveaways", "giveaways", Int),
            skater("SkaterShortHandedGoals", "shortHandedGoals", Int),
            skater("SkaterShortHandedAssists", "shortHandedAssists", Int),
            skater("SkaterBlocked", "blocked", Int),
            skater("SkaterPlusMinus", "plusMinus", Int),
            skater("SkaterEvenTimeOnIce", "evenTimeOnIce", Text),
            skater("SkaterPowerPlayTimeOnIce", "powerPlayTimeOnIce", Text),
            skater("SkaterShortHandedTimeOnIce", "shortHandedTimeOnIce", Text),
            FieldSpec::derived("SkaterShootoutGoals", Int),
            goalie("GoalieTimeOnIce", "timeOnIce", Text),
            goalie("GoalieAssists", "assists", Int),
            goalie("GoalieGoals", "goals", Int),
            goalie("GoaliePenaltyMins", "pim", Int),
            goalie("GoalieShotsAgainst", "shots", Int),
            goalie("GoalieSaves", "saves", Int),
            FieldSpec::new("GoalieGoalsAgainst", "stats.goalieStats", Int)
                .with_transform(Transform::difference("shots", "saves")),
            goalie("GoaliePowerPlaySaves", "powerPlaySaves", Int),
            goalie("GoalieShortHandedSaves", "shortHandedSaves", Int),
            goalie("GoalieEvenSaves", "evenSaves", Int),
            goalie("GoalieShortHandedShotsAgainst", "shortHandedShotsAgainst", Int),
            goalie("GoalieEvenShotsAgainst", "evenShotsAgainst", Int),
            goalie("GoaliePowerPlayShotsAgainst", "powerPlayShotsAgainst", Int),
            goalie("GoalieDecision", "decision", Text),
            goalie("GoalieSavePct", "savePercentage", Float),
            goalie("GoaliePowerPlaySavePct", "powerPlaySavePercentage", Float),
            goalie("GoalieEvenStrengthSavePct", "evenStrengthSavePercentage", Float),
            FieldSpec::derived("OnlyGoalie", FieldKind::Bool),
        ],
    )
}

fn play_map() -> FieldMap {
    FieldMap::new(
        "nhl play",
        vec![
            FieldSpec::derived("NhlGameId", FieldKind::Int),
            FieldSpec::new("NhlPlayer1Id", "players.0.player.id", FieldKind::Int),
            FieldSpec::new("NhlPlayer1Type", "players.0.playerType", FieldKind::Text),
            FieldSpec::new("NhlPlayer2Id", "players.1.player.id", FieldKind::Int),
            FieldSpec::new("NhlPlayer2Type", "players.1.playerType", FieldKind::Text),
            FieldSpec::new("Event", "result.event", FieldKind::Text),
            FieldSpec::new("Description", "result.description", FieldKind::Text),
            FieldSpec::new("Period", "about.period", FieldKind::Int),
            FieldSpec::new("PeriodType", "about.periodType", FieldKind::Text),
            FieldSpec::new("PeriodTime", "about.periodTime", FieldKind::Text),
            FieldSpec::new("PeriodTimeRemaining", "about.periodTimeRemaining", FieldKind::Text),
            FieldSpec::new("PlayDateTime", "about.dateTime", FieldKind::Timestamp)
                .with_transform(display_time(TimestampPart::DateTime)),
            FieldSpec::new("AwayGoals", "about.goals.away", FieldKind::Int),
            FieldSpec::new("HomeGoals", "about.goals.home", FieldKind::Int),
        ],
    )
}

// =============================================================================
// Schedule
// =============================================================================

pub fn schedule_games(schedule: &Json) -> Vec<&Json> {
    children_at(schedule, "dates")
        .into_iter()
        .flat_map(|date| children_at(date, "games"))
        .collect()
}

pub fn game_pk(game: &Json) -> Option<i64> {
    game.get("gamePk").and_then(Json::as_i64)
}

// =============================================================================
// Game bundle
// =============================================================================

fn periods(feed: &Json) -> Vec<Period> {
    children_at(feed, "liveData.linescore.periods")
        .into_iter()
        .filter_map(|p| {
            Some(Period {
                num: u32::try_from(p.get("num")?.as_u64()?).ok()?,
                ordinal: p.get("ordinalNum")?.as_str()?.to_string(),
            })
        })
        .collect()
}

fn team_map() -> FieldMap {
    FieldMap::new(
        "nhl team",
        vec![
            FieldSpec::new("NhlTeamId", "id", FieldKind::Int),
            FieldSpec::new("TeamName", "teamName", FieldKind::Text),
            FieldSpec::new("NhlVenueId", "venue.id", FieldKind::Int),
            FieldSpec::new("NhlVenueName", "venue.name", FieldKind::Text),
            FieldSpec::new("TeamAbbreviation", "abbreviation", FieldKind::Text),
            FieldSpec::new("LocationName", "locationName", FieldKind::Text),
            FieldSpec::new("NhlDivisionId", "division.id", FieldKind::Int),
            FieldSpec::new("NhlConferenceId", "conference.id", FieldKind::Int),
        ],
    )
}

/// Read from one `roster.roster[]` entry.
fn roster_player_map() -> FieldMap {
    FieldMap::new(
        "nhl player",
        vec![
            FieldSpec::new("NhlPlayerId", "person.id", FieldKind::Int),
            FieldSpec::new("FullName", "person.fullName", FieldKind::Text),
            FieldSpec::derived("NhlTeamId", FieldKind::Int),
            FieldSpec::new("JerseyNumber", "jerseyNumber", FieldKind::Int),
            FieldSpec::new("Position", "position.abbreviation", FieldKind::Text),
        ],
    )
}

/// Every team in the `teams` listing.
pub fn team_table(teams: &Json) -> Result<Table, CoreError> {
    let rows = extract_all(children_at(teams, "teams"), NhlTeam::field_map());
    Table::from_records(NhlTeam::field_map(), rows)
}

/// Every rostered player, in team order.
pub fn player_table(teams: &Json) -> Result<Table, CoreError> {
    let mut table = NhlPlayer::empty_table();
    for team in children_at(teams, "teams") {
        let team_id = team.get("id").and_then(|id| FieldKind::Int.coerce(id)).unwrap_or_default();
        for player in children_at(team, "roster.roster") {
            table.append(NhlPlayer::extract(player).with("NhlTeamId", team_id.clone()))?;
        }
    }
    Ok(table)
}

fn shootout_attempts(feed: &Json) -> Vec<ShootoutAttempt> {
    let period_type = FieldPath::parse("about.periodType");
    let event = FieldPath::parse("result.event");
    let mut attempts = Vec::new();
    for play in children_at(feed, "liveData.plays.allPlays") {
        if period_type.resolve(play).and_then(Json::as_str) != Some("SHOOTOUT") {
            continue;
        }
        let is_goal = event.resolve(play).and_then(Json::as_str) == Some("Goal");
        for player in children_at(play, "players") {
            if player.get("playerType").and_then(Json::as_str) != Some("Scorer") {
                continue;
            }
            if let Some(id) = player.pointer("/player/id").and_then(Json::as_i64) {
                attempts.push(ShootoutAttempt { scorer_id: id, is_goal });
            }
        }
    }
    attempts
}

/// Build the game record with its player and play tables from one live feed.
pub fn game_bundle(feed: &Json) -> Result<GameBundle, CoreError> {
    let has_shootout = FieldPath::parse("liveData.linescore.hasShootout")
        .resolve(feed)
        .and_then(Json::as_bool)
        .unwrap_or(false);
    let (overtime, note) = overtime_note(&periods(feed), has_shootout);
    let game = NhlGame::extract(feed)
        .with("Overtime", overtime)
        .with("ResultNote", if note.is_empty() { Value::Null } else { Value::Text(note) });

    let away_goals = game.get("AwayGoals").and_then(Value::as_i64);
    let home_goals = game.get("HomeGoals").and_then(Value::as_i64);
    let context = game_context(&game, &PLAYER_CONTEXT);
    let goals = if has_shootout {
        shootout_goals(&shootout_attempts(feed))
    } else {
        Default::default()
    };

    let rule = ParticipationRule::new(&["stats.skaterStats", "stats.goalieStats"]);
    let mut bundle = GameBundle::new(NhlGame::NAME, game.clone());
    for (side, key) in [("away", "AwayPlayers"), ("home", "HomePlayers")] {
        let is_away = side == "away";
        let candidates = children_at(feed, &format!("liveData.boxscore.teams.{side}.players"));
        let goalie_stats = FieldPath::parse("stats.goalieStats");
        let goalies_recorded = candidates.iter().filter(|p| goalie_stats.is_present(p)).count();

        let players = filter_participants(candidates, &rule, NhlPlayerBoxscore::field_map())?
            .map_records(|r| {
                let is_skater = !r.get("SkaterTimeOnIce").is_some_and(Value::is_null);
                let is_goalie = !r.get("GoalieTimeOnIce").is_some_and(Value::is_null);
                let player_id = r.get("NhlPlayerId").and_then(Value::as_i64);
                let so_goals = player_id
                    .filter(|_| is_skater)
                    .map(|id| goals.get(&id).copied().unwrap_or(0));
                apply_context(r, &context)
                    .with("IsAway", is_away)
                    .with(
                        "TeamResult",
                        scored_side_result(is_away, away_goals, home_goals).map(|r| r.code()),
                    )
                    .with("SkaterShootoutGoals", so_goals)
                    .with("OnlyGoalie", is_goalie.then(|| only_goalie(goalies_recorded)))
            })?;
        bundle = bundle.with_child(key, NhlPlayerBoxscore::NAME, players);
    }

    let game_id = game.get("NhlGameId").cloned().unwrap_or_default();
    let plays = extract_all(children_at(feed, "liveData.plays.allPlays"), NhlPlay::field_map());
    let plays = Table::from_records(NhlPlay::field_map(), plays)?
        .map_records(|r| r.with("NhlGameId", game_id.clone()))?;
    Ok(bundle.with_child("Plays", NhlPlay::NAME, plays))
}
