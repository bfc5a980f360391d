//! XFL entities scraped from the league's stats pages.
//!
//! Each game page is HTML. The relevant pieces (team header, the three
//! individual offense tables per side and the scoring summary) are read
//! with CSS selectors into keyed JSON documents, then extracted with field
//! maps like every other source.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use serde_json::{json, Map, Value as Json};

use super::{apply_context, entity_kind, game_context, selector, text_of, EntityKind, GameBundle};
use crate::core::derive::{point_conversions, scored_side_result};
use crate::core::field_map::Transform;
use crate::core::{CoreError, FieldKind, FieldMap, FieldSpec, Table, Value};

/// Games per week; week `w` holds ids `(w - 1) * 4 + 1 ..= w * 4`.
const GAMES_PER_WEEK: u32 = 4;

const PLAYER_CONTEXT: [&str; 4] = ["XflGameId", "Season", "AwayTeam", "HomeTeam"];

/// Cell columns of the individual offense tables, in page order. `None`
/// marks a column that is not kept.
const RUSHING_COLUMNS: [Option<&str>; 5] = [
    Some("attempts"),
    Some("yards"),
    Some("average"),
    Some("long"),
    Some("touchdowns"),
];
const PASSING_COLUMNS: [Option<&str>; 10] = [
    Some("completions"),
    Some("attempts"),
    Some("pct"),
    Some("yards"),
    None,
    None,
    Some("long"),
    Some("touchdowns"),
    Some("interceptions"),
    Some("rating"),
];
const RECEIVING_COLUMNS: [Option<&str>; 6] = [
    Some("targets"),
    Some("receptions"),
    Some("yards"),
    Some("average"),
    Some("long"),
    Some("touchdowns"),
];

const SCORING_CLASSES: [(&str, &str); 9] = [
    ("rQtr", "quarter"),
    ("rStart", "start"),
    ("rPossDown", "situation"),
    ("rPlayDesc", "description"),
    ("rPlays", "plays"),
    ("rYards", "yards"),
    ("rTime", "time"),
    ("rVisitor", "visitor"),
    ("rHome", "home"),
];

entity_kind!(XflGame, "xfl_games", game_map);
entity_kind!(XflPlayerBoxscore, "xfl_player_boxscores", player_map);
entity_kind!(XflScoringPlay, "xfl_scoring_plays", scoring_play_map);

fn game_map() -> FieldMap {
    FieldMap::new(
        "xfl game",
        vec![
            FieldSpec::new("XflGameId", "game_id", FieldKind::Int),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::new("AwayTeam", "visitor_team", FieldKind::Text),
            FieldSpec::new("AwayTeamScore", "visitor_score", FieldKind::Int),
            FieldSpec::new("HomeTeam", "home_team", FieldKind::Text),
            FieldSpec::new("HomeTeamScore", "home_score", FieldKind::Int),
        ],
    )
}

fn player_map() -> FieldMap {
    let int = |name: &str, path: &str| FieldSpec::new(name, path, FieldKind::Int);
    let float = |name: &str, path: &str| FieldSpec::new(name, path, FieldKind::Float);
    FieldMap::new(
        "xfl player boxscore",
        vec![
            FieldSpec::new("PlayerName", "player", FieldKind::Text).with_transform(Transform::StripPunctuation),
            FieldSpec::new("JerseyNumber", "jersey", FieldKind::Int),
            FieldSpec::derived("XflGameId", FieldKind::Int),
            FieldSpec::derived("Season", FieldKind::Int),
            FieldSpec::derived("AwayTeam", FieldKind::Text),
            FieldSpec::derived("HomeTeam", FieldKind::Text),
            FieldSpec::derived("IsAway", FieldKind::Bool),
            FieldSpec::derived("TeamResult", FieldKind::Text),
            int("PassingCompletions", "passing.completions"),
            int("PassingAttempts", "passing.attempts"),
            float("PassingCompletionPct", "passing.pct"),
            int("PassingYards", "passing.yards"),
            int("PassingLong", "passing.long"),
            int("PassingTouchdowns", "passing.touchdowns"),
            int("PassingInterceptions", "passing.interceptions"),
            float("PassingRating", "passing.rating"),
            int("RushingAttempts", "rushing.attempts"),
            int("RushingYards", "rushing.yards"),
            float("RushingAverage", "rushing.average"),
            int("RushingLong", "rushing.long"),
            int("RushingTouchdowns", "rushing.touchdowns"),
            int("ReceivingTargets", "receiving.targets"),
            int("Receptions", "receiving.receptions"),
            int("ReceivingYards", "receiving.yards"),
            float("ReceivingAverage", "receiving.average"),
            int("ReceivingLong", "receiving.long"),
            int("ReceivingTouchdowns", "receiving.touchdowns"),
            FieldSpec::derived("OnePointConversions", FieldKind::Int),
            FieldSpec::derived("TwoPointConversions", FieldKind::Int),
            FieldSpec::derived("ThreePointConversions", FieldKind::Int),
        ],
    )
}

fn scoring_play_map() -> FieldMap {
    FieldMap::new(
        "xfl scoring play",
        vec![
            FieldSpec::derived("XflGameId", FieldKind::Int),
            FieldSpec::new("XflTeamAbbrev", "team", FieldKind::Text),
            FieldSpec::new("Quarter", "quarter", FieldKind::Int),
            FieldSpec::new("PlayStartTime", "start", FieldKind::Text),
            FieldSpec::new("Situation", "situation", FieldKind::Text),
            FieldSpec::new("PlayDescription", "description", FieldKind::Text),
            FieldSpec::new("DrivePlayCount", "plays", FieldKind::Int),
            FieldSpec::new("DriveYards", "yards", FieldKind::Int),
            FieldSpec::new("DriveTime", "time", FieldKind::Text),
            FieldSpec::new("EndAwayScore", "visitor", FieldKind::Int),
            FieldSpec::new("EndHomeScore", "home", FieldKind::Int),
        ],
    )
}

/// Game ids played in a week of the season.
pub fn game_ids_for_week(week: u32) -> Vec<u32> {
    if week == 0 {
        return Vec::new();
    }
    let first = (week - 1) * GAMES_PER_WEEK + 1;
    (first..first + GAMES_PER_WEEK).collect()
}

// =============================================================================
// Page parsing
// =============================================================================

/// Team abbreviation from a header div's class list: the second class
/// without its four-character prefix (`"teamDCD"` → `"DCD"`).
fn team_from_header(document: &Html, marker: &str) -> Result<Option<String>, CoreError> {
    let header = selector(&format!("div[class*=\"{marker}\"]"))?;
    Ok(document
        .select(&header)
        .next()
        .and_then(|div| div.value().attr("class"))
        .and_then(|classes| classes.split_whitespace().nth(1))
        .and_then(|class| class.get(4..))
        .map(str::to_string))
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>, CoreError> {
    Ok(document.select(&selector(css)?).next().map(text_of))
}

/// Header facts of a game page.
pub fn game_document(document: &Html, game_id: i64) -> Result<Json, CoreError> {
    let visitor_team = team_from_header(document, "visitStroke")?;
    let home_team = team_from_header(document, "homeStroke")?;
    let visitor_score = first_text(document, "h2.score.visitor")?;
    let home_score = first_text(document, "h2.score.home")?;
    Ok(json!({
        "game_id": game_id,
        "visitor_team": visitor_team,
        "home_team": home_team,
        "visitor_score": visitor_score,
        "home_score": home_score,
    }))
}

/// Player documents for one side, merged across the rushing, passing and
/// receiving tables and ordered by name.
pub fn player_documents(document: &Html, is_away: bool) -> Result<Vec<Json>, CoreError> {
    let container = if is_away {
        "#visitorIndOffenseStats"
    } else {
        "#homeIndOffenseStats"
    };
    let tables = selector(&format!("{container} .table"))?;
    let rows = selector(".body .row")?;

    let mut players: BTreeMap<String, Map<String, Json>> = BTreeMap::new();
    let groups: [(&str, &[Option<&str>]); 3] = [
        ("rushing", &RUSHING_COLUMNS),
        ("passing", &PASSING_COLUMNS),
        ("receiving", &RECEIVING_COLUMNS),
    ];
    for (table, (group, columns)) in document.select(&tables).zip(groups) {
        for row in table.select(&rows) {
            let cells: Vec<String> = row.children().filter_map(ElementRef::wrap).map(text_of).collect();
            let [jersey, player, stats @ ..] = cells.as_slice() else {
                continue;
            };
            if player.is_empty() {
                continue;
            }
            let stats: Map<String, Json> = columns
                .iter()
                .zip(stats)
                .filter_map(|(column, cell)| column.map(|c| (c.to_string(), Json::String(cell.clone()))))
                .collect();
            let entry = players.entry(player.clone()).or_insert_with(|| {
                let mut doc = Map::new();
                doc.insert("player".into(), Json::String(player.clone()));
                doc.insert("jersey".into(), Json::String(jersey.clone()));
                doc
            });
            entry.insert(group.to_string(), Json::Object(stats));
        }
    }
    Ok(players.into_values().map(Json::Object).collect())
}

/// Scoring summary rows in page order.
pub fn scoring_documents(document: &Html) -> Result<Vec<Json>, CoreError> {
    let rows = selector("div.row.playRow.teamRow")?;
    let logo = selector("img")?;
    let cells = SCORING_CLASSES
        .iter()
        .map(|(class, key)| selector(&format!(".{class}")).map(|s| (s, *key)))
        .collect::<Result<Vec<_>, CoreError>>()?;

    let mut plays = Vec::new();
    for row in document.select(&rows) {
        let mut doc = Map::new();
        let team = row
            .select(&logo)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| src.rsplit('/').next())
            .and_then(|file| file.split('.').next());
        doc.insert("team".into(), json!(team));
        for (cell, key) in &cells {
            doc.insert(key.to_string(), json!(row.select(cell).next().map(text_of)));
        }
        plays.push(Json::Object(doc));
    }
    Ok(plays)
}

// =============================================================================
// Game bundle
// =============================================================================

/// Build the game record, player rows and scoring plays from one page.
pub fn game_bundle(html: &str, game_id: i64, season: i32) -> Result<GameBundle, CoreError> {
    let document = Html::parse_document(html);
    let game = XflGame::extract(&game_document(&document, game_id)?).with("Season", i64::from(season));
    let away_score = game.get("AwayTeamScore").and_then(Value::as_i64);
    let home_score = game.get("HomeTeamScore").and_then(Value::as_i64);
    let context = game_context(&game, &PLAYER_CONTEXT);
    let game_id = game.get("XflGameId").cloned().unwrap_or_default();

    let plays = Table::from_records(
        XflScoringPlay::field_map(),
        scoring_documents(&document)?
            .iter()
            .map(|doc| XflScoringPlay::extract(doc).with("XflGameId", game_id.clone()))
            .collect(),
    )?;
    let descriptions: Vec<String> = plays
        .records()
        .iter()
        .filter_map(|r| r.get("PlayDescription").and_then(Value::as_str).map(str::to_string))
        .collect();

    let mut players = XflPlayerBoxscore::empty_table();
    for is_away in [true, false] {
        for doc in player_documents(&document, is_away)? {
            let name = doc.get("player").and_then(Json::as_str).unwrap_or_default();
            let conversions = |points| point_conversions(name, descriptions.iter().map(String::as_str), points);
            let record = apply_context(XflPlayerBoxscore::extract(&doc), &context)
                .with("IsAway", is_away)
                .with(
                    "TeamResult",
                    scored_side_result(is_away, away_score, home_score).map(|r| r.code()),
                )
                .with("OnePointConversions", conversions(1))
                .with("TwoPointConversions", conversions(2))
                .with("ThreePointConversions", conversions(3));
            players.append(record)?;
        }
    }

    Ok(GameBundle::new(XflGame::NAME, game)
        .with_child("Players", XflPlayerBoxscore::NAME, players)
        .with_child("ScoringPlays", XflScoringPlay::NAME, plays))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="visitStroke teamDCD"></div>
          <div class="homeStroke teamSEA"></div>
          <h2 class="score visitor">31</h2>
          <h2 class="score home">19</h2>
          <div id="visitorIndOffenseStats">
            <div class="table"><div class="body">
              <div class="row"><span>22</span><span>Donnel Pumphrey</span><span>8</span><span>35</span><span>4.4</span><span>12</span><span>1</span></div>
            </div></div>
            <div class="table"><div class="body">
              <div class="row"><span>8</span><span>Cardale Jones</span><span>16</span><span>28</span><span>57.1</span><span>176</span><span>x</span><span>x</span><span>46</span><span>2</span><span>0</span><span>98.2</span></div>
            </div></div>
            <div class="table"><div class="body">
              <div class="row"><span>22</span><span>Donnel Pumphrey</span><span>3</span><span>2</span><span>14</span><span>7.0</span><span>9</span><span>0</span></div>
              <div class="row"></div>
            </div></div>
          </div>
          <div id="homeIndOffenseStats">
            <div class="table"><div class="body">
              <div class="row"><span>3</span><span>B.J. Daniels</span><span>4</span><span>20</span><span>5.0</span><span>9</span><span>0</span></div>
            </div></div>
          </div>
          <div class="row playRow teamRow">
            <img src="https://stats.xfl.com/img/DCD.png">
            <span class="rQtr">1</span><span class="rStart">10:02</span><span class="rPossDown">1st &amp; 10</span>
            <span class="rPlayDesc">Cardale Jones pass to Rashad Ross for 25 yards. Donnel Pumphrey 2pt attempt successful.</span>
            <span class="rPlays">6</span><span class="rYards">75</span><span class="rTime">3:10</span>
            <span class="rVisitor">8</span><span class="rHome">0</span>
          </div>
        </body></html>"#;

    #[test]
    fn test_game_ids_for_week() {
        assert_eq!(game_ids_for_week(1), vec![1, 2, 3, 4]);
        assert_eq!(game_ids_for_week(3), vec![9, 10, 11, 12]);
        assert!(game_ids_for_week(0).is_empty());
    }

    #[test]
    fn test_game_record() {
        let bundle = game_bundle(PAGE, 1, 2020).unwrap();
        assert_eq!(bundle.game.get("AwayTeam"), Some(&Value::Text("DCD".into())));
        assert_eq!(bundle.game.get("HomeTeam"), Some(&Value::Text("SEA".into())));
        assert_eq!(bundle.game.get("AwayTeamScore"), Some(&Value::Int(31)));
        assert_eq!(bundle.game.get("Season"), Some(&Value::Int(2020)));
    }

    #[test]
    fn test_players_merged_across_tables() {
        let bundle = game_bundle(PAGE, 1, 2020).unwrap();
        let players = bundle.children[0].table.records();
        assert_eq!(players.len(), 3);

        let jones = &players[0];
        assert_eq!(jones.get("PlayerName"), Some(&Value::Text("Cardale Jones".into())));
        assert_eq!(jones.get("PassingLong"), Some(&Value::Int(46)));
        assert_eq!(jones.get("PassingRating"), Some(&Value::Float(98.2)));
        assert_eq!(jones.get("RushingYards"), Some(&Value::Null));

        let pumphrey = &players[1];
        assert_eq!(pumphrey.get("RushingYards"), Some(&Value::Int(35)));
        assert_eq!(pumphrey.get("Receptions"), Some(&Value::Int(2)));
        assert_eq!(pumphrey.get("TwoPointConversions"), Some(&Value::Int(1)));
        assert_eq!(pumphrey.get("OnePointConversions"), Some(&Value::Int(0)));
        assert_eq!(pumphrey.get("TeamResult"), Some(&Value::Text("W".into())));

        let daniels = &players[2];
        assert_eq!(daniels.get("PlayerName"), Some(&Value::Text("BJ Daniels".into())));
        assert_eq!(daniels.get("IsAway"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_missing_score_leaves_result_null() {
        let page = PAGE.replace(r#"<h2 class="score home">19</h2>"#, "");
        let bundle = game_bundle(&page, 1, 2020).unwrap();
        assert_eq!(bundle.game.get("HomeTeamScore"), Some(&Value::Null));
        for player in bundle.children[0].table.records() {
            assert_eq!(player.get("TeamResult"), Some(&Value::Null));
        }
    }

    #[test]
    fn test_scoring_plays() {
        let bundle = game_bundle(PAGE, 1, 2020).unwrap();
        let plays = bundle.children[1].table.records();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].get("XflTeamAbbrev"), Some(&Value::Text("DCD".into())));
        assert_eq!(plays[0].get("Situation"), Some(&Value::Text("1st & 10".into())));
        assert_eq!(plays[0].get("EndAwayScore"), Some(&Value::Int(8)));
        assert_eq!(plays[0].get("XflGameId"), Some(&Value::Int(1)));
    }
}
