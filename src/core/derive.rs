//! Derived-field rules.
//!
//! Fields that are computed from other values rather than read from a
//! document. Each rule is a plain function so every sport shares one
//! definition.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Outcome of a game from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamResult {
    Win,
    Loss,
    Tie,
}

impl TeamResult {
    /// Single-letter code used in output rows.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Win => "W",
            Self::Loss => "L",
            Self::Tie => "T",
        }
    }
}

impl fmt::Display for TeamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Compare final scores. A tie only when they are exactly equal.
pub fn team_result(own_score: i64, opponent_score: i64) -> TeamResult {
    match own_score.cmp(&opponent_score) {
        std::cmp::Ordering::Greater => TeamResult::Win,
        std::cmp::Ordering::Less => TeamResult::Loss,
        std::cmp::Ordering::Equal => TeamResult::Tie,
    }
}

/// Result for the away or home side given both scores.
pub fn side_result(is_away: bool, away_score: i64, home_score: i64) -> TeamResult {
    if is_away {
        team_result(away_score, home_score)
    } else {
        team_result(home_score, away_score)
    }
}

/// Result for one side, or `None` unless both scores are known.
pub fn scored_side_result(
    is_away: bool,
    away_score: Option<i64>,
    home_score: Option<i64>,
) -> Option<TeamResult> {
    Some(side_result(is_away, away_score?, home_score?))
}

/// Baseball quality start: at least six innings with three or fewer
/// earned runs. Innings use box-score notation, so `5.2` is below six.
pub fn quality_start(innings_pitched: f64, earned_runs: i64) -> bool {
    innings_pitched >= 6.0 && earned_runs <= 3
}

/// Lineup slot from the packed batting-order integer. Starters are exact
/// multiples of 100 (`400` bats fourth); anything else is a substitute.
/// Negative input has no slot.
pub fn batting_order(packed: i64) -> Option<u32> {
    if packed % 100 == 0 {
        u32::try_from(packed / 100).ok()
    } else {
        None
    }
}

// =============================================================================
// Football
// =============================================================================

/// Points a defense/special-teams unit scored on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReturnScoring {
    pub punt_return_tds: i64,
    pub kick_return_tds: i64,
    pub fumble_return_tds: i64,
    pub interception_return_tds: i64,
    pub safeties: i64,
}

impl ReturnScoring {
    pub fn points(&self) -> i64 {
        (self.punt_return_tds
            + self.kick_return_tds
            + self.fumble_return_tds
            + self.interception_return_tds)
            * 6
            + self.safeties * 2
    }
}

/// Points allowed by one side's defense: the opponent's total minus what
/// the opponent's own defense and return units put on the board.
pub fn dst_points_allowed(opponent_points: i64, opponent_returns: &ReturnScoring) -> i64 {
    opponent_points - opponent_returns.points()
}

// =============================================================================
// Hockey
// =============================================================================

/// One period of a hockey linescore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub num: u32,
    pub ordinal: String,
}

/// Overtime flag and result note (`"OT"`, `"2OT"`, `"SO"`, or empty).
pub fn overtime_note(periods: &[Period], has_shootout: bool) -> (bool, String) {
    let mut overtime = false;
    let mut note = String::new();
    for period in periods {
        if period.num >= 4 {
            overtime = true;
            note = period.ordinal.clone();
        }
    }
    if has_shootout {
        note = "SO".to_string();
    }
    (overtime, note)
}

/// Bonus eligibility for a goalie who played the whole game for his side.
pub fn only_goalie(goalies_recorded: usize) -> bool {
    goalies_recorded == 1
}

/// A scoring event in a shootout: who scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShootoutAttempt {
    pub scorer_id: i64,
    pub is_goal: bool,
}

/// Goals per scorer across a shootout.
pub fn shootout_goals(attempts: &[ShootoutAttempt]) -> HashMap<i64, i64> {
    let mut goals = HashMap::new();
    for attempt in attempts.iter().filter(|a| a.is_goal) {
        *goals.entry(attempt.scorer_id).or_insert(0) += 1;
    }
    goals
}

// =============================================================================
// XFL
// =============================================================================

/// Count successful extra-point tries of `points` credited to `player`.
pub fn point_conversions<'a, I>(player: &str, descriptions: I, points: u8) -> i64
where
    I: IntoIterator<Item = &'a str>,
{
    let marker = format!("{points}pt attempt successful.");
    descriptions
        .into_iter()
        .filter(|d| d.contains(player) && d.contains(&marker))
        .count() as i64
}
