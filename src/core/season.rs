//! Season/date range resolution.
//!
//! Turns a logical time selector into a closed date interval using a
//! static season calendar. The calendar is built once at startup (the
//! built-in tables, optionally overlaid with a JSON file) and passed to
//! whoever needs it; it is never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::error::CoreError;
use super::sport::Sport;

/// Display format for calendar dates.
pub const CALENDAR_FORMAT: &str = "%m/%d/%Y";

const MLB_SEASONS: &[(i32, &str, &str)] = &[
    (2005, "04/03/2005", "10/26/2005"),
    (2006, "04/02/2006", "10/27/2006"),
    (2007, "04/01/2007", "10/28/2007"),
    (2008, "03/25/2008", "10/29/2008"),
    (2009, "04/05/2009", "11/04/2009"),
    (2010, "04/04/2010", "11/01/2010"),
    (2011, "03/31/2011", "10/28/2011"),
    (2012, "03/28/2012", "10/28/2012"),
    (2013, "03/31/2013", "10/30/2013"),
    (2014, "03/22/2014", "10/29/2014"),
    (2015, "04/05/2015", "11/01/2015"),
    (2016, "04/03/2016", "11/02/2016"),
    (2017, "04/02/2017", "11/01/2017"),
    (2018, "03/29/2018", "10/28/2018"),
    (2019, "03/28/2019", "11/01/2019"),
];

const NBA_SEASONS: &[(i32, &str, &str)] = &[
    (2018, "10/16/2018", "06/13/2019"),
    (2019, "10/22/2019", "04/15/2020"),
];

pub fn parse_calendar_date(text: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(text.trim(), CALENDAR_FORMAT)
        .map_err(|e| CoreError::InvalidSelector(format!("bad date {text:?}: {e}")))
}

// =============================================================================
// Selector
// =============================================================================

/// Logical time selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Season(i32),
    Range(NaiveDate, NaiveDate),
    Date(NaiveDate),
}

impl Selector {
    /// Build from optional parts. Exactly one must be present.
    pub fn from_parts(
        season: Option<i32>,
        range: Option<(NaiveDate, NaiveDate)>,
        date: Option<NaiveDate>,
    ) -> Result<Self, CoreError> {
        match (season, range, date) {
            (Some(season), None, None) => Ok(Self::Season(season)),
            (None, Some((start, end)), None) => Ok(Self::Range(start, end)),
            (None, None, Some(date)) => Ok(Self::Date(date)),
            (None, None, None) => Err(CoreError::InvalidSelector(
                "one of season, range or date is required".to_string(),
            )),
            _ => Err(CoreError::InvalidSelector(
                "only one of season, range or date may be given".to_string(),
            )),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Season(year) => write!(f, "season={year}"),
            Self::Range(start, end) => write!(
                f,
                "range={}..{}",
                start.format(CALENDAR_FORMAT),
                end.format(CALENDAR_FORMAT)
            ),
            Self::Date(date) => write!(f, "date={}", date.format(CALENDAR_FORMAT)),
        }
    }
}

// =============================================================================
// Interval
// =============================================================================

/// Closed, inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidSelector(format!(
                "start {} is after end {}",
                start.format(CALENDAR_FORMAT),
                end.format(CALENDAR_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start_str(&self) -> String {
        self.start.format(CALENDAR_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(CALENDAR_FORMAT).to_string()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_str(), self.end_str())
    }
}

// =============================================================================
// Calendar
// =============================================================================

#[derive(Debug, Deserialize)]
struct SeasonEntry {
    season: i32,
    start_date: String,
    end_date: String,
}

/// Per-sport table of season → interval.
#[derive(Debug, Clone, Default)]
pub struct SeasonCalendar {
    seasons: BTreeMap<Sport, BTreeMap<i32, DateInterval>>,
}

impl SeasonCalendar {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in MLB and NBA calendars.
    pub fn builtin() -> Self {
        let mut calendar = Self::empty();
        for (sport, table) in [(Sport::Mlb, MLB_SEASONS), (Sport::Nba, NBA_SEASONS)] {
            for (season, start, end) in table {
                if let (Ok(start), Ok(end)) =
                    (parse_calendar_date(start), parse_calendar_date(end))
                {
                    calendar.insert(sport, *season, DateInterval { start, end });
                }
            }
        }
        calendar
    }

    /// Built-in tables overlaid with a JSON file of the form
    /// `{"nhl": [{"season": 2019, "start_date": "10/02/2019", "end_date": "04/04/2020"}]}`.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        let calendar = Self::builtin().overlay_json(&text)?;
        debug!(path = %path.display(), "Loaded season calendar");
        Ok(calendar)
    }

    pub fn overlay_json(mut self, text: &str) -> Result<Self, CoreError> {
        let parsed: BTreeMap<String, Vec<SeasonEntry>> =
            serde_json::from_str(text).map_err(|e| CoreError::Calendar(e.to_string()))?;
        for (key, entries) in parsed {
            let sport: Sport = key.parse().map_err(CoreError::Calendar)?;
            for entry in entries {
                let start = parse_calendar_date(&entry.start_date)
                    .map_err(|e| CoreError::Calendar(e.to_string()))?;
                let end = parse_calendar_date(&entry.end_date)
                    .map_err(|e| CoreError::Calendar(e.to_string()))?;
                let interval = DateInterval::new(start, end)
                    .map_err(|e| CoreError::Calendar(e.to_string()))?;
                self.insert(sport, entry.season, interval);
            }
        }
        Ok(self)
    }

    fn insert(&mut self, sport: Sport, season: i32, interval: DateInterval) {
        self.seasons.entry(sport).or_default().insert(season, interval);
    }

    pub fn season(&self, sport: Sport, season: i32) -> Option<DateInterval> {
        self.seasons.get(&sport)?.get(&season).copied()
    }

    /// Known seasons for a sport, ascending.
    pub fn seasons(&self, sport: Sport) -> Vec<i32> {
        self.seasons
            .get(&sport)
            .map(|s| s.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn resolve(&self, sport: Sport, selector: &Selector) -> Result<DateInterval, CoreError> {
        match *selector {
            Selector::Season(season) => self.season(sport, season).ok_or_else(|| {
                CoreError::InvalidSelector(format!("unknown {sport} season {season}"))
            }),
            Selector::Range(start, end) => DateInterval::new(start, end),
            Selector::Date(date) => DateInterval::new(date, date),
        }
    }

    /// Season whose interval contains `date`.
    pub fn season_for_date(&self, sport: Sport, date: NaiveDate) -> Option<i32> {
        self.seasons
            .get(&sport)?
            .iter()
            .find(|(_, interval)| interval.contains(date))
            .map(|(season, _)| *season)
    }

    /// Season containing the whole range, if any single season does.
    pub fn season_for_range(&self, sport: Sport, start: NaiveDate, end: NaiveDate) -> Option<i32> {
        self.seasons
            .get(&sport)?
            .iter()
            .find(|(_, interval)| interval.contains(start) && interval.contains(end))
            .map(|(season, _)| *season)
    }
}
