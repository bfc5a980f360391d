//! Configuration management.
//!
//! Loads settings from environment variables and a .env file.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::api::Endpoints;
use crate::core::season::parse_calendar_date;
use crate::core::{CoreError, Selector, Sport};
use crate::pipeline::CollectorConfig;

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Run selection
    pub sport: String,
    pub season: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,

    // Outputs
    pub output_dir: PathBuf,
    pub enable_csv: bool,
    pub enable_ingest: bool,
    pub ingest_url: String,
    pub enable_odds: bool,
    /// Teams, rosters and injury reports alongside the games.
    pub enable_reference: bool,

    // Fetching
    pub rate_limit_per_sec: u32,
    pub max_concurrency: usize,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub season_calendar_path: Option<PathBuf>,
    pub xfl_weeks: Vec<u32>,

    // Sources
    pub mlb_base_url: String,
    pub nhl_base_url: String,
    pub nba_base_url: String,
    pub nba_schedule_url: String,
    pub nfl_base_url: String,
    pub xfl_base_url: String,
    pub odds_base_url: String,
    pub nba_reference_url: String,
    pub nhl_reference_url: String,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Load settings from environment variables (and .env file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();

        let defaults = Endpoints::default();

        Self {
            sport: env_str("SPORT", "mlb"),
            season: env_opt("SEASON"),
            start_date: env_opt("START_DATE"),
            end_date: env_opt("END_DATE"),
            date: env_opt("DATE"),

            output_dir: PathBuf::from(env_str("OUTPUT_DIR", "output")),
            enable_csv: env_bool("ENABLE_CSV", true),
            enable_ingest: env_bool("ENABLE_INGEST", false),
            ingest_url: env_str("INGEST_URL", ""),
            enable_odds: env_bool("ENABLE_ODDS", false),
            enable_reference: env_bool("ENABLE_REFERENCE", false),

            rate_limit_per_sec: env_u32("RATE_LIMIT_PER_SEC", 5),
            max_concurrency: env_usize("MAX_CONCURRENCY", 4),
            max_retries: env_u32("MAX_RETRIES", 3),
            request_timeout_secs: env_u64("REQUEST_TIMEOUT_SECS", 30),
            season_calendar_path: env_opt("SEASON_CALENDAR_PATH").map(PathBuf::from),
            xfl_weeks: env_csv_default("XFL_WEEKS", "1,2,3,4,5")
                .iter()
                .filter_map(|w| w.parse().ok())
                .collect(),

            mlb_base_url: env_str("MLB_BASE_URL", &defaults.mlb_base_url),
            nhl_base_url: env_str("NHL_BASE_URL", &defaults.nhl_base_url),
            nba_base_url: env_str("NBA_BASE_URL", &defaults.nba_base_url),
            nba_schedule_url: env_str("NBA_SCHEDULE_URL", &defaults.nba_schedule_url),
            nfl_base_url: env_str("NFL_BASE_URL", &defaults.nfl_base_url),
            xfl_base_url: env_str("XFL_BASE_URL", &defaults.xfl_base_url),
            odds_base_url: env_str("ODDS_BASE_URL", &defaults.odds_base_url),
            nba_reference_url: env_str("NBA_REFERENCE_URL", &defaults.nba_reference_url),
            nhl_reference_url: env_str("NHL_REFERENCE_URL", &defaults.nhl_reference_url),

            log_level: env_str("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON", false),
        }
    }

    /// Validate configuration for critical requirements.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.sport() {
            errors.push(e);
        }

        if let Err(e) = self.selector() {
            errors.push(format!("Time selector: {e}"));
        }

        if self.enable_ingest && self.ingest_url.is_empty() {
            errors.push("INGEST_URL is required when ENABLE_INGEST is set".to_string());
        }

        if self.max_concurrency == 0 {
            errors.push("MAX_CONCURRENCY must be at least 1".to_string());
        }

        if self.rate_limit_per_sec == 0 {
            errors.push("RATE_LIMIT_PER_SEC must be at least 1".to_string());
        }

        if self.sport().is_ok_and(|s| s == Sport::Xfl) && self.xfl_weeks.is_empty() {
            errors.push("XFL_WEEKS must list at least one week".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn sport(&self) -> Result<Sport, String> {
        self.sport.parse()
    }

    /// Time selector from `SEASON`, `START_DATE`/`END_DATE` or `DATE`.
    /// Exactly one form must be given.
    pub fn selector(&self) -> Result<Selector, CoreError> {
        let range = match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => Some((parse_calendar_date(start)?, parse_calendar_date(end)?)),
            (None, None) => None,
            _ => {
                return Err(CoreError::InvalidSelector(
                    "START_DATE and END_DATE must be given together".to_string(),
                ))
            }
        };
        let date: Option<NaiveDate> = self.date.as_deref().map(parse_calendar_date).transpose()?;
        let season = self
            .season
            .as_deref()
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|e| CoreError::InvalidSelector(format!("bad season {v:?}: {e}")))
            })
            .transpose()?;
        Selector::from_parts(season, range, date)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            mlb_base_url: self.mlb_base_url.clone(),
            nhl_base_url: self.nhl_base_url.clone(),
            nba_base_url: self.nba_base_url.clone(),
            nba_schedule_url: self.nba_schedule_url.clone(),
            nfl_base_url: self.nfl_base_url.clone(),
            xfl_base_url: self.xfl_base_url.clone(),
            odds_base_url: self.odds_base_url.clone(),
            nba_reference_url: self.nba_reference_url.clone(),
            nhl_reference_url: self.nhl_reference_url.clone(),
        }
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            max_concurrency: self.max_concurrency,
            xfl_weeks: self.xfl_weeks.clone(),
        }
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_csv_default(key: &str, default: &str) -> Vec<String> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        let defaults = Endpoints::default();
        Settings {
            sport: "nba".to_string(),
            season: Some("2018".to_string()),
            start_date: None,
            end_date: None,
            date: None,
            output_dir: PathBuf::from("output"),
            enable_csv: true,
            enable_ingest: false,
            ingest_url: String::new(),
            enable_odds: false,
            enable_reference: false,
            rate_limit_per_sec: 5,
            max_concurrency: 4,
            max_retries: 3,
            request_timeout_secs: 30,
            season_calendar_path: None,
            xfl_weeks: vec![1, 2],
            mlb_base_url: defaults.mlb_base_url,
            nhl_base_url: defaults.nhl_base_url,
            nba_base_url: defaults.nba_base_url,
            nba_schedule_url: defaults.nba_schedule_url,
            nfl_base_url: defaults.nfl_base_url,
            xfl_base_url: defaults.xfl_base_url,
            odds_base_url: defaults.odds_base_url,
            nba_reference_url: defaults.nba_reference_url,
            nhl_reference_url: defaults.nhl_reference_url,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    #[test]
    fn test_valid_settings() {
        let s = settings();
        assert!(s.validate().is_ok());
        assert_eq!(s.sport(), Ok(Sport::Nba));
        assert_eq!(s.selector().unwrap(), Selector::Season(2018));
    }

    #[test]
    fn test_selector_forms() {
        let mut s = settings();
        s.season = None;
        s.start_date = Some("10/16/2018".to_string());
        s.end_date = Some("10/20/2018".to_string());
        assert!(matches!(s.selector().unwrap(), Selector::Range(..)));

        s.end_date = None;
        assert!(s.selector().is_err());

        s.start_date = None;
        s.date = Some("2018-10-16".to_string());
        assert!(s.selector().is_err());

        s.date = Some("10/16/2018".to_string());
        s.season = Some("2018".to_string());
        assert!(s.selector().is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut s = settings();
        s.sport = "cricket".to_string();
        s.season = None;
        s.enable_ingest = true;
        s.max_concurrency = 0;
        let errors = s.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_unparsable_season_is_rejected() {
        let mut s = settings();
        s.season = Some("2018-19".to_string());
        assert!(matches!(s.selector(), Err(CoreError::InvalidSelector(_))));

        let errors = s.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("2018-19"));
    }
}
