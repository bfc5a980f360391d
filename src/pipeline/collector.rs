//! Per-sport game collection.
//!
//! The schedule for the window is fetched first; each game's documents are
//! then fetched with at most `max_concurrency` games in flight. Results
//! keep schedule order. Any fetch or extraction error ends the run.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value as Json;
use tracing::{debug, info, warn};

use super::{Extraction, PipelineError};
use crate::api::StatsClient;
use crate::core::{CoreError, DateInterval, SeasonCalendar, Selector, Sport, Table};
use crate::entities::injury::{self, NbaInjury, NhlInjury};
use crate::entities::mlb::{MlbPlayer, MlbTeam};
use crate::entities::nhl::{NhlPlayer, NhlTeam};
use crate::entities::odds::{self, GameOdds};
use crate::entities::{mlb, nba, nfl, nhl, xfl, EntityKind, GameBundle, DISPLAY_OFFSET_HOURS};

/// Time window a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Interval(DateInterval),
    /// A season the calendar has no dates for; the source's own season
    /// schedule defines it.
    WholeSeason(i32),
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Self::Interval(interval) => interval.contains(date),
            Self::WholeSeason(_) => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub max_concurrency: usize,
    /// XFL weeks to fetch; the league publishes no dated schedule.
    pub xfl_weeks: Vec<u32>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            xfl_weeks: (1..=5).collect(),
        }
    }
}

pub struct Collector {
    client: Arc<StatsClient>,
    calendar: SeasonCalendar,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(client: Arc<StatsClient>, calendar: SeasonCalendar, config: CollectorConfig) -> Self {
        Self {
            client,
            calendar,
            config,
        }
    }

    /// Resolve the selector to a window. NFL and XFL seasons missing from
    /// the calendar cover the whole published season.
    pub fn window(&self, sport: Sport, selector: &Selector) -> Result<Window, CoreError> {
        match (sport, selector) {
            (Sport::Nfl | Sport::Xfl, Selector::Season(season))
                if self.calendar.season(sport, *season).is_none() =>
            {
                Ok(Window::WholeSeason(*season))
            }
            _ => self.calendar.resolve(sport, selector).map(Window::Interval),
        }
    }

    /// Season the window belongs to.
    pub fn season(&self, sport: Sport, selector: &Selector, window: &Window) -> Result<i32, CoreError> {
        let interval = match (selector, window) {
            (Selector::Season(season), _) => return Ok(*season),
            (_, Window::WholeSeason(season)) => return Ok(*season),
            (_, Window::Interval(interval)) => interval,
        };
        match sport {
            Sport::Nfl => Ok(nfl::season_of(interval.start)),
            Sport::Xfl => Ok(interval.start.year()),
            _ => self
                .calendar
                .season_for_range(sport, interval.start, interval.end)
                .or_else(|| self.calendar.season_for_date(sport, interval.start))
                .ok_or_else(|| {
                    CoreError::InvalidSelector(format!("no {sport} season covers {interval}"))
                }),
        }
    }

    /// Fetch and extract every game of `sport` selected by `selector`.
    pub async fn collect(&self, sport: Sport, selector: &Selector) -> Result<Extraction, PipelineError> {
        let window = self.window(sport, selector)?;
        info!(sport = %sport, selector = %selector, window = ?window, "Collecting games");

        let bundles = match sport {
            Sport::Mlb => self.mlb(&window).await?,
            Sport::Nhl => self.nhl(&window).await?,
            Sport::Nba => self.nba(selector, &window).await?,
            Sport::Nfl => self.nfl(selector, &window).await?,
            Sport::Xfl => self.xfl(selector, &window).await?,
        };

        let mut extraction = Extraction::new(sport, window);
        for bundle in bundles {
            extraction.add_bundle(bundle)?;
        }
        info!(sport = %sport, games = extraction.games().len(), "Collection complete");
        Ok(extraction)
    }

    /// Upcoming game-line odds for `sport`.
    pub async fn collect_odds(&self, sport: Sport) -> Result<Table, PipelineError> {
        let Some((path, league)) = odds::feed_path(sport) else {
            debug!(sport = %sport, "No odds feed for sport");
            return Ok(GameOdds::empty_table());
        };
        let feed = self.client.odds(path, league).await?;
        let table = odds::odds_table(&feed, Utc::now().timestamp_millis())?;
        info!(sport = %sport, events = table.len(), "Odds collected");
        Ok(table)
    }

    /// Team listings, rosters and injury reports a sport publishes, as
    /// `(table name, table)` pairs. Injury reports are stamped with today's
    /// date at the display offset.
    pub async fn collect_reference(
        &self,
        sport: Sport,
        selector: &Selector,
    ) -> Result<Vec<(&'static str, Table)>, PipelineError> {
        let client = self.client.as_ref();
        let tables = match sport {
            Sport::Mlb => {
                let window = self.window(sport, selector)?;
                let season = self.season(sport, selector, &window)?;
                let (teams, players) = tokio::try_join!(client.mlb_teams(), client.mlb_players(season))?;
                vec![
                    (MlbTeam::NAME, mlb::team_table(&teams)?),
                    (MlbPlayer::NAME, mlb::player_table(&players, season)?),
                ]
            }
            Sport::Nhl => {
                let (teams, page) = tokio::try_join!(client.nhl_teams(), client.nhl_injury_page())?;
                vec![
                    (NhlTeam::NAME, nhl::team_table(&teams)?),
                    (NhlPlayer::NAME, nhl::player_table(&teams)?),
                    (NhlInjury::NAME, injury::nhl_injuries(&page, report_date())?),
                ]
            }
            Sport::Nba => {
                let page = client.nba_injury_page().await?;
                vec![(NbaInjury::NAME, injury::nba_injuries(&page, report_date())?)]
            }
            Sport::Nfl | Sport::Xfl => {
                debug!(sport = %sport, "No reference tables for sport");
                Vec::new()
            }
        };
        for (name, table) in &tables {
            info!(table = name, rows = table.len(), "Reference table collected");
        }
        Ok(tables)
    }

    // =========================================================================
    // Per-sport schedules
    // =========================================================================

    async fn mlb(&self, window: &Window) -> Result<Vec<GameBundle>, PipelineError> {
        let interval = interval_of(window)?;
        let schedule = self.client.mlb_schedule(&interval).await?;
        let pks = unique(
            mlb::schedule_games(&schedule)
                .iter()
                .filter(|g| mlb::is_final_regular_season(g))
                .filter_map(mlb::game_pk),
        );
        info!(games = pks.len(), "MLB schedule fetched");

        let client = self.client.as_ref();
        self.fetch_games(pks, |pk| async move {
            let (feed, boxscore, play_by_play) = tokio::try_join!(
                client.mlb_feed(pk),
                client.mlb_boxscore(pk),
                client.mlb_play_by_play(pk)
            )?;
            Ok::<_, PipelineError>(mlb::game_bundle(&feed, &boxscore, &play_by_play)?)
        })
        .await
    }

    async fn nhl(&self, window: &Window) -> Result<Vec<GameBundle>, PipelineError> {
        let interval = interval_of(window)?;
        let schedule = self.client.nhl_schedule(&interval).await?;
        let pks = unique(nhl::schedule_games(&schedule).into_iter().filter_map(nhl::game_pk));
        info!(games = pks.len(), "NHL schedule fetched");

        let client = self.client.as_ref();
        self.fetch_games(pks, |pk| async move {
            let feed = client.nhl_feed(pk).await?;
            Ok::<_, PipelineError>(nhl::game_bundle(&feed)?)
        })
        .await
    }

    async fn nba(&self, selector: &Selector, window: &Window) -> Result<Vec<GameBundle>, PipelineError> {
        let season = self.season(Sport::Nba, selector, window)?;
        let schedule = self.client.nba_schedule(season).await?;
        let games: Vec<(Json, String)> = nba::schedule_games(&schedule)
            .into_iter()
            .filter(|g| nba::listed_date(g).is_some_and(|d| window.contains(d)))
            .filter(|g| {
                let postponed = nba::is_postponed(g);
                if postponed {
                    debug!(gid = ?nba::game_id_string(g), "Skipping postponed game");
                }
                !postponed
            })
            .filter_map(|g| Some((g.clone(), nba::game_id_string(g)?.to_string())))
            .collect();
        info!(season, games = games.len(), "NBA schedule fetched");

        let client = self.client.as_ref();
        self.fetch_games(games, |(game, gid)| async move {
            let boxscore = client.nba_boxscore(&gid).await?;
            Ok::<_, PipelineError>(nba::game_bundle(&game, &boxscore, season)?)
        })
        .await
    }

    async fn nfl(&self, selector: &Selector, window: &Window) -> Result<Vec<GameBundle>, PipelineError> {
        let season = self.season(Sport::Nfl, selector, window)?;
        let schedule = self.client.nfl_schedule(season).await?;
        let ids = unique(
            nfl::schedule_games(&schedule)
                .into_iter()
                .filter(|(_, date)| match (window, date) {
                    (Window::WholeSeason(_), _) => true,
                    (Window::Interval(interval), Some(date)) => interval.contains(*date),
                    (Window::Interval(_), None) => false,
                })
                .map(|(id, _)| id),
        );
        info!(season, games = ids.len(), "NFL schedule fetched");

        let client = self.client.as_ref();
        self.fetch_games(ids, |id| async move {
            let boxscore = client.nfl_boxscore(id).await?;
            Ok::<_, PipelineError>(nfl::game_bundle(&boxscore)?)
        })
        .await
    }

    async fn xfl(&self, selector: &Selector, window: &Window) -> Result<Vec<GameBundle>, PipelineError> {
        let season = self.season(Sport::Xfl, selector, window)?;
        if matches!(window, Window::Interval(_)) {
            warn!("XFL pages are undated; fetching the configured weeks");
        }
        let ids: Vec<u32> = self
            .config
            .xfl_weeks
            .iter()
            .flat_map(|week| xfl::game_ids_for_week(*week))
            .collect();
        info!(season, games = ids.len(), weeks = ?self.config.xfl_weeks, "XFL games selected");

        let client = self.client.as_ref();
        self.fetch_games(ids, |id| async move {
            let page = client.xfl_game_page(id).await?;
            Ok::<_, PipelineError>(xfl::game_bundle(&page, i64::from(id), season)?)
        })
        .await
    }

    /// Run `fetch` for every key with bounded concurrency, keeping key order.
    async fn fetch_games<K, F, Fut>(&self, keys: Vec<K>, fetch: F) -> Result<Vec<GameBundle>, PipelineError>
    where
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<GameBundle, PipelineError>>,
    {
        stream::iter(keys)
            .map(fetch)
            .buffered(self.config.max_concurrency.max(1))
            .try_collect()
            .await
    }
}

fn report_date() -> NaiveDate {
    (Utc::now() + Duration::hours(DISPLAY_OFFSET_HOURS)).date_naive()
}

fn interval_of(window: &Window) -> Result<DateInterval, CoreError> {
    match window {
        Window::Interval(interval) => Ok(*interval),
        Window::WholeSeason(season) => Err(CoreError::InvalidSelector(format!(
            "season {season} has no calendar dates"
        ))),
    }
}

/// Drop repeated keys, keeping first occurrences in order.
fn unique<K: Copy + Eq + std::hash::Hash>(keys: impl IntoIterator<Item = K>) -> Vec<K> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(*k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoints;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn collector() -> Collector {
        let client = StatsClient::with_defaults(Endpoints::default()).unwrap();
        Collector::new(Arc::new(client), SeasonCalendar::builtin(), CollectorConfig::default())
    }

    #[test]
    fn test_window_resolution() {
        let c = collector();
        let window = c.window(Sport::Mlb, &Selector::Season(2019)).unwrap();
        let Window::Interval(interval) = window else {
            panic!("expected interval");
        };
        assert_eq!(interval.to_string(), "03/28/2019 - 11/01/2019");

        assert_eq!(
            c.window(Sport::Nfl, &Selector::Season(2019)).unwrap(),
            Window::WholeSeason(2019)
        );
        assert!(c.window(Sport::Nhl, &Selector::Season(2019)).is_err());
    }

    #[test]
    fn test_season_inference() {
        let c = collector();
        let selector = Selector::Date(d(2019, 1, 6));
        let window = c.window(Sport::Nba, &selector).unwrap();
        assert_eq!(c.season(Sport::Nba, &selector, &window).unwrap(), 2018);

        let window = c.window(Sport::Nfl, &selector).unwrap();
        assert_eq!(c.season(Sport::Nfl, &selector, &window).unwrap(), 2018);

        let selector = Selector::Date(d(2001, 1, 6));
        let window = c.window(Sport::Nba, &selector).unwrap();
        assert!(c.season(Sport::Nba, &selector, &window).is_err());
    }

    #[test]
    fn test_whole_season_window() {
        let window = Window::WholeSeason(2019);
        assert!(window.contains(d(2030, 1, 1)));
        assert!(interval_of(&window).is_err());
    }

    #[test]
    fn test_unique_keeps_first_order() {
        assert_eq!(unique([5, 3, 5, 1, 3]), vec![5, 3, 1]);
    }
}
