//! Async HTTP client for the stats sources.
//!
//! Features:
//! - Rate limiting (configurable requests/second)
//! - Automatic retries with exponential backoff
//! - `Retry-After` handling on 429
//! - One method per source endpoint, returning the raw document

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, Method};
use serde_json::Value as Json;
use tracing::{debug, warn};

use super::errors::FetchError;
use crate::core::DateInterval;

/// Date format the MLB and NHL schedule endpoints take.
const API_DATE_FORMAT: &str = "%Y-%m-%d";

const BASE_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 30_000;

const NBA_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_3) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/73.0.3683.86 Safari/537.36";

/// Base URLs of every source.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub mlb_base_url: String,
    pub nhl_base_url: String,
    pub nba_base_url: String,
    pub nba_schedule_url: String,
    pub nfl_base_url: String,
    pub xfl_base_url: String,
    pub odds_base_url: String,
    pub nba_reference_url: String,
    pub nhl_reference_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mlb_base_url: "https://statsapi.mlb.com".to_string(),
            nhl_base_url: "https://statsapi.web.nhl.com".to_string(),
            nba_base_url: "https://stats.nba.com".to_string(),
            nba_schedule_url: "http://data.nba.com/data/10s/v2015/json/mobile_teams/nba".to_string(),
            nfl_base_url: "https://feeds.nfl.com/feeds-rs".to_string(),
            xfl_base_url: "https://stats.xfl.com".to_string(),
            odds_base_url: "https://www.bovada.lv".to_string(),
            nba_reference_url: "https://www.basketball-reference.com".to_string(),
            nhl_reference_url: "https://www.hockey-reference.com".to_string(),
        }
    }
}

impl Endpoints {
    fn trimmed(self) -> Self {
        let trim = |s: String| s.trim_end_matches('/').to_string();
        Self {
            mlb_base_url: trim(self.mlb_base_url),
            nhl_base_url: trim(self.nhl_base_url),
            nba_base_url: trim(self.nba_base_url),
            nba_schedule_url: trim(self.nba_schedule_url),
            nfl_base_url: trim(self.nfl_base_url),
            xfl_base_url: trim(self.xfl_base_url),
            odds_base_url: trim(self.odds_base_url),
            nba_reference_url: trim(self.nba_reference_url),
            nhl_reference_url: trim(self.nhl_reference_url),
        }
    }
}

type DirectLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// Async client shared by every fetch of a run.
pub struct StatsClient {
    endpoints: Endpoints,
    client: Client,
    nba_headers: HeaderMap,
    rate_limiter: Arc<DirectLimiter>,
    max_retries: u32,
}

impl StatsClient {
    pub fn new(
        endpoints: Endpoints,
        rate_limit: u32,
        max_retries: u32,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(20)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            endpoints: endpoints.trimmed(),
            client,
            nba_headers: nba_headers(),
            rate_limiter,
            max_retries: max_retries.max(1),
        })
    }

    /// Create with default settings.
    pub fn with_defaults(endpoints: Endpoints) -> Result<Self, FetchError> {
        Self::new(endpoints, 5, 3, 30)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // =========================================================================
    // Core request method
    // =========================================================================

    async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, String)],
        headers: Option<&HeaderMap>,
        body: Option<&Json>,
    ) -> Result<String, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..self.max_retries {
            self.rate_limiter.until_ready().await;

            debug!(
                method = %method,
                url = %url,
                attempt = attempt + 1,
                "Fetch request"
            );

            let mut req = self.client.request(method.clone(), url);
            if !params.is_empty() {
                req = req.query(params);
            }
            if let Some(headers) = headers {
                req = req.headers(headers.clone());
            }
            if let Some(body) = body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response
                            .text()
                            .await
                            .map_err(|e| FetchError::Network(e.to_string()));
                    }

                    // Rate limit: always retry
                    if status.as_u16() == 429 {
                        let retry_after = response
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(1);
                        warn!(retry_after, attempt = attempt + 1, url = %url, "Rate limited");
                        last_error = Some(FetchError::RateLimited { retry_after });
                        if backoff_ms(attempt, self.max_retries).is_some() {
                            tokio::time::sleep(Duration::from_secs(retry_after)).await;
                        }
                        continue;
                    }

                    // Server errors: retry with backoff
                    if status.is_server_error() {
                        warn!(
                            status_code = status.as_u16(),
                            attempt = attempt + 1,
                            url = %url,
                            "Server error"
                        );
                        if let Some(delay_ms) = backoff_ms(attempt, self.max_retries) {
                            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        }
                        last_error = Some(FetchError::Http {
                            status_code: status.as_u16(),
                            message: status.to_string(),
                        });
                        continue;
                    }

                    // Client errors: don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(FetchError::from_response(status.as_u16(), &body_text));
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        url = %url,
                        "Network error"
                    );
                    if let Some(delay_ms) = backoff_ms(attempt, self.max_retries) {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }

                    if e.is_timeout() {
                        last_error = Some(FetchError::Timeout(e.to_string()));
                    } else {
                        last_error = Some(FetchError::Network(e.to_string()));
                    }
                }
            }
        }

        let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(FetchError::MaxRetriesExceeded {
            attempts: self.max_retries,
            last_error,
        })
    }

    async fn get_json_with(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: Option<&HeaderMap>,
    ) -> Result<Json, FetchError> {
        let text = self.request(Method::GET, url, params, headers, None).await?;
        serde_json::from_str(&text).map_err(|e| FetchError::Deserialization(format!("{url}: {e}")))
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Json, FetchError> {
        self.get_json_with(url, params, None).await
    }

    /// GET a page as text.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.request(Method::GET, url, &[], None, None).await
    }

    /// POST a JSON body, discarding the response body.
    pub async fn post_json(&self, url: &str, body: &Json) -> Result<(), FetchError> {
        self.request(Method::POST, url, &[], None, Some(body)).await?;
        Ok(())
    }

    // =========================================================================
    // MLB
    // =========================================================================

    pub async fn mlb_schedule(&self, interval: &DateInterval) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/schedule", self.endpoints.mlb_base_url);
        let params = [
            ("sportId", "1".to_string()),
            ("startDate", interval.start.format(API_DATE_FORMAT).to_string()),
            ("endDate", interval.end.format(API_DATE_FORMAT).to_string()),
        ];
        self.get_json(&url, &params).await
    }

    pub async fn mlb_feed(&self, game_pk: i64) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1.1/game/{game_pk}/feed/live", self.endpoints.mlb_base_url);
        self.get_json(&url, &[]).await
    }

    pub async fn mlb_boxscore(&self, game_pk: i64) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/game/{game_pk}/boxscore", self.endpoints.mlb_base_url);
        self.get_json(&url, &[]).await
    }

    pub async fn mlb_play_by_play(&self, game_pk: i64) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/game/{game_pk}/playByPlay", self.endpoints.mlb_base_url);
        self.get_json(&url, &[]).await
    }

    pub async fn mlb_teams(&self) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/teams", self.endpoints.mlb_base_url);
        self.get_json(&url, &[("sportId", "1".to_string())]).await
    }

    /// Every player on a major league roster during `season`.
    pub async fn mlb_players(&self, season: i32) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/sports/1/players", self.endpoints.mlb_base_url);
        self.get_json(&url, &[("season", season.to_string())]).await
    }

    // =========================================================================
    // NHL
    // =========================================================================

    pub async fn nhl_schedule(&self, interval: &DateInterval) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/schedule", self.endpoints.nhl_base_url);
        let params = [
            ("startDate", interval.start.format(API_DATE_FORMAT).to_string()),
            ("endDate", interval.end.format(API_DATE_FORMAT).to_string()),
        ];
        self.get_json(&url, &params).await
    }

    pub async fn nhl_feed(&self, game_pk: i64) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/game/{game_pk}/feed/live", self.endpoints.nhl_base_url);
        self.get_json(&url, &[]).await
    }

    /// Active teams with their current rosters expanded.
    pub async fn nhl_teams(&self) -> Result<Json, FetchError> {
        let url = format!("{}/api/v1/teams", self.endpoints.nhl_base_url);
        self.get_json(&url, &[("expand", "team.roster".to_string())]).await
    }

    pub async fn nhl_injury_page(&self) -> Result<String, FetchError> {
        let url = format!("{}/friv/injuries.cgi", self.endpoints.nhl_reference_url);
        self.get_text(&url).await
    }

    // =========================================================================
    // NBA
    // =========================================================================

    /// Full-season schedule file.
    pub async fn nba_schedule(&self, season: i32) -> Result<Json, FetchError> {
        let url = format!(
            "{}/{season}/league/00_full_schedule.json",
            self.endpoints.nba_schedule_url
        );
        self.get_json(&url, &[]).await
    }

    /// Traditional box score; needs browser-like headers.
    pub async fn nba_boxscore(&self, game_id: &str) -> Result<Json, FetchError> {
        let url = format!("{}/stats/boxscoretraditionalv2", self.endpoints.nba_base_url);
        let params = [
            ("GameID", game_id.to_string()),
            ("StartPeriod", "0".to_string()),
            ("EndPeriod", "10".to_string()),
            ("StartRange", "0".to_string()),
            ("EndRange", "28800".to_string()),
            ("RangeType", "0".to_string()),
        ];
        self.get_json_with(&url, &params, Some(&self.nba_headers)).await
    }

    pub async fn nba_injury_page(&self) -> Result<String, FetchError> {
        let url = format!("{}/friv/injuries.cgi", self.endpoints.nba_reference_url);
        self.get_text(&url).await
    }

    // =========================================================================
    // NFL / XFL
    // =========================================================================

    pub async fn nfl_schedule(&self, season: i32) -> Result<Json, FetchError> {
        let url = format!("{}/schedules/{season}.json", self.endpoints.nfl_base_url);
        self.get_json(&url, &[]).await
    }

    pub async fn nfl_boxscore(&self, game_id: i64) -> Result<Json, FetchError> {
        let url = format!("{}/boxscore/{game_id}.json", self.endpoints.nfl_base_url);
        self.get_json(&url, &[]).await
    }

    pub async fn xfl_game_page(&self, game_id: u32) -> Result<String, FetchError> {
        let url = format!("{}/{game_id}", self.endpoints.xfl_base_url);
        self.get_text(&url).await
    }

    // =========================================================================
    // Odds
    // =========================================================================

    pub async fn odds(&self, sport: &str, league: &str) -> Result<Json, FetchError> {
        let url = format!(
            "{}/services/sports/event/v2/events/A/description/{sport}/{league}",
            self.endpoints.odds_base_url
        );
        self.get_json(&url, &[]).await
    }
}

/// Delay before the next attempt, or `None` after the last one.
fn backoff_ms(attempt: u32, max_retries: u32) -> Option<u64> {
    if attempt.saturating_add(1) >= max_retries {
        return None;
    }
    Some(
        BASE_BACKOFF_MS
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(MAX_BACKOFF_MS),
    )
}

fn nba_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(NBA_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://stats.nba.com"));
    headers
}
