//! Ingestion endpoint sink.
//!
//! Nested game records are posted as one JSON array per sport to
//! `{base}/{sport}/boxscores`; odds rows go to `{base}/{sport}/odds`.

use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::api::{FetchError, StatsClient};
use crate::core::{NestedRecord, Record, Sport};

pub struct IngestSink {
    base_url: String,
}

impl IngestSink {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, sport: Sport, collection: &str) -> String {
        format!("{}/{sport}/{collection}", self.base_url)
    }

    pub async fn send_games(
        &self,
        client: &StatsClient,
        sport: Sport,
        games: &[NestedRecord],
    ) -> Result<(), FetchError> {
        self.send(client, sport, "boxscores", games).await
    }

    pub async fn send_odds(
        &self,
        client: &StatsClient,
        sport: Sport,
        odds: &[Record],
    ) -> Result<(), FetchError> {
        self.send(client, sport, "odds", odds).await
    }

    async fn send<T: Serialize>(
        &self,
        client: &StatsClient,
        sport: Sport,
        collection: &str,
        items: &[T],
    ) -> Result<(), FetchError> {
        let url = self.url(sport, collection);
        if items.is_empty() {
            debug!(url = %url, "Nothing to ingest");
            return Ok(());
        }
        let body = body(items)?;
        client.post_json(&url, &body).await?;
        info!(url = %url, records = items.len(), "Ingested records");
        Ok(())
    }
}

fn body<T: Serialize>(items: &[T]) -> Result<Json, FetchError> {
    serde_json::to_value(items).map_err(|e| FetchError::Deserialization(e.to_string()))
}
