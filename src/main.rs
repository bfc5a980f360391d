//! Sports statistics extractor.
//!
//! Pulls schedules, box scores and play-by-play for one sport and time
//! window from the public stats sources, flattens them into tables and
//! writes them out.
//!
//! Architecture:
//! - Tokio async runtime with a rate-limited, retrying HTTP client
//! - Static per-entity field maps driving a generic extractor
//! - Bounded-concurrency game fetching that keeps schedule order
//! - CSV files per table and an optional ingestion endpoint

use std::sync::Arc;

use tracing::{error, info};

use sportsdata::api::StatsClient;
use sportsdata::config::Settings;
use sportsdata::core::SeasonCalendar;
use sportsdata::pipeline::Collector;
use sportsdata::sink::{CsvSink, IngestSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration.
    let settings = Settings::from_env();

    // Initialize logging.
    init_logging(&settings);

    info!("=== Sports Data Extractor ===");
    info!(
        sport = %settings.sport,
        output_dir = %settings.output_dir.display(),
        csv = settings.enable_csv,
        ingest = settings.enable_ingest,
        odds = settings.enable_odds,
        reference = settings.enable_reference,
        "Configuration loaded"
    );

    // Validate settings.
    if let Err(errors) = settings.validate() {
        for e in &errors {
            error!(error = %e, "Configuration error");
        }
        anyhow::bail!("Configuration validation failed");
    }
    let sport = settings.sport().map_err(anyhow::Error::msg)?;
    let selector = settings.selector()?;

    let calendar = match &settings.season_calendar_path {
        Some(path) => SeasonCalendar::load(path)?,
        None => SeasonCalendar::builtin(),
    };

    let client = StatsClient::new(
        settings.endpoints(),
        settings.rate_limit_per_sec,
        settings.max_retries,
        settings.request_timeout_secs,
    )?;
    let client = Arc::new(client);

    let collector = Collector::new(client.clone(), calendar, settings.collector_config());

    // =========================================================================
    // Extraction
    // =========================================================================
    let extraction = collector.collect(sport, &selector).await?;
    for (name, table) in extraction.tables() {
        info!(table = name, rows = table.len(), "Table extracted");
    }

    let odds = if settings.enable_odds {
        Some(collector.collect_odds(sport).await?)
    } else {
        None
    };

    let reference = if settings.enable_reference {
        collector.collect_reference(sport, &selector).await?
    } else {
        Vec::new()
    };

    // =========================================================================
    // Outputs
    // =========================================================================
    if settings.enable_csv {
        let sink = CsvSink::new(&settings.output_dir);
        sink.write_all(extraction.tables())?;
        if let Some(odds) = &odds {
            sink.write(&format!("{sport}_odds"), odds)?;
        }
        if !reference.is_empty() {
            sink.write_all(reference.iter().map(|(name, table)| (*name, table)))?;
        }
    }

    if settings.enable_ingest {
        let sink = IngestSink::new(&settings.ingest_url);
        sink.send_games(&client, sport, extraction.games()).await?;
        if let Some(odds) = &odds {
            sink.send_odds(&client, sport, odds.records()).await?;
        }
    }

    info!(
        sport = %sport,
        games = extraction.games().len(),
        "Run complete"
    );
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
