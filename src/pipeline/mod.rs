//! End-to-end extraction runs: resolve a selector, fetch every game in
//! the window and accumulate the per-sport tables.

pub mod collector;

use thiserror::Error;
use tracing::debug;

use crate::api::FetchError;
use crate::core::{CoreError, NestedRecord, Sport, Table};
use crate::entities::{sport_tables, GameBundle};

pub use collector::{Collector, CollectorConfig, Window};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Everything extracted for one sport and window.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub sport: Sport,
    pub window: Window,
    tables: Vec<(&'static str, Table)>,
    games: Vec<NestedRecord>,
}

impl Extraction {
    /// Empty extraction holding the sport's tables with their schemas set.
    pub fn new(sport: Sport, window: Window) -> Self {
        Self {
            sport,
            window,
            tables: sport_tables(sport),
            games: Vec::new(),
        }
    }

    /// Add one game: its record joins the game table, its child rows join
    /// their tables and its nested form is kept for ingestion.
    pub fn add_bundle(&mut self, bundle: GameBundle) -> Result<(), CoreError> {
        let nested = bundle.nested();
        self.table_mut(bundle.table_name).append(bundle.game)?;
        for child in bundle.children {
            let table = self.table_mut(child.table_name);
            for record in child.table.into_records() {
                table.append(record)?;
            }
        }
        self.games.push(nested);
        Ok(())
    }

    fn table_mut(&mut self, name: &'static str) -> &mut Table {
        let index = match self.tables.iter().position(|(n, _)| *n == name) {
            Some(index) => index,
            None => {
                debug!(table = name, "Adding table without a template");
                self.tables.push((name, Table::new()));
                self.tables.len() - 1
            }
        };
        &mut self.tables[index].1
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|(n, _)| *n == name).map(|(_, t)| t)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> + '_ {
        self.tables.iter().map(|(n, t)| (*n, t))
    }

    /// Nested game records, in schedule order.
    pub fn games(&self) -> &[NestedRecord] {
        &self.games
    }
}
