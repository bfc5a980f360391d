//! Per-sport entity kinds.
//!
//! Each entity kind is a unit type implementing [`EntityKind`], backed by
//! one static [`FieldMap`]. Sport modules add the small amount of glue a
//! game needs: reshaping fetched documents, filling derived fields and
//! bundling child tables under their parent.

pub mod injury;
pub mod mlb;
pub mod nba;
pub mod nfl;
pub mod nhl;
pub mod odds;
pub mod xfl;

use chrono::Duration;
use scraper::{ElementRef, Selector};
use serde_json::Value as Json;

use crate::core::field_map::{TimestampPart, Transform};
use crate::core::{
    compose, extract, CoreError, FieldMap, FieldPath, NestedRecord, Record, Sport, Table, Value,
};

/// Timestamp format of the MLB and NHL stats APIs.
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Display offset applied to UTC timestamps (Pacific Standard Time).
pub const DISPLAY_OFFSET_HOURS: i64 = -8;

/// Statically declared entity schema.
pub trait EntityKind {
    /// Table name; also the CSV file stem.
    const NAME: &'static str;

    fn field_map() -> &'static FieldMap;

    fn extract(doc: &Json) -> Record {
        extract(doc, Self::field_map())
    }

    fn empty_table() -> Table {
        Table::for_map(Self::field_map())
    }
}

/// Declare an entity kind backed by a lazily built static map.
macro_rules! entity_kind {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $build:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $ty;

        impl $crate::entities::EntityKind for $ty {
            const NAME: &'static str = $name;

            fn field_map() -> &'static $crate::core::FieldMap {
                static MAP: std::sync::LazyLock<$crate::core::FieldMap> =
                    std::sync::LazyLock::new($build);
                &MAP
            }
        }
    };
}
pub(crate) use entity_kind;

/// UTC timestamp shifted to the display offset, keeping `part`.
pub fn display_time(part: TimestampPart) -> Transform {
    Transform::Timestamp {
        format: UTC_FORMAT,
        shift: Duration::hours(DISPLAY_OFFSET_HOURS),
        part,
    }
}

/// Items of the array, or values of the object, found at `path`.
pub fn children_at<'a>(doc: &'a Json, path: &str) -> Vec<&'a Json> {
    match FieldPath::parse(path).resolve(doc) {
        Some(Json::Array(items)) => items.iter().collect(),
        Some(Json::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, CoreError> {
    Selector::parse(css).map_err(|e| CoreError::Markup(format!("selector {css:?}: {e}")))
}

/// Trimmed text content of an element.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// =============================================================================
// Game bundles
// =============================================================================

/// One child collection of a game.
#[derive(Debug, Clone)]
pub struct ChildTable {
    /// Key of the embedded array in the nested record.
    pub key: &'static str,
    /// Table the rows accumulate into across games.
    pub table_name: &'static str,
    pub table: Table,
}

/// A game record with its child tables, as produced from one game's
/// fetched documents.
#[derive(Debug, Clone)]
pub struct GameBundle {
    pub table_name: &'static str,
    pub game: Record,
    pub children: Vec<ChildTable>,
}

impl GameBundle {
    pub fn new(table_name: &'static str, game: Record) -> Self {
        Self {
            table_name,
            game,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, key: &'static str, table_name: &'static str, table: Table) -> Self {
        self.children.push(ChildTable {
            key,
            table_name,
            table,
        });
        self
    }

    /// Nested form for the ingestion endpoint.
    pub fn nested(&self) -> NestedRecord {
        compose(
            self.game.clone(),
            self.children
                .iter()
                .map(|c| (c.key.to_string(), &c.table))
                .collect(),
        )
    }
}

/// Empty tables, in output order, that a sport's games fill.
pub fn sport_tables(sport: Sport) -> Vec<(&'static str, Table)> {
    use self::mlb::{MlbGame, MlbPlay, MlbPlayerBoxscore};
    use self::nba::{NbaGame, NbaPlayerBoxscore};
    use self::nfl::{NflDst, NflGame, NflPlayerBoxscore};
    use self::nhl::{NhlGame, NhlPlay, NhlPlayerBoxscore};
    use self::xfl::{XflGame, XflPlayerBoxscore, XflScoringPlay};

    fn entry<E: EntityKind>() -> (&'static str, Table) {
        (E::NAME, E::empty_table())
    }

    match sport {
        Sport::Mlb => vec![
            entry::<MlbGame>(),
            entry::<MlbPlayerBoxscore>(),
            entry::<MlbPlay>(),
        ],
        Sport::Nhl => vec![
            entry::<NhlGame>(),
            entry::<NhlPlayerBoxscore>(),
            entry::<NhlPlay>(),
        ],
        Sport::Nba => vec![entry::<NbaGame>(), entry::<NbaPlayerBoxscore>()],
        Sport::Nfl => vec![
            entry::<NflGame>(),
            entry::<NflPlayerBoxscore>(),
            entry::<NflDst>(),
        ],
        Sport::Xfl => vec![
            entry::<XflGame>(),
            entry::<XflPlayerBoxscore>(),
            entry::<XflScoringPlay>(),
        ],
    }
}

/// Copy the named game fields onto every child record.
pub(crate) fn game_context(game: &Record, names: &[&str]) -> Vec<(String, Value)> {
    names
        .iter()
        .map(|n| (n.to_string(), game.get(n).cloned().unwrap_or_default()))
        .collect()
}

pub(crate) fn apply_context(record: Record, context: &[(String, Value)]) -> Record {
    context
        .iter()
        .fold(record, |r, (name, value)| r.with(name, value.clone()))
}
