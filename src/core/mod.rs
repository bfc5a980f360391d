//! Record extraction core: field maps, extraction, composition,
//! tabulation and season resolution. Everything here is synchronous and
//! works on documents that have already been fetched.

pub mod compose;
pub mod derive;
pub mod error;
pub mod extract;
pub mod field_map;
pub mod path;
pub mod record;
pub mod season;
pub mod sport;
pub mod table;
pub mod value;

pub use compose::{compose, filter_participants, has_any_stat, ParticipationRule};
pub use error::CoreError;
pub use extract::{extract, extract_all};
pub use field_map::{FieldMap, FieldSpec, Transform};
pub use path::FieldPath;
pub use record::{NestedRecord, Record};
pub use season::{DateInterval, SeasonCalendar, Selector};
pub use sport::Sport;
pub use table::Table;
pub use value::{FieldKind, Value};
