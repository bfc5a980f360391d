//! Output sinks for extracted tables and nested game records.

pub mod csv_sink;
pub mod ingest;

pub use csv_sink::CsvSink;
pub use ingest::IngestSink;
