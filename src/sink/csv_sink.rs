//! One CSV file per table, named after the table.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::{CoreError, Table};

pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{table_name}.csv"))
    }

    /// Write `table` to `{dir}/{table_name}.csv`, replacing any existing file.
    pub fn write(&self, table_name: &str, table: &Table) -> Result<PathBuf, CoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(table_name);
        let file = File::create(&path)?;
        table.write_csv(BufWriter::new(file))?;
        debug!(path = %path.display(), rows = table.len(), "Wrote table");
        Ok(path)
    }

    pub fn write_all<'a, I>(&self, tables: I) -> Result<Vec<PathBuf>, CoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a Table)>,
    {
        let mut paths = Vec::new();
        for (name, table) in tables {
            paths.push(self.write(name, table)?);
        }
        info!(dir = %self.dir.display(), files = paths.len(), "CSV output written");
        Ok(paths)
    }
}
