//! Tabulator: homogeneous record tables.
//!
//! A table's schema is the ordered list of field names. It is fixed either
//! up front (from a `FieldMap`) or by the first record appended; every
//! later record must match it exactly.

use std::io::{Read, Write};

use super::error::CoreError;
use super::field_map::FieldMap;
use super::record::Record;
use super::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    schema: Option<Vec<String>>,
    records: Vec<Record>,
}

impl Table {
    /// Empty table whose schema is set by the first append.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(names: Vec<String>) -> Self {
        Self {
            schema: Some(names),
            records: Vec::new(),
        }
    }

    pub fn for_map(map: &FieldMap) -> Self {
        Self::with_schema(map.names())
    }

    /// Build a table from records of one map, failing on the first
    /// record whose shape differs.
    pub fn from_records(map: &FieldMap, records: Vec<Record>) -> Result<Self, CoreError> {
        let mut table = Self::for_map(map);
        for record in records {
            table.append(record)?;
        }
        Ok(table)
    }

    pub fn schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn append(&mut self, record: Record) -> Result<(), CoreError> {
        match &self.schema {
            Some(schema) if !record.same_schema(schema) => {
                let found: Vec<String> = record.names().map(str::to_string).collect();
                return Err(CoreError::schema_mismatch(schema, &found));
            }
            Some(_) => {}
            None => self.schema = Some(record.names().map(str::to_string).collect()),
        }
        self.records.push(record);
        Ok(())
    }

    /// Rebuild the table with `f` applied to every record, re-checking
    /// each result against the schema.
    pub fn map_records<F>(self, mut f: F) -> Result<Table, CoreError>
    where
        F: FnMut(Record) -> Record,
    {
        let mut out = Table {
            schema: self.schema,
            records: Vec::with_capacity(self.records.len()),
        };
        for record in self.records {
            out.append(f(record))?;
        }
        Ok(out)
    }

    /// Concatenate in input order. Tables without a schema carry no rows
    /// and are skipped; every other schema must match the first one.
    pub fn concat(tables: &[Table]) -> Result<Table, CoreError> {
        let mut out = Table::new();
        for table in tables {
            let Some(schema) = &table.schema else {
                continue;
            };
            match &out.schema {
                Some(expected) if expected != schema => {
                    return Err(CoreError::schema_mismatch(expected, schema));
                }
                Some(_) => {}
                None => out.schema = Some(schema.clone()),
            }
            out.records.extend(table.records.iter().cloned());
        }
        Ok(out)
    }

    /// Column names, empty when no schema has been established.
    pub fn header(&self) -> &[String] {
        self.schema.as_deref().unwrap_or(&[])
    }

    /// Flat value rows in table order. Borrowing only, so it can be called
    /// again to restart.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + Clone + '_ {
        self.records.iter().map(|r| r.values().collect())
    }

    // =========================================================================
    // CSV
    // =========================================================================

    /// Write header and rows. A table with no schema writes nothing.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CoreError> {
        let mut out = csv::Writer::from_writer(writer);
        if self.schema.is_none() {
            return Ok(());
        }
        out.write_record(self.header())?;
        for row in self.rows() {
            out.write_record(row.iter().map(|v| v.to_cell()))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Read a table written by `write_csv`, re-typing every cell with the
    /// kinds declared in `map`. The header must equal the map's names.
    pub fn read_csv<R: Read>(reader: R, map: &FieldMap) -> Result<Table, CoreError> {
        let mut input = csv::Reader::from_reader(reader);
        let names = map.names();
        let header: Vec<String> = input.headers()?.iter().map(str::to_string).collect();
        if header != names {
            return Err(CoreError::schema_mismatch(&names, &header));
        }

        let mut table = Table::for_map(map);
        for (row, result) in input.records().enumerate() {
            let cells = result?;
            let mut fields = Vec::with_capacity(names.len());
            for (spec, cell) in map.specs().iter().zip(cells.iter()) {
                let value = spec
                    .kind
                    .parse_cell(cell)
                    .map_err(|message| CoreError::InvalidCell {
                        row,
                        column: spec.name.clone(),
                        message,
                    })?;
                fields.push((spec.name.clone(), value));
            }
            table.append(Record::from_fields(fields))?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field_map::FieldSpec;
    use crate::core::value::FieldKind;

    fn row(id: i64, result: &str) -> Record {
        Record::from_fields(vec![
            ("GameId".into(), Value::Int(id)),
            ("TeamResult".into(), Value::Text(result.into())),
        ])
    }

    #[test]
    fn test_first_append_sets_schema() {
        let mut t = Table::new();
        t.append(row(1, "W")).unwrap();
        assert_eq!(t.header(), ["GameId", "TeamResult"]);

        let other = Record::from_fields(vec![("Id".into(), Value::Int(1))]);
        let err = t.append(other).unwrap_err();
        assert!(err.is_schema_mismatch());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_concat_skips_schemaless_tables() {
        let mut a = Table::new();
        a.append(row(1, "W")).unwrap();
        let joined = Table::concat(&[Table::new(), a.clone(), Table::new()]).unwrap();
        assert_eq!(joined, a);
    }

    #[test]
    fn test_rows_restartable() {
        let mut t = Table::new();
        t.append(row(1, "W")).unwrap();
        t.append(row(2, "L")).unwrap();
        let rows = t.rows();
        assert_eq!(rows.clone().count(), 2);
        assert_eq!(rows.count(), 2);
        assert_eq!(t.rows().nth(1).unwrap()[1], &Value::Text("L".into()));
    }

    #[test]
    fn test_read_csv_header_mismatch() {
        let map = FieldMap::new("t", vec![FieldSpec::new("Id", "id", FieldKind::Int)]);
        let err = Table::read_csv("Other\n1\n".as_bytes(), &map).unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_read_csv_bad_cell() {
        let map = FieldMap::new("t", vec![FieldSpec::new("Id", "id", FieldKind::Int)]);
        let err = Table::read_csv("Id\nabc\n".as_bytes(), &map).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCell { row: 0, .. }));
    }
}
