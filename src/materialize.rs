//! Materialization of positional rows into named-field records.

use serde_json::Value;

use crate::types::{Header, RawRow, Record};

/// Maps raw positional rows onto the session header and tracks the running
/// loaded-row count.
///
/// The counter advances by the number of rows actually materialized per
/// call — not by inspecting dataset size — so progress accounting stays
/// consistent even when the remote returns duplicate or short pages.
#[derive(Debug)]
pub struct RowMaterializer {
    header: Header,
    total_loaded: u64,
}

impl RowMaterializer {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            total_loaded: 0,
        }
    }

    /// Turn one page of raw rows into records.
    ///
    /// A row shorter than the header gets `Null` for the missing trailing
    /// fields; positions beyond the header are ignored.
    pub fn materialize(&mut self, rows: Vec<RawRow>) -> Vec<Record> {
        let records: Vec<Record> = rows
            .into_iter()
            .map(|row| self.materialize_row(row))
            .collect();
        self.total_loaded += records.len() as u64;
        records
    }

    fn materialize_row(&self, mut row: RawRow) -> Record {
        let mut record = Record::new();
        for (position, name) in self.header.iter().enumerate() {
            let value = if position < row.len() {
                std::mem::replace(&mut row[position], Value::Null)
            } else {
                Value::Null
            };
            record.insert(name.clone(), value);
        }
        record
    }

    /// Rows materialized so far across all calls.
    pub fn total_loaded(&self) -> u64 {
        self.total_loaded
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}
