use std::collections::HashMap;
use std::path::Path;

use crate::errors::AppError;

/// One row of a store. Absent columns read as the empty string.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// A flat tabular dataset: header order plus one `Record` per row.
/// Loaded fresh per request; nothing is cached or indexed.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl RecordStore {
    /// Read a CSV file whose header row defines the column names.
    /// A missing file maps to a 404; malformed rows propagate whatever
    /// the csv reader reports.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::NotFound(format!(
                "CSV file not found: {}",
                path.display()
            )));
        }
        let mut reader = csv::Reader::from_path(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let raw = result?;
            let mut fields = HashMap::new();
            for (i, column) in columns.iter().enumerate() {
                fields.insert(column.clone(), raw.get(i).unwrap_or("").to_string());
            }
            rows.push(Record { fields });
        }
        Ok(Self { columns, rows })
    }

    /// Row values in column order, for rendering result tables.
    pub fn row_values(&self, row: &Record) -> Vec<String> {
        self.columns.iter().map(|c| row.get(c).to_string()).collect()
    }
}
