//! History Store Implementation

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::StorageError;

/// Retention limit for loaded rows
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// One historical row, keyed by CSV column name
pub type HistoryRecord = Map<String, Value>;

/// Read-only store of historical observations
#[derive(Debug, Clone)]
pub struct HistoryStore {
    /// Rows in file order, oldest first
    records: VecDeque<HistoryRecord>,
    /// Max rows kept (oldest are dropped)
    max_records: usize,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_records: max_records.max(1),
        }
    }

    /// Load a CSV file with a header row. A missing file yields an empty store.
    pub fn load_csv(path: &Path, max_records: usize) -> Result<Self, StorageError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("History file {} not found, serving empty history", path.display());
                return Ok(Self::new(max_records));
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self::from_csv_str(&raw, max_records)?;
        info!("Loaded {} history records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse CSV text: a header row, then one record per row.
    ///
    /// Quoted cells may contain commas, newlines and `""` escapes. Cells become
    /// integers, floats or strings; empty cells become `null`.
    pub fn from_csv_str(raw: &str, max_records: usize) -> Result<Self, StorageError> {
        let mut store = Self::new(max_records);
        let mut rows = split_rows(raw)?.into_iter();

        let Some(CsvRow { cells: columns, .. }) = rows.next() else {
            return Ok(store);
        };

        for row in rows {
            if row.cells.len() != columns.len() {
                return Err(StorageError::Malformed {
                    line: row.line,
                    reason: format!(
                        "expected {} columns, found {}",
                        columns.len(),
                        row.cells.len()
                    ),
                });
            }

            let record: HistoryRecord = columns
                .iter()
                .cloned()
                .zip(row.cells.iter().map(|cell| parse_cell(cell)))
                .collect();
            store.insert(record);
        }

        debug!("Parsed {} history rows", store.len());
        Ok(store)
    }

    /// Append a record, dropping the oldest beyond the retention limit
    pub fn insert(&mut self, record: HistoryRecord) {
        while self.records.len() >= self.max_records {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The last `limit` records, oldest first
    pub fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Get total record count
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECORDS)
    }
}

/// One parsed CSV row and the line it starts on
struct CsvRow {
    line: usize,
    cells: Vec<String>,
}

#[derive(Default)]
struct RowBuilder {
    cells: Vec<String>,
    cell: String,
    quoted: bool,
}

impl RowBuilder {
    fn end_cell(&mut self) {
        let cell = std::mem::take(&mut self.cell);
        let cell = if self.quoted { cell } else { cell.trim().to_string() };
        self.cells.push(cell);
        self.quoted = false;
    }

    fn end_row(&mut self, line: usize, rows: &mut Vec<CsvRow>) {
        self.end_cell();
        let cells = std::mem::take(&mut self.cells);
        let blank = cells.len() == 1 && cells[0].is_empty();
        if !blank {
            rows.push(CsvRow { line, cells });
        }
    }
}

fn split_rows(raw: &str) -> Result<Vec<CsvRow>, StorageError> {
    let mut rows = Vec::new();
    let mut builder = RowBuilder::default();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    builder.cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    builder.cell.push(c);
                }
                _ => builder.cell.push(c),
            }
            continue;
        }

        match c {
            '"' if builder.cell.trim().is_empty() => {
                builder.cell.clear();
                builder.quoted = true;
                in_quotes = true;
            }
            ',' => builder.end_cell(),
            '\r' => {}
            '\n' => {
                builder.end_row(row_start, &mut rows);
                line += 1;
                row_start = line;
            }
            _ => builder.cell.push(c),
        }
    }

    if in_quotes {
        return Err(StorageError::Malformed {
            line: row_start,
            reason: "unterminated quoted cell".to_string(),
        });
    }
    builder.end_row(row_start, &mut rows);

    Ok(rows)
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(float) = cell.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
        return Value::Null;
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const CSV: &str = "timestamp,water_level_m,wind_speed_mps,station\n\
        2024-01-01 00:00:00,0.82,4.1,north\n\
        2024-01-01 01:00:00,0.91,,north\n\
        2024-01-01 02:00:00,1.05,6,north\n";

    #[test]
    fn test_parse_typed_cells() {
        let store = HistoryStore::from_csv_str(CSV, 100).unwrap();
        assert_eq!(store.len(), 3);

        let rows = store.recent(10);
        assert_eq!(rows[0]["timestamp"], json!("2024-01-01 00:00:00"));
        assert_eq!(rows[0]["water_level_m"], json!(0.82));
        assert_eq!(rows[1]["wind_speed_mps"], Value::Null);
        assert_eq!(rows[2]["wind_speed_mps"], json!(6));
        assert_eq!(rows[2]["station"], json!("north"));
    }

    #[test]
    fn test_recent_keeps_chronological_tail() {
        let store = HistoryStore::from_csv_str(CSV, 100).unwrap();
        let rows = store.recent(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["water_level_m"], json!(0.91));
        assert_eq!(rows[1]["water_level_m"], json!(1.05));
    }

    #[test]
    fn test_retention_limit() {
        let mut store = HistoryStore::new(5);
        for i in 0..10 {
            let mut record = HistoryRecord::new();
            record.insert("n".to_string(), json!(i));
            store.insert(record);
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.recent(1)[0]["n"], json!(9));
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = HistoryStore::from_csv_str("a,b\n1,2\n3\n", 10).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_quoted_cells() {
        let raw = "timestamp,water_level_m,note\n\
            2024-01-01 00:00:00,0.8,\"calm, clear\"\n\
            2024-01-01 01:00:00,0.9,\"gauge \"\"B\"\" offline\"\n\
            2024-01-01 02:00:00,\"1.0\",\"two\nlines\"\n";
        let store = HistoryStore::from_csv_str(raw, 10).unwrap();
        assert_eq!(store.len(), 3);

        let rows = store.recent(10);
        assert_eq!(rows[0]["note"], json!("calm, clear"));
        assert_eq!(rows[1]["note"], json!("gauge \"B\" offline"));
        assert_eq!(rows[2]["water_level_m"], json!(1.0));
        assert_eq!(rows[2]["note"], json!("two\nlines"));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let store = HistoryStore::from_csv_str("a,b\r\n\r\n1,2\r\n3,4\r\n", 10).unwrap();
        let rows = store.recent(10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["b"], json!(4));
    }

    #[test]
    fn test_unterminated_quote_is_rejected() {
        let err = HistoryStore::from_csv_str("a,b\n1,\"open\n", 10).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_empty_and_missing_sources() {
        assert!(HistoryStore::from_csv_str("", 10).unwrap().is_empty());
        assert!(HistoryStore::from_csv_str("a,b\n", 10).unwrap().is_empty());

        let store = HistoryStore::load_csv(Path::new("/nonexistent/historical.csv"), 10).unwrap();
        assert!(store.is_empty());
        assert!(store.recent(200).is_empty());
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let store = HistoryStore::load_csv(file.path(), 2).unwrap();
        assert_eq!(store.len(), 2);
    }
}
