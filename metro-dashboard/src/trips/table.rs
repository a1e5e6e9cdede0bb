//! Open-schema travel-time table.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// Errors loading a travel-time table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The file could not be opened
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV could not be decoded
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row has a different number of cells than the header
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Bool(bool),
    /// A finite number, with the text it was read from.
    Number { value: f64, raw: String },
    Text(String),
}

impl Cell {
    /// Infer a cell's type from its raw CSV text.
    ///
    /// `true`/`false` in any case become booleans, anything `f64` accepts
    /// becomes a number, blank input is empty, and the rest stays text.
    /// Numbers keep their source text, so `007` still matches as `007`.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Cell::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Cell::Bool(false);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number {
                value,
                raw: trimmed.to_string(),
            },
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The text used for exact-match comparison, or `None` for empty cells.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Number { value, .. } => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Number { raw, .. } => f.write_str(raw),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number {
            value,
            raw: value.to_string(),
        }
    }
}

/// One row of the travel-time table.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    cells: Vec<Cell>,
}

impl TripRecord {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// A column-ordered table of trips.
///
/// Rows are reference counted so that filtered copies share them with the
/// table they were cut from.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    columns: Arc<[String]>,
    rows: Vec<Arc<TripRecord>>,
}

impl TripTable {
    /// Create a table from a header and rows of cells.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let expected = columns.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row, cells)| {
                if cells.len() == expected {
                    Ok(Arc::new(TripRecord { cells }))
                } else {
                    Err(TableError::RowWidth {
                        row,
                        expected,
                        found: cells.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: columns.into(),
            rows,
        })
    }

    /// Read a table from CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_reader(reader);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::infer).collect());
        }

        Self::new(columns, rows)
    }

    /// Read a table from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of `column` in the header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn rows(&self) -> &[Arc<TripRecord>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cell at (`row`, `column`).
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r.cells[col])
    }

    /// A table with the same header and only the rows where `keep` holds.
    ///
    /// `keep` receives the cell of `column`; the caller has already checked
    /// the column exists.
    pub(crate) fn retain_by(&self, col: usize, mut keep: impl FnMut(&Cell) -> bool) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            rows: self
                .rows
                .iter()
                .filter(|r| keep(&r.cells[col]))
                .cloned()
                .collect(),
        }
    }

    /// Minimum and maximum of the numeric cells in `column`.
    ///
    /// `None` if the column is absent or holds no numbers.
    pub fn numeric_bounds(&self, column: &str) -> Option<(f64, f64)> {
        let col = self.column_index(column)?;
        self.rows
            .iter()
            .filter_map(|r| r.cells[col].as_number())
            .fold(None, |acc, n| match acc {
                None => Some((n, n)),
                Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
            })
    }

    /// Distinct non-empty values of `column`, in first-seen order.
    pub fn unique_text(&self, column: &str) -> Vec<String> {
        let Some(col) = self.column_index(column) else {
            return Vec::new();
        };

        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter_map(|r| r.cells[col].text())
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_json_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|r| {
                self.columns
                    .iter()
                    .zip(&r.cells)
                    .map(|(name, cell)| (name.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}

/// Serializes as `{ "columns": [...], "rows": [{...}, ...] }`.
impl Serialize for TripTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("TripTable", 2)?;
        s.serialize_field("columns", &*self.columns)?;
        s.serialize_field("rows", &self.to_json_rows())?;
        s.end()
    }
}
