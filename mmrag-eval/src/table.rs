//! Result table
//!
//! One row per input example, keyed by its position. Columns appear in the
//! order they are first written; rows that never received a column serialize
//! it as `null`, so every persisted record carries the full column set.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{EvalError, Result};
use crate::metric::grade_column;

/// A single value in the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Grade(i64),
    Score(f64),
    Text(String),
}

impl Cell {
    /// Numeric value of the cell, if it holds one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Grade(g) => Some(*g as f64),
            Cell::Score(s) => Some(*s),
            Cell::Null | Cell::Text(_) => None,
        }
    }

    /// Integer grade; scores truncate toward zero
    pub fn as_grade(&self) -> Option<i64> {
        match self {
            Cell::Grade(g) => Some(*g),
            Cell::Score(s) if s.is_finite() => Some(s.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(t) => Some(t),
            _ => None,
        }
    }

    fn from_value(value: Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Grade(i),
                None => n.as_f64().map(Cell::Score).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<Option<i64>> for Cell {
    fn from(grade: Option<i64>) -> Self {
        grade.map(Cell::Grade).unwrap_or(Cell::Null)
    }
}

impl From<f64> for Cell {
    fn from(score: f64) -> Self {
        Cell::Score(score)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

/// Cells written for one example
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    cells: HashMap<String, Cell>,
}

impl ResultRow {
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Ordered, append-only table of per-example results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure rows exist up to and including `index`
    pub fn ensure_row(&mut self, index: usize) -> &mut ResultRow {
        if self.rows.len() <= index {
            self.rows.resize_with(index + 1, ResultRow::default);
        }
        &mut self.rows[index]
    }

    pub fn set(&mut self, index: usize, column: &str, cell: impl Into<Cell>) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        self.ensure_row(index).cells.insert(column.to_string(), cell.into());
    }

    pub fn get(&self, index: usize, column: &str) -> Option<&Cell> {
        self.rows.get(index).and_then(|row| row.get(column))
    }

    /// Integer grade recorded for `name`; unset and null are both `None`
    pub fn grade(&self, index: usize, name: &str) -> Option<i64> {
        self.get(index, &grade_column(name)).and_then(Cell::as_grade)
    }

    pub fn row(&self, index: usize) -> Option<&ResultRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overwrite `path` with the full table.
    ///
    /// The content goes to a sibling temp file first and is renamed into place,
    /// so readers never observe a half-written checkpoint.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_json()?;
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Read back a table written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::LoadError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| EvalError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let records: Vec<serde_json::Map<String, Value>> = serde_json::from_str(content)?;
        let mut table = ResultTable::new();
        for (index, record) in records.into_iter().enumerate() {
            table.ensure_row(index);
            for (column, value) in record {
                // Nulls only stand for "never written"
                if !value.is_null() {
                    table.set(index, &column, Cell::from_value(value));
                } else if !table.columns.contains(&column) {
                    table.columns.push(column);
                }
            }
        }
        Ok(table)
    }
}

struct RecordRef<'a> {
    columns: &'a [String],
    row: &'a ResultRow,
}

impl Serialize for RecordRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.row.get(column).unwrap_or(&Cell::Null))?;
        }
        map.end()
    }
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RecordRef { columns: &self.columns, row })?;
        }
        seq.end()
    }
}
