// src/dataset.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Cell::Null,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            Value::String(s) => Cell::Text(s),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&Cell> for Value {
    fn from(c: &Cell) -> Self {
        match c {
            Cell::Null => Value::Null,
            Cell::Number(n) => Value::from(*n),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Rows × named columns, column order preserved.
///
/// Every row holds exactly one cell per header entry, so a row is addressed
/// by column position and `columns[i]` names `row[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with nulls (or dropping extras) to the header width.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rename `from` to `to` in place. Returns `false` (and leaves the
    /// dataset untouched) if `from` is absent or `to` is already taken.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to || self.has_column(to) {
            return false;
        }
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// All cells of one column, top to bottom.
    pub fn column_cells(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Rewrite every cell of `name` with `f`. No-op for an unknown column.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// Add a column holding `value` in every row. Returns `false` if the
    /// name is already in use.
    pub fn push_column(&mut self, name: &str, value: Cell) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
        true
    }

    /// Build from JSON objects. Columns appear in first-seen order across all
    /// records; keys missing from a record become nulls.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for rec in &records {
            for key in rec.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut ds = Dataset::new(columns);
        for mut rec in records {
            let row = ds
                .columns
                .iter()
                .map(|c| rec.remove(c).map(Cell::from).unwrap_or_default())
                .collect();
            ds.rows.push(row);
        }
        ds
    }

    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(name, cell)| (name.clone(), Value::from(cell)))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object literal")
    }

    #[test]
    fn push_row_pads_short_rows() {
        let mut ds = Dataset::new(["a", "b", "c"]);
        ds.push_row(vec![Cell::from("x")]);
        assert_eq!(ds.rows()[0], vec![Cell::from("x"), Cell::Null, Cell::Null]);
    }

    #[test]
    fn rename_refuses_to_collide() {
        let mut ds = Dataset::new(["TOTAL", "total"]);
        assert!(!ds.rename_column("TOTAL", "total"));
        assert!(!ds.rename_column("missing", "other"));
        assert!(ds.rename_column("TOTAL", "soma"));
        assert_eq!(ds.columns(), ["soma", "total"]);
    }

    #[test]
    fn records_keep_first_seen_column_order() {
        let ds = Dataset::from_records(vec![
            record(json!({"Tipo": "Papel", "jan/18": "1,5"})),
            record(json!({"TOTAL": 3, "Tipo": "Vidro"})),
        ]);
        assert_eq!(ds.columns(), ["Tipo", "jan/18", "TOTAL"]);
        assert_eq!(ds.rows()[0][2], Cell::Null);
        assert_eq!(ds.rows()[1][2], Cell::Number(3.0));

        let back = ds.to_records();
        assert_eq!(back[1]["Tipo"], json!("Vidro"));
        assert_eq!(back[0]["TOTAL"], Value::Null);
        let keys: Vec<&String> = back[0].keys().collect();
        assert_eq!(keys, ["Tipo", "jan/18", "TOTAL"]);
    }

    #[test]
    fn push_column_fills_every_row() {
        let mut ds = Dataset::new(["tipo_residuo"]);
        ds.push_row(vec![Cell::from("Papel")]);
        ds.push_row(vec![Cell::from("Vidro")]);
        assert!(ds.push_column("ano", Cell::Number(2018.0)));
        assert!(!ds.push_column("ano", Cell::Null));
        let anos = ds.column_cells("ano").unwrap();
        assert!(anos.iter().all(|c| c.as_number() == Some(2018.0)));
    }
}
