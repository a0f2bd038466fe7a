// src/table.rs
//! In-memory shape of every artifact: named columns over rows of [`Cell`]s.
//!
//! Cells carry the collection state of a field (`Pending`, `Missing`, `Errored`)
//! instead of overloading text. The `"?"` sentinel only exists in the
//! serialized form written by [`Table::to_csv`].

use std::collections::HashSet;

use crate::config::consts::{SENTINEL, STORE_SEP};
use crate::csv::{parse_rows, rows_to_string};
use crate::error::FieldError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    /// Not attempted yet.
    Pending,
    Value(String),
    /// Attempted; the source had nothing usable.
    Missing,
    /// Attempted; the request failed after retries. Retry candidate.
    Errored(String),
}

impl Cell {
    pub fn value(v: impl Into<String>) -> Self {
        Cell::Value(v.into())
    }

    /// Inverse of [`Cell::to_text`]. `Errored` is restored from the error ledger, not from text.
    pub fn from_text(s: &str) -> Self {
        match s {
            "" => Cell::Pending,
            SENTINEL => Cell::Missing,
            v => Cell::Value(v.to_string()),
        }
    }

    pub fn to_text(&self) -> &str {
        match self {
            Cell::Pending => "",
            Cell::Value(v) => v,
            Cell::Missing | Cell::Errored(_) => SENTINEL,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Cell::Pending)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Cell::Errored(_))
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Cell::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Result<String, FieldError>> for Cell {
    fn from(r: Result<String, FieldError>) -> Self {
        match r {
            Ok(v) if v.is_empty() || v == SENTINEL => Cell::Missing,
            Ok(v) => Cell::Value(v),
            Err(_) => Cell::Missing,
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(x) if x.is_finite() => Cell::Value(x.to_string()),
            _ => Cell::Missing,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
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

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn missing_columns(&self, expected: &[&str]) -> Vec<String> {
        expected.iter().filter(|c| !self.has_column(c)).map(|c| s!(*c)).collect()
    }

    /// Column indices for `cols`, or the first name that is absent.
    pub fn indices(&self, cols: &[&str]) -> Result<Vec<usize>, String> {
        cols.iter()
            .map(|c| self.column(c).ok_or_else(|| s!(*c)))
            .collect()
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    pub fn get_by(&self, row: usize, name: &str) -> Option<&Cell> {
        let c = self.column(name)?;
        self.rows.get(row).map(|r| &r[c])
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row][col] = cell;
    }

    /// Append a row, padding with `Pending` (or truncating) to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Pending);
        self.rows.push(row);
    }

    /// Add a column filled with `fill`; an existing column is left alone.
    pub fn add_column(&mut self, name: &str, fill: Cell) -> usize {
        if let Some(c) = self.column(name) {
            return c;
        }
        self.headers.push(s!(name));
        for r in &mut self.rows {
            r.push(fill.clone());
        }
        self.headers.len() - 1
    }

    /// Replace (or append) a whole column. `cells` must have one entry per row.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        let c = self.add_column(name, Cell::Pending);
        for (r, cell) in self.rows.iter_mut().zip(cells) {
            r[c] = cell;
        }
    }

    /// New table with only `cols`, in that order.
    pub fn project(&self, cols: &[&str]) -> Result<Table, String> {
        let idx = self.indices(cols)?;
        let mut out = Table::new(cols.iter().map(|c| s!(*c)).collect());
        for r in &self.rows {
            out.rows.push(idx.iter().map(|&i| r[i].clone()).collect());
        }
        Ok(out)
    }

    /// Key text for a row, or `None` when any key cell is not a value.
    pub fn key(&self, row: usize, idx: &[usize]) -> Option<Vec<&str>> {
        idx.iter().map(|&i| self.rows[row][i].as_value()).collect()
    }

    /// Distinct values of a column, first-seen order, non-values skipped.
    pub fn distinct(&self, col: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for r in &self.rows {
            if let Some(v) = r[col].as_value() {
                if seen.insert(v) {
                    out.push(s!(v));
                }
            }
        }
        out
    }

    pub fn to_csv(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|c| s!(c.to_text())).collect())
            .collect();
        rows_to_string(&self.headers, &rows, STORE_SEP)
    }

    /// First line is the header. Ragged rows are padded/truncated to its width.
    pub fn from_csv(text: &str) -> Result<Table, String> {
        let mut rows = parse_rows(text, STORE_SEP).into_iter();
        let headers = rows.next().ok_or_else(|| s!("no header row"))?;
        let mut table = Table::new(headers);
        for r in rows {
            table.push_row(r.iter().map(|c| Cell::from_text(c)).collect());
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(cols!["Place", "StateCode", "County"]);
        t.push_row(vec![Cell::value("springfield"), Cell::value("il"), Cell::value("sangamon")]);
        t.push_row(vec![Cell::value("springfield"), Cell::value("mo"), Cell::Missing]);
        t.push_row(vec![Cell::value("athens"), Cell::value("ga")]);
        t
    }

    #[test]
    fn sentinel_only_at_text_boundary() {
        let t = sample();
        let text = t.to_csv();
        assert_eq!(text, "Place,StateCode,County\nspringfield,il,sangamon\nspringfield,mo,?\nathens,ga,\n");
        let back = Table::from_csv(&text).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.get(1, 2), &Cell::Missing);
        assert!(back.get(2, 2).is_pending());
    }

    #[test]
    fn errored_serializes_as_sentinel() {
        assert_eq!(Cell::Errored(s!("timeout")).to_text(), "?");
        assert_eq!(Cell::from_text("?"), Cell::Missing);
    }

    #[test]
    fn key_requires_values() {
        let t = sample();
        let idx = t.indices(&["Place", "County"]).unwrap();
        assert_eq!(t.key(0, &idx), Some(vec!["springfield", "sangamon"]));
        assert_eq!(t.key(1, &idx), None);
        assert_eq!(t.indices(&["Place", "Fips"]), Err(s!("Fips")));
    }

    #[test]
    fn project_and_add_column() {
        let mut t = sample();
        let c = t.add_column("Zip", Cell::Pending);
        assert_eq!(c, 3);
        assert_eq!(t.add_column("Zip", Cell::Missing), 3);
        let p = t.project(&["StateCode", "Place"]).unwrap();
        assert_eq!(p.headers(), &["StateCode", "Place"]);
        assert_eq!(p.get(2, 1), &Cell::value("athens"));
        assert_eq!(t.distinct(0), vec!["springfield", "athens"]);
    }

    #[test]
    fn field_results_fold_to_cells() {
        assert_eq!(Cell::from(Ok::<_, FieldError>(s!("12"))), Cell::value("12"));
        assert_eq!(Cell::from(Err::<String, _>(FieldError::NotFound("County"))), Cell::Missing);
        assert_eq!(Cell::from(Some(f64::NAN)), Cell::Missing);
        assert_eq!(Cell::from(Some(0.25)), Cell::value("0.25"));
    }
}
