//! Query result table.

use rusqlite::types::ValueRef;
use std::fmt;

/// One result value, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Real(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(r) => Cell::Real(r),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Text(format!("<blob {} bytes>", b.len())),
        }
    }
}

/// CSV-ready rendering: NULL is empty, numbers use Rust's shortest form.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Column names plus rows, in the order the query returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Set when rows were dropped to honour the row cap
    pub truncated: bool,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when every non-null value in the column is a number and at least one exists.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen = false;
        for row in &self.rows {
            match row.get(idx) {
                Some(cell) if cell.is_numeric() => seen = true,
                Some(Cell::Null) | None => {}
                Some(_) => return false,
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        ResultTable {
            columns: vec!["ProductName".into(), "Revenue".into(), "Note".into()],
            rows: vec![
                vec![Cell::Text("Mouse".into()), Cell::Real(120.5), Cell::Null],
                vec![Cell::Text("TV".into()), Cell::Integer(900), Cell::Text("x".into())],
                vec![Cell::Text("Milk".into()), Cell::Null, Cell::Null],
            ],
            truncated: false,
        }
    }

    #[test]
    fn test_numeric_detection() {
        let t = table();
        assert!(!t.is_numeric_column(0));
        assert!(t.is_numeric_column(1));
        assert!(!t.is_numeric_column(2));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(Cell::Real(12.25).to_string(), "12.25");
        assert_eq!(Cell::Integer(-3).to_string(), "-3");
        assert_eq!(Cell::from(ValueRef::Text(b"abc")), Cell::Text("abc".into()));
    }
}
