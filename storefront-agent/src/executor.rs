//! Read-only query execution.

use crate::schema::DatabaseSchema;
use crate::table::{Cell, ResultTable};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use storefront_error::{Error, ErrorKind, Result};
use tracing::{debug, warn};

/// A read-only handle on the database.
///
/// The file is opened with `SQLITE_OPEN_READ_ONLY` and `query_only` is set,
/// so even a statement that slips past validation cannot write.
pub struct QueryExecutor {
    conn: Connection,
}

impl QueryExecutor {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let op = "executor::open";
        if !path.is_file() {
            return Err(Error::new(
                ErrorKind::FileNotFound,
                format!("database '{}' not found; run storefront-gen first", path.display()),
            )
            .with_operation(op));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            Error::database_failed(e.to_string())
                .with_operation(op)
                .with_context("path", path.display().to_string())
                .set_source(e)
        })?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection, switching it to query-only mode.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA query_only = ON;").map_err(|e| {
            Error::database_failed(e.to_string())
                .with_operation("executor::query_only")
                .set_source(e)
        })?;
        Ok(Self { conn })
    }

    pub fn schema(&self, sample_rows: usize) -> Result<DatabaseSchema> {
        DatabaseSchema::introspect(&self.conn, sample_rows)
    }

    /// Run one SELECT, keeping at most `max_rows` rows.
    pub fn execute(&self, sql: &str, max_rows: usize) -> Result<ResultTable> {
        let op = "executor::execute";
        let failed = |e: rusqlite::Error| Error::query_failed(e.to_string(), sql).with_operation(op).set_source(e);

        let mut stmt = self.conn.prepare(sql).map_err(failed)?;
        if !stmt.readonly() {
            return Err(Error::query_rejected("statement is not read-only", sql).with_operation(op));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut table = ResultTable::new(columns);

        let mut rows = stmt.query([]).map_err(failed)?;
        while let Some(row) = rows.next().map_err(failed)? {
            if table.rows.len() == max_rows {
                table.truncated = true;
                break;
            }
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(Cell::from(row.get_ref(i).map_err(failed)?));
            }
            table.rows.push(cells);
        }

        if table.truncated {
            warn!(max_rows, "result truncated");
        }
        debug!(rows = table.rows.len(), columns = width, "query executed");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("t.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE sales_data (StoreID TEXT, TotalRevenue REAL, Note TEXT);
             INSERT INTO sales_data VALUES ('STORE10', 10.5, NULL), ('STORE10', 4.5, 'x'), ('STORE11', 7.0, NULL);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_execute_select() {
        let dir = TempDir::new().unwrap();
        let exec = QueryExecutor::open(fixture(&dir)).unwrap();
        let table = exec
            .execute(
                "SELECT StoreID, SUM(TotalRevenue) AS Revenue, COUNT(*) AS N FROM sales_data GROUP BY StoreID ORDER BY Revenue DESC",
                100,
            )
            .unwrap();
        assert_eq!(table.columns, vec!["StoreID", "Revenue", "N"]);
        assert_eq!(table.rows[0], vec![Cell::Text("STORE10".into()), Cell::Real(15.0), Cell::Integer(2)]);
        assert!(!table.truncated);
    }

    #[test]
    fn test_row_cap() {
        let dir = TempDir::new().unwrap();
        let exec = QueryExecutor::open(fixture(&dir)).unwrap();
        let table = exec.execute("SELECT * FROM sales_data", 2).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(table.truncated);
        assert!(table.rows[0][2].is_null());
    }

    #[test]
    fn test_empty_result_keeps_columns() {
        let dir = TempDir::new().unwrap();
        let exec = QueryExecutor::open(fixture(&dir)).unwrap();
        let table = exec
            .execute("SELECT StoreID, TotalRevenue FROM sales_data WHERE 0", 10)
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_writes_are_refused() {
        let dir = TempDir::new().unwrap();
        let exec = QueryExecutor::open(fixture(&dir)).unwrap();
        let err = exec.execute("DELETE FROM sales_data", 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryRejected);

        let count = exec.execute("SELECT COUNT(*) FROM sales_data", 10).unwrap();
        assert_eq!(count.rows[0][0], Cell::Integer(3));
    }

    #[test]
    fn test_bad_sql_is_query_failed() {
        let dir = TempDir::new().unwrap();
        let exec = QueryExecutor::open(fixture(&dir)).unwrap();
        let err = exec.execute("SELECT Nope FROM sales_data", 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryFailed);
        assert!(err.message().contains("Nope"));
        assert_eq!(err.context_value("sql"), Some("SELECT Nope FROM sales_data"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = QueryExecutor::open(dir.path().join("absent.db")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }
}
