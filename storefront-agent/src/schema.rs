//! # Database schema for SQL generation
//!
//! A structured description of the database that is rendered into the
//! prompt: every table with its columns and declared types, followed by a
//! few sample rows so the model sees real value formats (dates, IDs).

use crate::table::Cell;
use rusqlite::Connection;
use storefront_error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub sample_rows: Vec<Vec<String>>,
}

/// Everything the model needs to know about the database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseSchema {
    pub tables: Vec<TableInfo>,
}

impl DatabaseSchema {
    /// Read table definitions and `sample_rows` rows per table.
    pub fn introspect(conn: &Connection, sample_rows: usize) -> Result<Self> {
        let op = "schema::introspect";
        let sqlite = |e: rusqlite::Error| Error::database_failed(e.to_string()).with_operation(op).set_source(e);

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .map_err(sqlite)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(sqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sqlite)?;

        if names.is_empty() {
            return Err(Error::table_missing("any").with_operation(op));
        }

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let quoted = quote_ident(&name);

            let mut stmt = conn
                .prepare(&format!("PRAGMA table_info({})", quoted))
                .map_err(sqlite)?;
            let columns = stmt
                .query_map([], |row| {
                    Ok(ColumnInfo {
                        name: row.get(1)?,
                        decl_type: row.get(2)?,
                        primary_key: row.get::<_, i64>(5)? > 0,
                    })
                })
                .map_err(sqlite)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sqlite)?;

            let mut sample = Vec::new();
            if sample_rows > 0 {
                let mut stmt = conn
                    .prepare(&format!("SELECT * FROM {} LIMIT {}", quoted, sample_rows))
                    .map_err(sqlite)?;
                let width = stmt.column_count();
                let mut rows = stmt.query([]).map_err(sqlite)?;
                while let Some(row) = rows.next().map_err(sqlite)? {
                    let mut values = Vec::with_capacity(width);
                    for i in 0..width {
                        values.push(Cell::from(row.get_ref(i).map_err(sqlite)?).to_string());
                    }
                    sample.push(values);
                }
            }

            tables.push(TableInfo {
                name,
                columns,
                sample_rows: sample,
            });
        }

        Ok(Self { tables })
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Render as a prompt-friendly string for the LLM
    pub fn to_prompt(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&format!("CREATE TABLE {} (\n", table.name));
            for (i, col) in table.columns.iter().enumerate() {
                out.push_str(&format!("    {} {}", col.name, col.decl_type));
                if col.primary_key {
                    out.push_str(" PRIMARY KEY");
                }
                if i + 1 < table.columns.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(")\n");

            if !table.sample_rows.is_empty() {
                out.push_str(&format!("/* {} sample rows from {}:\n", table.sample_rows.len(), table.name));
                let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
                out.push_str(&header.join("\t"));
                out.push('\n');
                for row in &table.sample_rows {
                    out.push_str(&row.join("\t"));
                    out.push('\n');
                }
                out.push_str("*/\n");
            }
            out.push('\n');
        }
        out
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_error::ErrorKind;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE stores (StoreID TEXT PRIMARY KEY, StoreLocation TEXT, Region TEXT);
             INSERT INTO stores VALUES ('STORE10', 'Omaha', 'Midwest'), ('STORE11', 'Austin', 'South'), ('STORE12', 'Boston', 'Northeast');
             CREATE TABLE products (ProductID TEXT PRIMARY KEY, Price REAL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_introspect_tables_and_samples() {
        let schema = DatabaseSchema::introspect(&fixture(), 2).unwrap();
        assert_eq!(schema.tables.len(), 2);

        let stores = schema.table("STORES").unwrap();
        assert_eq!(stores.columns.len(), 3);
        assert!(stores.columns[0].primary_key);
        assert_eq!(stores.sample_rows.len(), 2);
        assert_eq!(stores.sample_rows[0][1], "Omaha");

        assert!(schema.table("products").unwrap().sample_rows.is_empty());
    }

    #[test]
    fn test_prompt_rendering() {
        let prompt = DatabaseSchema::introspect(&fixture(), 1).unwrap().to_prompt();
        assert!(prompt.contains("CREATE TABLE stores ("));
        assert!(prompt.contains("    StoreID TEXT PRIMARY KEY,"));
        assert!(prompt.contains("STORE10\tOmaha\tMidwest"));
        assert!(!prompt.contains("STORE11"));
    }

    #[test]
    fn test_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        let err = DatabaseSchema::introspect(&conn, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TableMissing);
    }
}
