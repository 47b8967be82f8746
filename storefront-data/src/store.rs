//! SQLite persistence for the retail tables.
//!
//! A dataset is written in a single transaction: the five tables are
//! dropped, recreated, and filled dimensions-first. Any failure rolls the
//! whole write back.

use crate::model::{Catalog, Dataset, Product, Sale, Store};
use crate::{DATE_FORMAT, TIMESTAMP_FORMAT};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use storefront_error::{Error, ErrorKind, Result};
use tracing::{debug, info};

/// Table names in dependency order (dimensions first)
pub const TABLES: [&str; 5] = ["stores", "products", "inventory", "sales_data", "customer_feedback"];

const DROP_SQL: &str = "
DROP TABLE IF EXISTS customer_feedback;
DROP TABLE IF EXISTS sales_data;
DROP TABLE IF EXISTS inventory;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS stores;
";

const SCHEMA_SQL: &str = "
CREATE TABLE stores (
    StoreID TEXT PRIMARY KEY,
    StoreLocation TEXT NOT NULL,
    Region TEXT NOT NULL
);
CREATE TABLE products (
    ProductID TEXT PRIMARY KEY,
    ProductName TEXT NOT NULL UNIQUE,
    Category TEXT NOT NULL,
    Price REAL NOT NULL
);
CREATE TABLE inventory (
    StoreID TEXT NOT NULL REFERENCES stores(StoreID),
    ProductID TEXT NOT NULL REFERENCES products(ProductID),
    StockLevel INTEGER NOT NULL CHECK (StockLevel >= 0),
    LastRestockDate TEXT NOT NULL,
    PRIMARY KEY (StoreID, ProductID)
);
CREATE TABLE sales_data (
    TransactionID TEXT PRIMARY KEY,
    Date TEXT NOT NULL,
    StoreID TEXT NOT NULL REFERENCES stores(StoreID),
    ProductID TEXT NOT NULL REFERENCES products(ProductID),
    ProductName TEXT NOT NULL,
    UnitsSold INTEGER NOT NULL,
    Price REAL NOT NULL,
    TotalRevenue REAL NOT NULL
);
CREATE TABLE customer_feedback (
    FeedbackID TEXT PRIMARY KEY,
    Date TEXT NOT NULL,
    StoreID TEXT NOT NULL REFERENCES stores(StoreID),
    Comment TEXT NOT NULL,
    Sentiment REAL NOT NULL,
    Polarity TEXT NOT NULL
);
";

const INSERT_SALE: &str = "INSERT INTO sales_data
    (TransactionID, Date, StoreID, ProductID, ProductName, UnitsSold, Price, TotalRevenue)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Outcome of a dataset write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub rows: [(&'static str, usize); 5],
    pub total_revenue: f64,
}

impl WriteSummary {
    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(|(_, n)| n).sum()
    }
}

/// Wrap a rusqlite error as `DatabaseFailed` for the given operation.
pub(crate) fn sqlite_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Error {
    move |err| {
        Error::database_failed(err.to_string())
            .with_operation(operation)
            .set_source(err)
    }
}

/// Create (or replace) the database at `path` and write `dataset` into it.
///
/// Parent directories are created if absent.
pub fn create_database(path: impl AsRef<Path>, dataset: &Dataset) -> Result<WriteSummary> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::from(e)
                .with_operation("store::create_database")
                .with_context("path", parent.display().to_string())
        })?;
    }

    let mut conn = Connection::open(path).map_err(|e| {
        sqlite_error("store::create_database")(e).with_context("path", path.display().to_string())
    })?;
    let summary = write_dataset(&mut conn, dataset)?;
    info!(
        path = %path.display(),
        rows = summary.total_rows(),
        revenue = summary.total_revenue,
        "database written"
    );
    Ok(summary)
}

/// Replace the five tables on `conn` with the contents of `dataset`.
pub fn write_dataset(conn: &mut Connection, dataset: &Dataset) -> Result<WriteSummary> {
    dataset.verify_integrity()?;

    let op = "store::write_dataset";
    let tx = conn.transaction().map_err(sqlite_error(op))?;
    tx.execute_batch(DROP_SQL).map_err(sqlite_error(op))?;
    tx.execute_batch(SCHEMA_SQL).map_err(sqlite_error(op))?;

    {
        let mut stmt = tx
            .prepare("INSERT INTO stores (StoreID, StoreLocation, Region) VALUES (?1, ?2, ?3)")
            .map_err(sqlite_error(op))?;
        for s in &dataset.stores {
            stmt.execute(params![s.id, s.location, s.region])
                .map_err(sqlite_error(op))?;
        }

        let mut stmt = tx
            .prepare("INSERT INTO products (ProductID, ProductName, Category, Price) VALUES (?1, ?2, ?3, ?4)")
            .map_err(sqlite_error(op))?;
        for p in &dataset.products {
            stmt.execute(params![p.id, p.name, p.category, p.price])
                .map_err(sqlite_error(op))?;
        }
        debug!(stores = dataset.stores.len(), products = dataset.products.len(), "dimensions inserted");

        let mut stmt = tx
            .prepare(
                "INSERT INTO inventory (StoreID, ProductID, StockLevel, LastRestockDate) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(sqlite_error(op))?;
        for row in &dataset.inventory {
            stmt.execute(params![
                row.store_id,
                row.product_id,
                row.stock_level,
                row.last_restock.format(DATE_FORMAT).to_string()
            ])
            .map_err(sqlite_error(op))?;
        }

        let mut stmt = tx.prepare(INSERT_SALE).map_err(sqlite_error(op))?;
        for sale in &dataset.sales {
            execute_sale(&mut stmt, sale).map_err(sqlite_error(op))?;
        }

        let mut stmt = tx
            .prepare(
                "INSERT INTO customer_feedback (FeedbackID, Date, StoreID, Comment, Sentiment, Polarity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(sqlite_error(op))?;
        for f in &dataset.feedback {
            stmt.execute(params![
                f.feedback_id,
                f.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                f.store_id,
                f.comment,
                f.sentiment,
                f.polarity.as_str()
            ])
            .map_err(sqlite_error(op))?;
        }
        debug!(
            inventory = dataset.inventory.len(),
            sales = dataset.sales.len(),
            feedback = dataset.feedback.len(),
            "facts inserted"
        );
    }

    tx.commit().map_err(sqlite_error(op))?;

    Ok(WriteSummary {
        rows: dataset.row_counts(),
        total_revenue: dataset.total_revenue(),
    })
}

fn execute_sale(stmt: &mut rusqlite::Statement<'_>, sale: &Sale) -> rusqlite::Result<usize> {
    stmt.execute(params![
        sale.transaction_id,
        sale.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        sale.store_id,
        sale.product_id,
        sale.product_name,
        sale.units_sold,
        sale.price,
        sale.total_revenue
    ])
}

/// Append one sale to an existing `sales_data` table.
pub fn insert_sale(conn: &Connection, sale: &Sale) -> Result<()> {
    let op = "store::insert_sale";
    let mut stmt = conn.prepare_cached(INSERT_SALE).map_err(sqlite_error(op))?;
    execute_sale(&mut stmt, sale).map_err(|e| {
        sqlite_error(op)(e).with_context("transaction_id", sale.transaction_id.clone())
    })?;
    Ok(())
}

/// Open an existing database read-write without creating it.
pub fn open_existing(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::new(
            ErrorKind::FileNotFound,
            format!("database '{}' does not exist; run storefront-gen first", path.display()),
        )
        .with_operation("store::open_existing"));
    }
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| sqlite_error("store::open_existing")(e).with_context("path", path.display().to_string()))
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(sqlite_error("store::table_exists"))?;
    Ok(count > 0)
}

/// Load the dimension rows needed to append new sales.
pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let op = "store::load_catalog";
    for table in ["stores", "products", "sales_data"] {
        if !table_exists(conn, table)? {
            return Err(Error::table_missing(table).with_operation(op));
        }
    }

    let mut stmt = conn
        .prepare("SELECT StoreID, StoreLocation, Region FROM stores ORDER BY StoreID")
        .map_err(sqlite_error(op))?;
    let stores = stmt
        .query_map([], |row| {
            Ok(Store {
                id: row.get(0)?,
                location: row.get(1)?,
                region: row.get(2)?,
            })
        })
        .map_err(sqlite_error(op))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_error(op))?;

    let mut stmt = conn
        .prepare("SELECT ProductID, ProductName, Category, Price FROM products ORDER BY ProductID")
        .map_err(sqlite_error(op))?;
    let products = stmt
        .query_map([], |row| {
            Ok(Product {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                price: row.get(3)?,
            })
        })
        .map_err(sqlite_error(op))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_error(op))?;

    let catalog = Catalog { stores, products };
    if catalog.is_empty() {
        return Err(Error::database_failed(format!(
            "catalog is empty ({} stores, {} products)",
            catalog.stores.len(),
            catalog.products.len()
        ))
        .with_operation(op));
    }
    debug!(stores = catalog.stores.len(), products = catalog.products.len(), "catalog loaded");
    Ok(catalog)
}

/// Row count of each retail table present in the database.
pub fn table_counts(conn: &Connection) -> Result<Vec<(String, u64)>> {
    let op = "store::table_counts";
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        if !table_exists(conn, table)? {
            continue;
        }
        let n: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| row.get(0))
            .map_err(sqlite_error(op))?;
        counts.push((table.to_string(), u64::try_from(n).unwrap_or(0)));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            stores: 3,
            products: 8,
            sales: 120,
            feedback: 30,
            seed: Some(seed),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        }
    }

    fn sales_rows(conn: &Connection) -> Vec<(String, String, String, i64, f64)> {
        let mut stmt = conn
            .prepare("SELECT TransactionID, Date, ProductID, UnitsSold, TotalRevenue FROM sales_data ORDER BY TransactionID")
            .unwrap();
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_create_database_writes_all_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/store.db");
        let dataset = Dataset::generate(&config(1)).unwrap();

        let summary = create_database(&path, &dataset).unwrap();
        assert_eq!(summary.total_rows(), 3 + 8 + 24 + 120 + 30);

        let conn = Connection::open(&path).unwrap();
        let counts = table_counts(&conn).unwrap();
        assert_eq!(
            counts,
            vec![
                ("stores".to_string(), 3),
                ("products".to_string(), 8),
                ("inventory".to_string(), 24),
                ("sales_data".to_string(), 120),
                ("customer_feedback".to_string(), 30),
            ]
        );
    }

    #[test]
    fn test_rewrite_replaces_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        create_database(&path, &Dataset::generate(&config(1)).unwrap()).unwrap();

        let smaller = GeneratorConfig {
            sales: 10,
            ..config(2)
        };
        create_database(&path, &Dataset::generate(&smaller).unwrap()).unwrap();

        let conn = Connection::open(&path).unwrap();
        let counts = table_counts(&conn).unwrap();
        assert_eq!(counts[3], ("sales_data".to_string(), 10));
    }

    #[test]
    fn test_same_seed_same_rows() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.db");
        let b = dir.path().join("b.db");
        create_database(&a, &Dataset::generate(&config(5)).unwrap()).unwrap();
        create_database(&b, &Dataset::generate(&config(5)).unwrap()).unwrap();

        let rows_a = sales_rows(&Connection::open(&a).unwrap());
        let rows_b = sales_rows(&Connection::open(&b).unwrap());
        assert_eq!(rows_a.len(), 120);
        assert_eq!(rows_a, rows_b);
    }

    #[test]
    fn test_dates_are_sqlite_friendly() {
        let mut conn = Connection::open_in_memory().unwrap();
        write_dataset(&mut conn, &Dataset::generate(&config(3)).unwrap()).unwrap();

        let bad: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sales_data WHERE DATE(Date) IS NULL OR DATE(Date) < '2023-11-02' OR DATE(Date) > '2024-01-31'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(bad, 0);

        let restock: String = conn
            .query_row("SELECT LastRestockDate FROM inventory LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(restock.len(), 10);
    }

    #[test]
    fn test_integrity_violation_leaves_database_untouched() {
        let mut conn = Connection::open_in_memory().unwrap();
        write_dataset(&mut conn, &Dataset::generate(&config(1)).unwrap()).unwrap();

        let mut broken = Dataset::generate(&config(2)).unwrap();
        broken.feedback[0].store_id = "STORE99".into();
        let err = write_dataset(&mut conn, &broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IntegrityViolation);

        let counts = table_counts(&conn).unwrap();
        assert_eq!(counts[3], ("sales_data".to_string(), 120));
    }

    #[test]
    fn test_load_catalog_and_append_sale() {
        let mut conn = Connection::open_in_memory().unwrap();
        let dataset = Dataset::generate(&config(4)).unwrap();
        write_dataset(&mut conn, &dataset).unwrap();

        let catalog = load_catalog(&conn).unwrap();
        assert_eq!(catalog.stores.len(), 3);
        assert_eq!(catalog.products.len(), 8);

        let mut sale = dataset.sales[0].clone();
        sale.transaction_id = "live-1".into();
        insert_sale(&conn, &sale).unwrap();
        assert_eq!(table_counts(&conn).unwrap()[3].1, 121);

        let err = insert_sale(&conn, &sale).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseFailed);
        assert_eq!(err.context_value("transaction_id"), Some("live-1"));
    }

    #[test]
    fn test_load_catalog_requires_tables() {
        let conn = Connection::open_in_memory().unwrap();
        let err = load_catalog(&conn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TableMissing);
        assert_eq!(err.context_value("table"), Some("stores"));
    }

    #[test]
    fn test_open_existing_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = open_existing(dir.path().join("nope.db")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }
}
