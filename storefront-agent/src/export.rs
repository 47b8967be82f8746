//! CSV export.
//!
//! Artifacts are written to a temporary file in the destination directory
//! and renamed over the target once complete, so readers never see a
//! partial file and a failed write leaves nothing behind.

use crate::table::ResultTable;
use std::path::Path;
use storefront_error::{Error, Result};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `table` as CSV with a header row.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    let op = "export::write_csv";
    let mut tmp = staging_file(path, op)?;

    let csv_err = |e: csv::Error| {
        Error::export_failed(e.to_string())
            .with_operation(op)
            .with_context("path", path.display().to_string())
            .set_source(e)
    };
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(&table.columns).map_err(csv_err)?;
        for row in &table.rows {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|e| Error::from(e).with_operation(op))?;
    }

    commit(tmp, path, op, |msg| Error::export_failed(msg))?;
    debug!(path = %path.display(), rows = table.row_count(), "csv written");
    Ok(())
}

/// Empty temporary file in the directory that will hold `path`.
pub(crate) fn staging_file(path: &Path, op: &'static str) -> Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| Error::from(e).with_operation(op))?;
    tempfile::Builder::new()
        .prefix(".storefront-")
        .tempfile_in(dir)
        .map_err(|e| Error::from(e).with_operation(op))
}

/// Rename a finished staging file over `path`.
pub(crate) fn commit(
    tmp: NamedTempFile,
    path: &Path,
    op: &'static str,
    kind: fn(String) -> Error,
) -> Result<()> {
    tmp.persist(path).map_err(|e| {
        kind(format!("failed to move {} into place: {}", path.display(), e.error))
            .with_operation(op)
            .with_context("path", path.display().to_string())
            .set_source(e.error)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use tempfile::TempDir;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/result.csv");
        let table = ResultTable {
            columns: vec!["ProductName".into(), "Revenue".into()],
            rows: vec![
                vec![Cell::Text("Mainstays-Vacuum, Deluxe".into()), Cell::Real(1250.5)],
                vec![Cell::Text("Equate-Shampoo".into()), Cell::Null],
            ],
            truncated: false,
        };

        write_csv(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "ProductName,Revenue\n\"Mainstays-Vacuum, Deluxe\",1250.5\nEquate-Shampoo,\n"
        );
        assert_eq!(dir_entries(&dir.path().join("out")), vec!["result.csv"]);
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.csv");
        let table = ResultTable::new(vec!["Date".into(), "Revenue".into()]);
        write_csv(&table, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Date,Revenue\n");
    }

    #[test]
    fn test_failed_commit_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.csv");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let table = ResultTable::new(vec!["Date".into()]);
        let err = write_csv(&table, &path).unwrap_err();
        assert_eq!(err.kind(), storefront_error::ErrorKind::ExportFailed);
        assert_eq!(dir_entries(dir.path()), vec!["result.csv"]);
    }
}
