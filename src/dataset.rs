//! Builds the read-only store that reports query.
//!
//! The report pipeline never writes; this loader is run ahead of time (or by
//! tests) to create the dataset table from an extract on disk.

use std::io::Write;
use std::path::Path;

use duckdb::Connection as DuckDbConnection;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::Result;
use crate::queries::validate_identifier;

/// A writable handle on the dataset file.
pub struct Dataset {
    conn: DuckDbConnection,
}

impl Dataset {
    /// Open (creating if needed) the database file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = DuckDbConnection::open(path)?;
        Ok(Self { conn })
    }

    /// Replace `table` with the contents of a CSV file (header row, types
    /// sniffed), such as the Our World in Data COVID-19 export.
    pub fn import_csv<P: AsRef<Path>>(&self, table: &str, csv_path: P) -> Result<usize> {
        self.replace_table(table, "read_csv_auto", csv_path.as_ref(), "header=true")
    }

    /// Replace `table` with the contents of a newline-delimited JSON file.
    pub fn import_ndjson<P: AsRef<Path>>(&self, table: &str, ndjson_path: P) -> Result<usize> {
        self.replace_table(
            table,
            "read_json_auto",
            ndjson_path.as_ref(),
            "format='newline_delimited'",
        )
    }

    /// Replace `table` with the given JSON objects, one row each.
    ///
    /// Rows are staged through a temporary NDJSON file so DuckDB infers the
    /// column types the same way it does for a file import.
    pub fn import_rows(&self, table: &str, rows: &[serde_json::Value]) -> Result<usize> {
        let mut file = NamedTempFile::new()?;
        for row in rows {
            writeln!(file, "{}", serde_json::to_string(row)?)?;
        }
        file.flush()?;
        // DuckDB copies the data into the table, so the file can go afterwards.
        self.import_ndjson(table, file.path())
    }

    /// Number of rows in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        validate_identifier(table)?;
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count.max(0) as usize)
    }

    /// Flush and close the file so read-only connections can open it.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }

    fn replace_table(
        &self,
        table: &str,
        reader: &str,
        path: &Path,
        options: &str,
    ) -> Result<usize> {
        validate_identifier(table)?;
        let path_fwd = path.to_string_lossy().replace('\\', "/").replace('\'', "''");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM {}('{}', {})",
            table, table, reader, path_fwd, options
        ))?;
        let count = self.row_count(table)?;
        info!(table, rows = count, source = %path.display(), "dataset imported");
        Ok(count)
    }
}
