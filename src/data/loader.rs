// ============================================================
// Layer 4: CSV Loader
// ============================================================
// Reads a CSV file with a header row into a RawTable of
// string cells. No type conversion happens here; that is the
// preprocessor's job.
//
// The reader is `flexible`, so a row with the wrong number of
// fields is still returned. Records the csv crate cannot
// decode at all (e.g. invalid UTF-8) are skipped and counted.
//
// Reference: csv crate documentation (ReaderBuilder, Trim)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs::File, io::Read, path::PathBuf};

use crate::domain::dataset::RawTable;
use crate::domain::traits::TableSource;

/// Loads a single CSV file from disk.
/// Implements the TableSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvLoader {
    fn load_table(&self) -> Result<RawTable> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open CSV file '{}'", self.path.display()))?;

        let table = read_table(file)
            .with_context(|| format!("Cannot parse CSV file '{}'", self.path.display()))?;

        tracing::debug!(
            "Read {} rows x {} columns from '{}'",
            table.row_count(),
            table.headers.len(),
            self.path.display()
        );
        Ok(table)
    }
}

/// Parse CSV text from any reader. Cells are trimmed.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("CSV has no readable header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows    = Vec::new();
    let mut skipped = 0usize;
    for record in rdr.records() {
        match record {
            Ok(rec) => rows.push(rec.iter().map(str::to_string).collect()),
            Err(e) => {
                tracing::debug!("Skipping undecodable CSV record: {e}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        tracing::warn!("Skipped {} undecodable CSV records", skipped);
    }

    Ok(RawTable::new(headers, rows))
}
