//! Delimited-text writer backed by the `csv` crate

use crate::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `rows` to `writer`, one record per row
///
/// Rows may have different lengths. Fields are quoted only when needed.
pub fn write_rows<W, R, S>(writer: W, delimiter: u8, rows: &[R]) -> Result<()>
where
    W: Write,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut csv_writer = WriterBuilder::new()
        .flexible(true)
        .delimiter(delimiter)
        .from_writer(writer);

    for row in rows {
        csv_writer.write_record(row.as_ref().iter().map(|field| field.as_ref()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes `rows` as comma-separated values
pub fn write_csv<R, S>(path: &Path, rows: &[R]) -> Result<()>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let file = File::create(path)?;
    write_rows(file, b',', rows)?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
