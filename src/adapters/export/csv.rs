//! CSV Export
//!
//! Writes engine export rows as `timestamp,price,zscore` (single mode) or
//! `timestamp,spread,zscore` (pairs mode). Missing z-scores are empty cells.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use thiserror::Error;

use crate::domain::Mode;
use crate::strategy::ExportRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Header line for a mode
pub fn csv_header(mode: Mode) -> &'static str {
    match mode {
        Mode::Single => "timestamp,price,zscore",
        Mode::Pairs => "timestamp,spread,zscore",
    }
}

/// One CSV line, without the trailing newline
pub fn to_csv_line(row: &ExportRow) -> String {
    let z = row.z_score.map(|z| z.to_string()).unwrap_or_default();
    format!(
        "{},{},{}",
        row.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        row.value,
        z
    )
}

/// Write header and rows to any writer
pub fn write_csv<W: Write>(mut writer: W, mode: Mode, rows: &[ExportRow]) -> Result<(), ExportError> {
    writeln!(writer, "{}", csv_header(mode))?;
    for row in rows {
        writeln!(writer, "{}", to_csv_line(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// File exporter; each export replaces the file
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all rows, creating parent directories. Returns the row count.
    pub fn export(&self, mode: Mode, rows: &[ExportRow]) -> Result<usize, ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        write_csv(BufWriter::new(file), mode, rows)?;

        tracing::info!(path = %self.path.display(), rows = rows.len(), "exported CSV");
        Ok(rows.len())
    }
}
