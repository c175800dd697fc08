//! Export Adapters
//!
//! Serialises engine export rows for external consumers.

mod csv;

pub use csv::{csv_header, to_csv_line, write_csv, CsvExporter, ExportError};
