//! Result sinks
//!
//! The downloader hands each page of rows to a [`RowSink`] before requesting the
//! next one. Sinks are format-specific but column-order aware: the ordered keys
//! produced by the definition builder decide the column order, falling back to the
//! (sorted) keys of the first row when none are known.

mod json;
mod ndjson;
mod table;

pub use json::JsonSink;
pub use ndjson::NdjsonSink;
pub use table::TableSink;

use crate::error::Result;
use crate::types::Row;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Destination for downloaded rows, fed one page at a time
pub trait RowSink: Send {
    /// Write one page of rows
    fn render(&mut self, rows: &[Row]) -> Result<()>;

    /// Complete the output after the last page and flush it
    fn finish(&mut self) -> Result<()>;
}

/// Output format selected with `-o/--output`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated columns with an upper-cased header line
    #[default]
    Table,
    /// A single JSON array
    Json,
    /// Newline-delimited JSON, one object per row
    Ndj,
}

/// Boxed writer every sink writes through
pub type Output = Box<dyn Write + Send>;

/// Open `path` for writing (truncating), or stdout when no path is given
pub fn open_output(path: Option<&Path>) -> Result<Output> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            tracing::debug!(path = %path.display(), "writing output to file");
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// Build the sink for `format`; `headers` only affects table output
pub fn create_sink(
    format: OutputFormat,
    columns: Vec<String>,
    headers: bool,
    writer: Output,
) -> Box<dyn RowSink> {
    match format {
        OutputFormat::Table => Box::new(TableSink::new(writer, columns, headers)),
        OutputFormat::Json => Box::new(JsonSink::new(writer, columns)),
        OutputFormat::Ndj => Box::new(NdjsonSink::new(writer, columns)),
    }
}

/// Columns to print: the known ordered keys, else the first row's keys
pub(crate) fn resolve_columns(columns: &mut Vec<String>, rows: &[Row]) {
    if !columns.is_empty() {
        return;
    }
    if let Some(first) = rows.first() {
        columns.extend(first.keys().cloned());
    }
}

/// Serializes a row as a JSON object whose keys follow `columns`.
///
/// Values missing from the row serialize as empty strings. With no columns the row
/// is written in its own key order.
pub(crate) struct OrderedRow<'a> {
    pub row: &'a Row,
    pub columns: &'a [String],
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.columns.is_empty() {
            return self.row.serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            let value = self.row.get(column).map(String::as_str).unwrap_or("");
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
