use super::{OrderedRow, Output, RowSink, resolve_columns};
use crate::error::Result;
use crate::types::Row;
use std::io::Write;

/// Streams every page into one JSON array
///
/// The opening bracket is written with the first row, so memory use stays bounded
/// by a single page.
pub struct JsonSink {
    writer: Output,
    columns: Vec<String>,
    rows_written: u64,
}

impl JsonSink {
    /// Rows are keyed in `columns` order when given
    pub fn new(writer: Output, columns: Vec<String>) -> Self {
        Self {
            writer,
            columns,
            rows_written: 0,
        }
    }
}

impl RowSink for JsonSink {
    fn render(&mut self, rows: &[Row]) -> Result<()> {
        resolve_columns(&mut self.columns, rows);
        for row in rows {
            let separator = if self.rows_written == 0 { "[\n  " } else { ",\n  " };
            self.writer.write_all(separator.as_bytes())?;
            serde_json::to_writer(
                &mut self.writer,
                &OrderedRow {
                    row,
                    columns: &self.columns,
                },
            )?;
            self.rows_written += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.rows_written == 0 {
            self.writer.write_all(b"[]\n")?;
        } else {
            self.writer.write_all(b"\n]\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
