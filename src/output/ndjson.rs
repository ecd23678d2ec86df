use super::{OrderedRow, Output, RowSink, resolve_columns};
use crate::error::Result;
use crate::types::Row;
use std::io::Write;

/// One compact JSON object per line
pub struct NdjsonSink {
    writer: Output,
    columns: Vec<String>,
}

impl NdjsonSink {
    /// Rows are keyed in `columns` order when given
    pub fn new(writer: Output, columns: Vec<String>) -> Self {
        Self { writer, columns }
    }
}

impl RowSink for NdjsonSink {
    fn render(&mut self, rows: &[Row]) -> Result<()> {
        resolve_columns(&mut self.columns, rows);
        for row in rows {
            serde_json::to_writer(
                &mut self.writer,
                &OrderedRow {
                    row,
                    columns: &self.columns,
                },
            )?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
