use super::{Output, RowSink, resolve_columns};
use crate::error::Result;
use crate::types::Row;
use std::borrow::Cow;
use std::io::Write;

/// Tab-separated rows under a single upper-cased header line
pub struct TableSink {
    writer: Output,
    columns: Vec<String>,
    headers: bool,
    header_written: bool,
}

impl TableSink {
    /// `columns` may be empty, in which case the first page decides them
    pub fn new(writer: Output, columns: Vec<String>, headers: bool) -> Self {
        Self {
            writer,
            columns,
            headers,
            header_written: false,
        }
    }

    fn write_header(&mut self) -> Result<()> {
        let header: Vec<String> = self.columns.iter().map(|c| c.to_uppercase()).collect();
        writeln!(self.writer, "{}", header.join("\t"))?;
        self.header_written = true;
        Ok(())
    }
}

impl RowSink for TableSink {
    fn render(&mut self, rows: &[Row]) -> Result<()> {
        resolve_columns(&mut self.columns, rows);
        if self.headers && !self.header_written && !self.columns.is_empty() {
            self.write_header()?;
        }

        for row in rows {
            let cells: Vec<Cow<'_, str>> = self
                .columns
                .iter()
                .map(|c| row.get(c).map_or(Cow::Borrowed(""), |v| cell(v)))
                .collect();
            writeln!(self.writer, "{}", cells.join("\t"))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        // an export without rows still prints its header when columns are known
        if self.headers && !self.header_written && !self.columns.is_empty() {
            self.write_header()?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Tabs and line breaks would break the column layout; they are written as the
/// escapes `\t`, `\r` and `\n`
fn cell(value: &str) -> Cow<'_, str> {
    if !value.contains(['\t', '\r', '\n']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
