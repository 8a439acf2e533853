// src/sink.rs

use anyhow::{Context, Result};
use std::{
    borrow::Cow,
    fs::File,
    io::{self, Write},
    path::Path,
};

use crate::extract::PackageRow;

pub const HEADER: &str = "Package_Name\tDescription\tUpdated_Date";

/// Tab-separated output of accepted rows. The header goes out once, on
/// construction; every record after that is written and flushed as one line.
pub struct TsvSink<W: Write> {
    writer: W,
    records: u64,
}

impl TsvSink<File> {
    /// Create (or truncate) the file at `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("creating output {}", path.display()))?;
        Self::new(file).with_context(|| format!("writing header to {}", path.display()))
    }
}

impl<W: Write> TsvSink<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{HEADER}")?;
        writer.flush()?;
        Ok(Self {
            writer,
            records: 0,
        })
    }

    pub fn append(&mut self, row: &PackageRow) -> io::Result<()> {
        let line = format!(
            "{}\t{}\t{}\n",
            field(&row.name),
            field(&row.description),
            field(&row.updated)
        );
        // one write per line so an interrupted run never leaves half a record
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        self.records += 1;
        Ok(())
    }

    /// Records appended so far, header excluded.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Keep a field on one line and inside one column.
fn field(s: &str) -> Cow<'_, str> {
    if s.contains(['\t', '\n', '\r']) {
        Cow::Owned(s.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(s)
    }
}
