//! Raw CSV file primitives - the only I/O in the crate.
//!
//! Reads and writes are whole-file operations with no handle held between
//! calls. A field is quoted iff it contains the separator, a quote, or a
//! newline; embedded quotes are doubled. The `csv` crate's default
//! `QuoteStyle::Necessary` writer implements exactly that rule, and its reader
//! inverts it, so `read_records(write_records(rows)) == rows` for any field
//! content.

use crate::errors::Result;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;

/// Loads every record from `path`.
///
/// A missing file is not an error: it reads as an empty collection. No header
/// handling happens here; callers decide whether row 0 is a header.
pub fn read_records(path: &Path) -> Result<Vec<StringRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }
    Ok(records)
}

/// Overwrites `path` with the given records.
///
/// Whole-file overwrite is the only write primitive; partial-row updates do
/// not exist in this storage format.
pub fn write_records(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
