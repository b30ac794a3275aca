//! CSV sink.
//!
//! RULE: The header row always comes from `TabularRecord::FIELDS`, so an
//! empty batch still produces a header-only file.

use crate::{error::GenResult, record::TabularRecord};
use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default buffer size for CSV writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Write `records` to `path` as UTF-8, comma-delimited, `\n`-terminated CSV.
///
/// Parent directories are created as needed. Rows are written as they are
/// pulled from the iterator; a failure part-way leaves the rows written so
/// far on disk. Returns the number of data rows written.
pub fn write_csv<R, I>(records: I, path: impl AsRef<Path>) -> GenResult<u64>
where
    R: TabularRecord,
    I: IntoIterator<Item = R>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
        log::debug!("ensured output directory {}", parent.display());
    }

    let file = File::create(path)?;
    let rows = write_records(records, BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file))?;
    log::info!("wrote {rows} rows to {}", path.display());
    Ok(rows)
}

/// Write header and rows to any writer.
pub fn write_records<R, I, W>(records: I, out: W) -> GenResult<u64>
where
    R: TabularRecord,
    I: IntoIterator<Item = R>,
    W: Write,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(R::FIELDS)?;
    let mut rows = 0u64;
    for record in records {
        writer.serialize(&record)?;
        rows += 1;
        if rows % 10_000 == 0 {
            log::debug!("written {rows} rows");
        }
    }
    writer.flush()?;
    Ok(rows)
}
