//! Writing comma-separated output files.
//!
//! Every output is rewritten in full. An existing file is first moved aside
//! to `<name>.sav`, or `<name>.savN` with the lowest free N.

use crate::error::{Result, WlkError};
use csv::{Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Path the existing file would be moved to
pub fn backup_path(path: &Path) -> PathBuf {
    let base = path.as_os_str().to_os_string();

    let mut candidate = base.clone();
    candidate.push(".sav");
    let mut n = 1;
    while Path::new(&candidate).exists() {
        candidate = base.clone();
        candidate.push(format!(".sav{}", n));
        n += 1;
    }
    PathBuf::from(candidate)
}

/// Move `path` out of the way if it exists
pub fn backup_existing(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let target = backup_path(path);
    fs::rename(path, &target)?;
    info!("Saved {} as {}", path.display(), target.display());
    Ok(Some(target))
}

/// Serialize rows to `writer`, one line each, `\n` terminated
pub fn write_rows<W, I>(writer: W, rows: I, path: &Path) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut csv = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut count = 0;
    for row in rows {
        csv.write_record(&row).map_err(|source| WlkError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        count += 1;
    }
    csv.flush()?;
    Ok(count)
}

/// Back up any existing file at `path`, then write `rows` to it
pub fn write_file<I>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    backup_existing(path)?;

    let file = BufWriter::new(File::create(path)?);
    let count = write_rows(file, rows, path)?;
    debug!("Wrote {} rows to {}", count, path.display());
    Ok(count)
}
