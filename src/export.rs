use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::FetchError;

/// A row type with a fixed CSV header matching its serialized field order.
pub trait CsvRecord: Serialize {
    const HEADER: &'static [&'static str];
}

/// Writes `rows` as CSV. The header line is written even when `rows` is empty.
pub fn write_csv<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<(), FetchError> {
    ensure_parent(path)?;
    let tmp = tmp_path(path);
    if let Err(err) = write_csv_file(&tmp, rows) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

fn write_csv_file<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<(), FetchError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `value` as pretty JSON: a row slice becomes an array.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FetchError> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), bytes = json.len(), "wrote json");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), FetchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// Sibling of `path` with `.tmp` appended, so the rename stays on one filesystem.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("export"));
    name.push(".tmp");
    path.with_file_name(name)
}
