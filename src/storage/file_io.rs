//! JSON store files
//!
//! Every repository keeps one JSON document on disk. Writes go to a sibling
//! temp file that is synced and renamed over the original, so a store file
//! is either the old document or the new one.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::LedgerError;

fn store_error(action: &str, path: &Path, e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// Read a store file; a missing or zero-length file reads as `T::default()`
pub fn read_json<T, P>(path: P) -> Result<T, LedgerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(store_error("open", path, e)),
    };

    let is_empty = file
        .metadata()
        .map(|m| m.len() == 0)
        .map_err(|e| store_error("inspect", path, e))?;
    if is_empty {
        return Ok(T::default());
    }

    serde_json::from_reader(BufReader::new(file)).map_err(|e| store_error("parse", path, e))
}

/// Replace a store file with `data`, never leaving a partial document behind
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), LedgerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| store_error("create directory", parent, e))?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let written = (|| {
        let mut writer = BufWriter::new(
            File::create(&temp_path).map_err(|e| store_error("create", &temp_path, e))?,
        );
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| store_error("serialize", path, e))?;
        writer.flush().map_err(|e| store_error("flush", &temp_path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| store_error("sync", &temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| store_error("replace", path, e))
    })();

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written?;

    debug!(path = %path.display(), "wrote store file");
    Ok(())
}
