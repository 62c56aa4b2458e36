use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec::{decode, encode};
use crate::errors::{Result, StorageError};
use crate::model::{Schedule, CONFIG_FILE_NAME};

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Reads and decodes `_a3em.cfg` from `dir`. The result is not validated.
pub fn read_config(dir: &Path) -> Result<Schedule> {
    let path = config_path(dir);
    let text = fs::read_to_string(&path).map_err(|source| StorageError::Read {
        path: path.clone(),
        source,
    })?;
    let schedule = decode(&text)?;
    info!(path = %path.display(), phases = schedule.phases().len(), "read device configuration");
    Ok(schedule)
}

/// Validates and encodes `schedule`, then replaces `_a3em.cfg` in `dir`.
///
/// The text goes to a temporary file in the same directory first and is renamed over the
/// configuration file once flushed, so readers see either the old file or the complete new one.
pub fn write_config(dir: &Path, schedule: &Schedule) -> Result<PathBuf> {
    let text = encode(schedule)?;
    let path = config_path(dir);
    let staging = dir.join(format!(".{CONFIG_FILE_NAME}.tmp"));

    if let Err(err) = write_staging(&staging, &text) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    debug!(path = %staging.display(), bytes = text.len(), "staged device configuration");

    if let Err(source) = fs::rename(&staging, &path) {
        let _ = fs::remove_file(&staging);
        return Err(StorageError::Persist { path, source }.into());
    }
    info!(path = %path.display(), "wrote device configuration");
    Ok(path)
}

fn write_staging(staging: &Path, text: &str) -> std::result::Result<(), StorageError> {
    let to_error = |source| StorageError::Write {
        path: staging.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(staging).map_err(to_error)?;
    file.write_all(text.as_bytes()).map_err(to_error)?;
    file.sync_all().map_err(to_error)
}
