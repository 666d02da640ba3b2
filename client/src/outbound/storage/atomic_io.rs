//! Atomic replacement of the durable store file.
//!
//! Contents are written to a hidden sibling file, synced, and renamed over
//! the target so a crash never leaves a half-written store behind.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::StorageError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` inside `dir` with `contents`.
pub(crate) fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> Result<(), StorageError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    write_temp_file(dir, &tmp_name, contents).map_err(|err| {
        discard(dir, &tmp_name);
        StorageError::write(format!("{tmp_name}: {err}"))
    })?;
    rename_over(dir, &tmp_name, file_name).map_err(|err| {
        discard(dir, &tmp_name);
        StorageError::write(format!("{file_name}: {err}"))
    })?;
    sync_directory(dir);
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(windows)]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn discard(dir: &Dir, tmp_name: &str) {
    if dir.remove_file(tmp_name).is_err() {
        // The temp file may never have been created.
    }
}

fn sync_directory(dir: &Dir) {
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        // Directory sync is best effort.
    }
}
