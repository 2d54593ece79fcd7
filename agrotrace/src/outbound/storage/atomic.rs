//! Temp-file plus rename writes inside a capability directory.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` in `dir` with `contents` so readers never observe a
/// partial value.
///
/// `file_name` must already be a single validated path component.
pub(super) fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> io::Result<()> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    write_temp(dir, &tmp_name, contents)?;
    if let Err(err) = replace(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    // Directory sync is best effort.
    drop(dir.open(".").and_then(|parent| parent.sync_all()));
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    if written.is_err() {
        drop(file);
        drop(dir.remove_file(tmp_name));
    }
    written
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target)
}
