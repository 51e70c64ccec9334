//! Filesystem utilities for code generation

use std::fs;
use std::io;
use std::path::Path;

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Write content only when it differs from what is on disk.
///
/// Returns whether the file was written. Keeps modification times stable for
/// regenerated units that did not change.
pub fn write_if_changed<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<bool> {
    let path = path.as_ref();
    let contents = contents.as_ref();

    match fs::read(path) {
        Ok(existing) if existing == contents => Ok(false),
        Ok(_) => write_file(path, contents).map(|_| true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => write_file(path, contents).map(|_| true),
        Err(e) => Err(e),
    }
}
