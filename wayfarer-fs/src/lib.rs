//! Filesystem helpers built on `cap-std` and `camino`.
//!
//! Every operation opens the parent directory with ambient authority and
//! then works relative to that capability, so callers pass ordinary UTF-8
//! paths while the file access itself stays capability-scoped.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Resolve the directory containing `path` and the file name within it.
///
/// # Errors
///
/// Fails when `path` has no file name or its directory cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} should include a file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Read the whole file at `path`.
///
/// # Errors
///
/// Propagates open and read failures.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read(name.as_str())
}

/// Read the file at `path` as UTF-8 text.
///
/// # Errors
///
/// Propagates open and read failures, including invalid UTF-8.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Read `path` when it exists; `Ok(None)` when it does not.
///
/// # Errors
///
/// Propagates failures other than a missing file or directory.
pub fn read_optional_string(path: &Utf8Path) -> io::Result<Option<String>> {
    match read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Propagates directory creation and write failures.
pub fn write_bytes(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Delete the file at `path`; a missing file is not an error.
///
/// # Errors
///
/// Propagates failures other than the file being absent.
pub fn remove_if_exists(path: &Utf8Path) -> io::Result<()> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    match dir.remove_file(name.as_str()) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Return whether a path exists and is a regular file.
///
/// # Errors
///
/// Propagates failures to open the parent directory.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    Ok(dir
        .metadata(name.as_str())
        .is_ok_and(|meta| meta.is_file()))
}

/// Create any missing directories above `path`.
///
/// The nearest existing ancestor is opened and the remainder created
/// relative to it, so absolute and relative paths behave alike.
///
/// # Errors
///
/// Propagates failures other than a missing ancestor.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    for ancestor in parent.ancestors() {
        let base = if ancestor.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            ancestor
        };
        let dir = match fs_utf8::Dir::open_ambient_dir(base, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        };
        let missing = parent
            .strip_prefix(ancestor)
            .map_err(|_| io::Error::other(format!("{ancestor} is not a prefix of {parent}")))?;
        if missing.as_str().is_empty() {
            return Ok(());
        }
        return dir.create_dir_all(missing);
    }
    Ok(())
}
