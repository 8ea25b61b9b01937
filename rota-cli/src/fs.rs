//! Capability-based access to roster files.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open the roster file at `path` for reading.
pub(crate) fn open_roster_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Whether `path` names a regular file.
///
/// A missing file or directory surfaces as [`io::ErrorKind::NotFound`].
pub(crate) fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "roster path has no file name")
    })?;
    let containing = path
        .parent()
        .filter(|dir_path| !dir_path.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(containing, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}
