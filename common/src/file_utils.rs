//! File utility functions for listing input images and replacing files atomically.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Image file extensions the decoder understands.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

/// Returns paths to all files in a directory matching the given extensions, sorted by path.
/// Extensions are matched case-insensitively. A missing directory yields an empty list.
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        if extensions.contains(&ext.as_str()) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Returns paths to all decodable image files in the given directory.
pub fn image_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    files_with_extensions(dir, IMAGE_EXTENSIONS)
}

/// Replaces `path` with `contents` without ever exposing a partially written file.
///
/// The data goes to a uniquely named temporary file in the same directory, is
/// flushed to disk and then renamed over the destination. Concurrent writers to
/// the same path never share a temporary file; the last rename wins.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
