use std::{
    fs,
    os::unix,
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "create",
            source: err,
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Removes the specified file, symlink or directory, ignoring paths that don't exist.
///
/// Symlinks are removed themselves, never their targets.
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(());
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|err| FileSystemError::File {
        path: path.to_path_buf(),
        action: "remove",
        source: err,
    })
}

/// Copies the tree below `source` over `target`, replacing files that already exist.
///
/// Directories are created as needed and existing target entries not present in `source`
/// are left alone, so the result is an overlay of `source` on top of `target`. Symlinks are
/// recreated as symlinks (dangling ones included) and never followed inside `source`.
/// Returns the relative paths of the files and links that were written.
pub fn overlay_dir<S: AsRef<Path>, T: AsRef<Path>>(
    source: S,
    target: T,
) -> FileSystemResult<Vec<PathBuf>> {
    let source = source.as_ref();
    let target = target.as_ref();

    if !source.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: source.to_path_buf(),
        });
    }

    let mut written = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
        let dir = source.join(&relative);
        ensure_dir_exists(target.join(&relative))?;

        let entries = fs::read_dir(&dir).map_err(|err| FileSystemError::Directory {
            path: dir.clone(),
            action: "read",
            source: err,
        })?;

        for entry in entries {
            let entry = entry.map_err(|err| FileSystemError::Directory {
                path: dir.clone(),
                action: "read",
                source: err,
            })?;
            let entry_relative = relative.join(entry.file_name());
            let entry_path = entry.path();
            let file_type = entry.file_type().map_err(|err| FileSystemError::File {
                path: entry_path.clone(),
                action: "inspect",
                source: err,
            })?;

            if file_type.is_dir() {
                pending.push(entry_relative);
                continue;
            }

            let destination = target.join(&entry_relative);
            if file_type.is_symlink() {
                let link = fs::read_link(&entry_path).map_err(|err| FileSystemError::File {
                    path: entry_path.clone(),
                    action: "read link",
                    source: err,
                })?;
                safe_remove(&destination)?;
                unix::fs::symlink(&link, &destination).map_err(|err| FileSystemError::File {
                    path: destination.clone(),
                    action: "symlink",
                    source: err,
                })?;
            } else {
                // A link or directory at the destination is replaced, not written through.
                if fs::symlink_metadata(&destination)
                    .is_ok_and(|meta| meta.is_dir() || meta.file_type().is_symlink())
                {
                    safe_remove(&destination)?;
                }
                fs::copy(&entry_path, &destination).map_err(|err| FileSystemError::File {
                    path: destination.clone(),
                    action: "copy",
                    source: err,
                })?;
            }
            written.push(entry_relative);
        }
    }

    written.sort();
    Ok(written)
}
