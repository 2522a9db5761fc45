//! File system glue: reads, crash-safe writes, binary sniffing and a small
//! handle-based facade over files and directories.

use crate::lines::{to_line_map, LineMap};
use crate::tree::{build_tree, DirectoryTree, TreeError};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Bytes inspected by [`is_binary`].
pub const BINARY_SNIFF_LEN: usize = 1024;

/// Read a whole file.
pub fn read_file(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Read a file and convert it to a line map.
pub fn file_to_line_map(path: impl AsRef<Path>) -> io::Result<LineMap> {
    let content = read_file(path)?;
    Ok(to_line_map(&String::from_utf8_lossy(&content)))
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The temp file lives in the destination's directory so the rename never
/// crosses file systems. Readers of `path` see either the old or the new
/// content. The mtime is bumped afterwards so watchers notice the change.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Remove a file.
pub fn delete_file(path: impl AsRef<Path>) -> io::Result<()> {
    fs::remove_file(path)
}

/// Create a directory and any missing parents. Existing directories are fine.
pub fn create_dir(path: impl AsRef<Path>) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Remove a directory and everything below it. A missing path is fine.
pub fn delete_dir(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Whether the first [`BINARY_SNIFF_LEN`] bytes of a file contain a NUL byte.
///
/// Unreadable files report `false`; callers that open the file afterwards
/// get the real error there.
pub fn is_binary(path: impl AsRef<Path>) -> bool {
    let Ok(file) = fs::File::open(path) else {
        return false;
    };
    let mut head = Vec::with_capacity(BINARY_SNIFF_LEN);
    match file.take(BINARY_SNIFF_LEN as u64).read_to_end(&mut head) {
        Ok(_) => has_nul(&head),
        Err(_) => false,
    }
}

pub(crate) fn has_nul(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

/// Handle-based access to files and directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl FileSystem {
    pub fn new() -> Self {
        Self
    }

    pub fn file(&self, path: impl Into<PathBuf>) -> FileHandle {
        FileHandle { path: path.into() }
    }

    pub fn dir(&self, path: impl Into<PathBuf>) -> DirHandle {
        DirHandle { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    pub fn read(&self) -> io::Result<Vec<u8>> {
        read_file(&self.path)
    }

    pub fn write(&self, data: &[u8]) -> io::Result<()> {
        atomic_write(&self.path, data)
    }

    pub fn delete(&self) -> io::Result<()> {
        delete_file(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirHandle {
    path: PathBuf,
}

impl DirHandle {
    pub fn create(&self) -> io::Result<()> {
        create_dir(&self.path)
    }

    pub fn delete(&self) -> io::Result<()> {
        delete_dir(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the directory tree below this handle. `None` when the filters
    /// remove the directory itself.
    pub fn tree(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Option<DirectoryTree>, TreeError> {
        build_tree(&self.path, include, exclude)
    }
}
