//! Byte-oriented storage for config documents

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    Read,
    Write,
    CreateDir,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FsOperation::Read => "read",
            FsOperation::Write => "write",
            FsOperation::CreateDir => "create directory",
        })
    }
}

/// I/O failure at the storage boundary
#[derive(Debug, thiserror::Error)]
#[error("failed to {operation} {}: {source}", .path.display())]
pub struct FileSystemError {
    pub operation: FsOperation,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileSystemError {
    pub fn new(operation: FsOperation, path: &Path, source: io::Error) -> Self {
        Self {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Raw byte storage keyed by path
pub trait RawStorage: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Storage backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl RawStorage for FileStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// In-process storage, useful for previews and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents stored at `path`, if any
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(path).cloned()
    }
}

fn poisoned() -> io::Error {
    io::Error::other("memory storage lock poisoned")
}

impl RawStorage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let files = self.files.read().map_err(|_| poisoned())?;
        files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut files = self.files.write().map_err(|_| poisoned())?;
        files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}
