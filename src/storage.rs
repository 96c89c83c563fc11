//! Storage backends the generator reads definitions from and writes files to.
//!
//! [`OsStorage`] is the default and talks to the real filesystem.
//! [`MemoryStorage`] keeps everything in memory; clones share the same
//! files, so a caller can hand one clone to a [`Generator`](crate::Generator)
//! and inspect the results through another.
//!
//! Streams are closed when dropped, so every exit path of an operation
//! releases them.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where files are read from and written to.
pub trait Storage {
    /// Open an existing file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Create a file for writing, truncating it if it exists.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsStorage;

impl Storage for OsStorage {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(path)?))
    }

    /// Missing parent directories are created first.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Box::new(File::create(path)?))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    read_only: BTreeSet<PathBuf>,
}

/// In-memory storage with shared state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `contents` at `path`, replacing any existing file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.state().files.insert(path.into(), contents.into());
    }

    /// Refuse to create files at or below `prefix`.
    pub fn set_read_only(&self, prefix: impl Into<PathBuf>) {
        self.state().read_only.insert(prefix.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state().files.get(path.as_ref()).cloned()
    }

    /// File contents as UTF-8, if the file exists and is valid UTF-8.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.get(path).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state().files.keys().cloned().collect()
    }

    fn is_read_only(&self, path: &Path) -> bool {
        self.state()
            .read_only
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }
}

impl Storage for MemoryStorage {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let bytes = self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        if self.is_read_only(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        self.insert(path, Vec::new());
        Ok(Box::new(MemoryFile {
            storage: self,
            path: path.to_path_buf(),
        }))
    }
}

/// Writes land in the shared map immediately, so a failed run leaves
/// exactly what was written so far.
struct MemoryFile<'a> {
    storage: &'a MemoryStorage,
    path: PathBuf,
}

impl Write for MemoryFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.storage
            .state()
            .files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
