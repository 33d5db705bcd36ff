use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Filesystem rooted at a base directory. Spreadsheet locators and product
/// store files are both resolved against it.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

/// Exclusive advisory lock on a `<file>.lock` sidecar; released on drop.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Blocks until no other process holds the lock for `path`.
    pub fn lock(&self, path: &str) -> Result<FileLock> {
        let lock_path = with_suffix(&self.resolve(path), ".lock");
        ensure_parent(&lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        file.lock()?;
        Ok(FileLock { _file: file })
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path))?)
    }

    /// Writes `<path>.tmp` and renames it over `path`, so readers never see
    /// a half-written file.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        ensure_parent(&target)?;
        let staged = with_suffix(&target, ".tmp");
        fs::write(&staged, data)?;
        fs::rename(&staged, &target)?;
        Ok(())
    }
}
