//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use kickstart_core::{application::ports::Filesystem, domain::TaskError};

/// In-memory filesystem for testing.
///
/// Clones share the same storage, so a test can keep one handle and give
/// another to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    executables: HashSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn check_parent(&self, path: &Path) -> Result<(), TaskError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.directories.contains(parent) => {
                Err(TaskError::io(path, "Parent directory does not exist"))
            }
            _ => Ok(()),
        }
    }
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of a file, if present (testing helper).
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    pub fn is_executable(&self, path: impl AsRef<Path>) -> bool {
        self.inner
            .read()
            .map(|inner| inner.executables.contains(path.as_ref()))
            .unwrap_or(false)
    }

    /// All file paths, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryFilesystemInner>, TaskError> {
        self.inner
            .read()
            .map_err(|_| TaskError::io("<memory>", "filesystem lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryFilesystemInner>, TaskError> {
        self.inner
            .write()
            .map_err(|_| TaskError::io("<memory>", "filesystem lock poisoned"))
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> Result<(), TaskError> {
        self.write()?.add_dirs(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), TaskError> {
        let mut inner = self.write()?;
        inner.check_parent(path)?;
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn append_file(&self, path: &Path, content: &str) -> Result<(), TaskError> {
        let mut inner = self.write()?;
        if let Some(parent) = path.parent() {
            inner.add_dirs(parent);
        }
        inner
            .files
            .entry(path.to_path_buf())
            .or_default()
            .push_str(content);
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, TaskError> {
        self.read()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| TaskError::io(path, "No such file"))
    }

    fn set_executable(&self, path: &Path) -> Result<(), TaskError> {
        let mut inner = self.write()?;
        if !inner.files.contains_key(path) {
            return Err(TaskError::io(path, "No such file"));
        }
        inner.executables.insert(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }
}
