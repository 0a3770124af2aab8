//! The [`FsBackend`] implementation of `StorageBackend`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use dirdb_core::{BackendError, BackendResult, Child, StorageBackend};
use dirdb_types::{validate_name, Value};

/// File extension marking a leaf file; everything else in a directory
/// listing that is not a subdirectory is noise.
const LEAF_SUFFIX: &str = ".json";

/// Filesystem backend rooted at a base directory.
///
/// Cursor paths map to nested OS directories under the root; the leaf
/// `name` under a path maps to `<name>.json` in the corresponding
/// directory. Every path segment is re-validated here so no name can
/// escape the root or address more than one path component.
#[derive(Clone, Debug)]
pub struct FsBackend {
    root_dir: PathBuf,
}

impl FsBackend {
    /// Create a backend over an existing root directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Create a backend, creating the root directory (and its parents) if
    /// missing.
    pub fn open(root_dir: impl Into<PathBuf>) -> BackendResult<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir).map_err(|source| io_error(&root_dir, source))?;
        Ok(Self { root_dir })
    }

    /// The configured root directory.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// The OS directory a cursor path denotes.
    fn dir_path(&self, path: &[String]) -> BackendResult<PathBuf> {
        let mut full = self.root_dir.clone();
        for segment in path {
            validate_name(segment)?;
            full.push(segment);
        }
        Ok(full)
    }

    /// The OS directory the child `name` would occupy.
    fn child_dir_path(&self, path: &[String], name: &str) -> BackendResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir_path(path)?.join(name))
    }

    /// The leaf file the child `name` would occupy.
    fn leaf_path(&self, path: &[String], name: &str) -> BackendResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir_path(path)?.join(format!("{name}{LEAF_SUFFIX}")))
    }
}

impl StorageBackend for FsBackend {
    fn child_names(&self, path: &[String]) -> BackendResult<Vec<String>> {
        let dir = self.dir_path(path)?;
        let entries = fs::read_dir(&dir).map_err(|source| io_error(&dir, source))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| io_error(&dir, source))?;
            let file_type = entry.file_type().map_err(|source| io_error(&dir, source))?;
            let file_name = entry.file_name();
            // Non-UTF-8 entries cannot be node names; skip them as noise.
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_type.is_dir() {
                names.push(file_name.to_string());
            } else if file_type.is_file() {
                if let Some(stem) = file_name.strip_suffix(LEAF_SUFFIX) {
                    if !stem.is_empty() {
                        names.push(stem.to_string());
                    }
                }
            }
        }
        // read_dir order is OS-dependent; sort for stable enumeration.
        names.sort();
        Ok(names)
    }

    fn read_child(&self, path: &[String], name: &str) -> BackendResult<Option<Child>> {
        let dir = self.child_dir_path(path, name)?;
        if dir.is_dir() {
            return Ok(Some(Child::Dir));
        }
        let file = self.leaf_path(path, name)?;
        match fs::read(&file) {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|source| {
                    BackendError::Json {
                        path: file.display().to_string(),
                        source,
                    }
                })?;
                Ok(Some(Child::Leaf(value)))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&file, err)),
        }
    }

    fn write_leaf(&mut self, path: &[String], name: &str, value: &Value) -> BackendResult<()> {
        let file = self.leaf_path(path, name)?;
        let json = serde_json::to_vec(value).map_err(|source| BackendError::Json {
            path: file.display().to_string(),
            source,
        })?;
        fs::write(&file, json).map_err(|source| io_error(&file, source))?;
        debug!(file = %file.display(), "leaf written");
        Ok(())
    }

    fn create_dir(&mut self, path: &[String], name: &str) -> BackendResult<()> {
        let dir = self.child_dir_path(path, name)?;
        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(err) => return Err(io_error(&dir, err)),
        }
        // A leaf file occupying the name is displaced by the directory.
        let stale = self.leaf_path(path, name)?;
        match fs::remove_file(&stale) {
            Ok(()) => debug!(file = %stale.display(), "displaced stale leaf file"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(io_error(&stale, err)),
        }
        debug!(dir = %dir.display(), "directory created");
        Ok(())
    }

    fn delete_subtree(&mut self, path: &[String], name: &str) -> BackendResult<()> {
        let file = self.leaf_path(path, name)?;
        if file.is_file() {
            fs::remove_file(&file).map_err(|source| io_error(&file, source))?;
            debug!(file = %file.display(), "leaf removed");
            return Ok(());
        }
        let dir = self.child_dir_path(path, name)?;
        if dir.is_dir() {
            fs::remove_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
            debug!(dir = %dir.display(), "subtree removed");
            return Ok(());
        }
        Err(BackendError::NotFound {
            path: path.join("/"),
            name: name.to_string(),
        })
    }
}

fn io_error(path: &Path, source: io::Error) -> BackendError {
    BackendError::Io {
        path: path.display().to_string(),
        source,
    }
}
