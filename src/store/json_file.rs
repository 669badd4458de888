use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, ToolError};
use crate::model::{Module, StoredModule};

use super::{ModuleStore, upsert_document};

/// Store persisting every document as one JSON array on disk.
///
/// Each upsert takes an exclusive lock on a sibling `.lock` file, reloads the
/// array, applies the change and writes it through a uniquely named staging
/// file that is renamed over the target. Handles sharing a path therefore
/// only race on the same key, and readers never observe a partial write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating its parent directory when needed.
    /// A missing file is an empty store; an unreadable or malformed one is an
    /// error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let directory = store_directory(&path);
        fs::create_dir_all(directory).map_err(|error| {
            ToolError::Store(format!("cannot create {}: {error}", directory.display()))
        })?;

        let mut lock_name = path.as_os_str().to_os_string();
        lock_name.push(".lock");
        let store = Self {
            lock_path: PathBuf::from(lock_name),
            path,
        };

        let documents = store.load()?;
        info!(path = %store.path.display(), documents = documents.len(), "opened course store");
        Ok(store)
    }

    fn load(&self) -> Result<Vec<StoredModule>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let source = fs::read_to_string(&self.path).map_err(|error| {
            ToolError::Store(format!("cannot read {}: {error}", self.path.display()))
        })?;
        serde_json::from_str(&source).map_err(|error| {
            ToolError::Store(format!("malformed store {}: {error}", self.path.display()))
        })
    }

    fn persist(&self, documents: &[StoredModule]) -> Result<()> {
        let json = serde_json::to_string_pretty(documents)?;
        let write_error = |error: std::io::Error| {
            ToolError::Store(format!("cannot write {}: {error}", self.path.display()))
        };

        let mut staging = NamedTempFile::new_in(store_directory(&self.path)).map_err(write_error)?;
        staging.write_all(json.as_bytes()).map_err(write_error)?;
        staging
            .persist(&self.path)
            .map_err(|error| write_error(error.error))?;

        debug!(path = %self.path.display(), documents = documents.len(), "store persisted");
        Ok(())
    }
}

impl ModuleStore for JsonFileStore {
    fn upsert_by_key(&mut self, module_id: &str, module: Module) -> Result<StoredModule> {
        let lock_error = |error: std::io::Error| {
            ToolError::Store(format!("cannot lock {}: {error}", self.lock_path.display()))
        };
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(lock_error)?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write().map_err(lock_error)?;

        let mut documents = self.load()?;
        let stored = upsert_document(&mut documents, module_id, module);
        self.persist(&documents)?;
        Ok(stored)
    }

    fn find_all(&self) -> Result<Vec<StoredModule>> {
        self.load()
    }

    fn find_by_key(&self, module_id: &str) -> Result<Option<StoredModule>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|stored| stored.module.module_id == module_id))
    }
}

fn store_directory(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
