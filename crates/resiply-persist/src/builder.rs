use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{PersistError, Result};
use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::store::LocalStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    File,
}

pub struct StoreBuilder {
    kind: StorageKind,
    directory: Option<PathBuf>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            kind: StorageKind::Memory,
            directory: None,
        }
    }

    pub fn kind(mut self, kind: StorageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Selects the file-backed store rooted at `dir`.
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self.kind = StorageKind::File;
        self
    }

    pub fn build(self) -> Result<Arc<dyn LocalStore>> {
        match self.kind {
            StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageKind::File => {
                let dir = self.directory.ok_or_else(|| {
                    PersistError::Internal("directory is required for file storage".to_string())
                })?;
                Ok(Arc::new(FileStore::open(dir)?))
            }
        }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
