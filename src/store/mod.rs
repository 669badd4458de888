//! Persistence boundary for course documents.
//!
//! A [`ModuleStore`] holds [`StoredModule`]s keyed by their derived module
//! identifier. Writes are insert-or-replace: a second upsert for the same key
//! discards the previous content entirely while keeping the store-assigned
//! [`Uuid`].

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use uuid::Uuid;

use crate::error::Result;
use crate::model::{Module, StoredModule};

pub trait ModuleStore {
    /// Inserts `module` under `module_id`, or fully replaces the document
    /// already stored there, and returns the stored state.
    fn upsert_by_key(&mut self, module_id: &str, module: Module) -> Result<StoredModule>;

    /// Every stored module in the store's natural order.
    fn find_all(&self) -> Result<Vec<StoredModule>>;

    fn find_by_key(&self, module_id: &str) -> Result<Option<StoredModule>> {
        Ok(self
            .find_all()?
            .into_iter()
            .find(|stored| stored.module.module_id == module_id))
    }
}

/// Shared insert-or-replace over an ordered document list. New documents are
/// appended; replaced documents keep their position and identifier.
fn upsert_document(
    documents: &mut Vec<StoredModule>,
    module_id: &str,
    mut module: Module,
) -> StoredModule {
    module.module_id = module_id.to_string();

    match documents
        .iter_mut()
        .find(|stored| stored.module.module_id == module_id)
    {
        Some(existing) => {
            existing.module = module;
            existing.clone()
        }
        None => {
            let stored = StoredModule {
                id: Uuid::new_v4(),
                module,
            };
            documents.push(stored.clone());
            stored
        }
    }
}
