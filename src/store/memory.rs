use crate::error::Result;
use crate::model::{Module, StoredModule};

use super::{ModuleStore, upsert_document};

/// Store that keeps documents in memory, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Vec<StoredModule>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ModuleStore for MemoryStore {
    fn upsert_by_key(&mut self, module_id: &str, module: Module) -> Result<StoredModule> {
        Ok(upsert_document(&mut self.documents, module_id, module))
    }

    fn find_all(&self) -> Result<Vec<StoredModule>> {
        Ok(self.documents.clone())
    }

    fn find_by_key(&self, module_id: &str) -> Result<Option<StoredModule>> {
        Ok(self
            .documents
            .iter()
            .find(|stored| stored.module.module_id == module_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::module;

    #[test]
    fn find_by_key_returns_matching_document() {
        let mut store = MemoryStore::new();
        store
            .upsert_by_key("go-101", module("Go 101", &["Basics"]))
            .expect("upserted");
        store
            .upsert_by_key("rust-101", module("Rust 101", &["Ownership"]))
            .expect("upserted");

        let found = store
            .find_by_key("rust-101")
            .expect("lookup succeeded")
            .expect("document present");
        assert_eq!(found.module.title, "Rust 101");
        assert!(store.find_by_key("zig-101").expect("lookup succeeded").is_none());
        assert_eq!(store.len(), 2);
    }
}
