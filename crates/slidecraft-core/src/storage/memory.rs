use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use super::DocumentStore;
use crate::error::{Result, SlidecraftError};

/// In-process store, used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> SlidecraftError {
    SlidecraftError::Validation("memory store lock poisoned".to_string())
}

impl DocumentStore for MemoryStore {
    fn save(&self, key: &str, document: &Value) -> Result<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.insert(key.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.get(key).cloned())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}
