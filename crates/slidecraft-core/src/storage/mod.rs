mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::{RedbStore, CURRENT_SCHEMA_VERSION};

use crate::error::Result;
use serde_json::Value;

/// Key-value store for pipeline artifacts.
///
/// Keys are `<scope>/<name>`, where scope is a post id or an article run id.
pub trait DocumentStore: Send + Sync {
    /// Store a document (insert or overwrite).
    fn save(&self, key: &str, document: &Value) -> Result<()>;

    fn load(&self, key: &str) -> Result<Option<Value>>;

    /// All keys starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn save(&self, key: &str, document: &Value) -> Result<()> {
        (**self).save(key, document)
    }
    fn load(&self, key: &str) -> Result<Option<Value>> {
        (**self).load(key)
    }
    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys(prefix)
    }
}

/// Build an artifact key.
pub fn artifact_key(scope: &str, name: &str) -> String {
    format!("{}/{}", scope, name)
}
