use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use serde_json::Value;

use super::DocumentStore;
use crate::error::{Result, SlidecraftError};

const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Bumped when the key layout or document encoding changes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Redb-backed artifact store. Documents are stored as JSON bytes.
pub struct RedbStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbStore {
    /// Open an existing store or create an empty one, with parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir).map_err(|e| {
                SlidecraftError::Validation(format!("Cannot create {}: {}", dir.display(), e))
            })?,
            _ => {}
        }

        let db = Database::create(&path)?;
        let stored = stored_schema_version(&db)?;
        if let Some(version) = stored.filter(|v| *v > CURRENT_SCHEMA_VERSION) {
            return Err(SlidecraftError::Validation(format!(
                "Artifact store schema v{} is newer than this binary v{}",
                version, CURRENT_SCHEMA_VERSION
            )));
        }

        let txn = db.begin_write()?;
        {
            txn.open_table(DOCUMENTS)?;
            let mut meta = txn.open_table(META)?;
            if stored.is_none() {
                let version = CURRENT_SCHEMA_VERSION.to_string();
                meta.insert(SCHEMA_VERSION_KEY, version.as_bytes())?;
            }
        }
        txn.commit()?;

        log::debug!("Opened artifact store at {} (schema v{})", path.display(), CURRENT_SCHEMA_VERSION);
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `None` for a store that has never been stamped.
fn stored_schema_version(db: &Database) -> Result<Option<u32>> {
    let txn = db.begin_read()?;
    let meta = match txn.open_table(META) {
        Ok(table) => table,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let Some(raw) = meta.get(SCHEMA_VERSION_KEY)? else {
        return Ok(None);
    };
    let version = std::str::from_utf8(raw.value())
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| SlidecraftError::Validation("Corrupt schema version in meta table".to_string()))?;
    Ok(Some(version))
}

impl DocumentStore for RedbStore {
    fn save(&self, key: &str, document: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(document)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;
        match table.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;
        let mut keys = Vec::new();
        for entry in table.range(prefix..)? {
            let (key, _) = entry?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn round_trip_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artifacts.redb");
        let doc = json!({"post_id": "p1", "slides": [1, 2, 3]});

        {
            let store = RedbStore::open(&path).unwrap();
            store.save("p1/coherence_brief", &doc).unwrap();
            store.save("p1/caption", &json!({"text": "hello"})).unwrap();
            store.save("p2/caption", &json!({"text": "other"})).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.load("p1/coherence_brief").unwrap(), Some(doc));
        assert_eq!(store.load("p1/nothing").unwrap(), None);
        assert_eq!(
            store.keys("p1/").unwrap(),
            vec!["p1/caption".to_string(), "p1/coherence_brief".to_string()]
        );
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/store.redb");
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert!(store.keys("").unwrap().is_empty());
    }
}
