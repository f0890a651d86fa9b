// Key-value persistence backends for record collections

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage contract for collections: one JSON document per key
pub trait KeyValueStore {
    /// Read the JSON text stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the JSON text stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Validate a storage key
///
/// Keys become file names and table keys, so they are restricted to
/// alphanumerics plus `_` and `-`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

// ============================================================================
// In-memory
// ============================================================================

/// In-memory store, used by tests and demos
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key without counting it as a write
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    /// Number of `set` calls made so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Directory of JSON files
// ============================================================================

/// One `<key>.json` file per key inside a directory
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open (creating if needed) a file store rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create data directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(text))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(".lock"))
            .context("Failed to open lock file")?;

        // Held until `lock` is dropped
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        {
            let mut file = fs::File::create(&tmp).context("Failed to create temp file")?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(key, bytes = value.len(), path = ?path, "FileKv::set: written");
        Ok(())
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// Single-table SQLite store
pub struct SqliteKv {
    db: Connection,
}

impl SqliteKv {
    /// Open or create a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let db = Connection::open(path.as_ref()).context("Failed to open SQLite database")?;
        Self::with_connection(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { db })
    }

    /// Last write time for a key (milliseconds since epoch)
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let ts = self
            .db
            .query_row("SELECT updated_at FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(ts)
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;
        debug!(key, bytes = value.len(), "SqliteKv::set: written");
        Ok(())
    }
}

// Helper function for timestamps
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_key() {
        // Valid
        assert!(validate_key("users-data").is_ok());
        assert!(validate_key("kanban_tasks").is_ok());

        // Invalid
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_memory_kv_counts_writes() {
        let mut kv = MemoryKv::new().with_entry("users-data", "[]");
        assert_eq!(kv.writes(), 0);
        assert_eq!(kv.get("users-data").unwrap().as_deref(), Some("[]"));

        kv.set("users-data", "[1]").unwrap();
        assert_eq!(kv.writes(), 1);
        assert_eq!(kv.get("users-data").unwrap().as_deref(), Some("[1]"));
        assert!(kv.get("chart-data").unwrap().is_none());
    }

    #[test]
    fn test_file_kv_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path().join("data")).unwrap();

        assert!(kv.get("calendar-events").unwrap().is_none());
        kv.set("calendar-events", r#"[{"id":1}]"#).unwrap();
        kv.set("calendar-events", r#"[{"id":2}]"#).unwrap();

        assert_eq!(kv.get("calendar-events").unwrap().as_deref(), Some(r#"[{"id":2}]"#));
        assert!(temp.path().join("data/calendar-events.json").exists());
        assert!(!temp.path().join("data/calendar-events.json.tmp").exists());
    }

    #[test]
    fn test_file_kv_rejects_path_keys() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();
        assert!(kv.set("../outside", "[]").is_err());
        assert!(kv.get("a/b").is_err());
    }

    #[test]
    fn test_sqlite_kv_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dash.db");

        {
            let mut kv = SqliteKv::open(&path).unwrap();
            kv.set("chart-data", "[]").unwrap();
            assert!(kv.updated_at("chart-data").unwrap().is_some());
        }

        // Survives reopen
        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(kv.get("chart-data").unwrap().as_deref(), Some("[]"));
        assert!(kv.get("users-data").unwrap().is_none());
    }

    #[test]
    fn test_boxed_kv_delegates() {
        let mut kv: Box<dyn KeyValueStore> = Box::new(SqliteKv::open_in_memory().unwrap());
        kv.set("users-data", "[]").unwrap();
        assert_eq!(kv.get("users-data").unwrap().as_deref(), Some("[]"));
    }
}
