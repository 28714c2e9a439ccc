// Durable slot storage backends (SQLite, JSON files, in-memory)

use crate::error::StorageError;
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

type Result<T> = std::result::Result<T, StorageError>;

/// Directory created under the store path to hold backend files
pub const STORE_DIR: &str = ".todolist";

/// Client-local key/value storage holding one serialized value per slot
///
/// `save` replaces the whole slot in one step; a reader never sees a partial write.
pub trait Storage {
    /// Read a slot, `None` if it has never been written
    fn load(&self, slot: &str) -> Result<Option<String>>;

    /// Overwrite a slot with `data`
    fn save(&mut self, slot: &str, data: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        (**self).load(slot)
    }

    fn save(&mut self, slot: &str, data: &str) -> Result<()> {
        (**self).save(slot, data)
    }
}

/// Create the backend directory and its .gitignore
fn prepare_dir(path: &Path) -> Result<PathBuf> {
    let base_path = path.join(STORE_DIR);
    fs::create_dir_all(&base_path)?;

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, "todolist.db\ntodolist.db-shm\ntodolist.db-wal\n*.json.tmp\n*.lock\n")?;
    }
    Ok(base_path)
}

fn validate_slot(slot: &str) -> Result<()> {
    if slot.is_empty() || slot.len() > 64 || !slot.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(StorageError::InvalidSlot(slot.to_string()));
    }
    Ok(())
}

// ============================================================================
// SQLite
// ============================================================================

/// Slots stored as rows of a single SQLite table
pub struct SqliteStorage {
    base_path: PathBuf,
    db: Connection,
}

impl SqliteStorage {
    /// Open or create `<path>/.todolist/todolist.db`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = prepare_dir(path.as_ref())?;
        let db = Connection::open(base_path.join("todolist.db"))?;

        let storage = Self { base_path, db };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let storage = Self {
            base_path: PathBuf::new(),
            db: Connection::open_in_memory()?,
        };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Get the directory holding the database
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        let value = self
            .db
            .query_row("SELECT value FROM slots WHERE name = ?1", [slot], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, slot: &str, data: &str) -> Result<()> {
        validate_slot(slot)?;
        let tx = self.db.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO slots (name, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![slot, data, crate::now_ms()],
        )?;
        tx.commit()?;
        debug!(slot, bytes = data.len(), "Saved slot to SQLite");
        Ok(())
    }
}

// ============================================================================
// JSON files
// ============================================================================

/// One `<slot>.json` file per slot, replaced via temp file + rename
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open or create `<path>/.todolist/` for slot files
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            base_path: prepare_dir(path.as_ref())?,
        })
    }

    /// Get the directory holding the slot files
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", slot))
    }

    fn lock_path(&self, slot: &str) -> PathBuf {
        self.base_path.join(format!("{}.lock", slot))
    }
}

impl Storage for FileStorage {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save(&mut self, slot: &str, data: &str) -> Result<()> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", slot));
        let lock_path = self.lock_path(slot);

        // The temp file is shared between writers, so take the sidecar lock
        // before touching it. Held until `lock` is dropped, after the rename.
        let lock = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&lock_path)?;
        lock.lock_exclusive().map_err(|source| StorageError::Lock {
            path: lock_path.display().to_string(),
            source,
        })?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &path)?;

        debug!(slot, path = ?path, bytes = data.len(), "Saved slot to file");
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local storage; contents vanish with the value
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        Ok(self.slots.get(slot).cloned())
    }

    fn save(&mut self, slot: &str, data: &str) -> Result<()> {
        validate_slot(slot)?;
        self.slots.insert(slot.to_string(), data.to_string());
        Ok(())
    }
}
