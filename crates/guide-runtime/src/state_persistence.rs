//! Durable record of completed tours.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CompletionStore                          │
//! │   - load/save of the completed-tour set                       │
//! │   - one-shot "welcome offered" flag                           │
//! │   - absorbs every storage failure (logs, never returns Err)   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires state-persistence)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: a missing, unreadable, or corrupt store loads
//!    as "nothing completed". Losing this data only replays a tour.
//! 2. **Atomic writes**: file storage uses the write-rename pattern.
//! 3. **Canonical encoding**: the completed set is written as a sorted JSON
//!    array and entries are keyed in sorted order, so `save(load())`
//!    reproduces the stored bytes exactly.
//! 4. **Last writer wins**: there is one writer per profile; no locking
//!    beyond the backend's own.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Logged, empty set on load |
//! | `StorageError::Serialization` | JSON encode/decode | Logged, entry ignored |
//! | `StorageError::Corruption` | Lock poisoned, bad payload | Logged, empty set |
//! | Missing entry | First run | Empty set |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::RwLock;

/// Key under which the completed-tour set is stored.
pub const COMPLETED_KEY: &str = "guided_tour::completed";
/// Key for the one-shot flag recording that the default tour was offered.
pub const WELCOME_OFFERED_KEY: &str = "guided_tour::welcome_offered";
/// Schema version written with every entry.
pub const ENTRY_VERSION: u32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Stored data is invalid or a lock was poisoned.
    Corruption(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A serialized entry with version metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: String,
    pub version: u32,
    /// Serialized payload (JSON bytes).
    pub data: Vec<u8>,
}

impl StoredEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            version: ENTRY_VERSION,
            data,
        }
    }
}

/// Pluggable storage backend, scoped to one browser profile or user.
///
/// - `load_all` returns an empty map on first run.
/// - `save_all` replaces all existing entries and should be atomic.
/// - Entries are keyed in sorted order so file backends serialize them
///   deterministically.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn load_all(&self) -> StorageResult<BTreeMap<String, StoredEntry>>;

    fn save_all(&self, entries: &BTreeMap<String, StoredEntry>) -> StorageResult<()>;

    fn clear(&self) -> StorageResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory backend for tests and hosts without durable storage.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, StoredEntry>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: BTreeMap<String, StoredEntry>) -> Self {
        Self {
            data: RwLock::new(entries),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load_all(&self) -> StorageResult<BTreeMap<String, StoredEntry>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, entries: &BTreeMap<String, StoredEntry>) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        *guard = entries.clone();
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    #[derive(Serialize, Deserialize)]
    struct StoreFile {
        format_version: u32,
        entries: BTreeMap<String, FileEntry>,
    }

    #[derive(Serialize, Deserialize)]
    struct FileEntry {
        version: u32,
        data_base64: String,
    }

    impl StoreFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: BTreeMap::new(),
            }
        }
    }

    /// JSON file backend.
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "guided_tour::completed": {
    ///       "version": 1,
    ///       "data_base64": "WyJ3ZWxjb21lIl0="
    ///     }
    ///   }
    /// }
    /// ```
    ///
    /// Writes go to `{path}.tmp`, are flushed and synced, then renamed over
    /// `{path}`.
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// The file is created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// `$XDG_STATE_HOME/guided-tour/{profile}/tours.json`, falling back to
        /// `~/.local/state` and then the current directory.
        #[must_use]
        pub fn default_for_profile(profile: &str) -> Self {
            let base = dirs_or_fallback();
            let path = base.join("guided-tour").join(profile).join("tours.json");
            Self { path }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    fn dirs_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load_all(&self) -> StorageResult<BTreeMap<String, StoredEntry>> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);

            let store_file: StoreFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse store file: {e}"))
            })?;

            if store_file.format_version != StoreFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = store_file.format_version,
                    expected = StoreFile::FORMAT_VERSION,
                    "tour store format version mismatch, ignoring stored data"
                );
                return Ok(BTreeMap::new());
            }

            let mut result = BTreeMap::new();
            for (key, entry) in store_file.entries {
                use base64::Engine;
                let data = match base64::engine::general_purpose::STANDARD
                    .decode(&entry.data_base64)
                {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "failed to decode tour store entry, skipping");
                        continue;
                    }
                };
                result.insert(
                    key.clone(),
                    StoredEntry {
                        key,
                        version: entry.version,
                        data,
                    },
                );
            }

            Ok(result)
        }

        fn save_all(&self, entries: &BTreeMap<String, StoredEntry>) -> StorageResult<()> {
            use base64::Engine;

            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut store_file = StoreFile::new();
            for (key, entry) in entries {
                store_file.entries.insert(
                    key.clone(),
                    FileEntry {
                        version: entry.version,
                        data_base64: base64::engine::general_purpose::STANDARD.encode(&entry.data),
                    },
                );
            }

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &store_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize tour store: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = entries.len(),
                "saved tour store"
            );

            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Completion Store
// ─────────────────────────────────────────────────────────────────────────────

/// Best-effort persistence of completed tours.
///
/// Every method is infallible from the caller's point of view: failures are
/// logged with `tracing::warn!` and degrade to "nothing remembered".
pub struct CompletionStore {
    backend: Box<dyn StorageBackend>,
}

impl CompletionStore {
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Ephemeral store, for tests and private sessions.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Store backed by a JSON file at `path`.
    #[cfg(feature = "state-persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Read the completed-tour set. Never fails; corruption reads as empty.
    #[must_use]
    pub fn load(&self) -> BTreeSet<String> {
        match self.read_entry(COMPLETED_KEY) {
            Ok(Some(data)) => match serde_json::from_slice::<BTreeSet<String>>(&data) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        error = %e,
                        "completed-tour entry is corrupt, treating as empty"
                    );
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(
                    backend = %self.backend.name(),
                    error = %e,
                    "failed to load completed tours"
                );
                BTreeSet::new()
            }
        }
    }

    /// Persist the completed-tour set. Failures are logged and dropped.
    pub fn save(&self, ids: &BTreeSet<String>) {
        let result = serde_json::to_vec(ids)
            .map_err(StorageError::from)
            .and_then(|data| self.write_entry(COMPLETED_KEY, data));
        match result {
            Ok(()) => tracing::debug!(count = ids.len(), "persisted completed tours"),
            Err(e) => tracing::warn!(
                backend = %self.backend.name(),
                error = %e,
                "failed to persist completed tours"
            ),
        }
    }

    /// Whether the default tour has ever been offered in this profile.
    #[must_use]
    pub fn welcome_offered(&self) -> bool {
        match self.read_entry(WELCOME_OFFERED_KEY) {
            Ok(Some(data)) => serde_json::from_slice::<bool>(&data).unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read welcome flag");
                false
            }
        }
    }

    /// Set the one-shot "default tour offered" flag.
    pub fn mark_welcome_offered(&self) {
        if let Err(e) = self.write_entry(WELCOME_OFFERED_KEY, b"true".to_vec()) {
            tracing::warn!(error = %e, "failed to persist welcome flag");
        }
    }

    /// Erase both the completed set and the welcome flag.
    pub fn clear(&self) {
        if let Err(e) = self.backend.clear() {
            tracing::warn!(error = %e, "failed to clear tour store");
        }
    }

    /// Raw stored bytes of the completed set, if any.
    #[must_use]
    pub fn raw_completed(&self) -> Option<Vec<u8>> {
        self.read_entry(COMPLETED_KEY).ok().flatten()
    }

    fn read_entry(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let entries = self.backend.load_all()?;
        match entries.get(key) {
            Some(entry) if entry.version == ENTRY_VERSION => Ok(Some(entry.data.clone())),
            Some(entry) => {
                tracing::warn!(
                    key,
                    stored = entry.version,
                    expected = ENTRY_VERSION,
                    "tour store entry version mismatch, ignoring"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn write_entry(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let mut entries = self.backend.load_all().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "tour store unreadable, rewriting from scratch");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), StoredEntry::new(key, data));
        self.backend.save_all(&entries)
    }
}

impl fmt::Debug for CompletionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}
