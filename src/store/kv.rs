use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use crate::store::StoreError;

/// String key-value persistence, shaped after browser local storage.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key under `base_dir`.
pub struct FileKvStore {
    base_dir: PathBuf,
}

impl FileKvStore {
    pub fn with_base_dir(base_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("histquiz")
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.file_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::PersistenceReadFailure {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &path)
        };
        write().map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::PersistenceWriteFailure {
                key: key.to_string(),
                source,
            }
        })
    }
}

/// In-memory store. Clones share the same map, so a test can hand one clone to
/// a ledger and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::PersistenceWriteFailure {
                key: key.to_string(),
                source: io::Error::other("quota exceeded"),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, FileKvStore) {
        let dir = TempDir::new().unwrap();
        let store = FileKvStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_dir, store) = make_test_store();
        assert!(store.get("clearedGenres").unwrap().is_none());
    }

    #[test]
    fn set_then_get_uses_one_file_per_key() {
        let (dir, store) = make_test_store();
        store.set("clearedGenres", r#"{"edo":true}"#).unwrap();
        store.set("wrongAnswers", "{}").unwrap();

        assert_eq!(
            store.get("clearedGenres").unwrap().as_deref(),
            Some(r#"{"edo":true}"#)
        );
        assert!(dir.path().join("clearedGenres.json").exists());
        assert!(dir.path().join("wrongAnswers.json").exists());
    }

    #[test]
    fn set_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.set("playback", r#"{"music":true}"#).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn write_into_missing_dir_fails_without_panicking() {
        let dir = TempDir::new().unwrap();
        let store = FileKvStore {
            base_dir: dir.path().join("gone"),
        };
        let err = store.set("clearedGenres", "{}").unwrap_err();
        assert!(matches!(err, StoreError::PersistenceWriteFailure { .. }));
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryKvStore::new();
        let view = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(view.raw("k").as_deref(), Some("v"));
        assert_eq!(view.write_count(), 1);

        view.set_fail_writes(true);
        assert!(store.set("k", "w").is_err());
        assert_eq!(view.raw("k").as_deref(), Some("v"));
    }
}
