//! Key-value flag stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ini::Ini;
use parking_lot::Mutex;

use super::NoticeError;

/// INI section holding the flags.
pub const FLAG_SECTION: &str = "flags";

/// Persistent string flags keyed by name.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, NoticeError>;

    fn set(&self, key: &str, value: &str) -> Result<(), NoticeError>;

    fn remove(&self, key: &str) -> Result<(), NoticeError>;
}

/// Flags kept in the `[flags]` section of an INI file.
pub struct IniFlagStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl IniFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Ini, NoticeError> {
        if !self.path.exists() {
            return Ok(Ini::new());
        }
        Ini::load_from_file(&self.path).map_err(|e| NoticeError::Read {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write(&self, ini: &Ini) -> Result<(), NoticeError> {
        let write_error = |source| NoticeError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        ini.write_to_file(&self.path).map_err(write_error)
    }
}

impl FlagStore for IniFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, NoticeError> {
        let _guard = self.lock.lock();
        let ini = self.read()?;
        Ok(ini
            .section(Some(FLAG_SECTION))
            .and_then(|section| section.get(key))
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NoticeError> {
        let _guard = self.lock.lock();
        let mut ini = self.read()?;
        ini.with_section(Some(FLAG_SECTION)).set(key, value);
        self.write(&ini)
    }

    fn remove(&self, key: &str) -> Result<(), NoticeError> {
        let _guard = self.lock.lock();
        let mut ini = self.read()?;
        if ini.delete_from(Some(FLAG_SECTION), key).is_none() {
            return Ok(());
        }
        self.write(&ini)
    }
}

/// Flags held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryFlagStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, NoticeError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NoticeError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), NoticeError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ini_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("flags.ini");

        IniFlagStore::new(&path).set("infoMessage", "1700000000000").unwrap();

        let reopened = IniFlagStore::new(&path);
        assert_eq!(
            reopened.get("infoMessage").unwrap(),
            Some("1700000000000".to_string())
        );
        assert_eq!(reopened.get("other").unwrap(), None);
    }

    #[test]
    fn test_ini_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = IniFlagStore::new(dir.path().join("flags.ini"));

        // Removing from a store that was never written is fine
        store.remove("infoMessage").unwrap();

        store.set("infoMessage", "1").unwrap();
        store.remove("infoMessage").unwrap();
        assert_eq!(store.get("infoMessage").unwrap(), None);
    }

    #[test]
    fn test_ini_store_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let store = IniFlagStore::new(dir.path());
        assert!(store.get("infoMessage").is_err());
    }
}
