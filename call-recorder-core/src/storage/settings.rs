use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::error::CaptureError;
use crate::traits::settings_store::SettingsStore;

/// A stored setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
}

/// In-memory settings, for hosts that persist elsewhere and for tests.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, SettingValue>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.lock().get(key) {
            Some(SettingValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), CaptureError> {
        self.values.lock().insert(key.to_string(), SettingValue::Int(value));
        Ok(())
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.lock().get(key) {
            Some(SettingValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), CaptureError> {
        self.values.lock().insert(key.to_string(), SettingValue::Bool(value));
        Ok(())
    }
}

/// Settings kept in a flat JSON object file. Every `set_*` rewrites the file.
pub struct JsonSettingsStore {
    path: PathBuf,
    values: Mutex<HashMap<String, SettingValue>>,
}

impl JsonSettingsStore {
    /// Load `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| CaptureError::StorageError(format!("failed to parse settings: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CaptureError::storage("failed to read settings", e)),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), CaptureError> {
        let mut values = self.values.lock();
        let previous = values.insert(key.to_string(), value);
        if let Err(e) = self.save(&values) {
            // Keep memory consistent with disk.
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn save(&self, values: &HashMap<String, SettingValue>) -> Result<(), CaptureError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CaptureError::storage("failed to create settings directory", e))?;
            }
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| CaptureError::StorageError(format!("failed to serialize settings: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| CaptureError::storage("failed to write settings", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| CaptureError::storage("failed to replace settings", e))
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.lock().get(key) {
            Some(SettingValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), CaptureError> {
        self.set(key, SettingValue::Int(value))
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.lock().get(key) {
            Some(SettingValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), CaptureError> {
        self.set(key, SettingValue::Bool(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_keeps_types_apart() {
        let store = MemorySettingsStore::new();
        store.set_int("sample_rate", 16000).unwrap();
        store.set_bool("dark_theme", true).unwrap();

        assert_eq!(store.get_int("sample_rate"), Some(16000));
        assert_eq!(store.get_bool("dark_theme"), Some(true));
        assert_eq!(store.get_bool("sample_rate"), None);
        assert_eq!(store.get_int("missing"), None);
    }

    #[test]
    fn json_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        {
            let store = JsonSettingsStore::open(&path).unwrap();
            store.set_int("sample_rate", 48000).unwrap();
            store.set_bool("recording_enabled", false).unwrap();
        }

        let store = JsonSettingsStore::open(&path).unwrap();
        assert_eq!(store.get_int("sample_rate"), Some(48000));
        assert_eq!(store.get_bool("recording_enabled"), Some(false));
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn json_store_starts_empty_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get_int("sample_rate"), None);
    }

    #[test]
    fn corrupt_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonSettingsStore::open(&path),
            Err(CaptureError::StorageError(_))
        ));
    }
}
