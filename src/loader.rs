//! Reads the slot catalog and preference files from disk.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::data::{Preferences, RawSlotCatalog};
use crate::error::LoadError;

pub fn load_slot_catalog(path: impl AsRef<Path>) -> Result<RawSlotCatalog, LoadError> {
    read_json(path.as_ref())
}

pub fn load_preferences(path: impl AsRef<Path>) -> Result<Preferences, LoadError> {
    read_json(path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_slot_and_preference_files() {
        let dir = tempfile::tempdir().unwrap();
        let slots = dir.path().join("slot.json");
        let prefs = dir.path().join("preferences.json");
        fs::write(&slots, r#"{"1": {"1": ["08:00", "08:20"]}}"#).unwrap();
        fs::write(
            &prefs,
            r#"{"student2": {"timestamp": "2024-12-10T08:05:00", "preferences": [[1, 1]]},
                "student1": {"timestamp": "2024-12-10T08:00:00", "preferences": [[1, 1]]}}"#,
        )
        .unwrap();

        let catalog = load_slot_catalog(&slots).unwrap();
        let preferences = load_preferences(&prefs).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(preferences.0[0].0, "student2");
        assert_eq!(preferences.len(), 2);
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_slot_catalog(&missing), Err(LoadError::Io { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let err = load_preferences(&broken).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
