//! File-backed persistence for the pinned list: one JSON document holding the
//! whole list. Loads fail soft: a corrupt file is logged and left in place
//! for inspection, and the app proceeds as if nothing was saved.

use super::PinnedItem;
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct PinStore {
    path: PathBuf,
}

impl PinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".finboard")
            .join("pins.json")
    }

    /// Write the full list. The generator field is skipped by the model's
    /// serde attributes, so the persisted form never contains it.
    pub fn save(&self, items: &[PinnedItem]) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let bytes = serde_json::to_vec_pretty(items)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                    fs::rename(&tmp_path, &self.path)?;
                    Ok(())
                } else {
                    Err(rename_err)
                }
            }
        }
    }

    /// Read the persisted list, rebuilding each item's generator from its
    /// stored category and query. `None` means "nothing usable saved":
    /// missing file, unreadable file, or unparsable contents.
    pub fn load(&self) -> Option<Vec<PinnedItem>> {
        if !self.path.exists() {
            return None;
        }

        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("failed to read {}: {err}", self.path.display());
                return None;
            }
        };

        let mut items: Vec<PinnedItem> = match serde_json::from_slice(&data) {
            Ok(items) => items,
            Err(err) => {
                log::warn!("ignoring unparsable {}: {err}", self.path.display());
                return None;
            }
        };

        for item in &mut items {
            item.rebuild_generator();
        }
        Some(items)
    }

    /// Remove the persisted file. A file that never existed is fine.
    pub fn delete(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{PinnedItem, Position, Size};
    use std::fs;

    fn sample_items() -> Vec<PinnedItem> {
        let mut first = PinnedItem::new(
            0,
            "本月不良贷款率是多少？".to_string(),
            "当前不良贷款率为1.35%。".to_string(),
            "贷款业务".to_string(),
        );
        first.position = Position { x: 120, y: 64 };
        first.size = Size {
            width: 600.0,
            height: 420.0,
        };

        let second = PinnedItem::new(
            1,
            "存款增长趋势".to_string(),
            "存款余额858亿元，环比增长2.1%。".to_string(),
            "存款业务".to_string(),
        );
        vec![first, second]
    }

    #[test]
    fn round_trip_preserves_everything_but_the_generator() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store = PinStore::new(dir.path().join("pins.json"));

        let items = sample_items();
        store.save(&items).expect("save should succeed");

        let loaded = store.load().expect("saved data should load");
        assert_eq!(loaded.len(), items.len());
        for (loaded, original) in loaded.iter().zip(&items) {
            assert_eq!(loaded.id, original.id);
            assert_eq!(loaded.query, original.query);
            assert_eq!(loaded.response, original.response);
            assert_eq!(loaded.category, original.category);
            assert_eq!(loaded.timestamp, original.timestamp);
            assert_eq!(loaded.position, original.position);
            assert_eq!(loaded.size, original.size);

            // Rebuilt, not restored, and safe to invoke.
            let generator = loaded
                .generator
                .as_ref()
                .expect("load should rebuild the generator");
            assert!(!generator.snapshot().is_empty());
        }
    }

    #[test]
    fn load_returns_none_when_nothing_was_saved() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store = PinStore::new(dir.path().join("pins.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_fails_soft_and_is_left_untouched() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let path = dir.path().join("pins.json");
        fs::write(&path, b"{not json").expect("fixture should write");

        let store = PinStore::new(&path);
        assert!(store.load().is_none());

        let bytes = fs::read(&path).expect("file should still exist");
        assert_eq!(bytes, b"{not json");
    }

    #[test]
    fn delete_tolerates_a_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir should create");
        let store = PinStore::new(dir.path().join("pins.json"));

        store.delete().expect("deleting nothing should be fine");
        store.save(&sample_items()).expect("save should succeed");
        assert!(store.exists());
        store.delete().expect("delete should succeed");
        assert!(!store.exists());
    }
}
