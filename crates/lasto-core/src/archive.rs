//! File-per-record JSON archive under the platform data directory.
//!
//! The archive is the single owner of transcript records; every other copy
//! (cloud basket, disk export) is derived from it. Each record lives in its
//! own `<id>.json` so saves and deletes touch one file, mirroring a
//! key-value object store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::history::{self, HistoryItem};

const RECORDINGS_DIR: &str = "recordings";

/// Single-file archive written by builds before the per-record layout.
const LEGACY_FILE: &str = "history.json";

pub struct Archive {
    records: PathBuf,
    legacy: PathBuf,
}

impl Archive {
    /// Open the archive in the default platform data directory
    /// (e.g. `~/.local/share/lasto`).
    pub fn open_default() -> Result<Self> {
        let root = dirs::data_dir()
            .context("Could not determine data directory")?
            .join("lasto");
        Self::open(&root)
    }

    /// Open an archive rooted at `root`, creating it if needed and migrating
    /// any legacy single-file archive into the per-record layout.
    pub fn open(root: &Path) -> Result<Self> {
        let records = root.join(RECORDINGS_DIR);
        fs::create_dir_all(&records)
            .with_context(|| format!("Failed to create archive directory {}", records.display()))?;

        let archive = Self {
            records,
            legacy: root.join(LEGACY_FILE),
        };
        archive.migrate_legacy()?;
        Ok(archive)
    }

    /// Insert or replace a record.
    pub fn save(&self, item: &HistoryItem) -> Result<()> {
        let path = self.record_path(&item.id)?;
        let json = serde_json::to_string_pretty(item).context("Failed to serialize record")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write record {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<HistoryItem>> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        let item = serde_json::from_str(&data)
            .with_context(|| format!("Record {} is not valid JSON", path.display()))?;
        Ok(Some(item))
    }

    /// Load every record, newest first. Files that fail to parse are skipped
    /// rather than failing the whole archive.
    pub fn load_all(&self) -> Result<Vec<HistoryItem>> {
        let mut items = Vec::new();
        for entry in fs::read_dir(&self.records).context("Failed to read archive directory")? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|data| serde_json::from_str::<HistoryItem>(&data).map_err(Into::into))
            {
                Ok(item) => items.push(item),
                Err(err) => {
                    crate::verbose!("Skipping unreadable record {}: {err}", path.display());
                }
            }
        }
        history::sort_by_date_desc(&mut items);
        Ok(items)
    }

    /// Delete a record. Returns false when no such record exists.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete record {}", path.display()))?;
        Ok(true)
    }

    /// Write the whole archive as a pretty JSON array. Returns the record count.
    pub fn export(&self, path: &Path) -> Result<usize> {
        let items = self.load_all()?;
        let json =
            serde_json::to_string_pretty(&items).context("Failed to serialize archive")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        Ok(items.len())
    }

    /// Import a JSON array of records, upserting each. Returns the count read
    /// from the file.
    pub fn import(&self, path: &Path) -> Result<usize> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let items: Vec<HistoryItem> =
            serde_json::from_str(&data).context("File is not a JSON array of recordings")?;
        for item in &items {
            self.save(item)?;
        }
        Ok(items.len())
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.records.join(format!("{id}.json")))
    }

    fn migrate_legacy(&self) -> Result<()> {
        if !self.legacy.exists() {
            return Ok(());
        }
        crate::verbose!("Migrating legacy archive {}", self.legacy.display());
        match fs::read_to_string(&self.legacy)
            .map_err(anyhow::Error::from)
            .and_then(|data| {
                serde_json::from_str::<Vec<HistoryItem>>(&data).map_err(Into::into)
            }) {
            Ok(items) => {
                for item in &items {
                    self.save(item)?;
                }
            }
            Err(err) => {
                crate::verbose!("Legacy archive unreadable, dropping it: {err}");
            }
        }
        fs::remove_file(&self.legacy).context("Failed to remove legacy archive")?;
        Ok(())
    }
}

/// Record ids become file names, so anything that could escape the archive
/// directory is rejected.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty()
        || id.contains('/')
        || id.contains('\\')
        || id.contains("..")
        || id.contains('\0')
    {
        anyhow::bail!("Invalid recording id: {id:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Utterance;

    fn item(id: &str, date: &str) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            title: format!("title {id}"),
            date: date.to_string(),
            content: "text".to_string(),
            utterances: Some(vec![Utterance {
                speaker: "A".to_string(),
                text: "text".to_string(),
            }]),
            speaker_names: None,
        }
    }

    #[test]
    fn save_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();

        let it = item("rec-1", "2024-01-01T00:00:00Z");
        archive.save(&it).unwrap();
        assert_eq!(archive.get("rec-1").unwrap().unwrap(), it);

        assert!(archive.delete("rec-1").unwrap());
        assert!(!archive.delete("rec-1").unwrap());
        assert!(archive.get("rec-1").unwrap().is_none());
    }

    #[test]
    fn save_is_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();

        archive.save(&item("rec-1", "2024-01-01T00:00:00Z")).unwrap();
        let mut renamed = item("rec-1", "2024-01-01T00:00:00Z");
        renamed.title = "renamed".to_string();
        archive.save(&renamed).unwrap();

        assert_eq!(archive.load_all().unwrap().len(), 1);
        assert_eq!(archive.get("rec-1").unwrap().unwrap().title, "renamed");
    }

    #[test]
    fn load_all_sorts_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();

        archive.save(&item("old", "2020-01-01T00:00:00Z")).unwrap();
        archive.save(&item("new", "2024-01-01T00:00:00Z")).unwrap();
        fs::write(dir.path().join("recordings/broken.json"), "{not json").unwrap();

        let items = archive.load_all().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "new");
        assert_eq!(items[1].id, "old");
    }

    #[test]
    fn rejects_path_traversal_ids() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();
        assert!(archive.get("../escape").is_err());
        assert!(archive.save(&item("a/b", "2024-01-01T00:00:00Z")).is_err());
    }

    #[test]
    fn export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::open(dir.path()).unwrap();
        archive.save(&item("rec-1", "2024-01-01T00:00:00Z")).unwrap();
        archive.save(&item("rec-2", "2024-02-01T00:00:00Z")).unwrap();

        let export_path = dir.path().join("backup.json");
        assert_eq!(archive.export(&export_path).unwrap(), 2);

        let other = tempfile::tempdir().unwrap();
        let restored = Archive::open(other.path()).unwrap();
        assert_eq!(restored.import(&export_path).unwrap(), 2);
        assert_eq!(restored.load_all().unwrap().len(), 2);
    }

    #[test]
    fn migrates_legacy_single_file_archive() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![item("rec-1", "2024-01-01T00:00:00Z")];
        fs::write(
            dir.path().join("history.json"),
            serde_json::to_string(&items).unwrap(),
        )
        .unwrap();

        let archive = Archive::open(dir.path()).unwrap();
        assert_eq!(archive.load_all().unwrap().len(), 1);
        assert!(!dir.path().join("history.json").exists());
    }
}
