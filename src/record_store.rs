// Flat JSON record store for uploaded images.
//
// The whole sequence lives in memory and is rewritten to the backing file
// after every append. There is no locking on the file itself: one process
// owns it, and callers serialize mutation (the web layer holds the store
// behind a write lock).

use crate::models::ImageRecord;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Canonical representation of an empty store.
pub const EMPTY_STORE_JSON: &str = "[]";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read record file: {0}")]
    Read(#[source] io::Error),
    #[error("record file is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to write record file: {0}")]
    Write(#[source] io::Error),
    #[error("failed to encode records: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Why `load` fell back to an empty sequence.
#[derive(Debug)]
pub enum RecoveryReason {
    MissingFile,
    ReadFailed(StoreError),
}

/// Result of reading the backing file once.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Vec<ImageRecord>),
    Recovered(RecoveryReason),
}

impl LoadOutcome {
    #[cfg(test)]
    pub fn into_records(self) -> Vec<ImageRecord> {
        match self {
            LoadOutcome::Loaded(records) => records,
            LoadOutcome::Recovered(_) => Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<ImageRecord>,
}

impl RecordStore {
    /// Reads the backing file without side effects. Never fails: read and
    /// parse errors are reported as `LoadOutcome::Recovered`.
    pub fn load(path: &Path) -> LoadOutcome {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return LoadOutcome::Recovered(RecoveryReason::MissingFile);
            }
            Err(e) => {
                return LoadOutcome::Recovered(RecoveryReason::ReadFailed(StoreError::Read(e)));
            }
        };

        // A blank file is treated like "[]".
        if raw.trim().is_empty() {
            return LoadOutcome::Loaded(Vec::new());
        }

        match serde_json::from_str::<Vec<ImageRecord>>(&raw) {
            Ok(records) => LoadOutcome::Loaded(records),
            Err(e) => LoadOutcome::Recovered(RecoveryReason::ReadFailed(StoreError::Malformed(e))),
        }
    }

    /// Initializes the store at process start.
    ///
    /// A missing file is created with `[]`. An unreadable or malformed file
    /// is logged and the store starts empty; the file is left untouched until
    /// the next append overwrites it. Only a failure to create the missing
    /// file is returned as an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, Option<RecoveryReason>), StoreError> {
        let path = path.into();
        let outcome = Self::load(&path);

        let recovery = match outcome {
            LoadOutcome::Loaded(records) => {
                info!(
                    "Loaded {} image record(s) from {}",
                    records.len(),
                    path.display()
                );
                return Ok((Self { path, records }, None));
            }
            LoadOutcome::Recovered(reason) => reason,
        };

        let store = Self {
            path,
            records: Vec::new(),
        };

        match &recovery {
            RecoveryReason::MissingFile => {
                info!(
                    "Record file {} not found, creating an empty one",
                    store.path.display()
                );
                store.write_raw(EMPTY_STORE_JSON)?;
            }
            RecoveryReason::ReadFailed(err) => {
                warn!(
                    "Could not load {}: {}. Starting with an empty gallery.",
                    store.path.display(),
                    err
                );
            }
        }

        Ok((store, Some(recovery)))
    }

    /// Adds `record` at the end and rewrites the backing file. The in-memory
    /// sequence keeps the record even if the write fails.
    pub fn append(&mut self, record: ImageRecord) -> Result<(), StoreError> {
        debug!("Appending record {}", record.url);
        self.records.push(record);
        self.persist()
    }

    /// Serializes the full sequence (2-space pretty JSON) over the backing file.
    pub fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records).map_err(StoreError::Encode)?;
        self.write_raw(&json)
    }

    /// Records in insertion (upload) order.
    pub fn all(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn write_raw(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }
        fs::write(&self.path, contents).map_err(StoreError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(n: usize) -> ImageRecord {
        ImageRecord::new(format!("/uploads/{n}.png"), format!("R{n}"))
    }

    #[test]
    fn test_open_missing_file_creates_empty_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");

        let (store, recovery) = RecordStore::open(&path).unwrap();

        assert!(store.is_empty());
        assert!(matches!(recovery, Some(RecoveryReason::MissingFile)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_open_existing_file_loads_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        fs::write(
            &path,
            r#"[{"url":"/uploads/1.png","title":"R1"},{"url":"/uploads/2.png","title":"R2"}]"#,
        )
        .unwrap();

        let (store, recovery) = RecordStore::open(&path).unwrap();

        assert!(recovery.is_none());
        assert_eq!(store.all(), &[record(1), record(2)]);
    }

    #[test]
    fn test_load_blank_file_is_empty_not_recovered() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        fs::write(&path, "  \n").unwrap();

        match RecordStore::load(&path) {
            LoadOutcome::Loaded(records) => assert!(records.is_empty()),
            other => panic!("expected Loaded, got {:?}", other),
        }
    }

    #[test]
    fn test_load_malformed_file_is_recovered() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        fs::write(&path, "{not json").unwrap();

        let outcome = RecordStore::load(&path);

        assert!(matches!(
            outcome,
            LoadOutcome::Recovered(RecoveryReason::ReadFailed(StoreError::Malformed(_)))
        ));
        assert!(outcome.into_records().is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_recovered() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        fs::write(&path, r#"{"url":"/uploads/1.png","title":"R1"}"#).unwrap();

        assert!(matches!(
            RecordStore::load(&path),
            LoadOutcome::Recovered(RecoveryReason::ReadFailed(StoreError::Malformed(_)))
        ));
    }

    #[test]
    fn test_malformed_file_then_append_overwrites_with_valid_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        fs::write(&path, "garbage").unwrap();

        let (mut store, recovery) = RecordStore::open(&path).unwrap();
        assert!(matches!(recovery, Some(RecoveryReason::ReadFailed(_))));
        // Left untouched until the first append.
        assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");

        store.append(record(1)).unwrap();

        let on_disk: Vec<ImageRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec![record(1)]);
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        let (mut store, _) = RecordStore::open(&path).unwrap();
        for n in 1..=3 {
            store.append(record(n)).unwrap();
        }
        store.append(ImageRecord::new("/uploads/4.gif", "")).unwrap();

        let reloaded = RecordStore::load(&path).into_records();
        assert_eq!(reloaded, store.all());
    }

    #[test]
    fn test_persist_is_pretty_printed_with_two_spaces() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        let (mut store, _) = RecordStore::open(&path).unwrap();

        store
            .append(ImageRecord::new("/uploads/a.png", "sunset"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[\n  {\n    \"url\": \"/uploads/a.png\",\n    \"title\": \"sunset\"\n  }\n]"
        );
    }

    #[test]
    fn test_all_is_stable_without_append() {
        let tmp = TempDir::new().unwrap();
        let (mut store, _) = RecordStore::open(tmp.path().join("images.json")).unwrap();
        store.append(record(1)).unwrap();

        let first = store.all().to_vec();
        let second = store.all().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_append_write_failure_propagates_and_keeps_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.json");
        let (mut store, _) = RecordStore::open(&path).unwrap();

        // Replace the backing file with a directory so the write fails.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let result = store.append(record(1));

        assert!(matches!(result, Err(StoreError::Write(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_open_creates_missing_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("images.json");

        RecordStore::open(&path).unwrap();

        assert!(path.exists());
    }
}
