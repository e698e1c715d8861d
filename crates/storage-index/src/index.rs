//! The storage index: object identity to folder path, with invariant
//! enforcement and capture-history tracking.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::record::StorageRecord;

/// Base folder under the storage root that all output lives in.
pub const BASE_FOLDER: &str = "CubemapOutput";

/// Subfolder marker that every record path must contain.
pub const OBJECTS_FOLDER: &str = "Objects";

/// Metadata file written into each capture folder.
pub const METADATA_FILE: &str = "metadata.json";

/// Index file persisted at `<root>/CubemapOutput/index.json`.
pub const INDEX_FILE: &str = "index.json";

/// Canonical face names, in fixed processing order.
pub const FACE_NAMES: [&str; 6] = ["Left", "Right", "Top", "Bottom", "Front", "Back"];

/// Image extensions a face file may carry.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "webp"];

/// Error type for storage operations that the caller must decide on.
///
/// Path-invariant violations and corrupt records are never surfaced here;
/// they are repaired in place and logged.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object identifier is empty or has no usable characters")]
    EmptyObjectId,

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Maps object identities to validated output folders and their records.
#[derive(Debug)]
pub struct StorageIndex {
    root: PathBuf,
    records: BTreeMap<String, StorageRecord>,
    clock: fn() -> DateTime<Utc>,
}

impl StorageIndex {
    /// Open the index rooted at `root`, loading any persisted records.
    ///
    /// A missing or corrupt index file is not an error: it is logged and
    /// the index starts empty, regenerating records on first access.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, Utc::now)
    }

    /// Open with an explicit clock. Used by tests for deterministic
    /// timestamps.
    pub fn with_clock(root: impl Into<PathBuf>, clock: fn() -> DateTime<Utc>) -> Self {
        let root = root.into();
        let records = load_index_file(&root);
        Self {
            root,
            records,
            clock,
        }
    }

    /// The storage root this index manages.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/CubemapOutput/Objects`.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join(BASE_FOLDER).join(OBJECTS_FOLDER)
    }

    /// Read access to an existing record, if any.
    pub fn record(&self, object_id: &str) -> Option<&StorageRecord> {
        self.records.get(object_id)
    }

    /// Return the record for `object_id`, creating or repairing it so its
    /// folder path always satisfies the invariant. Creates the folder on
    /// disk and writes its metadata file.
    pub fn ensure_record(
        &mut self,
        object_id: &str,
        is_probe_source: bool,
    ) -> Result<&StorageRecord, StorageError> {
        let safe_name = sanitize_object_name(object_id);
        if safe_name.is_empty() {
            return Err(StorageError::EmptyObjectId);
        }

        let needs_new_path = match self.records.get(object_id) {
            Some(record) => {
                let valid = path_satisfies_invariant(&record.folder_path);
                if !valid {
                    tracing::error!(
                        object = object_id,
                        path = %record.folder_path.display(),
                        "Storage path invariant violated; regenerating folder path"
                    );
                }
                !valid
            }
            None => true,
        };

        if needs_new_path {
            let folder_path = self.generate_folder_path(&safe_name);
            let record = self
                .records
                .entry(object_id.to_string())
                .or_insert_with(|| StorageRecord {
                    object_name: object_id.to_string(),
                    folder_path: folder_path.clone(),
                    last_capture_date: None,
                    capture_history: Vec::new(),
                    is_probe_source,
                });
            record.folder_path = folder_path;
            record.is_probe_source = is_probe_source;
        }

        let record = &self.records[object_id];
        let folder = self.root.join(&record.folder_path);
        if !folder.exists() {
            std::fs::create_dir_all(&folder).map_err(|source| StorageError::CreateDir {
                path: folder.clone(),
                source,
            })?;
            tracing::info!(path = %folder.display(), "Created capture folder");
        }
        write_metadata(record, &folder)?;

        Ok(&self.records[object_id])
    }

    /// Prepare a capture: stamp the record's history, make sure all
    /// directories exist, persist everything, and return the absolute
    /// output folder.
    pub fn prepare_capture(
        &mut self,
        object_id: &str,
        is_probe_source: bool,
    ) -> Result<PathBuf, StorageError> {
        self.ensure_base_directories()?;
        self.ensure_record(object_id, is_probe_source)?;

        let timestamp = (self.clock)().format(TIMESTAMP_FORMAT).to_string();
        let record = self
            .records
            .get_mut(object_id)
            .expect("record exists after ensure_record");
        record.last_capture_date = Some(timestamp.clone());
        record.capture_history.push(timestamp);

        let folder = self.root.join(&record.folder_path);
        write_metadata(record, &folder)?;
        self.persist()?;

        tracing::info!(object = object_id, path = %folder.display(), "Prepared capture");
        Ok(folder)
    }

    /// True iff every canonical face has at least one file with a
    /// supported extension in `folder`. Gates overwrite confirmation.
    pub fn has_existing_output(folder: &Path) -> bool {
        if !folder.is_dir() {
            return false;
        }
        FACE_NAMES.iter().all(|face| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|ext| folder.join(format!("{face}.{ext}")).is_file())
        })
    }

    /// Idempotent creation of `<root>/CubemapOutput/Objects`.
    fn ensure_base_directories(&self) -> Result<(), StorageError> {
        let objects = self.objects_dir();
        std::fs::create_dir_all(&objects).map_err(|source| StorageError::CreateDir {
            path: objects.clone(),
            source,
        })
    }

    /// `CubemapOutput/Objects/<safe-name>_<timestamp>`, relative to root.
    fn generate_folder_path(&self, safe_name: &str) -> PathBuf {
        let timestamp = (self.clock)().format(TIMESTAMP_FORMAT).to_string();
        PathBuf::from(BASE_FOLDER)
            .join(OBJECTS_FOLDER)
            .join(format!("{safe_name}_{timestamp}"))
    }

    /// Write the whole index to `<root>/CubemapOutput/index.json`.
    fn persist(&self) -> Result<(), StorageError> {
        let path = self.root.join(BASE_FOLDER).join(INDEX_FILE);
        let json = serde_json::to_string_pretty(&self.records)
            .expect("record serialization cannot fail");
        std::fs::write(&path, json).map_err(|source| StorageError::WriteFile { path, source })
    }
}

/// Timestamp format used in folder names and capture history.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Replace every non-ASCII-alphanumeric character with `_`.
pub fn sanitize_object_name(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    mapped.trim_matches('_').to_string()
}

/// The record-path invariant: relative, non-empty, never the root itself,
/// and always inside the objects subfolder.
pub fn path_satisfies_invariant(path: &Path) -> bool {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return false;
    }
    let mut components = path.components();
    let descends = components
        .clone()
        .all(|c| matches!(c, Component::Normal(_)));
    let under_objects = components.any(|c| c.as_os_str() == OBJECTS_FOLDER);
    // The folder itself must be deeper than the marker.
    descends && under_objects && path.file_name().map_or(false, |n| n != OBJECTS_FOLDER)
}

fn load_index_file(root: &Path) -> BTreeMap<String, StorageRecord> {
    let path = root.join(BASE_FOLDER).join(INDEX_FILE);
    if !path.exists() {
        return BTreeMap::new();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt index file; starting fresh");
                BTreeMap::new()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable index file; starting fresh");
            BTreeMap::new()
        }
    }
}

fn write_metadata(record: &StorageRecord, folder: &Path) -> Result<(), StorageError> {
    let path = folder.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(record).expect("record serialization cannot fail");
    std::fs::write(&path, json).map_err(|source| StorageError::WriteFile { path, source })
}
