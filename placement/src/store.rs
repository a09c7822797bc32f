use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A committed placement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: Uuid,
    pub model: String,
    /// Scene world-space position, single precision.
    pub position: [f32; 3],
    /// Radians about the vertical axis; not normalized, may wrap.
    pub rotation_y: f32,
    /// Uniform multiplier against the asset's base size; always positive.
    pub scale: f32,
    /// Set once at creation; used only for stable ordering.
    pub created_at: DateTime<Utc>,
}

impl PlacedItem {
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

/// Arguments for [`PlacementStore::create`]. The id and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePlacement {
    pub model: String,
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no placed item with id {0}")]
    NotFound(Uuid),
    #[error("scale must be positive, got {0}")]
    InvalidScale(f32),
    #[error("failed to read placement file: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write placement file: {0}")]
    Write(#[source] io::Error),
    #[error("placement file is not valid TOML: {0}")]
    Decode(#[source] toml::de::Error),
    #[error("failed to encode placements: {0}")]
    Encode(#[source] toml::ser::Error),
}

/// Committed placements, ordered by creation time.
///
/// Every operation is synchronous; there is no concurrent-write protocol and
/// no change notification. Callers re-run [`PlacementStore::list`] after any
/// mutation to resynchronize their view.
pub trait PlacementStore {
    /// Every record, creation time ascending. Stable and replayable.
    fn list(&self) -> Result<Vec<PlacedItem>, StorageError>;

    /// Persists a new record, assigning its id and timestamp. Rejects a
    /// non-positive scale with [`StorageError::InvalidScale`].
    fn create(&mut self, request: CreatePlacement) -> Result<PlacedItem, StorageError>;

    /// Removes the record with the given id, failing with
    /// [`StorageError::NotFound`] when it no longer exists.
    fn delete(&mut self, id: Uuid) -> Result<(), StorageError>;

    /// Removes every record.
    fn clear(&mut self) -> Result<(), StorageError>;
}

fn build_item(request: CreatePlacement) -> Result<PlacedItem, StorageError> {
    if !(request.scale > 0.0) {
        return Err(StorageError::InvalidScale(request.scale));
    }
    Ok(PlacedItem {
        id: Uuid::new_v4(),
        model: request.model,
        position: request.position.into(),
        rotation_y: request.rotation_y,
        scale: request.scale,
        created_at: Utc::now(),
    })
}

/// In-memory store; backs tests and previews.
#[derive(Debug, Default)]
pub struct MemoryPlacementStore {
    items: Vec<PlacedItem>,
}

impl MemoryPlacementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlacementStore for MemoryPlacementStore {
    fn list(&self) -> Result<Vec<PlacedItem>, StorageError> {
        Ok(self.items.clone())
    }

    fn create(&mut self, request: CreatePlacement) -> Result<PlacedItem, StorageError> {
        let item = build_item(request)?;
        self.items.push(item.clone());
        Ok(item)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StorageError::NotFound(id))?;
        self.items.remove(index);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        Ok(())
    }
}

#[derive(Serialize)]
struct FileContents<'a> {
    items: &'a [PlacedItem],
}

#[derive(Deserialize, Default)]
struct FileDocument {
    #[serde(default)]
    items: Vec<PlacedItem>,
}

/// File-backed store: one TOML document of placement records, rewritten in
/// full on every mutation.
#[derive(Debug)]
pub struct FilePlacementStore {
    path: PathBuf,
    items: Vec<PlacedItem>,
}

impl FilePlacementStore {
    /// Opens the store at `path`, reading any existing document. A missing
    /// file is an empty store; it is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let mut items = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(StorageError::Read)?;
            let document: FileDocument = toml::from_str(&raw).map_err(StorageError::Decode)?;
            document.items
        } else {
            Vec::new()
        };
        items.sort_by_key(|item| item.created_at);
        debug!("opened placement store at {} ({} items)", path.display(), items.len());
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StorageError::Write)?;
            }
        }
        let contents = toml::to_string(&FileContents { items: &self.items })
            .map_err(StorageError::Encode)?;
        fs::write(&self.path, contents).map_err(StorageError::Write)
    }
}

impl PlacementStore for FilePlacementStore {
    fn list(&self) -> Result<Vec<PlacedItem>, StorageError> {
        Ok(self.items.clone())
    }

    fn create(&mut self, request: CreatePlacement) -> Result<PlacedItem, StorageError> {
        let item = build_item(request)?;
        self.items.push(item.clone());
        self.persist()?;
        Ok(item)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StorageError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StorageError::NotFound(id))?;
        self.items.remove(index);
        self.persist()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.persist()
    }
}
