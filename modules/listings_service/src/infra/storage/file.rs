//! File engine - every record in memory, persisted as one JSON document
//!
//! Writes go straight to the shared map and are visible to every session at once;
//! `save` rewrites the whole file.

use super::document::Document;
use crate::contract::model::record_key;
use crate::contract::{EntityKind, Record, Relationship};
use crate::domain::repository::{AmenityLinks, Backend, StorageEngine, UnitOfWork};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub struct FileEngine {
    path: PathBuf,
    objects: RwLock<IndexMap<String, Record>>,
    /// Serializes writers of the file itself
    flush_lock: Mutex<()>,
}

impl FileEngine {
    /// Open the engine and load `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let engine = Self {
            path: path.into(),
            objects: RwLock::new(IndexMap::new()),
            flush_lock: Mutex::new(()),
        };
        engine.reload()?;
        tracing::info!(
            "File storage opened at {} with {} records",
            engine.path.display(),
            engine.objects.read().len()
        );
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory map with the contents of the file.
    pub fn reload(&self) -> Result<()> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.objects.write().clear();
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let documents: IndexMap<String, Document> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        let objects = documents
            .into_values()
            .map(Record::from)
            .map(|record| (record.key(), record))
            .collect();
        *self.objects.write() = objects;
        Ok(())
    }

    /// Write the whole map to a sibling temp file, then rename it over the target.
    fn flush(&self) -> Result<()> {
        let _guard = self.flush_lock.lock();

        let bytes = {
            let objects = self.objects.read();
            let documents: IndexMap<&str, Document> = objects
                .iter()
                .map(|(key, record)| (key.as_str(), Document::from(record)))
                .collect();
            serde_json::to_vec(&documents)?
        };
        tracing::debug!("Flushing {} bytes to {}", bytes.len(), self.path.display());

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

impl StorageEngine for FileEngine {
    fn backend(&self) -> Backend {
        Backend::File
    }

    fn begin(self: Arc<Self>) -> Box<dyn UnitOfWork> {
        Box::new(FileSession { engine: self })
    }
}

/// Remove `root` and, transitively, everything it owns. Deleted amenities are
/// also dropped from every place's amenity list.
fn cascade_delete(objects: &mut IndexMap<String, Record>, root: &Record) {
    let mut pending = vec![(root.kind(), root.id().to_string())];

    while let Some((kind, id)) = pending.pop() {
        objects.shift_remove(&record_key(kind, &id));

        if kind == EntityKind::Amenity {
            for record in objects.values_mut() {
                if let Record::Place(place) = record {
                    place.amenity_ids.retain(|amenity_id| *amenity_id != id);
                }
            }
        }

        for record in objects.values() {
            let owned = kind.relationship(record.kind()) == Some(Relationship::Owns)
                && record.parent_id(kind) == Some(id.as_str());
            if owned {
                pending.push((record.kind(), record.id().to_string()));
            }
        }
    }
}

struct FileSession {
    engine: Arc<FileEngine>,
}

impl FileSession {
    fn place_amenity_ids(&self, place_id: &str) -> Result<Vec<String>> {
        match self.engine.objects.read().get(&record_key(EntityKind::Place, place_id)) {
            Some(Record::Place(place)) => Ok(place.amenity_ids.clone()),
            _ => bail!("place {} does not exist", place_id),
        }
    }
}

#[async_trait]
impl AmenityLinks for FileSession {
    async fn amenity_ids(&mut self, place_id: &str) -> Result<Vec<String>> {
        self.place_amenity_ids(place_id)
    }

    async fn link(&mut self, place_id: &str, amenity_id: &str) -> Result<bool> {
        let mut objects = self.engine.objects.write();
        match objects.get_mut(&record_key(EntityKind::Place, place_id)) {
            Some(Record::Place(place)) => {
                if place.amenity_ids.iter().any(|id| id == amenity_id) {
                    return Ok(false);
                }
                place.amenity_ids.push(amenity_id.to_string());
                Ok(true)
            }
            _ => bail!("place {} does not exist", place_id),
        }
    }

    async fn unlink(&mut self, place_id: &str, amenity_id: &str) -> Result<bool> {
        let mut objects = self.engine.objects.write();
        match objects.get_mut(&record_key(EntityKind::Place, place_id)) {
            Some(Record::Place(place)) => {
                let before = place.amenity_ids.len();
                place.amenity_ids.retain(|id| id != amenity_id);
                Ok(place.amenity_ids.len() != before)
            }
            _ => bail!("place {} does not exist", place_id),
        }
    }
}

#[async_trait]
impl UnitOfWork for FileSession {
    async fn all(&mut self, kind: Option<EntityKind>) -> Result<IndexMap<String, Record>> {
        Ok(self
            .engine
            .objects
            .read()
            .iter()
            .filter(|(_, record)| kind.map_or(true, |kind| record.kind() == kind))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect())
    }

    async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Record>> {
        Ok(self.engine.objects.read().get(&record_key(kind, id)).cloned())
    }

    async fn new(&mut self, record: Record) -> Result<()> {
        self.engine.objects.write().insert(record.key(), record);
        Ok(())
    }

    async fn save(&mut self) -> Result<()> {
        self.engine.flush()
    }

    async fn delete(&mut self, record: &Record) -> Result<()> {
        tracing::debug!("Deleting {} and its dependents", record.key());
        cascade_delete(&mut self.engine.objects.write(), record);
        Ok(())
    }

    async fn count(&mut self, kind: Option<EntityKind>) -> Result<usize> {
        let objects = self.engine.objects.read();
        Ok(match kind {
            None => objects.len(),
            Some(kind) => objects.values().filter(|record| record.kind() == kind).count(),
        })
    }

    async fn related(&mut self, parent: &Record, kind: EntityKind) -> Result<Vec<Record>> {
        let relationship = parent
            .kind()
            .relationship(kind)
            .ok_or_else(|| anyhow!("{} has no relationship to {}", parent.kind(), kind))?;

        let objects = self.engine.objects.read();
        let records = match (relationship, parent) {
            (Relationship::Owns, _) => objects
                .values()
                .filter(|record| {
                    record.kind() == kind && record.parent_id(parent.kind()) == Some(parent.id())
                })
                .cloned()
                .collect(),
            (Relationship::Association, Record::Place(_)) => {
                match objects.get(&record_key(EntityKind::Place, parent.id())) {
                    Some(Record::Place(stored)) => stored
                        .amenity_ids
                        .iter()
                        .filter_map(|id| objects.get(&record_key(EntityKind::Amenity, id)))
                        .cloned()
                        .collect(),
                    _ => Vec::new(),
                }
            }
            (Relationship::Association, _) => objects
                .values()
                .filter(|record| match record {
                    Record::Place(place) => place.amenity_ids.iter().any(|id| id == parent.id()),
                    _ => false,
                })
                .cloned()
                .collect(),
        };
        Ok(records)
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
