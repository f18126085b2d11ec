//! Storage facade
//!
//! [`Storage`] hides which engine is active; [`Session`] adds typed helpers on top
//! of a unit of work.

use super::repository::{Backend, StorageEngine, UnitOfWork};
use crate::contract::{Entity, EntityKind, Record};
use anyhow::Result;
use indexmap::IndexMap;
use std::sync::Arc;

/// Shared handle to the active storage engine
#[derive(Clone)]
pub struct Storage {
    engine: Arc<dyn StorageEngine>,
}

impl Storage {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    pub fn backend(&self) -> Backend {
        self.engine.backend()
    }

    /// Open a unit of work. Close it with [`Session::close`] when done.
    pub fn session(&self) -> Session {
        Session {
            uow: Arc::clone(&self.engine).begin(),
        }
    }
}

/// A unit of work with typed accessors
pub struct Session {
    uow: Box<dyn UnitOfWork>,
}

impl Session {
    pub async fn all(&mut self, kind: Option<EntityKind>) -> Result<IndexMap<String, Record>> {
        self.uow.all(kind).await
    }

    pub async fn all_of<T: Entity>(&mut self) -> Result<Vec<T>> {
        let records = self.uow.all(Some(T::KIND)).await?;
        Ok(records.into_values().filter_map(T::from_record).collect())
    }

    pub async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Record>> {
        self.uow.get(kind, id).await
    }

    pub async fn get_as<T: Entity>(&mut self, id: &str) -> Result<Option<T>> {
        Ok(self.uow.get(T::KIND, id).await?.and_then(T::from_record))
    }

    pub async fn new(&mut self, record: impl Into<Record>) -> Result<()> {
        self.uow.new(record.into()).await
    }

    pub async fn save(&mut self) -> Result<()> {
        self.uow.save().await
    }

    pub async fn delete(&mut self, record: impl Into<Record>) -> Result<()> {
        self.uow.delete(&record.into()).await
    }

    pub async fn count(&mut self, kind: Option<EntityKind>) -> Result<usize> {
        self.uow.count(kind).await
    }

    pub async fn count_of<T: Entity>(&mut self) -> Result<usize> {
        self.uow.count(Some(T::KIND)).await
    }

    /// Count by type name. An unknown name counts as zero.
    pub async fn count_by_name(&mut self, name: Option<&str>) -> Result<usize> {
        match name {
            None => self.uow.count(None).await,
            Some(name) => match EntityKind::parse(name) {
                Some(kind) => self.uow.count(Some(kind)).await,
                None => Ok(0),
            },
        }
    }

    pub async fn related<T: Entity>(&mut self, parent: &Record) -> Result<Vec<T>> {
        let records = self.uow.related(parent, T::KIND).await?;
        Ok(records.into_iter().filter_map(T::from_record).collect())
    }

    pub async fn amenity_ids(&mut self, place_id: &str) -> Result<Vec<String>> {
        self.uow.amenity_ids(place_id).await
    }

    pub async fn link(&mut self, place_id: &str, amenity_id: &str) -> Result<bool> {
        self.uow.link(place_id, amenity_id).await
    }

    pub async fn unlink(&mut self, place_id: &str, amenity_id: &str) -> Result<bool> {
        self.uow.unlink(place_id, amenity_id).await
    }

    pub async fn close(mut self) -> Result<()> {
        self.uow.close().await
    }
}
