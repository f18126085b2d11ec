//! Storage traits for data access
//!
//! These traits define the seam both storage engines implement.
//! Implementations are in infra/storage (file.rs and relational.rs).

use crate::contract::{EntityKind, Record};
use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

/// Which engine backs a storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    File,
    Relational,
}

/// A storage engine, opened once at startup and shared by every request
pub trait StorageEngine: Send + Sync {
    fn backend(&self) -> Backend;

    /// Check out a unit of work. Engine state is shared; the unit of work
    /// owns whatever per-request resources the engine needs.
    fn begin(self: Arc<Self>) -> Box<dyn UnitOfWork>;
}

/// Place <-> Amenity association
///
/// The file engine keeps ids on the place record, the relational engine keeps
/// rows in an association table. Callers never need to know which.
#[async_trait]
pub trait AmenityLinks: Send {
    /// Ids of amenities linked to the place. Errors if the place does not exist.
    async fn amenity_ids(&mut self, place_id: &str) -> Result<Vec<String>>;

    /// Link an amenity to a place. Returns false if the link already existed.
    async fn link(&mut self, place_id: &str, amenity_id: &str) -> Result<bool>;

    /// Remove a link. Returns false if there was nothing to remove.
    async fn unlink(&mut self, place_id: &str, amenity_id: &str) -> Result<bool>;
}

/// One request's view of storage
///
/// Pending changes are visible to later reads on the same unit of work.
/// They become durable on [`save`](UnitOfWork::save); [`close`](UnitOfWork::close)
/// discards anything not saved where the engine can.
#[async_trait]
pub trait UnitOfWork: AmenityLinks {
    /// All records, optionally restricted to one kind, keyed `"<TypeName>.<id>"`
    async fn all(&mut self, kind: Option<EntityKind>) -> Result<IndexMap<String, Record>>;

    async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Record>>;

    /// Register a record, replacing any record with the same key
    async fn new(&mut self, record: Record) -> Result<()>;

    async fn save(&mut self) -> Result<()>;

    /// Remove a record together with everything it owns
    async fn delete(&mut self, record: &Record) -> Result<()>;

    async fn count(&mut self, kind: Option<EntityKind>) -> Result<usize>;

    /// Records of `kind` related to `parent`, through ownership or association
    async fn related(&mut self, parent: &Record, kind: EntityKind) -> Result<Vec<Record>>;

    async fn close(&mut self) -> Result<()>;
}
