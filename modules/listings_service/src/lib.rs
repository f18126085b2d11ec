//! Listings Service Module
//!
//! REST API over states, cities, places, amenities, users and reviews.
//! Records live either in a single JSON document or in a relational database;
//! both engines sit behind the same storage facade.

// Public exports
pub mod contract;
pub use contract::{
    Amenity, City, Entity, EntityKind, ListingsError, Place, Record, Review, State, User,
};

pub mod config;
pub use config::{Config, StorageType};

pub mod module;
pub use module::ListingsServiceModule;

pub mod domain;
pub mod infra;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
