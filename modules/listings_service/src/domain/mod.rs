//! Domain layer - business logic, storage seam and services

pub mod repository;
pub mod service;
pub mod storage;
pub mod validation;

pub use repository::{AmenityLinks, Backend, StorageEngine, UnitOfWork};
pub use service::{LinkOutcome, PlaceSearch, Service};
pub use storage::{Session, Storage};
