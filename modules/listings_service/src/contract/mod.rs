//! Contract layer - public types shared by every other layer
//!
//! This layer contains transport-agnostic models and the domain error type.
//! NO serde derives on models - these are pure domain types.

pub mod error;
pub mod model;

pub use error::ListingsError;
pub use model::{
    Amenity, City, Entity, EntityKind, Place, Record, Relationship, Review, State, User,
};
