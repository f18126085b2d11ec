//! Domain service - business logic orchestration
//!
//! Every operation runs in its own session, opened at the start and closed at
//! the end whether or not the operation succeeded.

use super::storage::{Session, Storage};
use crate::contract::{Amenity, City, Entity, EntityKind, ListingsError, Place, State};
use indexmap::IndexMap;

/// Outcome of linking an amenity to a place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was stored
    Linked(Amenity),
    /// The amenity was already linked; nothing changed
    AlreadyLinked(Amenity),
}

impl LinkOutcome {
    pub fn amenity(&self) -> &Amenity {
        match self {
            Self::Linked(amenity) | Self::AlreadyLinked(amenity) => amenity,
        }
    }

    pub fn into_amenity(self) -> Amenity {
        match self {
            Self::Linked(amenity) | Self::AlreadyLinked(amenity) => amenity,
        }
    }
}

/// Place search filter. Empty lists mean "no constraint".
#[derive(Debug, Clone, Default)]
pub struct PlaceSearch {
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub amenities: Vec<String>,
}

impl PlaceSearch {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.cities.is_empty() && self.amenities.is_empty()
    }
}

/// Domain service for listings
pub struct Service {
    storage: Storage,
}

impl Service {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ===== Generic record operations =====

    /// All records of one type
    pub async fn list<T: Entity>(&self) -> Result<Vec<T>, ListingsError> {
        let mut session = self.storage.session();
        let result = session.all_of::<T>().await.map_err(internal);
        finish(session).await;
        result
    }

    /// One record by id
    pub async fn get<T: Entity>(&self, id: &str) -> Result<T, ListingsError> {
        let mut session = self.storage.session();
        let result = fetch::<T>(&mut session, id).await;
        finish(session).await;
        result
    }

    /// Store a new record after checking that everything it references exists
    pub async fn create<T: Entity>(&self, entity: T) -> Result<T, ListingsError> {
        let mut session = self.storage.session();
        let result = create_in(&mut session, entity).await;
        finish(session).await;
        result
    }

    /// Apply `patch` to a stored record, refresh `updated_at` and save it
    pub async fn update<T, F>(&self, id: &str, patch: F) -> Result<T, ListingsError>
    where
        T: Entity,
        F: FnOnce(&mut T) + Send,
    {
        let mut session = self.storage.session();
        let result = update_in(&mut session, id, patch).await;
        finish(session).await;
        result
    }

    /// Delete a record and everything it owns
    pub async fn delete<T: Entity>(&self, id: &str) -> Result<(), ListingsError> {
        let mut session = self.storage.session();
        let result = delete_in::<T>(&mut session, id).await;
        finish(session).await;
        result
    }

    /// Records of type `C` belonging to (or associated with) the `P` record `parent_id`
    pub async fn children<P: Entity, C: Entity>(
        &self,
        parent_id: &str,
    ) -> Result<Vec<C>, ListingsError> {
        let mut session = self.storage.session();
        let result = children_in::<P, C>(&mut session, parent_id).await;
        finish(session).await;
        result
    }

    // ===== Place <-> Amenity =====

    pub async fn place_amenities(&self, place_id: &str) -> Result<Vec<Amenity>, ListingsError> {
        self.children::<Place, Amenity>(place_id).await
    }

    pub async fn link_amenity(
        &self,
        place_id: &str,
        amenity_id: &str,
    ) -> Result<LinkOutcome, ListingsError> {
        let mut session = self.storage.session();
        let result = link_in(&mut session, place_id, amenity_id).await;
        finish(session).await;
        result
    }

    pub async fn unlink_amenity(&self, place_id: &str, amenity_id: &str) -> Result<(), ListingsError> {
        let mut session = self.storage.session();
        let result = unlink_in(&mut session, place_id, amenity_id).await;
        finish(session).await;
        result
    }

    // ===== Queries =====

    /// Places matching a search filter, without duplicates, in discovery order
    pub async fn search_places(&self, filter: &PlaceSearch) -> Result<Vec<Place>, ListingsError> {
        let mut session = self.storage.session();
        let result = search_in(&mut session, filter).await;
        finish(session).await;
        result
    }

    /// Record counts per type, in type order
    pub async fn stats(&self) -> Result<Vec<(EntityKind, usize)>, ListingsError> {
        let mut session = self.storage.session();
        let result = stats_in(&mut session).await;
        finish(session).await;
        result
    }
}

// ===== Session-scoped steps =====

fn internal(error: anyhow::Error) -> ListingsError {
    tracing::error!("Storage error: {:#}", error);
    ListingsError::Internal
}

async fn finish(session: Session) {
    if let Err(error) = session.close().await {
        tracing::warn!("Failed to close storage session: {:#}", error);
    }
}

async fn fetch<T: Entity>(session: &mut Session, id: &str) -> Result<T, ListingsError> {
    session
        .get_as::<T>(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ListingsError::not_found(T::KIND, id))
}

async fn create_in<T: Entity>(session: &mut Session, entity: T) -> Result<T, ListingsError> {
    for (kind, id) in entity.references() {
        if session.get(kind, &id).await.map_err(internal)?.is_none() {
            tracing::warn!("{} references missing {} {}", T::KIND, kind, id);
            return Err(ListingsError::not_found(kind, id));
        }
    }
    session.new(entity.clone().into_record()).await.map_err(internal)?;
    session.save().await.map_err(internal)?;
    Ok(entity)
}

async fn update_in<T, F>(session: &mut Session, id: &str, patch: F) -> Result<T, ListingsError>
where
    T: Entity,
    F: FnOnce(&mut T) + Send,
{
    let mut entity = fetch::<T>(session, id).await?;
    patch(&mut entity);
    entity.touch();
    session.new(entity.clone().into_record()).await.map_err(internal)?;
    session.save().await.map_err(internal)?;
    Ok(entity)
}

async fn delete_in<T: Entity>(session: &mut Session, id: &str) -> Result<(), ListingsError> {
    let entity = fetch::<T>(session, id).await?;
    session.delete(entity.into_record()).await.map_err(internal)?;
    session.save().await.map_err(internal)
}

async fn children_in<P: Entity, C: Entity>(
    session: &mut Session,
    parent_id: &str,
) -> Result<Vec<C>, ListingsError> {
    let parent = fetch::<P>(session, parent_id).await?;
    session
        .related::<C>(&parent.into_record())
        .await
        .map_err(internal)
}

async fn link_in(
    session: &mut Session,
    place_id: &str,
    amenity_id: &str,
) -> Result<LinkOutcome, ListingsError> {
    let place = fetch::<Place>(session, place_id).await?;
    let amenity = fetch::<Amenity>(session, amenity_id).await?;

    if !session.link(&place.id, &amenity.id).await.map_err(internal)? {
        return Ok(LinkOutcome::AlreadyLinked(amenity));
    }
    session.save().await.map_err(internal)?;
    Ok(LinkOutcome::Linked(amenity))
}

async fn unlink_in(
    session: &mut Session,
    place_id: &str,
    amenity_id: &str,
) -> Result<(), ListingsError> {
    let place = fetch::<Place>(session, place_id).await?;
    let amenity = fetch::<Amenity>(session, amenity_id).await?;

    if !session.unlink(&place.id, &amenity.id).await.map_err(internal)? {
        tracing::warn!("Amenity {} is not linked to place {}", amenity.id, place.id);
        return Err(ListingsError::NotFound {
            resource: "PlaceAmenity".to_string(),
            id: format!("{}/{}", place.id, amenity.id),
        });
    }
    session.save().await.map_err(internal)
}

async fn search_in(session: &mut Session, filter: &PlaceSearch) -> Result<Vec<Place>, ListingsError> {
    let mut found: IndexMap<String, Place> = IndexMap::new();

    if filter.states.is_empty() && filter.cities.is_empty() {
        for place in session.all_of::<Place>().await.map_err(internal)? {
            found.insert(place.id.clone(), place);
        }
    } else {
        let mut cities = Vec::new();
        for state_id in &filter.states {
            if let Some(state) = session.get_as::<State>(state_id).await.map_err(internal)? {
                let state_cities = session
                    .related::<City>(&state.into_record())
                    .await
                    .map_err(internal)?;
                cities.extend(state_cities);
            }
        }
        for city_id in &filter.cities {
            if let Some(city) = session.get_as::<City>(city_id).await.map_err(internal)? {
                cities.push(city);
            }
        }
        for city in cities {
            let places = session
                .related::<Place>(&city.into_record())
                .await
                .map_err(internal)?;
            for place in places {
                found.entry(place.id.clone()).or_insert(place);
            }
        }
    }

    if !filter.amenities.is_empty() {
        found.retain(|_, place| place.has_amenities(&filter.amenities));
    }
    Ok(found.into_values().collect())
}

async fn stats_in(session: &mut Session) -> Result<Vec<(EntityKind, usize)>, ListingsError> {
    let mut counts = Vec::new();
    for kind in EntityKind::all() {
        let count = session
            .count_by_name(Some(kind.as_str()))
            .await
            .map_err(internal)?;
        counts.push((*kind, count));
    }
    Ok(counts)
}
