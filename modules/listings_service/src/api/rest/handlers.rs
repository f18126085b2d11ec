//! HTTP request handlers - thin layer that delegates to domain service
//!
//! Bodies are taken as raw bytes so that malformed JSON, missing fields and
//! wrongly typed fields each get their own error.

use super::dto::*;
use super::error::ApiError;
use super::mapper::Patch;
use crate::contract::{Amenity, City, Entity, EntityKind, ListingsError, Place, State, User};
use crate::domain::{validation, LinkOutcome, Service};
use axum::{
    body::Bytes,
    extract::Path,
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Parse a request body: JSON object first, then required fields, then field types.
pub fn decode<R: RequestSchema>(body: &[u8]) -> Result<R, ApiError> {
    let object = validation::parse_json_object(body)?;
    validation::require_fields(&object, R::REQUIRED)?;
    serde_json::from_value(Value::Object(object)).map_err(|e| {
        ListingsError::Validation {
            message: format!("Invalid field: {}", e),
        }
        .into()
    })
}

/// Places and reviews name their owner first: `user_id` must be present and
/// refer to an existing user before any other field is looked at.
async fn check_owner(service: &Service, body: &[u8]) -> Result<(), ApiError> {
    let object = validation::parse_json_object(body)?;
    validation::require_fields(&object, &["user_id"])?;
    let user_id = match object.get("user_id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => return Err(ListingsError::missing("user_id").into()),
    };
    service.get::<User>(&user_id).await?;
    Ok(())
}

// ===== Service endpoints =====

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

pub async fn stats(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let mut stats = StatsResponse::default();
    for (kind, count) in service.stats().await? {
        match kind {
            EntityKind::Amenity => stats.amenities = count,
            EntityKind::City => stats.cities = count,
            EntityKind::Place => stats.places = count,
            EntityKind::Review => stats.reviews = count,
            EntityKind::State => stats.states = count,
            EntityKind::User => stats.users = count,
        }
    }
    Ok(Json(stats))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

// ===== Generic record endpoints =====

/// `GET /<collection>`
pub async fn list<T, D>(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<Vec<D>>, ApiError>
where
    T: Entity,
    D: From<T> + Serialize,
{
    let items = service.list::<T>().await?;
    Ok(Json(items.into_iter().map(D::from).collect()))
}

/// `GET /<collection>/{id}`
pub async fn show<T, D>(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<D>, ApiError>
where
    T: Entity,
    D: From<T> + Serialize,
{
    let item = service.get::<T>(&id).await?;
    Ok(Json(D::from(item)))
}

/// `PUT /<collection>/{id}`
pub async fn update<T, R, D>(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<D>, ApiError>
where
    T: Entity,
    R: RequestSchema + Patch<T> + Send + 'static,
    D: From<T> + Serialize,
{
    service.get::<T>(&id).await?;
    let req: R = decode(&body)?;
    let item = service.update::<T, _>(&id, move |item| req.apply(item)).await?;
    Ok(Json(D::from(item)))
}

/// `DELETE /<collection>/{id}`
pub async fn destroy<T: Entity>(
    Extension(service): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    service.delete::<T>(&id).await?;
    Ok(Json(json!({})))
}

/// `GET /<parents>/{id}/<children>`
pub async fn children<P, C, D>(
    Extension(service): Extension<Arc<Service>>,
    Path(parent_id): Path<String>,
) -> Result<Json<Vec<D>>, ApiError>
where
    P: Entity,
    C: Entity,
    D: From<C> + Serialize,
{
    let items = service.children::<P, C>(&parent_id).await?;
    Ok(Json(items.into_iter().map(D::from).collect()))
}

// ===== Creates =====

pub async fn create_state(
    Extension(service): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StateDto>), ApiError> {
    let req: NamedRequest = decode(&body)?;
    let state = service.create(State::new(req.name)).await?;
    Ok((StatusCode::CREATED, Json(state.into())))
}

pub async fn create_amenity(
    Extension(service): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AmenityDto>), ApiError> {
    let req: NamedRequest = decode(&body)?;
    let amenity = service.create(Amenity::new(req.name)).await?;
    Ok((StatusCode::CREATED, Json(amenity.into())))
}

pub async fn create_user(
    Extension(service): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let req: CreateUserRequest = decode(&body)?;
    let user = service.create(User::from(req)).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn create_city(
    Extension(service): Extension<Arc<Service>>,
    Path(state_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<CityDto>), ApiError> {
    service.get::<State>(&state_id).await?;
    let req: NamedRequest = decode(&body)?;
    let city = service.create(City::new(&state_id, req.name)).await?;
    Ok((StatusCode::CREATED, Json(city.into())))
}

pub async fn create_place(
    Extension(service): Extension<Arc<Service>>,
    Path(city_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<PlaceDto>), ApiError> {
    service.get::<City>(&city_id).await?;
    check_owner(&service, &body).await?;
    let req: CreatePlaceRequest = decode(&body)?;
    let place = service.create(req.into_place(&city_id)).await?;
    Ok((StatusCode::CREATED, Json(place.into())))
}

pub async fn create_review(
    Extension(service): Extension<Arc<Service>>,
    Path(place_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ReviewDto>), ApiError> {
    service.get::<Place>(&place_id).await?;
    check_owner(&service, &body).await?;
    let req: CreateReviewRequest = decode(&body)?;
    let review = service.create(req.into_review(&place_id)).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

// ===== Places =====

pub async fn places_search(
    Extension(service): Extension<Arc<Service>>,
    body: Bytes,
) -> Result<Json<Vec<PlaceDto>>, ApiError> {
    let req: PlacesSearchRequest = decode(&body)?;
    let places = service.search_places(&req.into()).await?;
    Ok(Json(places.into_iter().map(PlaceDto::from).collect()))
}

pub async fn link_amenity(
    Extension(service): Extension<Arc<Service>>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<AmenityDto>), ApiError> {
    let (status, amenity) = match service.link_amenity(&place_id, &amenity_id).await? {
        LinkOutcome::Linked(amenity) => (StatusCode::CREATED, amenity),
        LinkOutcome::AlreadyLinked(amenity) => (StatusCode::OK, amenity),
    };
    Ok((status, Json(amenity.into())))
}

pub async fn unlink_amenity(
    Extension(service): Extension<Arc<Service>>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    service.unlink_amenity(&place_id, &amenity_id).await?;
    Ok(Json(json!({})))
}
