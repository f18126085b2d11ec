//! REST DTOs with serde derives for HTTP API
//!
//! Timestamps go out as ISO-8601 strings without offset, and every record carries
//! its type name in `__class__`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request bodies declare the fields that must be present before they are decoded.
pub trait RequestSchema: serde::de::DeserializeOwned {
    /// Required fields, in the order they are checked
    const REQUIRED: &'static [&'static str];
}

// ===== Record DTOs =====

/// State response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateDto {
    #[serde(rename = "__class__")]
    #[schema(example = "State")]
    pub class: String,
    pub id: String,
    #[schema(example = "2017-09-28T21:05:54.119427")]
    pub created_at: String,
    pub updated_at: String,
    #[schema(example = "California")]
    pub name: String,
}

/// City response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityDto {
    #[serde(rename = "__class__")]
    pub class: String,
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub state_id: String,
    #[schema(example = "San Francisco")]
    pub name: String,
}

/// User response DTO. The password is never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    #[serde(rename = "__class__")]
    pub class: String,
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    #[schema(example = "guest@example.com")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Amenity response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AmenityDto {
    #[serde(rename = "__class__")]
    pub class: String,
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    #[schema(example = "Wifi")]
    pub name: String,
}

/// Place response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceDto {
    #[serde(rename = "__class__")]
    pub class: String,
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub city_id: String,
    pub user_id: String,
    #[schema(example = "Cozy loft")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub number_rooms: i32,
    pub number_bathrooms: i32,
    pub max_guest: i32,
    pub price_by_night: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub amenity_ids: Vec<String>,
}

/// Review response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewDto {
    #[serde(rename = "__class__")]
    pub class: String,
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

// ===== Request bodies =====

/// Create body for states, cities and amenities
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NamedRequest {
    pub name: String,
}

impl RequestSchema for NamedRequest {
    const REQUIRED: &'static [&'static str] = &["name"];
}

/// Update body for states, cities and amenities
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NamedUpdateRequest {
    pub name: Option<String>,
}

impl RequestSchema for NamedUpdateRequest {
    const REQUIRED: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RequestSchema for CreateUserRequest {
    const REQUIRED: &'static [&'static str] = &["email", "password"];
}

/// User update. The email cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RequestSchema for UpdateUserRequest {
    const REQUIRED: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePlaceRequest {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: Option<i32>,
    pub number_bathrooms: Option<i32>,
    pub max_guest: Option<i32>,
    pub price_by_night: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RequestSchema for CreatePlaceRequest {
    const REQUIRED: &'static [&'static str] = &["user_id", "name"];
}

/// Place update. Owner and city cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePlaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub number_rooms: Option<i32>,
    pub number_bathrooms: Option<i32>,
    pub max_guest: Option<i32>,
    pub price_by_night: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RequestSchema for UpdatePlaceRequest {
    const REQUIRED: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub user_id: String,
    pub text: String,
}

impl RequestSchema for CreateReviewRequest {
    const REQUIRED: &'static [&'static str] = &["user_id", "text"];
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
}

impl RequestSchema for UpdateReviewRequest {
    const REQUIRED: &'static [&'static str] = &[];
}

/// Place search filter. Absent, null and empty lists all mean "no constraint".
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PlacesSearchRequest {
    #[serde(default)]
    pub states: Option<Vec<String>>,
    #[serde(default)]
    pub cities: Option<Vec<String>>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
}

impl RequestSchema for PlacesSearchRequest {
    const REQUIRED: &'static [&'static str] = &[];
}

// ===== Service endpoints =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "OK")]
    pub status: String,
}

/// Record counts per collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub amenities: usize,
    pub cities: usize,
    pub places: usize,
    pub reviews: usize,
    pub states: usize,
    pub users: usize,
}
