//! Route registration and OpenAPI document

use super::dto::*;
use super::error::ErrorBody;
use super::handlers::{self, children, destroy, list, show, update};
use crate::contract::{Amenity, City, Place, Review, State, User};
use crate::domain::Service;
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Every API route is mounted under this prefix
pub const API_PREFIX: &str = "/api/v1";

#[derive(OpenApi)]
#[openapi(
    info(title = "Listings API", description = "States, cities, places, amenities, users and reviews"),
    components(schemas(
        StateDto,
        CityDto,
        UserDto,
        AmenityDto,
        PlaceDto,
        ReviewDto,
        NamedRequest,
        NamedUpdateRequest,
        CreateUserRequest,
        UpdateUserRequest,
        CreatePlaceRequest,
        UpdatePlaceRequest,
        CreateReviewRequest,
        UpdateReviewRequest,
        PlacesSearchRequest,
        StatusResponse,
        StatsResponse,
        ErrorBody,
    ))
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Register all REST routes on `router`
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route("/status", get(handlers::status))
        .route("/stats", get(handlers::stats))
        .route("/openapi.json", get(openapi))
        // States
        .route(
            "/states",
            get(list::<State, StateDto>).post(handlers::create_state),
        )
        .route(
            "/states/{state_id}",
            get(show::<State, StateDto>)
                .put(update::<State, NamedUpdateRequest, StateDto>)
                .delete(destroy::<State>),
        )
        .route(
            "/states/{state_id}/cities",
            get(children::<State, City, CityDto>).post(handlers::create_city),
        )
        // Cities
        .route(
            "/cities/{city_id}",
            get(show::<City, CityDto>)
                .put(update::<City, NamedUpdateRequest, CityDto>)
                .delete(destroy::<City>),
        )
        .route(
            "/cities/{city_id}/places",
            get(children::<City, Place, PlaceDto>).post(handlers::create_place),
        )
        // Amenities
        .route(
            "/amenities",
            get(list::<Amenity, AmenityDto>).post(handlers::create_amenity),
        )
        .route(
            "/amenities/{amenity_id}",
            get(show::<Amenity, AmenityDto>)
                .put(update::<Amenity, NamedUpdateRequest, AmenityDto>)
                .delete(destroy::<Amenity>),
        )
        // Users
        .route(
            "/users",
            get(list::<User, UserDto>).post(handlers::create_user),
        )
        .route(
            "/users/{user_id}",
            get(show::<User, UserDto>)
                .put(update::<User, UpdateUserRequest, UserDto>)
                .delete(destroy::<User>),
        )
        // Places
        .route(
            "/places/{place_id}",
            get(show::<Place, PlaceDto>)
                .put(update::<Place, UpdatePlaceRequest, PlaceDto>)
                .delete(destroy::<Place>),
        )
        .route(
            "/places/{place_id}/reviews",
            get(children::<Place, Review, ReviewDto>).post(handlers::create_review),
        )
        .route(
            "/places/{place_id}/amenities",
            get(children::<Place, Amenity, AmenityDto>),
        )
        .route(
            "/places/{place_id}/amenities/{amenity_id}",
            post(handlers::link_amenity).delete(handlers::unlink_amenity),
        )
        .route("/places_search", post(handlers::places_search))
        // Reviews
        .route(
            "/reviews/{review_id}",
            get(show::<Review, ReviewDto>)
                .put(update::<Review, UpdateReviewRequest, ReviewDto>)
                .delete(destroy::<Review>),
        )
        // Add service as extension for handlers
        .layer(Extension(service))
}

/// The served application: a trailing slash is dropped before routing, so
/// `/api/v1/status/` and `/api/v1/status` are the same route.
pub type App = NormalizePath<Router>;

pub fn build_app(service: Arc<Service>) -> App {
    NormalizePath::trim_trailing_slash(build_router(service))
}

/// API routes under [`API_PREFIX`], JSON 404 for everything else, permissive
/// CORS and per-request tracing.
pub fn build_router(service: Arc<Service>) -> Router {
    let api = register_routes(Router::new(), service);

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
