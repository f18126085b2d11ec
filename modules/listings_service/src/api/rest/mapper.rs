//! Mapper implementations for converting between DTOs and contract models
//!
//! Responses are built from contract models; request bodies either build a new
//! model or patch an existing one.

use super::dto::*;
use crate::contract::model::format_timestamp;
use crate::contract::{self, Entity};
use crate::domain::PlaceSearch;

// ===== Responses =====

impl From<contract::State> for StateDto {
    fn from(s: contract::State) -> Self {
        Self {
            class: contract::State::KIND.to_string(),
            id: s.id,
            created_at: format_timestamp(&s.created_at),
            updated_at: format_timestamp(&s.updated_at),
            name: s.name,
        }
    }
}

impl From<contract::City> for CityDto {
    fn from(c: contract::City) -> Self {
        Self {
            class: contract::City::KIND.to_string(),
            id: c.id,
            created_at: format_timestamp(&c.created_at),
            updated_at: format_timestamp(&c.updated_at),
            state_id: c.state_id,
            name: c.name,
        }
    }
}

impl From<contract::User> for UserDto {
    fn from(u: contract::User) -> Self {
        Self {
            class: contract::User::KIND.to_string(),
            id: u.id,
            created_at: format_timestamp(&u.created_at),
            updated_at: format_timestamp(&u.updated_at),
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

impl From<contract::Amenity> for AmenityDto {
    fn from(a: contract::Amenity) -> Self {
        Self {
            class: contract::Amenity::KIND.to_string(),
            id: a.id,
            created_at: format_timestamp(&a.created_at),
            updated_at: format_timestamp(&a.updated_at),
            name: a.name,
        }
    }
}

impl From<contract::Place> for PlaceDto {
    fn from(p: contract::Place) -> Self {
        Self {
            class: contract::Place::KIND.to_string(),
            id: p.id,
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
            city_id: p.city_id,
            user_id: p.user_id,
            name: p.name,
            description: p.description,
            number_rooms: p.number_rooms,
            number_bathrooms: p.number_bathrooms,
            max_guest: p.max_guest,
            price_by_night: p.price_by_night,
            latitude: p.latitude,
            longitude: p.longitude,
            amenity_ids: p.amenity_ids,
        }
    }
}

impl From<contract::Review> for ReviewDto {
    fn from(r: contract::Review) -> Self {
        Self {
            class: contract::Review::KIND.to_string(),
            id: r.id,
            created_at: format_timestamp(&r.created_at),
            updated_at: format_timestamp(&r.updated_at),
            place_id: r.place_id,
            user_id: r.user_id,
            text: r.text,
        }
    }
}

// ===== Creates =====

impl From<CreateUserRequest> for contract::User {
    fn from(req: CreateUserRequest) -> Self {
        let mut user = contract::User::new(req.email, req.password);
        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user
    }
}

impl CreatePlaceRequest {
    pub fn into_place(self, city_id: &str) -> contract::Place {
        let mut place = contract::Place::new(city_id, self.user_id, self.name);
        place.description = self.description;
        place.number_rooms = self.number_rooms.unwrap_or_default();
        place.number_bathrooms = self.number_bathrooms.unwrap_or_default();
        place.max_guest = self.max_guest.unwrap_or_default();
        place.price_by_night = self.price_by_night.unwrap_or_default();
        place.latitude = self.latitude;
        place.longitude = self.longitude;
        place
    }
}

impl CreateReviewRequest {
    pub fn into_review(self, place_id: &str) -> contract::Review {
        contract::Review::new(place_id, self.user_id, self.text)
    }
}

// ===== Updates =====

/// Apply the fields present in an update body to a stored record.
pub trait Patch<T> {
    fn apply(self, target: &mut T);
}

impl Patch<contract::State> for NamedUpdateRequest {
    fn apply(self, target: &mut contract::State) {
        if let Some(name) = self.name {
            target.name = name;
        }
    }
}

impl Patch<contract::City> for NamedUpdateRequest {
    fn apply(self, target: &mut contract::City) {
        if let Some(name) = self.name {
            target.name = name;
        }
    }
}

impl Patch<contract::Amenity> for NamedUpdateRequest {
    fn apply(self, target: &mut contract::Amenity) {
        if let Some(name) = self.name {
            target.name = name;
        }
    }
}

impl Patch<contract::User> for UpdateUserRequest {
    fn apply(self, target: &mut contract::User) {
        if let Some(password) = self.password {
            target.password = password;
        }
        if self.first_name.is_some() {
            target.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            target.last_name = self.last_name;
        }
    }
}

impl Patch<contract::Place> for UpdatePlaceRequest {
    fn apply(self, target: &mut contract::Place) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if self.description.is_some() {
            target.description = self.description;
        }
        if let Some(rooms) = self.number_rooms {
            target.number_rooms = rooms;
        }
        if let Some(bathrooms) = self.number_bathrooms {
            target.number_bathrooms = bathrooms;
        }
        if let Some(guests) = self.max_guest {
            target.max_guest = guests;
        }
        if let Some(price) = self.price_by_night {
            target.price_by_night = price;
        }
        if self.latitude.is_some() {
            target.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            target.longitude = self.longitude;
        }
    }
}

impl Patch<contract::Review> for UpdateReviewRequest {
    fn apply(self, target: &mut contract::Review) {
        if let Some(text) = self.text {
            target.text = text;
        }
    }
}

// ===== Queries =====

impl From<PlacesSearchRequest> for PlaceSearch {
    fn from(req: PlacesSearchRequest) -> Self {
        Self {
            states: req.states.unwrap_or_default(),
            cities: req.cities.unwrap_or_default(),
            amenities: req.amenities.unwrap_or_default(),
        }
    }
}
