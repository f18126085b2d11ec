//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{amenity, city, place, place_amenity, review, state, user};
use crate::contract::{Amenity, City, Place, Review, State, User};
use sea_orm::ActiveValue::Set;

// ===== State =====

impl From<state::Model> for State {
    fn from(m: state::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            name: m.name,
        }
    }
}

impl From<&State> for state::ActiveModel {
    fn from(s: &State) -> Self {
        Self {
            id: Set(s.id.clone()),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
            name: Set(s.name.clone()),
        }
    }
}

// ===== City =====

impl From<city::Model> for City {
    fn from(m: city::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            state_id: m.state_id,
            name: m.name,
        }
    }
}

impl From<&City> for city::ActiveModel {
    fn from(c: &City) -> Self {
        Self {
            id: Set(c.id.clone()),
            created_at: Set(c.created_at),
            updated_at: Set(c.updated_at),
            state_id: Set(c.state_id.clone()),
            name: Set(c.name.clone()),
        }
    }
}

// ===== User =====

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            email: m.email,
            password: m.password,
            first_name: m.first_name,
            last_name: m.last_name,
        }
    }
}

impl From<&User> for user::ActiveModel {
    fn from(u: &User) -> Self {
        Self {
            id: Set(u.id.clone()),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
            email: Set(u.email.clone()),
            password: Set(u.password.clone()),
            first_name: Set(u.first_name.clone()),
            last_name: Set(u.last_name.clone()),
        }
    }
}

// ===== Amenity =====

impl From<amenity::Model> for Amenity {
    fn from(m: amenity::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            name: m.name,
        }
    }
}

impl From<&Amenity> for amenity::ActiveModel {
    fn from(a: &Amenity) -> Self {
        Self {
            id: Set(a.id.clone()),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
            name: Set(a.name.clone()),
        }
    }
}

// ===== Place =====

/// Build a place from its row and the ids found in `place_amenity`.
pub fn place_from_model(m: place::Model, amenity_ids: Vec<String>) -> Place {
    Place {
        id: m.id,
        created_at: m.created_at,
        updated_at: m.updated_at,
        city_id: m.city_id,
        user_id: m.user_id,
        name: m.name,
        description: m.description,
        number_rooms: m.number_rooms,
        number_bathrooms: m.number_bathrooms,
        max_guest: m.max_guest,
        price_by_night: m.price_by_night,
        latitude: m.latitude,
        longitude: m.longitude,
        amenity_ids,
    }
}

/// `amenity_ids` is not a column; links are written through `place_amenity`.
impl From<&Place> for place::ActiveModel {
    fn from(p: &Place) -> Self {
        Self {
            id: Set(p.id.clone()),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
            city_id: Set(p.city_id.clone()),
            user_id: Set(p.user_id.clone()),
            name: Set(p.name.clone()),
            description: Set(p.description.clone()),
            number_rooms: Set(p.number_rooms),
            number_bathrooms: Set(p.number_bathrooms),
            max_guest: Set(p.max_guest),
            price_by_night: Set(p.price_by_night),
            latitude: Set(p.latitude),
            longitude: Set(p.longitude),
        }
    }
}

pub fn link_model(place_id: &str, amenity_id: &str, position: i32) -> place_amenity::ActiveModel {
    place_amenity::ActiveModel {
        place_id: Set(place_id.to_string()),
        amenity_id: Set(amenity_id.to_string()),
        position: Set(position),
    }
}

// ===== Review =====

impl From<review::Model> for Review {
    fn from(m: review::Model) -> Self {
        Self {
            id: m.id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            place_id: m.place_id,
            user_id: m.user_id,
            text: m.text,
        }
    }
}

impl From<&Review> for review::ActiveModel {
    fn from(r: &Review) -> Self {
        Self {
            id: Set(r.id.clone()),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
            place_id: Set(r.place_id.clone()),
            user_id: Set(r.user_id.clone()),
            text: Set(r.text.clone()),
        }
    }
}
