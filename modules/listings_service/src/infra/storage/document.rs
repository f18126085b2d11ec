//! JSON document format of the file engine
//!
//! The file holds one object mapping `"<TypeName>.<id>"` to a record document.
//! Each document carries its type in `__class__` and its timestamps as ISO strings.

use crate::contract::model::{format_timestamp, parse_timestamp};
use crate::contract::{Amenity, City, Place, Record, Review, State, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod iso_timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "__class__")]
pub enum Document {
    State(StateDocument),
    City(CityDocument),
    User(UserDocument),
    Amenity(AmenityDocument),
    Place(PlaceDocument),
    Review(ReviewDocument),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDocument {
    pub id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDocument {
    pub id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub state_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    pub id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmenityDocument {
    pub id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDocument {
    pub id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub number_rooms: i32,
    #[serde(default)]
    pub number_bathrooms: i32,
    #[serde(default)]
    pub max_guest: i32,
    #[serde(default)]
    pub price_by_night: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub amenity_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl From<&Record> for Document {
    fn from(record: &Record) -> Self {
        match record.clone() {
            Record::State(s) => Document::State(StateDocument {
                id: s.id,
                created_at: s.created_at,
                updated_at: s.updated_at,
                name: s.name,
            }),
            Record::City(c) => Document::City(CityDocument {
                id: c.id,
                created_at: c.created_at,
                updated_at: c.updated_at,
                state_id: c.state_id,
                name: c.name,
            }),
            Record::User(u) => Document::User(UserDocument {
                id: u.id,
                created_at: u.created_at,
                updated_at: u.updated_at,
                email: u.email,
                password: u.password,
                first_name: u.first_name,
                last_name: u.last_name,
            }),
            Record::Amenity(a) => Document::Amenity(AmenityDocument {
                id: a.id,
                created_at: a.created_at,
                updated_at: a.updated_at,
                name: a.name,
            }),
            Record::Place(p) => Document::Place(PlaceDocument {
                id: p.id,
                created_at: p.created_at,
                updated_at: p.updated_at,
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
            }),
            Record::Review(r) => Document::Review(ReviewDocument {
                id: r.id,
                created_at: r.created_at,
                updated_at: r.updated_at,
                place_id: r.place_id,
                user_id: r.user_id,
                text: r.text,
            }),
        }
    }
}

impl From<Document> for Record {
    fn from(document: Document) -> Self {
        match document {
            Document::State(d) => Record::State(State {
                id: d.id,
                created_at: d.created_at,
                updated_at: d.updated_at,
                name: d.name,
            }),
            Document::City(d) => Record::City(City {
                id: d.id,
                created_at: d.created_at,
                updated_at: d.updated_at,
                state_id: d.state_id,
                name: d.name,
            }),
            Document::User(d) => Record::User(User {
                id: d.id,
                created_at: d.created_at,
                updated_at: d.updated_at,
                email: d.email,
                password: d.password,
                first_name: d.first_name,
                last_name: d.last_name,
            }),
            Document::Amenity(d) => Record::Amenity(Amenity {
                id: d.id,
                created_at: d.created_at,
                updated_at: d.updated_at,
                name: d.name,
            }),
            Document::Place(d) => Record::Place(Place {
                id: d.id,
                created_at: d.created_at,
                updated_at: d.updated_at,
                city_id: d.city_id,
                user_id: d.user_id,
                name: d.name,
                description: d.description,
                number_rooms: d.number_rooms,
                number_bathrooms: d.number_bathrooms,
                max_guest: d.max_guest,
                price_by_night: d.price_by_night,
                latitude: d.latitude,
                longitude: d.longitude,
                amenity_ids: d.amenity_ids,
            }),
            Document::Review(d) => Record::Review(Review {
                id: d.id,
                created_at: d.created_at,
                updated_at: d.updated_at,
                place_id: d.place_id,
                user_id: d.user_id,
                text: d.text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_carries_class_and_iso_timestamps() {
        let state = State::new("Oregon");
        let value = serde_json::to_value(Document::from(&Record::from(state.clone()))).unwrap();

        assert_eq!(value["__class__"], "State");
        assert_eq!(value["id"], state.id.as_str());
        assert_eq!(value["created_at"], format_timestamp(&state.created_at).as_str());
    }

    #[test]
    fn test_reads_hand_written_document() {
        let value = json!({
            "__class__": "Place",
            "id": "p1",
            "created_at": "2017-09-28T21:05:54.119427",
            "updated_at": "2017-09-28T21:05:54",
            "city_id": "c1",
            "user_id": "u1",
            "name": "Loft",
            "extra": "ignored"
        });
        let record = Record::from(serde_json::from_value::<Document>(value).unwrap());

        match record {
            Record::Place(place) => {
                assert_eq!(place.id, "p1");
                assert_eq!(place.number_rooms, 0);
                assert!(place.amenity_ids.is_empty());
                assert_eq!(format_timestamp(&place.created_at), "2017-09-28T21:05:54.119427");
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let value = json!({"__class__": "BaseModel", "id": "x"});
        assert!(serde_json::from_value::<Document>(value).is_err());
    }
}
