//! Contract models for the listings service
//!
//! These models are transport-agnostic and shared by the domain, storage and REST layers.
//! NO serde derives - the JSON document format and the REST DTOs live next to their transports.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use std::fmt;

/// Current time truncated to the microsecond precision every backend can hold.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// ISO-8601 form used on the wire and in the file document, e.g. `2017-09-28T21:05:54.119427`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written by [`format_timestamp`]. The fraction is optional.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ===== Entity kinds =====

/// The six record types of the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    State,
    City,
    User,
    Amenity,
    Place,
    Review,
}

impl EntityKind {
    /// Type name as used in storage keys (`"<TypeName>.<id>"`) and `__class__`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::City => "City",
            Self::User => "User",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }

    /// Parse a type name. Names are case-sensitive, like the keys they come from.
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Plural collection name used by statistics reporting
    pub fn collection(&self) -> &'static str {
        match self {
            Self::State => "states",
            Self::City => "cities",
            Self::User => "users",
            Self::Amenity => "amenities",
            Self::Place => "places",
            Self::Review => "reviews",
        }
    }

    /// All kinds, in dependency order (parents before children).
    pub fn all() -> &'static [EntityKind] {
        &[
            Self::State,
            Self::City,
            Self::User,
            Self::Amenity,
            Self::Place,
            Self::Review,
        ]
    }

    /// How records of `child` kind hang off a record of this kind, if at all.
    pub fn relationship(self, child: EntityKind) -> Option<Relationship> {
        use EntityKind::*;
        match (self, child) {
            (State, City) | (City, Place) | (User, Place) | (User, Review) | (Place, Review) => {
                Some(Relationship::Owns)
            }
            (Place, Amenity) | (Amenity, Place) => Some(Relationship::Association),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship between two entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// One-to-many: the child carries a reference to the parent, deleted with it
    Owns,
    /// Many-to-many Place <-> Amenity association
    Association,
}

// ===== Entities =====

/// A state, owner of cities
#[derive(Debug, Clone)]
pub struct State {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

/// A city inside a state
#[derive(Debug, Clone)]
pub struct City {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state_id: String,
    pub name: String,
}

/// A user, owner of places and author of reviews
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// An amenity that places can offer
#[derive(Debug, Clone)]
pub struct Amenity {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
}

/// A rental listing in a city, owned by a user
#[derive(Debug, Clone)]
pub struct Place {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub city_id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub number_rooms: i32,
    pub number_bathrooms: i32,
    pub max_guest: i32,
    pub price_by_night: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Linked amenity ids. Authoritative for the file engine; the relational
    /// engine fills it from the association table on read.
    pub amenity_ids: Vec<String>,
}

/// A user's review of a place
#[derive(Debug, Clone)]
pub struct Review {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            name: name.into(),
        }
    }
}

impl City {
    pub fn new(state_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            state_id: state_id.into(),
            name: name.into(),
        }
    }
}

impl User {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }
}

impl Amenity {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            name: name.into(),
        }
    }
}

impl Place {
    pub fn new(
        city_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            city_id: city_id.into(),
            user_id: user_id.into(),
            name: name.into(),
            description: None,
            number_rooms: 0,
            number_bathrooms: 0,
            max_guest: 0,
            price_by_night: 0,
            latitude: None,
            longitude: None,
            amenity_ids: Vec::new(),
        }
    }

    /// Whether every one of `amenity_ids` is linked to this place.
    pub fn has_amenities(&self, amenity_ids: &[String]) -> bool {
        amenity_ids.iter().all(|id| self.amenity_ids.contains(id))
    }
}

impl Review {
    pub fn new(
        place_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let now = now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            place_id: place_id.into(),
            user_id: user_id.into(),
            text: text.into(),
        }
    }
}

// Records are identified by id alone.
macro_rules! identity_eq {
    ($($ty:ty),+ $(,)?) => {$(
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}
    )+};
}

identity_eq!(State, City, User, Amenity, Place, Review);

// ===== Record =====

/// Any of the six entities, as it crosses the storage seam
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    State(State),
    City(City),
    User(User),
    Amenity(Amenity),
    Place(Place),
    Review(Review),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::State(_) => EntityKind::State,
            Self::City(_) => EntityKind::City,
            Self::User(_) => EntityKind::User,
            Self::Amenity(_) => EntityKind::Amenity,
            Self::Place(_) => EntityKind::Place,
            Self::Review(_) => EntityKind::Review,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::State(e) => &e.id,
            Self::City(e) => &e.id,
            Self::User(e) => &e.id,
            Self::Amenity(e) => &e.id,
            Self::Place(e) => &e.id,
            Self::Review(e) => &e.id,
        }
    }

    /// Storage key, `"<TypeName>.<id>"`
    pub fn key(&self) -> String {
        record_key(self.kind(), self.id())
    }

    /// Records this one must see existing when it is created.
    pub fn references(&self) -> Vec<(EntityKind, &str)> {
        match self {
            Self::City(c) => vec![(EntityKind::State, c.state_id.as_str())],
            Self::Place(p) => vec![
                (EntityKind::City, p.city_id.as_str()),
                (EntityKind::User, p.user_id.as_str()),
            ],
            Self::Review(r) => vec![
                (EntityKind::Place, r.place_id.as_str()),
                (EntityKind::User, r.user_id.as_str()),
            ],
            Self::State(_) | Self::User(_) | Self::Amenity(_) => Vec::new(),
        }
    }

    /// Id of the `parent` kind record this one belongs to, if any.
    pub fn parent_id(&self, parent: EntityKind) -> Option<&str> {
        self.references()
            .into_iter()
            .find(|(kind, _)| *kind == parent)
            .map(|(_, id)| id)
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        let ts = now();
        match self {
            Self::State(e) => e.updated_at = ts,
            Self::City(e) => e.updated_at = ts,
            Self::User(e) => e.updated_at = ts,
            Self::Amenity(e) => e.updated_at = ts,
            Self::Place(e) => e.updated_at = ts,
            Self::Review(e) => e.updated_at = ts,
        }
    }
}

/// Build a storage key from its parts.
pub fn record_key(kind: EntityKind, id: &str) -> String {
    format!("{}.{}", kind.as_str(), id)
}

// ===== Typed access =====

/// Typed view over one variant of [`Record`]
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Option<Self>;

    fn references(&self) -> Vec<(EntityKind, String)> {
        self.clone()
            .into_record()
            .references()
            .into_iter()
            .map(|(kind, id)| (kind, id.to_string()))
            .collect()
    }

    fn touch(&mut self);
}

macro_rules! entity_impl {
    ($($ty:ident),+ $(,)?) => {$(
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn id(&self) -> &str {
                &self.id
            }

            fn into_record(self) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$ty(entity) => Some(entity),
                    _ => None,
                }
            }

            fn touch(&mut self) {
                self.updated_at = now();
            }
        }

        impl From<$ty> for Record {
            fn from(entity: $ty) -> Self {
                Record::$ty(entity)
            }
        }
    )+};
}

entity_impl!(State, City, User, Amenity, Place, Review);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in EntityKind::all() {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(EntityKind::parse("state"), None);
        assert_eq!(EntityKind::parse("BaseModel"), None);
    }

    #[test]
    fn test_record_key_and_references() {
        let state = State::new("California");
        let city = City::new(&state.id, "San Francisco");
        let record = Record::from(city.clone());

        assert_eq!(record.key(), format!("City.{}", city.id));
        assert_eq!(record.parent_id(EntityKind::State), Some(state.id.as_str()));
        assert_eq!(record.parent_id(EntityKind::User), None);
        assert!(Record::from(state).references().is_empty());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = Amenity::new("Wifi");
        let mut b = a.clone();
        b.name = "Pool".to_string();
        assert_eq!(a, b);
        assert_ne!(a, Amenity::new("Wifi"));
    }

    #[test]
    fn test_touch_keeps_created_at() {
        let mut review = Review::new("p", "u", "Great stay");
        let created = review.created_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        review.touch();
        assert_eq!(review.created_at, created);
        assert!(review.updated_at > created);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = now();
        let text = format_timestamp(&ts);
        assert_eq!(text.len(), "2017-09-28T21:05:54.119427".len());
        assert_eq!(parse_timestamp(&text).unwrap(), ts);
        assert!(parse_timestamp("2017-09-28T21:05:54").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_relationships() {
        assert_eq!(
            EntityKind::State.relationship(EntityKind::City),
            Some(Relationship::Owns)
        );
        assert_eq!(
            EntityKind::Amenity.relationship(EntityKind::Place),
            Some(Relationship::Association)
        );
        assert_eq!(EntityKind::City.relationship(EntityKind::State), None);
    }

    #[test]
    fn test_has_amenities_is_intersection() {
        let mut place = Place::new("c", "u", "Loft");
        place.amenity_ids = vec!["a".into(), "b".into()];
        assert!(place.has_amenities(&["a".into()]));
        assert!(place.has_amenities(&["a".into(), "b".into()]));
        assert!(!place.has_amenities(&["a".into(), "z".into()]));
        assert!(place.has_amenities(&[]));
    }
}
