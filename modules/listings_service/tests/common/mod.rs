//! Common test utilities: temporary stores and a small seeded listing graph

#![allow(dead_code)]

use listings_service::contract::*;
use listings_service::domain::{Service, Storage};
use listings_service::infra::storage::{FileEngine, SeaOrmEngine};
use std::sync::Arc;
use tempfile::TempDir;

/// A storage facade over an engine whose files live in a temp directory
pub struct TestStore {
    pub name: &'static str,
    pub dir: TempDir,
    pub storage: Storage,
}

impl TestStore {
    pub fn file_path(&self) -> std::path::PathBuf {
        self.dir.path().join("file.json")
    }
}

pub fn file_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::open(dir.path().join("file.json")).unwrap();
    TestStore {
        name: "file",
        dir,
        storage: Storage::new(Arc::new(engine)),
    }
}

pub fn sqlite_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("hbnb.db").display())
}

pub async fn sqlite_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let engine = SeaOrmEngine::connect(&sqlite_url(&dir)).await.unwrap();
    TestStore {
        name: "sqlite",
        dir,
        storage: Storage::new(Arc::new(engine)),
    }
}

/// One store per engine
pub async fn all_stores() -> Vec<TestStore> {
    vec![file_store(), sqlite_store().await]
}

/// State -> City -> Place (owned by a user) with one review, plus two amenities
#[derive(Debug, Clone)]
pub struct Listing {
    pub state: State,
    pub city: City,
    pub user: User,
    pub place: Place,
    pub review: Review,
    pub wifi: Amenity,
    pub pool: Amenity,
}

impl Listing {
    /// Build the graph in memory; nothing is stored.
    pub fn new(tag: &str) -> Self {
        let state = State::new(format!("State {}", tag));
        let city = City::new(&state.id, format!("City {}", tag));
        let mut user = User::new(format!("{}@example.com", tag), "pwd");
        user.first_name = Some("Betty".to_string());
        let mut place = Place::new(&city.id, &user.id, format!("Place {}", tag));
        place.number_rooms = 3;
        place.price_by_night = 120;
        place.latitude = Some(37.77);
        let review = Review::new(&place.id, &user.id, "Great stay");
        Self {
            state,
            city,
            user,
            place,
            review,
            wifi: Amenity::new("Wifi"),
            pool: Amenity::new("Pool"),
        }
    }

    /// Store every record and link wifi to the place.
    pub async fn seed(tag: &str, service: &Service) -> Self {
        let listing = Self::new(tag);
        service.create(listing.state.clone()).await.unwrap();
        service.create(listing.city.clone()).await.unwrap();
        service.create(listing.user.clone()).await.unwrap();
        service.create(listing.place.clone()).await.unwrap();
        service.create(listing.review.clone()).await.unwrap();
        service.create(listing.wifi.clone()).await.unwrap();
        service.create(listing.pool.clone()).await.unwrap();
        service
            .link_amenity(&listing.place.id, &listing.wifi.id)
            .await
            .unwrap();
        listing
    }
}
