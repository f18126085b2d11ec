//! Storage facade tests, run against both engines

mod common;

use common::{Listing, TestStore};
use listings_service::contract::*;
use listings_service::domain::{Backend, Service, Storage};
use listings_service::infra::storage::FileEngine;
use std::sync::Arc;

fn print_test_header(name: &str, store: &TestStore) {
    println!("\n=== {} [{}] ===", name, store.name);
}

async fn seeded(store: &TestStore, tag: &str) -> Listing {
    Listing::seed(tag, &Service::new(store.storage.clone())).await
}

#[tokio::test]
async fn test_new_save_get_round_trips_every_kind() {
    for store in common::all_stores().await {
        print_test_header("new/save/get", &store);
        let listing = Listing::new("roundtrip");

        let mut session = store.storage.session();
        session.new(listing.state.clone()).await.unwrap();
        session.new(listing.city.clone()).await.unwrap();
        session.new(listing.user.clone()).await.unwrap();
        session.new(listing.place.clone()).await.unwrap();
        session.new(listing.review.clone()).await.unwrap();
        session.new(listing.wifi.clone()).await.unwrap();
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        let state = session.get_as::<State>(&listing.state.id).await.unwrap().unwrap();
        assert_eq!(state.name, "State roundtrip");
        assert_eq!(state.created_at, listing.state.created_at);

        let user = session.get_as::<User>(&listing.user.id).await.unwrap().unwrap();
        assert_eq!(user.email, "roundtrip@example.com");
        assert_eq!(user.password, "pwd");
        assert_eq!(user.first_name.as_deref(), Some("Betty"));
        assert_eq!(user.last_name, None);

        let place = session.get_as::<Place>(&listing.place.id).await.unwrap().unwrap();
        assert_eq!(place.city_id, listing.city.id);
        assert_eq!(place.number_rooms, 3);
        assert_eq!(place.price_by_night, 120);
        assert_eq!(place.latitude, Some(37.77));
        assert_eq!(place.longitude, None);

        let review = session.get_as::<Review>(&listing.review.id).await.unwrap().unwrap();
        assert_eq!(review.text, "Great stay");

        assert!(session.get(EntityKind::Amenity, "missing").await.unwrap().is_none());
        // Wrong kind for an existing id
        assert!(session.get(EntityKind::City, &listing.state.id).await.unwrap().is_none());
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_all_filters_by_kind() {
    for store in common::all_stores().await {
        print_test_header("all", &store);
        let listing = seeded(&store, "all").await;

        let mut session = store.storage.session();
        let everything = session.all(None).await.unwrap();
        assert_eq!(everything.len(), 7);

        let amenities = session.all(Some(EntityKind::Amenity)).await.unwrap();
        assert_eq!(amenities.len(), 2);
        let key = Record::from(listing.wifi.clone()).key();
        assert!(amenities.contains_key(&key));
        assert!(key.starts_with("Amenity."));

        let states = session.all_of::<State>().await.unwrap();
        assert_eq!(states, vec![listing.state.clone()]);
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_count_and_count_by_name() {
    for store in common::all_stores().await {
        print_test_header("count", &store);
        seeded(&store, "count").await;

        let mut session = store.storage.session();
        assert_eq!(session.count(None).await.unwrap(), 7);
        assert_eq!(session.count_of::<Amenity>().await.unwrap(), 2);
        assert_eq!(session.count_by_name(Some("Place")).await.unwrap(), 1);
        assert_eq!(session.count_by_name(None).await.unwrap(), 7);
        assert_eq!(session.count_by_name(Some("Spaceship")).await.unwrap(), 0);
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_save_overwrites_existing_record() {
    for store in common::all_stores().await {
        print_test_header("overwrite", &store);
        let listing = seeded(&store, "overwrite").await;

        let mut renamed = listing.state.clone();
        renamed.name = "Renamed".to_string();
        renamed.touch();

        let mut session = store.storage.session();
        session.new(renamed.clone()).await.unwrap();
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        let states = session.all_of::<State>().await.unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].name, "Renamed");
        assert_eq!(states[0].created_at, listing.state.created_at);
        assert!(states[0].updated_at >= listing.state.updated_at);
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_related_follows_ownership_and_association() {
    for store in common::all_stores().await {
        print_test_header("related", &store);
        let listing = seeded(&store, "related").await;

        let mut session = store.storage.session();
        let state = Record::from(listing.state.clone());
        let cities = session.related::<City>(&state).await.unwrap();
        assert_eq!(cities, vec![listing.city.clone()]);

        let places = session
            .related::<Place>(&Record::from(listing.city.clone()))
            .await
            .unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].amenity_ids, vec![listing.wifi.id.clone()]);

        let reviews = session
            .related::<Review>(&Record::from(listing.place.clone()))
            .await
            .unwrap();
        assert_eq!(reviews, vec![listing.review.clone()]);

        let amenities = session
            .related::<Amenity>(&Record::from(listing.place.clone()))
            .await
            .unwrap();
        assert_eq!(amenities, vec![listing.wifi.clone()]);

        let linked_places = session
            .related::<Place>(&Record::from(listing.wifi.clone()))
            .await
            .unwrap();
        assert_eq!(linked_places, vec![listing.place.clone()]);

        assert!(session
            .related::<Place>(&Record::from(listing.pool.clone()))
            .await
            .unwrap()
            .is_empty());

        // State and Review are unrelated
        assert!(session.related::<Review>(&state).await.is_err());
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_link_is_idempotent_and_unlink_reports_absence() {
    for store in common::all_stores().await {
        print_test_header("link/unlink", &store);
        let listing = seeded(&store, "link").await;
        let place_id = listing.place.id.as_str();

        let mut session = store.storage.session();
        assert!(!session.link(place_id, &listing.wifi.id).await.unwrap());
        assert!(session.link(place_id, &listing.pool.id).await.unwrap());
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        assert_eq!(
            session.amenity_ids(place_id).await.unwrap(),
            vec![listing.wifi.id.clone(), listing.pool.id.clone()]
        );

        assert!(session.unlink(place_id, &listing.wifi.id).await.unwrap());
        assert!(!session.unlink(place_id, &listing.wifi.id).await.unwrap());
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        assert_eq!(
            session.amenity_ids(place_id).await.unwrap(),
            vec![listing.pool.id.clone()]
        );
        assert!(session.amenity_ids("missing").await.is_err());
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_amenities_keep_link_order() {
    for store in common::all_stores().await {
        print_test_header("link order", &store);
        let listing = seeded(&store, "order").await;
        let mut zzz = Amenity::new("Sauna");
        zzz.id = "zzz".to_string();
        let mut aaa = Amenity::new("Balcony");
        aaa.id = "aaa".to_string();

        let mut session = store.storage.session();
        session.new(zzz.clone()).await.unwrap();
        session.new(aaa.clone()).await.unwrap();
        session.unlink(&listing.place.id, &listing.wifi.id).await.unwrap();
        session.link(&listing.place.id, "zzz").await.unwrap();
        session.link(&listing.place.id, "aaa").await.unwrap();
        session.link(&listing.place.id, &listing.wifi.id).await.unwrap();
        session.save().await.unwrap();
        session.close().await.unwrap();

        let expected = vec!["zzz".to_string(), "aaa".to_string(), listing.wifi.id.clone()];
        let mut session = store.storage.session();
        assert_eq!(session.amenity_ids(&listing.place.id).await.unwrap(), expected);

        let place = session.get_as::<Place>(&listing.place.id).await.unwrap().unwrap();
        assert_eq!(place.amenity_ids, expected);

        let amenities = session
            .related::<Amenity>(&Record::from(listing.place.clone()))
            .await
            .unwrap();
        let ids: Vec<String> = amenities.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, expected);
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_related_reads_stored_place_not_caller_copy() {
    for store in common::all_stores().await {
        print_test_header("stale parent", &store);
        let listing = seeded(&store, "stale").await;

        // Built before the link was made, so it carries no amenity ids
        let stale = Record::from(listing.place.clone());
        assert!(listing.place.amenity_ids.is_empty());

        let mut session = store.storage.session();
        let amenities = session.related::<Amenity>(&stale).await.unwrap();
        assert_eq!(amenities, vec![listing.wifi.clone()]);

        let mut ghost = listing.place.clone();
        ghost.id = "ghost".to_string();
        ghost.amenity_ids = vec![listing.pool.id.clone()];
        let amenities = session.related::<Amenity>(&Record::from(ghost)).await.unwrap();
        assert!(amenities.is_empty());
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_deleting_state_cascades_to_owned_records() {
    for store in common::all_stores().await {
        print_test_header("cascade state", &store);
        let listing = seeded(&store, "cascade").await;

        let mut session = store.storage.session();
        session.delete(listing.state.clone()).await.unwrap();
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        assert_eq!(session.count_of::<State>().await.unwrap(), 0);
        assert_eq!(session.count_of::<City>().await.unwrap(), 0);
        assert_eq!(session.count_of::<Place>().await.unwrap(), 0);
        assert_eq!(session.count_of::<Review>().await.unwrap(), 0);
        // Users and amenities are not owned by the state
        assert_eq!(session.count_of::<User>().await.unwrap(), 1);
        assert_eq!(session.count_of::<Amenity>().await.unwrap(), 2);
        let wifi = Record::from(listing.wifi.clone());
        assert!(session.related::<Place>(&wifi).await.unwrap().is_empty());
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_deleting_amenity_drops_its_links() {
    for store in common::all_stores().await {
        print_test_header("cascade amenity", &store);
        let listing = seeded(&store, "unlinked").await;

        let mut session = store.storage.session();
        session.delete(listing.wifi.clone()).await.unwrap();
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        let place = session.get_as::<Place>(&listing.place.id).await.unwrap().unwrap();
        assert!(place.amenity_ids.is_empty());
        assert!(session.amenity_ids(&listing.place.id).await.unwrap().is_empty());
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_deleting_user_removes_their_places_and_reviews() {
    for store in common::all_stores().await {
        print_test_header("cascade user", &store);
        let listing = seeded(&store, "owner").await;

        let mut session = store.storage.session();
        session.delete(listing.user.clone()).await.unwrap();
        session.save().await.unwrap();
        session.close().await.unwrap();

        let mut session = store.storage.session();
        assert_eq!(session.count_of::<Place>().await.unwrap(), 0);
        assert_eq!(session.count_of::<Review>().await.unwrap(), 0);
        assert_eq!(session.count_of::<City>().await.unwrap(), 1);
        session.close().await.unwrap();
    }
}

// ===== File engine specifics =====

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let store = common::file_store();
    assert_eq!(store.storage.backend(), Backend::File);
    let listing = seeded(&store, "reopen").await;

    let reopened = Storage::new(Arc::new(FileEngine::open(store.file_path()).unwrap()));
    let mut session = reopened.session();
    assert_eq!(session.count(None).await.unwrap(), 7);
    let place = session.get_as::<Place>(&listing.place.id).await.unwrap().unwrap();
    assert_eq!(place.amenity_ids, vec![listing.wifi.id.clone()]);
    assert_eq!(place.created_at, listing.place.created_at);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_file_document_is_keyed_and_tagged() {
    let store = common::file_store();
    let listing = seeded(&store, "document").await;

    let raw = std::fs::read_to_string(store.file_path()).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let state = &document[format!("State.{}", listing.state.id)];
    assert_eq!(state["__class__"], "State");
    assert_eq!(state["name"], "State document");
    assert!(state["created_at"].as_str().unwrap().contains('T'));

    let place = &document[format!("Place.{}", listing.place.id)];
    assert_eq!(place["amenity_ids"][0], listing.wifi.id.as_str());
}

#[test]
fn test_file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::open(dir.path().join("nothing-here.json")).unwrap();
    assert!(!engine.path().exists());
}

#[test]
fn test_file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    std::fs::write(&path, "{ not json").unwrap();

    let error = FileEngine::open(&path).err().unwrap();
    assert!(format!("{:#}", error).contains("parsing"));
}

#[tokio::test]
async fn test_file_store_save_leaves_no_temp_files() {
    let store = common::file_store();
    seeded(&store, "tidy").await;

    let entries: Vec<_> = std::fs::read_dir(store.dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("file.json")]);
}

// ===== Relational engine specifics =====

#[tokio::test]
async fn test_relational_close_without_save_discards_changes() {
    let store = common::sqlite_store().await;
    assert_eq!(store.storage.backend(), Backend::Relational);

    let mut session = store.storage.session();
    session.new(State::new("Ephemeral")).await.unwrap();
    assert_eq!(session.count_of::<State>().await.unwrap(), 1);
    session.close().await.unwrap();

    let mut session = store.storage.session();
    assert_eq!(session.count_of::<State>().await.unwrap(), 0);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_relational_migrations_rerun_on_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = common::sqlite_url(&dir);

    for _ in 0..2 {
        let engine = listings_service::infra::storage::SeaOrmEngine::connect(&url)
            .await
            .unwrap();
        let mut session = Storage::new(Arc::new(engine)).session();
        assert_eq!(session.count(None).await.unwrap(), 0);
        session.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_relational_store_survives_reconnect() {
    let store = common::sqlite_store().await;
    let listing = seeded(&store, "reconnect").await;

    let engine = listings_service::infra::storage::SeaOrmEngine::connect(&common::sqlite_url(&store.dir))
        .await
        .unwrap();
    let mut session = Storage::new(Arc::new(engine)).session();
    let place = session.get_as::<Place>(&listing.place.id).await.unwrap().unwrap();
    assert_eq!(place.amenity_ids, vec![listing.wifi.id.clone()]);
    assert_eq!(session.count(None).await.unwrap(), 7);
    session.close().await.unwrap();
}
