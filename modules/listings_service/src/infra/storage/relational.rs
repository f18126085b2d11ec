//! SeaORM engine - records in relational tables
//!
//! Each session lazily opens one database transaction. Reads and writes of the
//! session go through it, `save` commits it and `close` rolls back whatever is left.

use super::entity::{amenity, city, place, place_amenity, review, state, user};
use super::mapper::{link_model, place_from_model};
use super::migrations::Migrator;
use crate::contract::{EntityKind, Record};
use crate::domain::repository::{AmenityLinks, Backend, StorageEngine, UnitOfWork};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::collections::HashMap;
use std::sync::Arc;

pub struct SeaOrmEngine {
    db: DatabaseConnection,
}

impl SeaOrmEngine {
    /// Connect and bring the schema up to date.
    pub async fn connect(url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(url.to_owned());
        options.sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .context("connecting to database")?;
        Self::from_connection(db).await
    }

    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .context("running listings migrations")?;
        tracing::info!("Listings service migrations completed");
        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl StorageEngine for SeaOrmEngine {
    fn backend(&self) -> Backend {
        Backend::Relational
    }

    fn begin(self: Arc<Self>) -> Box<dyn UnitOfWork> {
        Box::new(SeaOrmSession {
            db: self.db.clone(),
            txn: None,
        })
    }
}

struct SeaOrmSession {
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl SeaOrmSession {
    async fn txn(&mut self) -> Result<&DatabaseTransaction> {
        if self.txn.is_none() {
            self.txn = Some(self.db.begin().await.context("starting transaction")?);
        }
        match self.txn.as_ref() {
            Some(txn) => Ok(txn),
            None => bail!("transaction unavailable"),
        }
    }
}

// ===== Queries on an open transaction =====

/// Attach `place_amenity` ids to loaded place rows.
async fn load_places(txn: &DatabaseTransaction, models: Vec<place::Model>) -> Result<Vec<Record>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let mut links: HashMap<String, Vec<String>> = HashMap::new();
    for link in place_amenity::Entity::find()
        .filter(place_amenity::Column::PlaceId.is_in(ids))
        .order_by_asc(place_amenity::Column::Position)
        .all(txn)
        .await?
    {
        links.entry(link.place_id).or_default().push(link.amenity_id);
    }

    Ok(models
        .into_iter()
        .map(|m| {
            let amenity_ids = links.remove(&m.id).unwrap_or_default();
            Record::Place(place_from_model(m, amenity_ids))
        })
        .collect())
}

async fn find_all(txn: &DatabaseTransaction, kind: EntityKind) -> Result<Vec<Record>> {
    Ok(match kind {
        EntityKind::State => state::Entity::find()
            .order_by_asc(state::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(|m| Record::State(m.into()))
            .collect(),
        EntityKind::City => city::Entity::find()
            .order_by_asc(city::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(|m| Record::City(m.into()))
            .collect(),
        EntityKind::User => user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(|m| Record::User(m.into()))
            .collect(),
        EntityKind::Amenity => amenity::Entity::find()
            .order_by_asc(amenity::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(|m| Record::Amenity(m.into()))
            .collect(),
        EntityKind::Place => {
            let models = place::Entity::find()
                .order_by_asc(place::Column::CreatedAt)
                .all(txn)
                .await?;
            load_places(txn, models).await?
        }
        EntityKind::Review => review::Entity::find()
            .order_by_asc(review::Column::CreatedAt)
            .all(txn)
            .await?
            .into_iter()
            .map(|m| Record::Review(m.into()))
            .collect(),
    })
}

async fn find_one(txn: &DatabaseTransaction, kind: EntityKind, id: &str) -> Result<Option<Record>> {
    let id = id.to_owned();
    Ok(match kind {
        EntityKind::State => state::Entity::find_by_id(id)
            .one(txn)
            .await?
            .map(|m| Record::State(m.into())),
        EntityKind::City => city::Entity::find_by_id(id)
            .one(txn)
            .await?
            .map(|m| Record::City(m.into())),
        EntityKind::User => user::Entity::find_by_id(id)
            .one(txn)
            .await?
            .map(|m| Record::User(m.into())),
        EntityKind::Amenity => amenity::Entity::find_by_id(id)
            .one(txn)
            .await?
            .map(|m| Record::Amenity(m.into())),
        EntityKind::Place => {
            let models = place::Entity::find_by_id(id).one(txn).await?;
            load_places(txn, models.into_iter().collect())
                .await?
                .into_iter()
                .next()
        }
        EntityKind::Review => review::Entity::find_by_id(id)
            .one(txn)
            .await?
            .map(|m| Record::Review(m.into())),
    })
}

async fn count_kind(txn: &DatabaseTransaction, kind: EntityKind) -> Result<u64> {
    Ok(match kind {
        EntityKind::State => state::Entity::find().count(txn).await?,
        EntityKind::City => city::Entity::find().count(txn).await?,
        EntityKind::User => user::Entity::find().count(txn).await?,
        EntityKind::Amenity => amenity::Entity::find().count(txn).await?,
        EntityKind::Place => place::Entity::find().count(txn).await?,
        EntityKind::Review => review::Entity::find().count(txn).await?,
    })
}

// Insert or replace one row by primary key.
macro_rules! upsert {
    ($txn:expr, $module:ident, $entity:expr) => {{
        let active = $module::ActiveModel::from($entity);
        if $module::Entity::find_by_id($entity.id.clone())
            .one($txn)
            .await?
            .is_some()
        {
            $module::Entity::update(active).exec($txn).await?;
        } else {
            $module::Entity::insert(active)
                .exec_without_returning($txn)
                .await?;
        }
    }};
}

async fn upsert(txn: &DatabaseTransaction, record: &Record) -> Result<()> {
    match record {
        Record::State(s) => upsert!(txn, state, s),
        Record::City(c) => upsert!(txn, city, c),
        Record::User(u) => upsert!(txn, user, u),
        Record::Amenity(a) => upsert!(txn, amenity, a),
        Record::Place(p) => upsert!(txn, place, p),
        Record::Review(r) => upsert!(txn, review, r),
    }
    Ok(())
}

async fn remove(txn: &DatabaseTransaction, record: &Record) -> Result<()> {
    let id = record.id().to_owned();
    match record.kind() {
        EntityKind::State => state::Entity::delete_by_id(id).exec(txn).await?,
        EntityKind::City => city::Entity::delete_by_id(id).exec(txn).await?,
        EntityKind::User => user::Entity::delete_by_id(id).exec(txn).await?,
        EntityKind::Amenity => amenity::Entity::delete_by_id(id).exec(txn).await?,
        EntityKind::Place => place::Entity::delete_by_id(id).exec(txn).await?,
        EntityKind::Review => review::Entity::delete_by_id(id).exec(txn).await?,
    };
    Ok(())
}

// Children of a loaded parent row, oldest first.
macro_rules! children {
    ($txn:expr, $parent:ident, $id:expr, $child:ident, $variant:ident) => {{
        match $parent::Entity::find_by_id($id.to_owned()).one($txn).await? {
            Some(parent) => parent
                .find_related($child::Entity)
                .order_by_asc($child::Column::CreatedAt)
                .all($txn)
                .await?
                .into_iter()
                .map(|m| Record::$variant(m.into()))
                .collect(),
            None => Vec::new(),
        }
    }};
}

/// Amenities linked to a place, in link order.
async fn linked_amenities(txn: &DatabaseTransaction, place_id: &str) -> Result<Vec<Record>> {
    let links = place_amenity::Entity::find()
        .filter(place_amenity::Column::PlaceId.eq(place_id))
        .order_by_asc(place_amenity::Column::Position)
        .all(txn)
        .await?;
    let ids: Vec<String> = links.into_iter().map(|link| link.amenity_id).collect();
    let mut amenities: HashMap<String, amenity::Model> = amenity::Entity::find()
        .filter(amenity::Column::Id.is_in(ids.clone()))
        .all(txn)
        .await?
        .into_iter()
        .map(|m| (m.id.clone(), m))
        .collect();
    Ok(ids
        .iter()
        .filter_map(|id| amenities.remove(id))
        .map(|m| Record::Amenity(m.into()))
        .collect())
}

async fn find_related(txn: &DatabaseTransaction, parent: &Record, kind: EntityKind) -> Result<Vec<Record>> {
    let id = parent.id();
    Ok(match (parent.kind(), kind) {
        (EntityKind::State, EntityKind::City) => children!(txn, state, id, city, City),
        (EntityKind::User, EntityKind::Review) => children!(txn, user, id, review, Review),
        (EntityKind::Place, EntityKind::Review) => children!(txn, place, id, review, Review),
        (EntityKind::Place, EntityKind::Amenity) => linked_amenities(txn, id).await?,
        (EntityKind::City, EntityKind::Place) => {
            let models = match city::Entity::find_by_id(id.to_owned()).one(txn).await? {
                Some(row) => {
                    row.find_related(place::Entity)
                        .order_by_asc(place::Column::CreatedAt)
                        .all(txn)
                        .await?
                }
                None => Vec::new(),
            };
            load_places(txn, models).await?
        }
        (EntityKind::User, EntityKind::Place) => {
            let models = match user::Entity::find_by_id(id.to_owned()).one(txn).await? {
                Some(row) => {
                    row.find_related(place::Entity)
                        .order_by_asc(place::Column::CreatedAt)
                        .all(txn)
                        .await?
                }
                None => Vec::new(),
            };
            load_places(txn, models).await?
        }
        (EntityKind::Amenity, EntityKind::Place) => {
            let models = match amenity::Entity::find_by_id(id.to_owned()).one(txn).await? {
                Some(row) => {
                    row.find_related(place::Entity)
                        .order_by_asc(place::Column::CreatedAt)
                        .all(txn)
                        .await?
                }
                None => Vec::new(),
            };
            load_places(txn, models).await?
        }
        (parent_kind, kind) => bail!("{} has no relationship to {}", parent_kind, kind),
    })
}

#[async_trait]
impl AmenityLinks for SeaOrmSession {
    async fn amenity_ids(&mut self, place_id: &str) -> Result<Vec<String>> {
        let txn = self.txn().await?;
        if place::Entity::find_by_id(place_id.to_owned()).one(txn).await?.is_none() {
            bail!("place {} does not exist", place_id);
        }
        Ok(place_amenity::Entity::find()
            .filter(place_amenity::Column::PlaceId.eq(place_id))
            .order_by_asc(place_amenity::Column::Position)
            .all(txn)
            .await?
            .into_iter()
            .map(|link| link.amenity_id)
            .collect())
    }

    async fn link(&mut self, place_id: &str, amenity_id: &str) -> Result<bool> {
        let txn = self.txn().await?;
        let existing = place_amenity::Entity::find_by_id((place_id.to_owned(), amenity_id.to_owned()))
            .one(txn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }
        let position = place_amenity::Entity::find()
            .filter(place_amenity::Column::PlaceId.eq(place_id))
            .order_by_desc(place_amenity::Column::Position)
            .one(txn)
            .await?
            .map_or(0, |last| last.position + 1);
        place_amenity::Entity::insert(link_model(place_id, amenity_id, position))
            .exec_without_returning(txn)
            .await?;
        Ok(true)
    }

    async fn unlink(&mut self, place_id: &str, amenity_id: &str) -> Result<bool> {
        let txn = self.txn().await?;
        let result = place_amenity::Entity::delete_many()
            .filter(place_amenity::Column::PlaceId.eq(place_id))
            .filter(place_amenity::Column::AmenityId.eq(amenity_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl UnitOfWork for SeaOrmSession {
    async fn all(&mut self, kind: Option<EntityKind>) -> Result<IndexMap<String, Record>> {
        let txn = self.txn().await?;
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => EntityKind::all().to_vec(),
        };
        let mut records = IndexMap::new();
        for kind in kinds {
            for record in find_all(txn, kind).await? {
                records.insert(record.key(), record);
            }
        }
        Ok(records)
    }

    async fn get(&mut self, kind: EntityKind, id: &str) -> Result<Option<Record>> {
        let txn = self.txn().await?;
        find_one(txn, kind, id).await
    }

    async fn new(&mut self, record: Record) -> Result<()> {
        let txn = self.txn().await?;
        upsert(txn, &record).await
    }

    async fn save(&mut self) -> Result<()> {
        if let Some(txn) = self.txn.take() {
            tracing::debug!("Committing storage transaction");
            txn.commit().await.context("committing transaction")?;
        }
        Ok(())
    }

    async fn delete(&mut self, record: &Record) -> Result<()> {
        tracing::debug!("Deleting {}", record.key());
        let txn = self.txn().await?;
        remove(txn, record).await
    }

    async fn count(&mut self, kind: Option<EntityKind>) -> Result<usize> {
        let txn = self.txn().await?;
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => EntityKind::all().to_vec(),
        };
        let mut total = 0;
        for kind in kinds {
            total += count_kind(txn, kind).await?;
        }
        Ok(usize::try_from(total)?)
    }

    async fn related(&mut self, parent: &Record, kind: EntityKind) -> Result<Vec<Record>> {
        let txn = self.txn().await?;
        find_related(txn, parent, kind).await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(txn) = self.txn.take() {
            txn.rollback().await.context("rolling back transaction")?;
        }
        Ok(())
    }
}
