//! Storage layer - file and relational engines

pub mod document;
pub mod entity;
pub mod file;
pub mod mapper;
pub mod migrations;
pub mod relational;

use crate::config::{Config, StorageType};
use crate::domain::{StorageEngine, Storage};
use anyhow::Result;
use std::sync::Arc;

pub use file::FileEngine;
pub use relational::SeaOrmEngine;

/// Open the engine selected by `type_storage` and wrap it in the storage facade.
pub async fn open_storage(config: &Config) -> Result<Storage> {
    let engine: Arc<dyn StorageEngine> = match config.type_storage {
        StorageType::Db => Arc::new(SeaOrmEngine::connect(&config.database_url()).await?),
        StorageType::File => Arc::new(FileEngine::open(&config.file_path)?),
    };
    tracing::info!("Listings storage ready ({:?} backend)", engine.backend());
    Ok(Storage::new(engine))
}
