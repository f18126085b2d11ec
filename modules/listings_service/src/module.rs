//! Module declaration and lifecycle

use crate::api::rest::routes::App;
use crate::config::Config;
use crate::domain::{Service, Storage};
use anyhow::{Context, Result};
use axum::extract::Request;
use axum::ServiceExt;
use std::future::Future;
use std::sync::Arc;

/// Listings service module: storage, domain service and REST surface
pub struct ListingsServiceModule {
    config: Config,
    service: Arc<Service>,
}

impl ListingsServiceModule {
    /// Open the configured storage engine and build the domain service.
    pub async fn init(config: Config) -> Result<Self> {
        let storage = crate::infra::storage::open_storage(&config).await?;
        Ok(Self::with_storage(config, storage))
    }

    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let service = Arc::new(Service::new(storage));
        tracing::info!("Listings service initialized");
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    pub fn router(&self) -> App {
        tracing::info!("Registering listings service REST routes");
        crate::api::rest::routes::build_app(self.service())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding {}", addr))?;
        tracing::info!("Listings API listening on http://{}", addr);

        let app = ServiceExt::<Request>::into_make_service(self.router());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("serving listings API")?;

        tracing::info!("Listings API stopped");
        Ok(())
    }
}
