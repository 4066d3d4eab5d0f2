//! Module wiring: repositories, domain service, REST routes and native client

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::domain::{Service, TracingEventPublisher};
use crate::infra::storage::{
    Migrator, SeaOrmCatalogRepository, SeaOrmCustomerRepository, SeaOrmMeasurementRepository,
    SeaOrmOrderRepository,
};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Workshop orders module
pub struct WorkshopOrdersModule {
    service: Arc<Service>,
    client: Arc<NativeClient>,
}

impl WorkshopOrdersModule {
    /// Build the module on top of an open database connection
    pub fn new(db: Arc<DatabaseConnection>, config: Config) -> Self {
        let customer_repo = Arc::new(SeaOrmCustomerRepository::new(db.clone()));
        let measurement_repo = Arc::new(SeaOrmMeasurementRepository::new(db.clone()));
        let order_repo = Arc::new(SeaOrmOrderRepository::new(db.clone()));
        let catalog_repo = Arc::new(SeaOrmCatalogRepository::new(db));

        let service = Arc::new(Service::new(
            customer_repo,
            measurement_repo,
            order_repo,
            catalog_repo,
            Arc::new(TracingEventPublisher),
            config,
        ));
        let client = Arc::new(NativeClient::new(service.clone()));

        tracing::info!("Workshop orders module initialized with native client");
        Self { service, client }
    }

    /// Apply pending schema migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None).await?;
        tracing::info!("Workshop orders migrations completed");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules
    pub fn client(&self) -> Arc<dyn crate::contract::WorkshopOrdersApi> {
        self.client.clone()
    }

    /// Mount the REST routes on `router`
    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        tracing::info!("Registering workshop orders REST routes");
        crate::api::rest::register_routes(router, self.service.clone())
    }
}
