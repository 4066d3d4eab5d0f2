//! Domain layer - business logic and services

pub mod accounts;
pub mod events;
pub mod linking;
pub mod measurements;
pub mod pricing;
pub mod repository;
pub mod service;
pub mod validation;
pub mod wizard;

pub use events::{EventPublisher, NoOpEventPublisher, OrderEvent, TracingEventPublisher};
pub use repository::{
    CatalogRepository, CustomerRepository, MeasurementRepository, OrderRepository, StockUsage,
    WriteConflict,
};
pub use service::Service;
pub use wizard::{ValidationContext, WizardError};
