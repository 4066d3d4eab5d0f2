//! Workshop Orders Module
//!
//! Order intake for a tailoring workshop: customer demographics and household
//! accounts, body measurements, garment and shelf-product selection with priced
//! snapshots, checkout, and grouping of confirmed orders for joint delivery.

// Public exports
pub mod contract;
pub use contract::{
    client::WorkshopOrdersApi, error::OrdersError, Customer, Measurement, Order, OrderDraft,
    OrderWithRelations, StepInput, WizardStep,
};

pub mod module;
pub use module::WorkshopOrdersModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
