//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;
pub mod workflow;

pub use client::WorkshopOrdersApi;
pub use error::{FieldError, OrdersError};
pub use model::*;
pub use workflow::*;
