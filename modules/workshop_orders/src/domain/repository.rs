//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use crate::contract::{
    Campaign, CheckoutStatus, Customer, CustomerId, CustomerInput, Fabric, FabricId, Garment,
    Measurement, MeasurementId, NewOrder, Order, OrderId, OrderWithRelations, PriceEntry,
    ShelfItem, ShelfProduct, ShelfProductId, Style,
};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Repository for customers
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Create a new customer
    async fn create(&self, input: &CustomerInput) -> Result<Customer>;

    /// Replace the editable fields of a customer
    async fn update(&self, id: CustomerId, input: &CustomerInput) -> Result<Customer>;

    /// Find a customer by id
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Find all customers sharing an exact phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Vec<Customer>>;

    /// Case-insensitive substring match on name, nick name and phone
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Customer>>;
}

/// Repository for measurements
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Insert a measurement; the `id` of the argument is ignored
    async fn create(&self, measurement: &Measurement) -> Result<Measurement>;

    /// Update a measurement in place
    async fn update(&self, measurement: &Measurement) -> Result<Measurement>;

    /// Find a measurement by id
    async fn find_by_id(&self, id: MeasurementId) -> Result<Option<Measurement>>;

    /// All measurements of a customer, oldest first
    async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Measurement>>;
}

/// Stock consumed by a confirmed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockUsage {
    pub fabrics: Vec<(FabricId, Decimal)>,
    pub shelf: Vec<(ShelfProductId, i32)>,
}

/// A guarded write refused inside the repository transaction.
///
/// Returned through `anyhow::Error`; the service downcasts it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteConflict {
    #[error("order #{0} is no longer a draft")]
    NotDraft(OrderId),

    #[error("insufficient stock: {}", .0.join("; "))]
    StockShortage(Vec<String>),
}

/// Repository for orders and their line items
///
/// Every method that writes more than one row runs in a single transaction.
/// Line-item writes and `confirm` only apply while the stored order is a draft
/// and fail with [`WriteConflict::NotDraft`] otherwise.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Create a draft order
    async fn create(&self, order: &NewOrder) -> Result<Order>;

    /// Write all order fields
    async fn update(&self, order: &Order) -> Result<Order>;

    /// Write several orders atomically
    async fn update_many(&self, orders: &[Order]) -> Result<Vec<Order>>;

    /// Find an order by id
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Find an order by its invoice number
    async fn find_by_invoice(&self, invoice_number: i32) -> Result<Option<Order>>;

    /// Load an order with customer, garments and shelf items
    async fn find_with_relations(&self, id: OrderId) -> Result<Option<OrderWithRelations>>;

    /// Orders of a customer in any of the given statuses, newest first
    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        statuses: &[CheckoutStatus],
        limit: u64,
    ) -> Result<Vec<Order>>;

    /// Orders whose `linked_order_id` points at `primary_id`
    async fn children_of(&self, primary_id: OrderId) -> Result<Vec<Order>>;

    /// Replace the garment set of an order and write the order, atomically.
    /// Garments with `id == 0` are inserted, others updated, missing ones deleted.
    async fn save_garments(&self, order: &Order, garments: &[Garment]) -> Result<Vec<Garment>>;

    /// Replace the shelf lines of an order and write the order, atomically
    async fn replace_shelf_items(&self, order: &Order, items: &[ShelfItem])
        -> Result<Vec<ShelfItem>>;

    /// Write a draft as cancelled
    async fn cancel(&self, order: &Order) -> Result<Order>;

    /// Assign the next invoice number, write the order and decrement stock, atomically.
    /// Stock that no longer covers `usage` fails with [`WriteConflict::StockShortage`].
    async fn confirm(&self, order: &Order, usage: &StockUsage) -> Result<Order>;
}

/// Read access to the catalogs maintained by the back office
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_fabrics(&self) -> Result<Vec<Fabric>>;

    async fn list_styles(&self) -> Result<Vec<Style>>;

    async fn list_prices(&self) -> Result<Vec<PriceEntry>>;

    async fn list_campaigns(&self) -> Result<Vec<Campaign>>;

    async fn list_shelf_products(&self) -> Result<Vec<ShelfProduct>>;
}
