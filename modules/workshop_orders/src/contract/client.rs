//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to work with workshop orders.
//! NO HTTP - direct function calls.

use super::error::OrdersError;
use super::model::{
    Customer, CustomerId, CustomerInput, Measurement, MeasurementInput, Order, OrderId,
    OrderWithRelations, ProductionStage,
};
use super::workflow::{
    LinkOutcome, LinkRequest, LinkedGroup, LookupResult, OrderDraft, OrderLookup, StartOrder,
    StepInput,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Workshop orders API for inter-module communication
#[async_trait]
pub trait WorkshopOrdersApi: Send + Sync {
    // ===== Customers =====

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, OrdersError>;

    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>, OrdersError>;

    async fn create_customer(&self, input: CustomerInput) -> Result<Customer, OrdersError>;

    async fn measurements_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Measurement>, OrdersError>;

    async fn create_measurement(
        &self,
        customer_id: CustomerId,
        input: MeasurementInput,
    ) -> Result<Measurement, OrdersError>;

    // ===== Orders =====

    /// Order with customer, garments and shelf lines
    async fn get_order(&self, id: OrderId) -> Result<OrderWithRelations, OrdersError>;

    async fn get_order_by_invoice(&self, invoice_number: i32)
        -> Result<OrderWithRelations, OrdersError>;

    /// Fresh draft, or the customer's pending drafts when some exist
    async fn start_order(&self, customer_id: CustomerId) -> Result<StartOrder, OrdersError>;

    async fn continue_draft(&self, order_id: OrderId) -> Result<OrderDraft, OrdersError>;

    /// Persist one wizard step and advance the draft
    async fn proceed(&self, draft: OrderDraft, input: StepInput) -> Result<OrderDraft, OrdersError>;

    async fn advance_production_stage(
        &self,
        order_id: OrderId,
        stage: ProductionStage,
    ) -> Result<Order, OrdersError>;

    // ===== Linking =====

    async fn link_orders(&self, request: LinkRequest) -> Result<LinkOutcome, OrdersError>;

    async fn unlink_order(
        &self,
        order_id: OrderId,
        new_delivery_date: Option<NaiveDate>,
    ) -> Result<Order, OrdersError>;

    async fn linked_group(&self, primary_id: OrderId) -> Result<LinkedGroup, OrdersError>;

    async fn lookup_orders(&self, lookup: OrderLookup) -> Result<LookupResult, OrdersError>;
}
