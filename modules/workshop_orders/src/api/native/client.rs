//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    Customer, CustomerId, CustomerInput, LinkOutcome, LinkRequest, LinkedGroup, LookupResult,
    Measurement, MeasurementInput, Order, OrderDraft, OrderId, OrderLookup, OrderWithRelations,
    OrdersError, ProductionStage, StartOrder, StepInput, WorkshopOrdersApi,
};
use crate::domain::Service;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Native client that calls the domain service directly
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl WorkshopOrdersApi for NativeClient {
    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, OrdersError> {
        self.service.find_customer_by_phone(phone).await
    }

    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>, OrdersError> {
        self.service.search_customers(query).await
    }

    async fn create_customer(&self, input: CustomerInput) -> Result<Customer, OrdersError> {
        self.service.create_customer(input).await
    }

    async fn measurements_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Measurement>, OrdersError> {
        self.service.measurements_for_customer(customer_id).await
    }

    async fn create_measurement(
        &self,
        customer_id: CustomerId,
        input: MeasurementInput,
    ) -> Result<Measurement, OrdersError> {
        self.service.create_measurement(customer_id, input).await
    }

    async fn get_order(&self, id: OrderId) -> Result<OrderWithRelations, OrdersError> {
        self.service.get_order_with_relations(id).await
    }

    async fn get_order_by_invoice(
        &self,
        invoice_number: i32,
    ) -> Result<OrderWithRelations, OrdersError> {
        self.service.get_order_by_invoice(invoice_number).await
    }

    async fn start_order(&self, customer_id: CustomerId) -> Result<StartOrder, OrdersError> {
        self.service.start_order(customer_id).await
    }

    async fn continue_draft(&self, order_id: OrderId) -> Result<OrderDraft, OrdersError> {
        self.service.continue_draft(order_id).await
    }

    async fn proceed(&self, draft: OrderDraft, input: StepInput) -> Result<OrderDraft, OrdersError> {
        self.service.proceed(draft, input).await
    }

    async fn advance_production_stage(
        &self,
        order_id: OrderId,
        stage: ProductionStage,
    ) -> Result<Order, OrdersError> {
        self.service.advance_production_stage(order_id, stage).await
    }

    async fn link_orders(&self, request: LinkRequest) -> Result<LinkOutcome, OrdersError> {
        self.service.link_orders(request).await
    }

    async fn unlink_order(
        &self,
        order_id: OrderId,
        new_delivery_date: Option<NaiveDate>,
    ) -> Result<Order, OrdersError> {
        self.service.unlink_order(order_id, new_delivery_date).await
    }

    async fn linked_group(&self, primary_id: OrderId) -> Result<LinkedGroup, OrdersError> {
        self.service.linked_group(primary_id).await
    }

    async fn lookup_orders(&self, lookup: OrderLookup) -> Result<LookupResult, OrdersError> {
        self.service.lookup_orders(lookup).await
    }
}
