//! In-memory repositories and fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::Arc;
use workshop_orders::config::Config;
use workshop_orders::contract::*;
use workshop_orders::domain::repository::{
    CatalogRepository, CustomerRepository, MeasurementRepository, OrderRepository, StockUsage,
    WriteConflict,
};
use workshop_orders::domain::{EventPublisher, OrderEvent, Service};

#[derive(Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    measurements: BTreeMap<MeasurementId, Measurement>,
    orders: BTreeMap<OrderId, Order>,
    garments: BTreeMap<GarmentId, Garment>,
    shelf_items: BTreeMap<i32, ShelfItem>,
    fabrics: BTreeMap<FabricId, Fabric>,
    shelf: BTreeMap<ShelfProductId, ShelfProduct>,
    prices: Vec<PriceEntry>,
    next_id: i32,
    /// Fabric taken by another checkout between the service's stock check and `confirm`
    concurrent_withdrawals: Vec<(FabricId, Decimal)>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_draft(&self, id: OrderId) -> anyhow::Result<()> {
        match self.orders.get(&id) {
            Some(o) if o.checkout_status == CheckoutStatus::Draft => Ok(()),
            _ => Err(WriteConflict::NotDraft(id).into()),
        }
    }
}

/// One shared store implementing every repository trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids handed out by the store start after `start`
    pub fn with_ids_from(self, start: i32) -> Self {
        self.tables.write().next_id = start;
        self
    }

    pub fn add_fabric(&self, id: FabricId, name: &str, price_per_meter: Decimal, real_stock: Decimal) {
        self.tables.write().fabrics.insert(
            id,
            Fabric {
                id,
                name: name.to_string(),
                color: None,
                price_per_meter,
                real_stock,
            },
        );
    }

    pub fn add_shelf_product(&self, id: ShelfProductId, product_type: &str, price: Decimal, stock: i32) {
        self.tables.write().shelf.insert(
            id,
            ShelfProduct {
                id,
                product_type: product_type.to_string(),
                brand: None,
                price,
                stock,
            },
        );
    }

    pub fn add_price(&self, key: &str, value: Decimal) {
        self.tables.write().prices.push(PriceEntry {
            key: key.to_string(),
            value,
            description: None,
        });
    }

    /// Insert an order row as-is, bypassing the service
    pub fn put_order(&self, order: Order) {
        let mut t = self.tables.write();
        t.next_id = t.next_id.max(order.id);
        t.orders.insert(order.id, order);
    }

    /// Make the next `confirm` find `metres` of a fabric already gone
    pub fn withdraw_before_confirm(&self, fabric_id: FabricId, metres: Decimal) {
        self.tables.write().concurrent_withdrawals.push((fabric_id, metres));
    }

    /// Change an order's checkout status behind the service's back
    pub fn set_checkout_status(&self, id: OrderId, status: CheckoutStatus) {
        if let Some(order) = self.tables.write().orders.get_mut(&id) {
            order.checkout_status = status;
        }
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.tables.read().orders.get(&id).cloned()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.tables.read().orders.values().cloned().collect()
    }

    pub fn fabric_stock(&self, id: FabricId) -> Option<Decimal> {
        self.tables.read().fabrics.get(&id).map(|f| f.real_stock)
    }

    pub fn shelf_stock(&self, id: ShelfProductId) -> Option<i32> {
        self.tables.read().shelf.get(&id).map(|p| p.stock)
    }

    pub fn garments_of(&self, order_id: OrderId) -> Vec<Garment> {
        self.tables
            .read()
            .garments
            .values()
            .filter(|g| g.order_id == order_id)
            .cloned()
            .collect()
    }
}

fn customer_from(id: CustomerId, input: &CustomerInput, created_at: chrono::DateTime<Utc>) -> Customer {
    Customer {
        id,
        name: input.name.clone(),
        nick_name: input.nick_name.clone(),
        arabic_name: input.arabic_name.clone(),
        phone: input.phone.clone(),
        alternate_mobile: input.alternate_mobile.clone(),
        whatsapp: input.whatsapp.clone(),
        email: input.email.clone(),
        nationality: input.nationality.clone(),
        customer_segment: input.customer_segment.clone(),
        address: input.address.clone(),
        account_type: input.account_type,
        relation: input.relation.clone(),
        created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn create(&self, input: &CustomerInput) -> anyhow::Result<Customer> {
        let mut t = self.tables.write();
        let id = t.next_id();
        let customer = customer_from(id, input, Utc::now());
        t.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, id: CustomerId, input: &CustomerInput) -> anyhow::Result<Customer> {
        let mut t = self.tables.write();
        let created_at = t
            .customers
            .get(&id)
            .map(|c| c.created_at)
            .ok_or_else(|| anyhow::anyhow!("customer {} missing", id))?;
        let customer = customer_from(id, input, created_at);
        t.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: CustomerId) -> anyhow::Result<Option<Customer>> {
        Ok(self.tables.read().customers.get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> anyhow::Result<Vec<Customer>> {
        Ok(self
            .tables
            .read()
            .customers
            .values()
            .filter(|c| c.phone == phone)
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str, limit: u64) -> anyhow::Result<Vec<Customer>> {
        let needle = query.to_lowercase();
        let matches = |field: &str| field.to_lowercase().contains(&needle);
        Ok(self
            .tables
            .read()
            .customers
            .values()
            .filter(|c| {
                matches(&c.name)
                    || c.nick_name.as_deref().is_some_and(matches)
                    || c.phone.contains(query)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MeasurementRepository for MemoryStore {
    async fn create(&self, measurement: &Measurement) -> anyhow::Result<Measurement> {
        let mut t = self.tables.write();
        let mut created = measurement.clone();
        created.id = t.next_id();
        t.measurements.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, measurement: &Measurement) -> anyhow::Result<Measurement> {
        self.tables
            .write()
            .measurements
            .insert(measurement.id, measurement.clone());
        Ok(measurement.clone())
    }

    async fn find_by_id(&self, id: MeasurementId) -> anyhow::Result<Option<Measurement>> {
        Ok(self.tables.read().measurements.get(&id).cloned())
    }

    async fn list_for_customer(&self, customer_id: CustomerId) -> anyhow::Result<Vec<Measurement>> {
        Ok(self
            .tables
            .read()
            .measurements
            .values()
            .filter(|m| m.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create(&self, new_order: &NewOrder) -> anyhow::Result<Order> {
        let mut t = self.tables.write();
        let id = t.next_id();
        let now = Utc::now();
        let order = Order {
            id,
            customer_id: new_order.customer_id,
            invoice_number: None,
            order_type: new_order.order_type,
            checkout_status: CheckoutStatus::Draft,
            production_stage: ProductionStage::OrderAtShop,
            payment_type: None,
            payment_ref: None,
            order_date: None,
            delivery_date: None,
            home_delivery: false,
            campaign_id: new_order.campaign_id,
            stitching_price: new_order.stitching_price,
            discount: None,
            charges: OrderCharges::default(),
            advance: Decimal::ZERO,
            paid: Decimal::ZERO,
            num_of_fabrics: 0,
            linked_order_id: None,
            linked_date: None,
            unlinked_date: None,
            notes: new_order.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        t.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update(&self, order: &Order) -> anyhow::Result<Order> {
        self.tables.write().orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn update_many(&self, orders: &[Order]) -> anyhow::Result<Vec<Order>> {
        let mut t = self.tables.write();
        for order in orders {
            t.orders.insert(order.id, order.clone());
        }
        Ok(orders.to_vec())
    }

    async fn find_by_id(&self, id: OrderId) -> anyhow::Result<Option<Order>> {
        Ok(self.order(id))
    }

    async fn find_by_invoice(&self, invoice_number: i32) -> anyhow::Result<Option<Order>> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .find(|o| o.invoice_number == Some(invoice_number))
            .cloned())
    }

    async fn find_with_relations(&self, id: OrderId) -> anyhow::Result<Option<OrderWithRelations>> {
        let t = self.tables.read();
        let Some(order) = t.orders.get(&id).cloned() else {
            return Ok(None);
        };
        let customer = t
            .customers
            .get(&order.customer_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("customer {} missing", order.customer_id))?;
        Ok(Some(OrderWithRelations {
            garments: t.garments.values().filter(|g| g.order_id == id).cloned().collect(),
            shelf_items: t.shelf_items.values().filter(|s| s.order_id == id).cloned().collect(),
            order,
            customer,
        }))
    }

    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        statuses: &[CheckoutStatus],
        limit: u64,
    ) -> anyhow::Result<Vec<Order>> {
        let t = self.tables.read();
        let mut orders: Vec<Order> = t
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id && statuses.contains(&o.checkout_status))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        orders.truncate(limit as usize);
        Ok(orders)
    }

    async fn children_of(&self, primary_id: OrderId) -> anyhow::Result<Vec<Order>> {
        Ok(self
            .tables
            .read()
            .orders
            .values()
            .filter(|o| o.linked_order_id == Some(primary_id))
            .cloned()
            .collect())
    }

    async fn save_garments(&self, order: &Order, garments: &[Garment]) -> anyhow::Result<Vec<Garment>> {
        let mut t = self.tables.write();
        t.ensure_draft(order.id)?;
        let kept: Vec<GarmentId> = garments.iter().map(|g| g.id).filter(|id| *id != 0).collect();
        t.garments
            .retain(|id, g| g.order_id != order.id || kept.contains(id));

        let mut saved = Vec::with_capacity(garments.len());
        for garment in garments {
            let mut garment = garment.clone();
            if garment.id == 0 {
                garment.id = t.next_id();
            }
            t.garments.insert(garment.id, garment.clone());
            saved.push(garment);
        }
        t.orders.insert(order.id, order.clone());
        Ok(saved)
    }

    async fn replace_shelf_items(&self, order: &Order, items: &[ShelfItem]) -> anyhow::Result<Vec<ShelfItem>> {
        let mut t = self.tables.write();
        t.ensure_draft(order.id)?;
        t.shelf_items.retain(|_, s| s.order_id != order.id);
        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            let mut item = item.clone();
            item.id = t.next_id();
            t.shelf_items.insert(item.id, item.clone());
            saved.push(item);
        }
        t.orders.insert(order.id, order.clone());
        Ok(saved)
    }

    async fn cancel(&self, order: &Order) -> anyhow::Result<Order> {
        let mut t = self.tables.write();
        t.ensure_draft(order.id)?;
        t.orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn confirm(&self, order: &Order, usage: &StockUsage) -> anyhow::Result<Order> {
        let mut t = self.tables.write();
        t.ensure_draft(order.id)?;
        for (fabric_id, metres) in std::mem::take(&mut t.concurrent_withdrawals) {
            if let Some(fabric) = t.fabrics.get_mut(&fabric_id) {
                fabric.real_stock -= metres;
            }
        }

        let mut shortages = Vec::new();
        for (fabric_id, metres) in &usage.fabrics {
            if t.fabrics.get(fabric_id).map_or(true, |f| f.real_stock < *metres) {
                shortages.push(format!("Fabric #{}: less than {}m left in stock", fabric_id, metres));
            }
        }
        for (shelf_id, quantity) in &usage.shelf {
            if t.shelf.get(shelf_id).map_or(true, |p| p.stock < *quantity) {
                shortages.push(format!("Product #{}: less than {} left in stock", shelf_id, quantity));
            }
        }
        if !shortages.is_empty() {
            return Err(WriteConflict::StockShortage(shortages).into());
        }
        for (fabric_id, metres) in &usage.fabrics {
            if let Some(fabric) = t.fabrics.get_mut(fabric_id) {
                fabric.real_stock -= *metres;
            }
        }
        for (shelf_id, quantity) in &usage.shelf {
            if let Some(product) = t.shelf.get_mut(shelf_id) {
                product.stock -= *quantity;
            }
        }

        let last_invoice = t.orders.values().filter_map(|o| o.invoice_number).max().unwrap_or(0);
        let mut confirmed = order.clone();
        confirmed.invoice_number = Some(last_invoice + 1);
        t.orders.insert(confirmed.id, confirmed.clone());
        Ok(confirmed)
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_fabrics(&self) -> anyhow::Result<Vec<Fabric>> {
        Ok(self.tables.read().fabrics.values().cloned().collect())
    }

    async fn list_styles(&self) -> anyhow::Result<Vec<Style>> {
        Ok(Vec::new())
    }

    async fn list_prices(&self) -> anyhow::Result<Vec<PriceEntry>> {
        Ok(self.tables.read().prices.clone())
    }

    async fn list_campaigns(&self) -> anyhow::Result<Vec<Campaign>> {
        Ok(Vec::new())
    }

    async fn list_shelf_products(&self) -> anyhow::Result<Vec<ShelfProduct>> {
        Ok(self.tables.read().shelf.values().cloned().collect())
    }
}

/// Collects published events for assertions
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<RwLock<Vec<OrderEvent>>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: OrderEvent) -> anyhow::Result<()> {
        self.events.write().push(event);
        Ok(())
    }
}

pub struct Harness {
    pub store: MemoryStore,
    pub events: RecordingPublisher,
    pub service: Arc<Service>,
}

pub fn harness() -> Harness {
    harness_with(MemoryStore::new(), Config::default())
}

pub fn harness_with(store: MemoryStore, config: Config) -> Harness {
    let events = RecordingPublisher::default();
    let service = Arc::new(Service::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(events.clone()),
        config,
    ));
    Harness {
        store,
        events,
        service,
    }
}

// ===== Fixtures =====

pub fn customer_input(name: &str, phone: &str) -> CustomerInput {
    CustomerInput {
        name: name.to_string(),
        phone: phone.to_string(),
        ..Default::default()
    }
}

pub fn measurement_input() -> MeasurementInput {
    MeasurementInput {
        measurement_type: MeasurementType::Body,
        reference: None,
        measurer: Some("Hassan".to_string()),
        dimensions: BodyDimensions {
            length_front: Some(dec!(140)),
            length_back: Some(dec!(142)),
            chest_full: Some(dec!(104)),
            waist_full: Some(dec!(92)),
            armhole: Some(dec!(24)),
            ..Default::default()
        },
        notes: None,
    }
}

pub fn garment_row(measurement_id: MeasurementId, fabric_id: FabricId, length: Decimal) -> GarmentInput {
    GarmentInput {
        id: None,
        measurement_id: Some(measurement_id),
        fabric_source: FabricSource::In,
        fabric_id: Some(fabric_id),
        fabric_length: length,
        color: None,
        style: "kuwaiti".to_string(),
        options: StyleOptions::default(),
        express: false,
        brova: false,
        delivery_date: None,
        notes: None,
    }
}

pub fn cash(advance: Decimal) -> ConfirmPayment {
    ConfirmPayment {
        payment_type: PaymentType::Cash,
        payment_ref: None,
        advance,
        paid: None,
        delivery_date: None,
        home_delivery: false,
        discount: None,
    }
}

/// A confirmed work order row for linking scenarios
pub fn confirmed_order(id: OrderId, customer_id: CustomerId, linked_to: Option<OrderId>) -> Order {
    let now = Utc::now();
    Order {
        id,
        customer_id,
        invoice_number: Some(1000 + id),
        order_type: OrderType::Work,
        checkout_status: CheckoutStatus::Confirmed,
        production_stage: ProductionStage::OrderAtShop,
        payment_type: Some(PaymentType::Cash),
        payment_ref: None,
        order_date: Some(now),
        delivery_date: None,
        home_delivery: false,
        campaign_id: None,
        stitching_price: dec!(7),
        discount: None,
        charges: OrderCharges::default(),
        advance: Decimal::ZERO,
        paid: Decimal::ZERO,
        num_of_fabrics: 1,
        linked_order_id: linked_to,
        linked_date: linked_to.map(|_| now),
        unlinked_date: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

/// Customer plus one measurement, created through the service
pub async fn customer_with_measurement(service: &Service, name: &str, phone: &str) -> (Customer, Measurement) {
    let customer = service
        .create_customer(customer_input(name, phone))
        .await
        .expect("create customer");
    let measurement = service
        .create_measurement(customer.id, measurement_input())
        .await
        .expect("create measurement");
    (customer, measurement)
}
