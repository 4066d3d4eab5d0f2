//! Domain service - business logic orchestration

use crate::config::Config;
use crate::contract::{
    AccountSuggestion, AccountType, Campaign, CheckoutStatus, ConfirmPayment, Customer, CustomerCandidates,
    CustomerId, CustomerInput, Fabric, FabricId, FieldError, Garment, GarmentInput, LinkOutcome,
    LinkRequest, LinkedGroup, LookupResult, Measurement, MeasurementId, MeasurementInput,
    MeasurementStep, NewOrder, Order, OrderDraft, OrderId, OrderLookup, OrderType, OrderUpdate,
    OrderWithRelations, OrdersError, PaymentDecision, PriceEntry, PriceSnapshot, ProductionStage,
    ShelfItem, ShelfItemInput, ShelfProduct, ShelfProductId, StartOrder, StepInput, Style,
};
use super::events::{EventPublisher, OrderEvent};
use super::linking::{self, plan_link, plan_unlink};
use super::pricing::{self, PriceCatalog};
use super::repository::{
    CatalogRepository, CustomerRepository, MeasurementRepository, OrderRepository, StockUsage,
    WriteConflict,
};
use super::wizard::{garment_to_input, ValidationContext};
use super::{accounts, measurements, validation};
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Log a storage failure and hide it behind `OrdersError::Internal`
fn storage(operation: &'static str) -> impl FnOnce(anyhow::Error) -> OrdersError {
    move |e| {
        tracing::error!(operation, error = %e, "storage operation failed");
        OrdersError::Internal
    }
}

/// Like [`storage`], but guards refused inside the repository become business errors
fn guarded(operation: &'static str) -> impl FnOnce(anyhow::Error) -> OrdersError {
    move |e| match e.downcast::<WriteConflict>() {
        Ok(WriteConflict::NotDraft(id)) => {
            tracing::warn!(operation, order_id = id, "write refused, order is no longer a draft");
            OrdersError::invalid_state(format!("order #{} is no longer a draft", id))
        }
        Ok(WriteConflict::StockShortage(shortages)) => {
            tracing::warn!(operation, ?shortages, "write refused for insufficient stock");
            OrdersError::InsufficientStock { shortages }
        }
        Err(e) => storage(operation)(e),
    }
}

fn validation_failed(errors: Vec<FieldError>) -> Result<(), OrdersError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(OrdersError::Validation { errors })
    }
}

/// Read cache with a generation bumped by every eviction.
///
/// A load that started before an eviction must not repopulate the cache.
struct VersionedCache<K, V> {
    entries: HashMap<K, V>,
    generation: u64,
}

impl<K: Eq + Hash, V: Clone> VersionedCache<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn insert_if_current(&mut self, generation: u64, key: K, value: V) -> bool {
        if generation != self.generation {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    fn evict(&mut self, key: &K) {
        self.generation += 1;
        self.entries.remove(key);
    }

    fn evict_where(&mut self, stale: impl Fn(&V) -> bool) {
        self.generation += 1;
        self.entries.retain(|_, v| !stale(v));
    }
}

/// Domain service for workshop orders
pub struct Service {
    customer_repo: Arc<dyn CustomerRepository>,
    measurement_repo: Arc<dyn MeasurementRepository>,
    order_repo: Arc<dyn OrderRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    config: Config,
    /// Read cache of orders with relations; every write to an order evicts it
    order_cache: Arc<RwLock<VersionedCache<OrderId, OrderWithRelations>>>,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        customer_repo: Arc<dyn CustomerRepository>,
        measurement_repo: Arc<dyn MeasurementRepository>,
        order_repo: Arc<dyn OrderRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        config: Config,
    ) -> Self {
        Self {
            customer_repo,
            measurement_repo,
            order_repo,
            catalog_repo,
            event_publisher,
            config,
            order_cache: Arc::new(RwLock::new(VersionedCache::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== Customer Operations =====

    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, OrdersError> {
        self.customer_repo
            .find_by_id(id)
            .await
            .map_err(storage("find customer"))?
            .ok_or_else(|| OrdersError::not_found("customer", id))
    }

    /// Customer owning a phone number, preferring the primary account holder
    pub async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, OrdersError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Ok(None);
        }
        let mut matches = self
            .customer_repo
            .find_by_phone(phone)
            .await
            .map_err(storage("find customers by phone"))?;
        matches.sort_by_key(|c| (c.account_type != Some(AccountType::Primary), c.id));
        Ok(matches.into_iter().next())
    }

    /// Fuzzy customer search ranked by similarity of name, nick name or phone
    pub async fn search_customers(&self, query: &str) -> Result<Vec<Customer>, OrdersError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = self
            .customer_repo
            .search(query, self.config.search_limit)
            .await
            .map_err(storage("search customers"))?;

        let needle = query.to_lowercase();
        let score = |c: &Customer| {
            [Some(&c.name), c.nick_name.as_ref(), Some(&c.phone)]
                .into_iter()
                .flatten()
                .map(|field| strsim::jaro_winkler(&needle, &field.to_lowercase()))
                .fold(0.0_f64, f64::max)
        };
        found.sort_by(|a, b| score(b).total_cmp(&score(a)));
        Ok(found)
    }

    pub async fn suggest_account_type(
        &self,
        phone: &str,
    ) -> Result<Option<AccountSuggestion>, OrdersError> {
        let same_phone = self.customers_with_phone(phone).await?;
        Ok(accounts::suggest_account_type(phone, &same_phone))
    }

    pub async fn create_customer(&self, input: CustomerInput) -> Result<Customer, OrdersError> {
        validation_failed(validation::validate_customer(&input))?;
        let same_phone = self.customers_with_phone(&input.phone).await?;
        let input = accounts::resolve_account_type(input, &same_phone, None)
            .map_err(|e| OrdersError::Validation { errors: vec![e] })?;

        let customer = self
            .customer_repo
            .create(&input)
            .await
            .map_err(storage("create customer"))?;
        tracing::info!(
            customer_id = customer.id,
            account_type = ?customer.account_type,
            "customer created"
        );
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<Customer, OrdersError> {
        self.get_customer(id).await?;
        validation_failed(validation::validate_customer(&input))?;
        let same_phone = self.customers_with_phone(&input.phone).await?;
        let input = accounts::resolve_account_type(input, &same_phone, Some(id))
            .map_err(|e| OrdersError::Validation { errors: vec![e] })?;

        let customer = self
            .customer_repo
            .update(id, &input)
            .await
            .map_err(storage("update customer"))?;
        self.order_cache
            .write()
            .evict_where(|o| o.order.customer_id == id);
        tracing::info!(customer_id = id, "customer updated");
        Ok(customer)
    }

    async fn customers_with_phone(&self, phone: &str) -> Result<Vec<Customer>, OrdersError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Ok(Vec::new());
        }
        self.customer_repo
            .find_by_phone(phone)
            .await
            .map_err(storage("find customers by phone"))
    }

    // ===== Measurement Operations =====

    pub async fn measurements_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Measurement>, OrdersError> {
        self.get_customer(customer_id).await?;
        self.measurement_repo
            .list_for_customer(customer_id)
            .await
            .map_err(storage("list measurements"))
    }

    pub async fn get_measurement(&self, id: MeasurementId) -> Result<Measurement, OrdersError> {
        self.measurement_repo
            .find_by_id(id)
            .await
            .map_err(storage("find measurement"))?
            .ok_or_else(|| OrdersError::not_found("measurement", id))
    }

    /// Record a new measurement; the code and provisions are derived
    pub async fn create_measurement(
        &self,
        customer_id: CustomerId,
        input: MeasurementInput,
    ) -> Result<Measurement, OrdersError> {
        validation_failed(measurements::validate_dimensions(&input.dimensions))?;
        let existing = self.measurements_for_customer(customer_id).await?;

        let mut measurement = Measurement {
            id: 0,
            customer_id,
            measurement_code: measurements::next_measurement_code(customer_id, &existing),
            measurement_type: input.measurement_type,
            reference: None,
            measurer: None,
            measurement_date: Utc::now(),
            dimensions: Default::default(),
            provisions: Default::default(),
            notes: None,
        };
        measurement.apply_input(input);

        let created = self
            .measurement_repo
            .create(&measurement)
            .await
            .map_err(storage("create measurement"))?;
        tracing::info!(
            customer_id,
            measurement_id = created.id,
            code = %created.measurement_code,
            "measurement created"
        );
        Ok(created)
    }

    pub async fn update_measurement(
        &self,
        id: MeasurementId,
        input: MeasurementInput,
    ) -> Result<Measurement, OrdersError> {
        validation_failed(measurements::validate_dimensions(&input.dimensions))?;
        let mut measurement = self.get_measurement(id).await?;
        measurement.apply_input(input);

        self.measurement_repo
            .update(&measurement)
            .await
            .map_err(storage("update measurement"))
    }

    // ===== Order Operations =====

    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrdersError> {
        Ok(self.get_order_with_relations(id).await?.order)
    }

    /// Order with customer and line items, served from the read cache when possible
    pub async fn get_order_with_relations(
        &self,
        id: OrderId,
    ) -> Result<OrderWithRelations, OrdersError> {
        let generation = {
            let cache = self.order_cache.read();
            if let Some(cached) = cache.get(&id) {
                return Ok(cached);
            }
            cache.generation
        };
        let loaded = self
            .order_repo
            .find_with_relations(id)
            .await
            .map_err(storage("load order"))?
            .ok_or_else(|| OrdersError::not_found("order", id))?;
        if !self.order_cache.write().insert_if_current(generation, id, loaded.clone()) {
            tracing::debug!(order_id = id, "order changed while loading; not cached");
        }
        Ok(loaded)
    }

    pub async fn get_order_by_invoice(
        &self,
        invoice_number: i32,
    ) -> Result<OrderWithRelations, OrdersError> {
        let order = self
            .order_repo
            .find_by_invoice(invoice_number)
            .await
            .map_err(storage("find order by invoice"))?
            .ok_or_else(|| OrdersError::not_found("invoice", invoice_number))?;
        self.get_order_with_relations(order.id).await
    }

    /// Create a draft order for an existing customer
    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order, OrdersError> {
        self.get_customer(new_order.customer_id).await?;
        pricing::validate_tier(new_order.stitching_price, &self.config.pricing)
            .map_err(|e| OrdersError::Validation { errors: vec![e] })?;

        let order = self
            .order_repo
            .create(&new_order)
            .await
            .map_err(storage("create order"))?;
        tracing::info!(
            order_id = order.id,
            customer_id = order.customer_id,
            order_type = %order.order_type,
            "draft order created"
        );
        Ok(order)
    }

    /// Edit order terms. Confirmed and cancelled orders only accept notes.
    pub async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Order, OrdersError> {
        let mut order = self.get_order(id).await?;
        if order.checkout_status.is_terminal() && update.changes_terms() {
            return Err(OrdersError::invalid_state(format!(
                "order #{} is {}; only notes can be changed",
                id, order.checkout_status
            )));
        }

        if let Some(date) = update.delivery_date {
            order.delivery_date = Some(date);
        }
        if let Some(home_delivery) = update.home_delivery {
            order.home_delivery = home_delivery;
        }
        if let Some(campaign_id) = update.campaign_id {
            order.campaign_id = Some(campaign_id);
        }
        if let Some(notes) = update.notes {
            order.notes = Some(notes);
        }
        order.updated_at = Utc::now();

        self.write_order(&order, "update order").await
    }

    /// Orders of a customer in the given statuses, newest first
    pub async fn pending_orders_for_customer(
        &self,
        customer_id: CustomerId,
        statuses: &[CheckoutStatus],
    ) -> Result<Vec<Order>, OrdersError> {
        self.order_repo
            .list_for_customer(customer_id, statuses, self.config.pending_orders_limit)
            .await
            .map_err(storage("list customer orders"))
    }

    async fn write_order(&self, order: &Order, operation: &'static str) -> Result<Order, OrdersError> {
        let saved = self.order_repo.update(order).await.map_err(storage(operation))?;
        self.invalidate(order.id);
        Ok(saved)
    }

    fn invalidate(&self, id: OrderId) {
        self.order_cache.write().evict(&id);
    }

    /// Load an order that must still be a draft
    async fn draft_order(&self, id: OrderId) -> Result<OrderWithRelations, OrdersError> {
        let loaded = self.get_order_with_relations(id).await?;
        if loaded.order.checkout_status != CheckoutStatus::Draft {
            return Err(OrdersError::invalid_state(format!(
                "order #{} is {}, not a draft",
                id, loaded.order.checkout_status
            )));
        }
        Ok(loaded)
    }

    // ===== Pending Drafts =====

    /// Begin a work order for a customer unless drafts are already waiting
    pub async fn start_order(&self, customer_id: CustomerId) -> Result<StartOrder, OrdersError> {
        self.get_customer(customer_id).await?;
        let drafts = self
            .pending_orders_for_customer(customer_id, &[CheckoutStatus::Draft])
            .await?;

        if drafts.is_empty() {
            Ok(StartOrder::Fresh(OrderDraft::for_customer(customer_id)))
        } else {
            tracing::info!(customer_id, drafts = drafts.len(), "customer has pending drafts");
            Ok(StartOrder::PendingDrafts(drafts))
        }
    }

    /// Fresh wizard state, skipping the pending-draft check
    pub async fn start_new_order(&self, customer_id: CustomerId) -> Result<OrderDraft, OrdersError> {
        self.get_customer(customer_id).await?;
        Ok(OrderDraft::for_customer(customer_id))
    }

    pub async fn continue_draft(&self, order_id: OrderId) -> Result<OrderDraft, OrdersError> {
        let loaded = self.draft_order(order_id).await?;
        Ok(OrderDraft::resume(&loaded))
    }

    /// Cancel a pending draft and return the remaining drafts of its customer
    pub async fn cancel_draft(&self, order_id: OrderId) -> Result<Vec<Order>, OrdersError> {
        let order = self.submit_payment(order_id, PaymentDecision::Cancel).await?;
        self.pending_orders_for_customer(order.customer_id, &[CheckoutStatus::Draft])
            .await
    }

    // ===== Wizard =====

    /// Validate and persist the input of one wizard step, returning the advanced draft
    pub async fn proceed(&self, draft: OrderDraft, input: StepInput) -> Result<OrderDraft, OrdersError> {
        let step = input.step();
        draft.check_can_submit(step)?;

        let ctx = self.validation_context(&input).await?;
        validation_failed(draft.validate_input(&input, &ctx))?;

        let order_id = draft.order_id;
        let next = match input {
            StepInput::Demographics {
                customer_id,
                customer,
                campaign_id,
            } => {
                let customer = match customer_id.or(draft.customer_id) {
                    Some(id) => self.update_customer(id, customer).await?,
                    None => self.create_customer(customer).await?,
                };
                let order_id = match order_id {
                    Some(id) => self.reassign_draft(id, customer.id, campaign_id).await?,
                    None => {
                        let tier = self
                            .config
                            .pricing
                            .stitching_tiers
                            .first()
                            .copied()
                            .unwrap_or_default();
                        self.create_order(NewOrder {
                            customer_id: customer.id,
                            order_type: OrderType::Work,
                            campaign_id,
                            stitching_price: tier,
                            notes: None,
                        })
                        .await?
                        .id
                    }
                };
                draft.record_demographics(customer.id, order_id, campaign_id)
            }
            StepInput::Measurements(measurement) => {
                let customer_id = draft
                    .customer_id
                    .ok_or_else(|| OrdersError::invalid_state("the draft has no customer"))?;
                let saved = match measurement {
                    MeasurementStep::UseExisting(id) => self.owned_measurement(id, customer_id).await?,
                    MeasurementStep::Create(input) => self.create_measurement(customer_id, input).await?,
                    MeasurementStep::Update(id, input) => {
                        self.owned_measurement(id, customer_id).await?;
                        self.update_measurement(id, input).await?
                    }
                };
                draft.record_measurement(saved.id)
            }
            StepInput::FabricSelection {
                stitching_tier,
                garments,
            } => {
                let id = order_id.ok_or_else(|| OrdersError::invalid_state("the draft has no order"))?;
                let saved = self.save_garments(id, stitching_tier, garments).await?;
                draft.record_garments(stitching_tier, &saved)
            }
            StepInput::ShelfProducts { items } => {
                let id = order_id.ok_or_else(|| OrdersError::invalid_state("the draft has no order"))?;
                self.save_shelf_items(id, items.clone()).await?;
                draft.record_shelf_items(items)
            }
            StepInput::ReviewPayment(decision) => {
                let id = order_id.ok_or_else(|| OrdersError::invalid_state("the draft has no order"))?;
                let order = self.submit_payment(id, decision).await?;
                draft.record_outcome(order.checkout_status)
            }
        };

        tracing::debug!(step = ?step, next = ?next.current_step, "wizard step saved");
        Ok(next)
    }

    /// A measurement of the draft's customer; checked before anything is written
    async fn owned_measurement(
        &self,
        id: MeasurementId,
        customer_id: CustomerId,
    ) -> Result<Measurement, OrdersError> {
        let measurement = self.get_measurement(id).await?;
        if measurement.customer_id != customer_id {
            tracing::warn!(measurement_id = id, customer_id, "measurement of another customer refused");
            return Err(OrdersError::validation(
                "measurement_id",
                format!("measurement #{} belongs to another customer", id),
            ));
        }
        Ok(measurement)
    }

    async fn validation_context(&self, input: &StepInput) -> Result<ValidationContext, OrdersError> {
        let mut ctx = ValidationContext {
            pricing: self.config.pricing.clone(),
            ..Default::default()
        };
        match input {
            StepInput::FabricSelection { .. } => ctx.fabrics = self.fabric_map().await?,
            StepInput::ShelfProducts { .. } => ctx.shelf_products = self.shelf_map().await?,
            _ => {}
        }
        Ok(ctx)
    }

    /// Point an existing draft at the (possibly changed) customer and campaign
    async fn reassign_draft(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        campaign_id: Option<i32>,
    ) -> Result<OrderId, OrdersError> {
        let mut order = self.draft_order(order_id).await?.order;
        if order.customer_id == customer_id && order.campaign_id == campaign_id {
            return Ok(order_id);
        }
        order.customer_id = customer_id;
        order.campaign_id = campaign_id;
        order.updated_at = Utc::now();
        Ok(self.write_order(&order, "reassign draft").await?.id)
    }

    // ===== Line Items =====

    /// Replace the garment set of a draft order.
    ///
    /// Rows are validated, the fabric stock is checked for the whole set, prices are
    /// snapshotted and the order charges recomputed; all of it is written atomically.
    pub async fn save_garments(
        &self,
        order_id: OrderId,
        stitching_tier: Decimal,
        rows: Vec<GarmentInput>,
    ) -> Result<Vec<Garment>, OrdersError> {
        let loaded = self.draft_order(order_id).await?;
        let fabrics = self.fabric_map().await?;

        let mut errors = validation::validate_garment_rows(&rows, &fabrics);
        if let Err(e) = pricing::validate_tier(stitching_tier, &self.config.pricing) {
            errors.push(e);
        }
        let owned: Vec<MeasurementId> = self
            .measurement_repo
            .list_for_customer(loaded.order.customer_id)
            .await
            .map_err(storage("list measurements"))?
            .into_iter()
            .map(|m| m.id)
            .collect();
        for (index, row) in rows.iter().enumerate() {
            if let Some(m) = row.measurement_id.filter(|m| !owned.contains(m)) {
                errors.push(FieldError::in_row(
                    index + 1,
                    "measurement_id",
                    format!("measurement #{} does not belong to the order's customer", m),
                ));
            }
            if let Some(g) = row.id.filter(|g| !loaded.garments.iter().any(|e| e.id == *g)) {
                errors.push(FieldError::in_row(
                    index + 1,
                    "id",
                    format!("garment #{} is not part of order #{}", g, order_id),
                ));
            }
        }
        validation_failed(errors)?;

        if let Err(shortages) = pricing::check_fabric_stock(&rows, &fabrics) {
            tracing::warn!(order_id, ?shortages, "garments refused for insufficient fabric stock");
            return Err(OrdersError::InsufficientStock { shortages });
        }

        let catalog = PriceCatalog::from_entries(&self.list_prices().await?);
        let mut next_code = next_garment_number(&loaded.garments);
        let garments: Vec<Garment> = rows
            .into_iter()
            .map(|row| {
                let price =
                    pricing::price_garment(&row, stitching_tier, &fabrics, &catalog, &self.config.pricing);
                let garment_code = row
                    .id
                    .and_then(|id| loaded.garments.iter().find(|g| g.id == id))
                    .map(|g| g.garment_code.clone())
                    .unwrap_or_else(|| {
                        next_code += 1;
                        format!("{}-{}", order_id, next_code)
                    });
                Garment {
                    id: row.id.unwrap_or(0),
                    order_id,
                    garment_code,
                    measurement_id: row.measurement_id.unwrap_or_default(),
                    fabric_source: row.fabric_source,
                    fabric_id: row.fabric_id,
                    fabric_length: row.fabric_length,
                    color: row.color,
                    style: row.style,
                    options: row.options,
                    express: row.express,
                    brova: row.brova,
                    delivery_date: row.delivery_date,
                    notes: row.notes,
                    price,
                }
            })
            .collect();

        let mut order = loaded.order;
        let snapshots: Vec<PriceSnapshot> = garments.iter().map(|g| g.price.clone()).collect();
        order.stitching_price = stitching_tier;
        order.num_of_fabrics = garments.len() as i32;
        order.charges = pricing::order_charges(
            &snapshots,
            &loaded.shelf_items,
            order.charges.delivery,
            order.discount.as_ref(),
        );
        order.updated_at = Utc::now();

        let saved = self.order_repo.save_garments(&order, &garments).await;
        self.invalidate(order_id);
        let saved = saved.map_err(guarded("save garments"))?;
        tracing::info!(
            order_id,
            garments = saved.len(),
            total = %order.charges.total,
            "garments saved"
        );
        Ok(saved)
    }

    /// Replace the shelf lines of a draft order, snapshotting unit prices
    pub async fn save_shelf_items(
        &self,
        order_id: OrderId,
        items: Vec<ShelfItemInput>,
    ) -> Result<Vec<ShelfItem>, OrdersError> {
        let loaded = self.draft_order(order_id).await?;
        let products = self.shelf_map().await?;
        let merged = validation::validate_shelf_rows(&items, &products)
            .map_err(|errors| OrdersError::Validation { errors })?;

        let lines: Vec<ShelfItem> = merged
            .into_iter()
            .filter_map(|(shelf_id, quantity)| {
                let product = products.get(&shelf_id)?;
                Some(ShelfItem {
                    id: 0,
                    order_id,
                    shelf_id,
                    quantity,
                    unit_price: product.price,
                })
            })
            .collect();

        let mut order = loaded.order;
        let snapshots: Vec<PriceSnapshot> = loaded.garments.iter().map(|g| g.price.clone()).collect();
        order.charges = pricing::order_charges(
            &snapshots,
            &lines,
            order.charges.delivery,
            order.discount.as_ref(),
        );
        order.updated_at = Utc::now();

        let saved = self.order_repo.replace_shelf_items(&order, &lines).await;
        self.invalidate(order_id);
        let saved = saved.map_err(guarded("replace shelf items"))?;
        tracing::info!(order_id, lines = saved.len(), shelf = %order.charges.shelf, "shelf items saved");
        Ok(saved)
    }

    // ===== Checkout =====

    /// Confirm or cancel a draft order
    pub async fn submit_payment(
        &self,
        order_id: OrderId,
        decision: PaymentDecision,
    ) -> Result<Order, OrdersError> {
        let loaded = self.draft_order(order_id).await?;
        let order = match decision {
            PaymentDecision::Cancel => {
                let mut order = loaded.order;
                order.checkout_status = CheckoutStatus::Cancelled;
                order.updated_at = Utc::now();
                let cancelled = self.order_repo.cancel(&order).await;
                self.invalidate(order_id);
                let order = cancelled.map_err(guarded("cancel order"))?;
                tracing::info!(order_id, "order cancelled");
                order
            }
            PaymentDecision::Confirm(payment) => self.confirm(loaded, payment).await?,
        };

        self.publish(OrderEvent::checkout_completed(&order)).await;
        Ok(order)
    }

    async fn confirm(
        &self,
        loaded: OrderWithRelations,
        payment: ConfirmPayment,
    ) -> Result<Order, OrdersError> {
        let OrderWithRelations {
            order: mut order,
            garments,
            shelf_items,
            ..
        } = loaded;
        if garments.is_empty() && shelf_items.is_empty() {
            return Err(OrdersError::validation(
                "order",
                "add at least one garment or shelf product before confirming",
            ));
        }

        let delivery = if payment.home_delivery {
            self.config.pricing.default_delivery_charge
        } else {
            Decimal::ZERO
        };
        let snapshots: Vec<PriceSnapshot> = garments.iter().map(|g| g.price.clone()).collect();
        let charges =
            pricing::order_charges(&snapshots, &shelf_items, delivery, payment.discount.as_ref());
        validation_failed(validation::validate_payment(&payment, charges.total))?;

        // Stock may have moved since the lines were saved
        let inputs: Vec<GarmentInput> = garments.iter().map(garment_to_input).collect();
        let mut shortages = match pricing::check_fabric_stock(&inputs, &self.fabric_map().await?) {
            Ok(()) => Vec::new(),
            Err(s) => s,
        };
        let products = self.shelf_map().await?;
        for line in &shelf_items {
            match products.get(&line.shelf_id) {
                Some(p) if p.stock >= line.quantity => {}
                Some(p) => shortages.push(format!(
                    "Product {} (#{}): requested {} exceeds stock {}",
                    p.product_type, p.id, line.quantity, p.stock
                )),
                None => shortages.push(format!("Product #{} no longer exists", line.shelf_id)),
            }
        }
        if !shortages.is_empty() {
            tracing::warn!(order_id = order.id, ?shortages, "confirmation refused for insufficient stock");
            return Err(OrdersError::InsufficientStock { shortages });
        }

        let now = Utc::now();
        order.checkout_status = CheckoutStatus::Confirmed;
        order.payment_type = Some(payment.payment_type);
        order.payment_ref = payment.payment_ref;
        order.paid = payment.paid.unwrap_or(payment.advance);
        order.advance = payment.advance;
        order.home_delivery = payment.home_delivery;
        order.discount = payment.discount;
        order.charges = charges;
        order.order_date = Some(now);
        if payment.delivery_date.is_some() {
            order.delivery_date = payment.delivery_date;
        }
        order.updated_at = now;

        let usage = StockUsage {
            fabrics: pricing::fabric_usage(&inputs).into_iter().collect(),
            shelf: shelf_items.iter().map(|s| (s.shelf_id, s.quantity)).collect(),
        };
        let confirmed = self.order_repo.confirm(&order, &usage).await;
        self.invalidate(order.id);
        let confirmed = confirmed.map_err(guarded("confirm order"))?;
        tracing::info!(
            order_id = confirmed.id,
            invoice_number = ?confirmed.invoice_number,
            total = %confirmed.charges.total,
            "order confirmed"
        );
        Ok(confirmed)
    }

    // ===== Production =====

    /// Move a confirmed order forward through the workshop stages
    pub async fn advance_production_stage(
        &self,
        order_id: OrderId,
        stage: ProductionStage,
    ) -> Result<Order, OrdersError> {
        let mut order = self.get_order(order_id).await?;
        if order.checkout_status != CheckoutStatus::Confirmed {
            return Err(OrdersError::invalid_state(format!(
                "order #{} is {}; only confirmed orders go to production",
                order_id, order.checkout_status
            )));
        }
        if stage <= order.production_stage {
            return Err(OrdersError::invalid_state(format!(
                "order #{} is already at {}; cannot move to {}",
                order_id, order.production_stage, stage
            )));
        }

        let from = order.production_stage;
        order.production_stage = stage;
        order.updated_at = Utc::now();
        let order = self.write_order(&order, "advance production stage").await?;

        tracing::info!(order_id, from = %from, to = %stage, "production stage advanced");
        self.publish(OrderEvent::production_advanced(order_id, from, stage)).await;
        Ok(order)
    }

    // ===== Linking =====

    /// Group confirmed work orders under a primary with a shared delivery date
    pub async fn link_orders(&self, request: LinkRequest) -> Result<LinkOutcome, OrdersError> {
        let mut selected = Vec::with_capacity(request.order_ids.len());
        let mut children = HashMap::new();
        for id in &request.order_ids {
            if selected.iter().any(|o: &Order| o.id == *id) {
                continue;
            }
            let order = self
                .order_repo
                .find_by_id(*id)
                .await
                .map_err(storage("find order"))?
                .ok_or_else(|| OrdersError::not_found("order", id))?;
            let kids = self
                .order_repo
                .children_of(*id)
                .await
                .map_err(storage("list linked orders"))?;
            children.insert(*id, kids);
            selected.push(order);
        }

        let plan = plan_link(&request, &selected, &children, Utc::now()).map_err(|e| {
            tracing::warn!(primary_id = request.primary_id, error = %e, "link refused");
            OrdersError::from(e)
        })?;

        self.order_repo
            .update_many(&plan.updates)
            .await
            .map_err(storage("link orders"))?;
        for order in &plan.updates {
            self.invalidate(order.id);
        }

        tracing::info!(
            primary_id = plan.primary_id,
            children = ?plan.children,
            auto_added = plan.auto_added,
            "orders linked"
        );
        self.publish(OrderEvent::orders_linked(
            plan.primary_id,
            plan.children.clone(),
            plan.delivery_date,
        ))
        .await;

        Ok(LinkOutcome {
            primary_id: plan.primary_id,
            children: plan.children,
            auto_added: plan.auto_added,
            delivery_date: plan.delivery_date,
        })
    }

    /// Detach a child from its group with its own delivery date
    pub async fn unlink_order(
        &self,
        order_id: OrderId,
        new_delivery_date: Option<NaiveDate>,
    ) -> Result<Order, OrdersError> {
        let order = self.get_order(order_id).await?;
        let former_primary = order.linked_order_id;
        let updated = plan_unlink(&order, new_delivery_date, Utc::now()).map_err(|e| {
            tracing::warn!(order_id, error = %e, "unlink refused");
            OrdersError::from(e)
        })?;

        let saved = self.write_order(&updated, "unlink order").await?;
        if let (Some(primary), Some(date)) = (former_primary, saved.delivery_date) {
            self.invalidate(primary);
            tracing::info!(order_id, former_primary = primary, "order unlinked");
            self.publish(OrderEvent::order_unlinked(order_id, primary, date)).await;
        }
        Ok(saved)
    }

    pub async fn linked_group(&self, primary_id: OrderId) -> Result<LinkedGroup, OrdersError> {
        let primary = self.get_order(primary_id).await?;
        if let Some(parent) = primary.linked_order_id {
            return Err(OrdersError::rule(format!(
                "order #{} is linked to order #{}; open the group from its primary",
                primary_id, parent
            )));
        }
        let children = self
            .order_repo
            .children_of(primary_id)
            .await
            .map_err(storage("list linked orders"))?;
        Ok(LinkedGroup { primary, children })
    }

    /// Locate orders to link by id, invoice number or customer
    pub async fn lookup_orders(&self, lookup: OrderLookup) -> Result<LookupResult, OrdersError> {
        let single = match &lookup {
            OrderLookup::Id(id) => Some(self.get_order(*id).await?),
            OrderLookup::InvoiceNumber(n) => Some(self.get_order_by_invoice(*n).await?.order),
            OrderLookup::Customer(_) => None,
        };
        if let Some(order) = single {
            let notice = (!linking::is_link_candidate(&order)).then(|| {
                format!(
                    "order #{} is not available for linking ({}, {})",
                    order.id,
                    order.checkout_status,
                    if order.is_linked() { "linked" } else { "unlinked" }
                )
            });
            return Ok(LookupResult {
                orders: vec![order],
                customers: Vec::new(),
                notice,
            });
        }

        let OrderLookup::Customer(query) = lookup else {
            return Ok(LookupResult::default());
        };
        let customers = self.search_customers(&query).await?;
        if customers.is_empty() {
            return Err(OrdersError::not_found("customer", query));
        }

        let mut result = LookupResult::default();
        let mut empty = Vec::new();
        for customer in customers {
            let orders: Vec<Order> = self
                .pending_orders_for_customer(customer.id, &[CheckoutStatus::Confirmed])
                .await?
                .into_iter()
                .filter(linking::is_link_candidate)
                .collect();
            if orders.is_empty() {
                empty.push(customer.name.clone());
            }
            result.orders.extend(orders.iter().cloned());
            result.customers.push(CustomerCandidates { customer, orders });
        }
        if !empty.is_empty() {
            result.notice = Some(format!("No pending orders for {}", empty.join(", ")));
        }
        Ok(result)
    }

    // ===== Catalogs =====

    pub async fn list_fabrics(&self) -> Result<Vec<Fabric>, OrdersError> {
        self.catalog_repo.list_fabrics().await.map_err(storage("list fabrics"))
    }

    pub async fn list_styles(&self) -> Result<Vec<Style>, OrdersError> {
        self.catalog_repo.list_styles().await.map_err(storage("list styles"))
    }

    pub async fn list_prices(&self) -> Result<Vec<PriceEntry>, OrdersError> {
        self.catalog_repo.list_prices().await.map_err(storage("list prices"))
    }

    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, OrdersError> {
        self.catalog_repo.list_campaigns().await.map_err(storage("list campaigns"))
    }

    pub async fn list_shelf_products(&self) -> Result<Vec<ShelfProduct>, OrdersError> {
        self.catalog_repo
            .list_shelf_products()
            .await
            .map_err(storage("list shelf products"))
    }

    async fn fabric_map(&self) -> Result<HashMap<FabricId, Fabric>, OrdersError> {
        Ok(self.list_fabrics().await?.into_iter().map(|f| (f.id, f)).collect())
    }

    async fn shelf_map(&self) -> Result<HashMap<ShelfProductId, ShelfProduct>, OrdersError> {
        Ok(self
            .list_shelf_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect())
    }

    async fn publish(&self, event: OrderEvent) {
        if let Err(e) = self.event_publisher.publish(event).await {
            tracing::warn!(error = %e, "failed to publish order event");
        }
    }
}

/// Highest `n` among garment codes `"<orderId>-<n>"`
fn next_garment_number(existing: &[Garment]) -> u32 {
    existing
        .iter()
        .filter_map(|g| g.garment_code.rsplit_once('-'))
        .filter_map(|(_, n)| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}
