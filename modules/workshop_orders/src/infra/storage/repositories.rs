//! SeaORM repository implementations

use crate::contract::{
    Campaign, CheckoutStatus, Customer, CustomerId, CustomerInput, Fabric, Garment, Measurement,
    MeasurementId, NewOrder, Order, OrderId, OrderWithRelations, PriceEntry, ShelfItem,
    ShelfProduct, Style,
};
use crate::domain::repository::{
    CatalogRepository, CustomerRepository, MeasurementRepository, OrderRepository, StockUsage,
    WriteConflict,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::sync::Arc;

use super::entity::{
    campaign, customer, fabric, garment, measurement, order, order_shelf_item, price, shelf, style,
};
use super::mapper;

// ===== Customer Repository =====

pub struct SeaOrmCustomerRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn create(&self, input: &CustomerInput) -> Result<Customer> {
        let active = mapper::customer_active(input, chrono::Utc::now());
        let result = customer::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;
        result.try_into()
    }

    async fn update(&self, id: CustomerId, input: &CustomerInput) -> Result<Customer> {
        let mut active = mapper::customer_active(input, chrono::Utc::now());
        active.id = Set(id);
        // created_at is not editable
        active.created_at = sea_orm::ActiveValue::NotSet;
        let result = customer::Entity::update(active).exec(&*self.db).await?;
        result.try_into()
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>> {
        customer::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Customer::try_from)
            .transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Vec<Customer>> {
        let results = customer::Entity::find()
            .filter(customer::Column::Phone.eq(phone.trim()))
            .order_by_asc(customer::Column::Id)
            .all(&*self.db)
            .await?;
        results.into_iter().map(Customer::try_from).collect()
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<Customer>> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let lower_like = |column: customer::Column| {
            Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone())
        };

        let results = customer::Entity::find()
            .filter(
                Condition::any()
                    .add(lower_like(customer::Column::Name))
                    .add(lower_like(customer::Column::NickName))
                    .add(lower_like(customer::Column::ArabicName))
                    .add(customer::Column::Phone.contains(query.trim())),
            )
            .order_by_asc(customer::Column::Name)
            .limit(limit)
            .all(&*self.db)
            .await?;
        results.into_iter().map(Customer::try_from).collect()
    }
}

// ===== Measurement Repository =====

pub struct SeaOrmMeasurementRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMeasurementRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MeasurementRepository for SeaOrmMeasurementRepository {
    async fn create(&self, model: &Measurement) -> Result<Measurement> {
        let mut active = measurement::ActiveModel::try_from(model)?;
        active.id = sea_orm::ActiveValue::NotSet;
        let result = measurement::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;
        result.try_into()
    }

    async fn update(&self, model: &Measurement) -> Result<Measurement> {
        let active = measurement::ActiveModel::try_from(model)?;
        let result = measurement::Entity::update(active).exec(&*self.db).await?;
        result.try_into()
    }

    async fn find_by_id(&self, id: MeasurementId) -> Result<Option<Measurement>> {
        measurement::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Measurement::try_from)
            .transpose()
    }

    async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Measurement>> {
        let results = measurement::Entity::find()
            .filter(measurement::Column::CustomerId.eq(customer_id))
            .order_by_asc(measurement::Column::Id)
            .all(&*self.db)
            .await?;
        results.into_iter().map(Measurement::try_from).collect()
    }
}

// ===== Order Repository =====

pub struct SeaOrmOrderRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

async fn write_order<C: ConnectionTrait>(conn: &C, model: &Order) -> Result<Order> {
    let active: order::ActiveModel = model.into();
    let result = order::Entity::update(active).exec(conn).await?;
    result.try_into()
}

/// Touch the order row only while it is still a draft; the row stays locked
/// until the surrounding transaction ends
async fn claim_draft<C: ConnectionTrait>(conn: &C, model: &Order) -> Result<()> {
    let result = order::Entity::update_many()
        .col_expr(order::Column::UpdatedAt, Expr::value(model.updated_at))
        .filter(order::Column::Id.eq(model.id))
        .filter(order::Column::CheckoutStatus.eq(CheckoutStatus::Draft.as_str()))
        .exec(conn)
        .await?;
    if result.rows_affected != 1 {
        return Err(WriteConflict::NotDraft(model.id).into());
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn create(&self, new_order: &NewOrder) -> Result<Order> {
        let active = mapper::new_order_active(new_order, chrono::Utc::now());
        let result = order::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;
        result.try_into()
    }

    async fn update(&self, model: &Order) -> Result<Order> {
        write_order(&*self.db, model).await
    }

    async fn update_many(&self, orders: &[Order]) -> Result<Vec<Order>> {
        let txn = self.db.begin().await?;
        let mut saved = Vec::with_capacity(orders.len());
        for model in orders {
            saved.push(write_order(&txn, model).await?);
        }
        txn.commit().await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        order::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_by_invoice(&self, invoice_number: i32) -> Result<Option<Order>> {
        order::Entity::find()
            .filter(order::Column::InvoiceNumber.eq(invoice_number))
            .one(&*self.db)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_with_relations(&self, id: OrderId) -> Result<Option<OrderWithRelations>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let customer: Customer = customer::Entity::find_by_id(order.customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| anyhow!("order #{} references missing customer #{}", id, order.customer_id))?
            .try_into()?;
        let garments = garment::Entity::find()
            .filter(garment::Column::OrderId.eq(id))
            .order_by_asc(garment::Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Garment::try_from)
            .collect::<Result<Vec<_>>>()?;
        let shelf_items = order_shelf_item::Entity::find()
            .filter(order_shelf_item::Column::OrderId.eq(id))
            .order_by_asc(order_shelf_item::Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(ShelfItem::from)
            .collect();

        Ok(Some(OrderWithRelations {
            order,
            customer,
            garments,
            shelf_items,
        }))
    }

    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        statuses: &[CheckoutStatus],
        limit: u64,
    ) -> Result<Vec<Order>> {
        let labels: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let results = order::Entity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(order::Column::CheckoutStatus.is_in(labels))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .limit(limit)
            .all(&*self.db)
            .await?;
        results.into_iter().map(Order::try_from).collect()
    }

    async fn children_of(&self, primary_id: OrderId) -> Result<Vec<Order>> {
        let results = order::Entity::find()
            .filter(order::Column::LinkedOrderId.eq(primary_id))
            .order_by_asc(order::Column::Id)
            .all(&*self.db)
            .await?;
        results.into_iter().map(Order::try_from).collect()
    }

    async fn save_garments(&self, model: &Order, garments: &[Garment]) -> Result<Vec<Garment>> {
        let txn = self.db.begin().await?;
        claim_draft(&txn, model).await?;
        write_order(&txn, model).await?;

        let kept: Vec<i32> = garments.iter().map(|g| g.id).filter(|id| *id != 0).collect();
        garment::Entity::delete_many()
            .filter(garment::Column::OrderId.eq(model.id))
            .filter(garment::Column::Id.is_not_in(kept))
            .exec(&txn)
            .await?;

        let mut saved = Vec::with_capacity(garments.len());
        for item in garments {
            let active = garment::ActiveModel::try_from(item)?;
            let result = if item.id == 0 {
                garment::Entity::insert(active).exec_with_returning(&txn).await?
            } else {
                garment::Entity::update(active).exec(&txn).await?
            };
            saved.push(Garment::try_from(result)?);
        }

        txn.commit().await?;
        Ok(saved)
    }

    async fn replace_shelf_items(&self, model: &Order, items: &[ShelfItem]) -> Result<Vec<ShelfItem>> {
        let txn = self.db.begin().await?;
        claim_draft(&txn, model).await?;
        write_order(&txn, model).await?;

        order_shelf_item::Entity::delete_many()
            .filter(order_shelf_item::Column::OrderId.eq(model.id))
            .exec(&txn)
            .await?;

        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            let active: order_shelf_item::ActiveModel = item.into();
            let result = order_shelf_item::Entity::insert(active)
                .exec_with_returning(&txn)
                .await?;
            saved.push(result.into());
        }

        txn.commit().await?;
        Ok(saved)
    }

    async fn cancel(&self, model: &Order) -> Result<Order> {
        let txn = self.db.begin().await?;
        claim_draft(&txn, model).await?;
        let cancelled = write_order(&txn, model).await?;
        txn.commit().await?;
        Ok(cancelled)
    }

    async fn confirm(&self, model: &Order, usage: &StockUsage) -> Result<Order> {
        let txn = self.db.begin().await?;
        claim_draft(&txn, model).await?;

        let last_invoice: Option<i32> = order::Entity::find()
            .select_only()
            .column_as(order::Column::InvoiceNumber.max(), "last_invoice")
            .into_tuple::<Option<i32>>()
            .one(&txn)
            .await?
            .flatten();

        let mut confirmed = model.clone();
        confirmed.invoice_number = Some(last_invoice.unwrap_or(0) + 1);
        let confirmed = write_order(&txn, &confirmed).await?;

        let mut shortages = Vec::new();
        for (fabric_id, meters) in &usage.fabrics {
            let result = fabric::Entity::update_many()
                .col_expr(
                    fabric::Column::RealStock,
                    Expr::col(fabric::Column::RealStock).sub(*meters),
                )
                .filter(fabric::Column::Id.eq(*fabric_id))
                .filter(fabric::Column::RealStock.gte(*meters))
                .exec(&txn)
                .await?;
            if result.rows_affected != 1 {
                shortages.push(format!("Fabric #{}: less than {}m left in stock", fabric_id, meters));
            }
        }
        for (shelf_id, quantity) in &usage.shelf {
            let result = shelf::Entity::update_many()
                .col_expr(shelf::Column::Stock, Expr::col(shelf::Column::Stock).sub(*quantity))
                .filter(shelf::Column::Id.eq(*shelf_id))
                .filter(shelf::Column::Stock.gte(*quantity))
                .exec(&txn)
                .await?;
            if result.rows_affected != 1 {
                shortages.push(format!("Product #{}: less than {} left in stock", shelf_id, quantity));
            }
        }
        if !shortages.is_empty() {
            // dropping the transaction rolls back the invoice and any decrement
            return Err(WriteConflict::StockShortage(shortages).into());
        }

        txn.commit().await?;
        Ok(confirmed)
    }
}

// ===== Catalog Repository =====

pub struct SeaOrmCatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list_fabrics(&self) -> Result<Vec<Fabric>> {
        let results = fabric::Entity::find()
            .order_by_asc(fabric::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Fabric::from).collect())
    }

    async fn list_styles(&self) -> Result<Vec<Style>> {
        let results = style::Entity::find()
            .order_by_asc(style::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Style::from).collect())
    }

    async fn list_prices(&self) -> Result<Vec<PriceEntry>> {
        let results = price::Entity::find()
            .order_by_asc(price::Column::Key)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(PriceEntry::from).collect())
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        let results = campaign::Entity::find()
            .order_by_asc(campaign::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Campaign::from).collect())
    }

    async fn list_shelf_products(&self) -> Result<Vec<ShelfProduct>> {
        let results = shelf::Entity::find()
            .order_by_asc(shelf::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(ShelfProduct::from).collect())
    }
}
