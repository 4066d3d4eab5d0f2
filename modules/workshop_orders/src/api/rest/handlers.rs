//! HTTP request handlers - thin layer that delegates to domain service

use crate::contract::{
    CheckoutStatus, ConfirmPayment, CustomerInput, MeasurementInput, NewOrder, OrderLookup,
    OrdersError, PaymentDecision, ProductionStage, StartOrder,
};
use crate::domain::Service;
use super::{
    dto::*,
    error::{map_domain_error, Problem},
    mapper,
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

// ===== Customer Handlers =====

/// Query parameters for fuzzy customer search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Name, nickname or phone fragment
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}

pub async fn search_customers(
    service: Arc<Service>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<CustomerListResponse>, Problem> {
    let customers = service
        .search_customers(&query.q)
        .await
        .map_err(map_domain_error)?;

    let items: Vec<CustomerDto> = customers.into_iter().map(Into::into).collect();
    let total = items.len();
    Ok(Json(CustomerListResponse { items, total }))
}

pub async fn find_customer_by_phone(
    service: Arc<Service>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<CustomerDto>, Problem> {
    let customer = service
        .find_customer_by_phone(&query.phone)
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| map_domain_error(OrdersError::not_found("Customer", &query.phone)))?;

    Ok(Json(customer.into()))
}

/// Account type the intake form should preselect for a phone number
pub async fn suggest_account_type(
    service: Arc<Service>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<AccountSuggestionDto>, Problem> {
    let suggestion = service
        .suggest_account_type(&query.phone)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(suggestion.into()))
}

pub async fn get_customer(
    service: Arc<Service>,
    Path(id): Path<i32>,
) -> Result<Json<CustomerDto>, Problem> {
    let customer = service.get_customer(id).await.map_err(map_domain_error)?;
    Ok(Json(customer.into()))
}

pub async fn create_customer(
    service: Arc<Service>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerDto>), Problem> {
    let input = CustomerInput::try_from(req).map_err(map_domain_error)?;
    let customer = service
        .create_customer(input)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

pub async fn update_customer(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<CustomerDto>, Problem> {
    let input = CustomerInput::try_from(req).map_err(map_domain_error)?;
    let customer = service
        .update_customer(id, input)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(customer.into()))
}

// ===== Measurement Handlers =====

pub async fn list_measurements(
    service: Arc<Service>,
    Path(customer_id): Path<i32>,
) -> Result<Json<MeasurementListResponse>, Problem> {
    let measurements = service
        .measurements_for_customer(customer_id)
        .await
        .map_err(map_domain_error)?;

    let items: Vec<MeasurementDto> = measurements.into_iter().map(Into::into).collect();
    let total = items.len();
    Ok(Json(MeasurementListResponse { items, total }))
}

pub async fn create_measurement(
    service: Arc<Service>,
    Path(customer_id): Path<i32>,
    Json(req): Json<MeasurementRequest>,
) -> Result<(StatusCode, Json<MeasurementDto>), Problem> {
    let input = MeasurementInput::try_from(req).map_err(map_domain_error)?;
    let measurement = service
        .create_measurement(customer_id, input)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(measurement.into())))
}

pub async fn update_measurement(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<MeasurementRequest>,
) -> Result<Json<MeasurementDto>, Problem> {
    let input = MeasurementInput::try_from(req).map_err(map_domain_error)?;
    let measurement = service
        .update_measurement(id, input)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(measurement.into()))
}

// ===== Order Handlers =====

/// Status filter for a customer's orders, comma separated; defaults to drafts
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<CheckoutStatus>, OrdersError> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(vec![CheckoutStatus::Draft]);
    };
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<CheckoutStatus>()
                .map_err(|e| OrdersError::validation("status", e.to_string()))
        })
        .collect()
}

pub async fn customer_orders(
    service: Arc<Service>,
    Path(customer_id): Path<i32>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrderListResponse>, Problem> {
    let statuses = parse_statuses(query.status.as_deref()).map_err(map_domain_error)?;
    let orders = service
        .pending_orders_for_customer(customer_id, &statuses)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(orders.into()))
}

/// Start a work order: either a fresh draft or the drafts that must be resolved first
pub async fn start_order(
    service: Arc<Service>,
    Path(customer_id): Path<i32>,
) -> Result<Json<StartOrderResponse>, Problem> {
    let started = service
        .start_order(customer_id)
        .await
        .map_err(map_domain_error)?;

    let response = match started {
        StartOrder::Fresh(_) => StartOrderResponse {
            fresh: true,
            pending_drafts: Vec::new(),
        },
        StartOrder::PendingDrafts(drafts) => StartOrderResponse {
            fresh: false,
            pending_drafts: drafts.into_iter().map(Into::into).collect(),
        },
    };
    Ok(Json(response))
}

pub async fn create_order(
    service: Arc<Service>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>), Problem> {
    let order_type = mapper::order_type(&req.order_type).map_err(map_domain_error)?;
    let stitching_price = match req.stitching_price {
        Some(price) => price,
        None => service
            .config()
            .pricing
            .stitching_tiers
            .first()
            .copied()
            .unwrap_or_default(),
    };

    let order = service
        .create_order(NewOrder {
            customer_id: req.customer_id,
            order_type,
            campaign_id: req.campaign_id,
            stitching_price,
            notes: req.notes,
        })
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn get_order(
    service: Arc<Service>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetailDto>, Problem> {
    let loaded = service
        .get_order_with_relations(id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(loaded.into()))
}

pub async fn get_order_by_invoice(
    service: Arc<Service>,
    Path(invoice_number): Path<i32>,
) -> Result<Json<OrderDetailDto>, Problem> {
    let loaded = service
        .get_order_by_invoice(invoice_number)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(loaded.into()))
}

pub async fn update_order(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderDto>, Problem> {
    let order = service
        .update_order(id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(order.into()))
}

/// Replace the garment rows of a draft order and reprice it
pub async fn save_garments(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<SaveGarmentsRequest>,
) -> Result<Json<Vec<GarmentDto>>, Problem> {
    let rows = mapper::garment_rows(req.garments).map_err(map_domain_error)?;
    let garments = service
        .save_garments(id, req.stitching_price, rows)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(garments.into_iter().map(Into::into).collect()))
}

pub async fn save_shelf_items(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<SaveShelfItemsRequest>,
) -> Result<Json<Vec<ShelfItemDto>>, Problem> {
    let items = service
        .save_shelf_items(id, req.items.into_iter().map(Into::into).collect())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn confirm_order(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<ConfirmOrderRequest>,
) -> Result<Json<OrderDto>, Problem> {
    let payment = ConfirmPayment::try_from(req).map_err(map_domain_error)?;
    let order = service
        .submit_payment(id, PaymentDecision::Confirm(payment))
        .await
        .map_err(map_domain_error)?;

    Ok(Json(order.into()))
}

/// Cancel a draft; responds with the customer's remaining drafts
pub async fn cancel_order(
    service: Arc<Service>,
    Path(id): Path<i32>,
) -> Result<Json<OrderListResponse>, Problem> {
    let remaining = service.cancel_draft(id).await.map_err(map_domain_error)?;
    Ok(Json(remaining.into()))
}

pub async fn advance_production_stage(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<ProductionStageRequest>,
) -> Result<Json<OrderDto>, Problem> {
    let stage = ProductionStage::try_from(req).map_err(map_domain_error)?;
    let order = service
        .advance_production_stage(id, stage)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(order.into()))
}

// ===== Linking Handlers =====

pub async fn link_orders(
    service: Arc<Service>,
    Json(req): Json<LinkOrdersRequest>,
) -> Result<Json<LinkOutcomeDto>, Problem> {
    let outcome = service
        .link_orders(req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(outcome.into()))
}

pub async fn unlink_order(
    service: Arc<Service>,
    Path(id): Path<i32>,
    Json(req): Json<UnlinkOrderRequest>,
) -> Result<Json<OrderDto>, Problem> {
    let order = service
        .unlink_order(id, req.delivery_date)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(order.into()))
}

pub async fn linked_group(
    service: Arc<Service>,
    Path(id): Path<i32>,
) -> Result<Json<LinkedGroupDto>, Problem> {
    let group = service.linked_group(id).await.map_err(map_domain_error)?;
    Ok(Json(group.into()))
}

/// Exactly one of the fields selects the lookup mode
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub order_id: Option<i32>,
    pub invoice_number: Option<i32>,
    pub customer: Option<String>,
}

impl TryFrom<LookupQuery> for OrderLookup {
    type Error = OrdersError;

    fn try_from(query: LookupQuery) -> Result<Self, Self::Error> {
        let customer = query.customer.filter(|c| !c.trim().is_empty());
        match (query.order_id, query.invoice_number, customer) {
            (Some(id), None, None) => Ok(OrderLookup::Id(id)),
            (None, Some(n), None) => Ok(OrderLookup::InvoiceNumber(n)),
            (None, None, Some(c)) => Ok(OrderLookup::Customer(c)),
            _ => Err(OrdersError::validation(
                "lookup",
                "provide exactly one of order_id, invoice_number or customer",
            )),
        }
    }
}

/// Find link candidates by order id, invoice number or customer
pub async fn lookup_orders(
    service: Arc<Service>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResultDto>, Problem> {
    let lookup = OrderLookup::try_from(query).map_err(map_domain_error)?;
    let result = service
        .lookup_orders(lookup)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(result.into()))
}

// ===== Catalog Handlers =====

pub async fn list_fabrics(service: Arc<Service>) -> Result<Json<Vec<FabricDto>>, Problem> {
    let fabrics = service.list_fabrics().await.map_err(map_domain_error)?;
    Ok(Json(fabrics.into_iter().map(Into::into).collect()))
}

pub async fn list_styles(service: Arc<Service>) -> Result<Json<Vec<StyleDto>>, Problem> {
    let styles = service.list_styles().await.map_err(map_domain_error)?;
    Ok(Json(styles.into_iter().map(Into::into).collect()))
}

pub async fn list_prices(service: Arc<Service>) -> Result<Json<Vec<PriceEntryDto>>, Problem> {
    let prices = service.list_prices().await.map_err(map_domain_error)?;
    Ok(Json(prices.into_iter().map(Into::into).collect()))
}

pub async fn list_campaigns(service: Arc<Service>) -> Result<Json<Vec<CampaignDto>>, Problem> {
    let campaigns = service.list_campaigns().await.map_err(map_domain_error)?;
    Ok(Json(campaigns.into_iter().map(Into::into).collect()))
}

pub async fn list_shelf_products(
    service: Arc<Service>,
) -> Result<Json<Vec<ShelfProductDto>>, Problem> {
    let products = service
        .list_shelf_products()
        .await
        .map_err(map_domain_error)?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses_default_to_draft() {
        assert_eq!(parse_statuses(None).unwrap(), vec![CheckoutStatus::Draft]);
        assert_eq!(
            parse_statuses(Some("draft, confirmed")).unwrap(),
            vec![CheckoutStatus::Draft, CheckoutStatus::Confirmed]
        );
        assert!(parse_statuses(Some("shipped")).is_err());
    }

    #[test]
    fn test_lookup_needs_exactly_one_mode() {
        let by_invoice = LookupQuery {
            invoice_number: Some(1042),
            ..Default::default()
        };
        assert_eq!(
            OrderLookup::try_from(by_invoice).unwrap(),
            OrderLookup::InvoiceNumber(1042)
        );

        let ambiguous = LookupQuery {
            order_id: Some(1),
            customer: Some("Ali".into()),
            ..Default::default()
        };
        assert!(OrderLookup::try_from(ambiguous).is_err());
        assert!(OrderLookup::try_from(LookupQuery::default()).is_err());
    }
}
