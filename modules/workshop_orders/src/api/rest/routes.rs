//! Route registration and OpenAPI document

use crate::domain::Service;
use super::{dto::*, error::Problem, handlers};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// OpenAPI components of the workshop orders REST API
#[derive(OpenApi)]
#[openapi(
    info(title = "Workshop Orders API"),
    components(schemas(
        AddressDto,
        CustomerDto,
        CustomerRequest,
        CustomerListResponse,
        AccountSuggestionDto,
        BodyDimensionsDto,
        ProvisionsDto,
        MeasurementDto,
        MeasurementRequest,
        MeasurementListResponse,
        StyleOptionsDto,
        GarmentRowDto,
        SaveGarmentsRequest,
        PriceSnapshotDto,
        GarmentDto,
        ShelfLineRequest,
        SaveShelfItemsRequest,
        ShelfItemDto,
        OrderChargesDto,
        DiscountDto,
        OrderDto,
        OrderListResponse,
        OrderDetailDto,
        CreateOrderRequest,
        UpdateOrderRequest,
        StartOrderResponse,
        ConfirmOrderRequest,
        ProductionStageRequest,
        LinkOrdersRequest,
        LinkOutcomeDto,
        UnlinkOrderRequest,
        LinkedGroupDto,
        CustomerCandidatesDto,
        LookupResultDto,
        FabricDto,
        StyleDto,
        PriceEntryDto,
        CampaignDto,
        ShelfProductDto,
    ))
)]
pub struct ApiDoc;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        // Customers
        .route("/customers", get(search_customers_handler).post(create_customer_handler))
        .route("/customers/by-phone", get(find_customer_by_phone_handler))
        .route("/customers/account-suggestion", get(suggest_account_type_handler))
        .route("/customers/{id}", get(get_customer_handler).put(update_customer_handler))
        .route(
            "/customers/{id}/measurements",
            get(list_measurements_handler).post(create_measurement_handler),
        )
        .route("/customers/{id}/orders", get(customer_orders_handler))
        .route("/customers/{id}/orders/start", post(start_order_handler))
        // Measurements
        .route("/measurements/{id}", put(update_measurement_handler))
        // Orders
        .route("/orders", post(create_order_handler))
        .route("/orders/link", post(link_orders_handler))
        .route("/orders/lookup", get(lookup_orders_handler))
        .route("/orders/by-invoice/{number}", get(get_order_by_invoice_handler))
        .route("/orders/{id}", get(get_order_handler).patch(update_order_handler))
        .route("/orders/{id}/garments", put(save_garments_handler))
        .route("/orders/{id}/shelf-items", put(save_shelf_items_handler))
        .route("/orders/{id}/confirm", post(confirm_order_handler))
        .route("/orders/{id}/cancel", post(cancel_order_handler))
        .route("/orders/{id}/production-stage", put(advance_production_stage_handler))
        .route("/orders/{id}/unlink", post(unlink_order_handler))
        .route("/orders/{id}/group", get(linked_group_handler))
        // Catalog
        .route("/catalog/fabrics", get(list_fabrics_handler))
        .route("/catalog/styles", get(list_styles_handler))
        .route("/catalog/prices", get(list_prices_handler))
        .route("/catalog/campaigns", get(list_campaigns_handler))
        .route("/catalog/shelf", get(list_shelf_products_handler))
        .route("/openapi.json", get(openapi_handler))
        .layer(Extension(service))
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// ===== Handler wrappers that extract service from Extension =====

async fn search_customers_handler(
    Extension(service): Extension<Arc<Service>>,
    query: Query<handlers::SearchQuery>,
) -> Result<Json<CustomerListResponse>, Problem> {
    handlers::search_customers(service, query).await
}

async fn create_customer_handler(
    Extension(service): Extension<Arc<Service>>,
    json: Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerDto>), Problem> {
    handlers::create_customer(service, json).await
}

async fn find_customer_by_phone_handler(
    Extension(service): Extension<Arc<Service>>,
    query: Query<handlers::PhoneQuery>,
) -> Result<Json<CustomerDto>, Problem> {
    handlers::find_customer_by_phone(service, query).await
}

async fn suggest_account_type_handler(
    Extension(service): Extension<Arc<Service>>,
    query: Query<handlers::PhoneQuery>,
) -> Result<Json<AccountSuggestionDto>, Problem> {
    handlers::suggest_account_type(service, query).await
}

async fn get_customer_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<CustomerDto>, Problem> {
    handlers::get_customer(service, path).await
}

async fn update_customer_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<CustomerRequest>,
) -> Result<Json<CustomerDto>, Problem> {
    handlers::update_customer(service, path, json).await
}

async fn list_measurements_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<MeasurementListResponse>, Problem> {
    handlers::list_measurements(service, path).await
}

async fn create_measurement_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<MeasurementRequest>,
) -> Result<(StatusCode, Json<MeasurementDto>), Problem> {
    handlers::create_measurement(service, path, json).await
}

async fn customer_orders_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    query: Query<handlers::OrdersQuery>,
) -> Result<Json<OrderListResponse>, Problem> {
    handlers::customer_orders(service, path, query).await
}

async fn start_order_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<StartOrderResponse>, Problem> {
    handlers::start_order(service, path).await
}

async fn update_measurement_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<MeasurementRequest>,
) -> Result<Json<MeasurementDto>, Problem> {
    handlers::update_measurement(service, path, json).await
}

async fn create_order_handler(
    Extension(service): Extension<Arc<Service>>,
    json: Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>), Problem> {
    handlers::create_order(service, json).await
}

async fn link_orders_handler(
    Extension(service): Extension<Arc<Service>>,
    json: Json<LinkOrdersRequest>,
) -> Result<Json<LinkOutcomeDto>, Problem> {
    handlers::link_orders(service, json).await
}

async fn lookup_orders_handler(
    Extension(service): Extension<Arc<Service>>,
    query: Query<handlers::LookupQuery>,
) -> Result<Json<LookupResultDto>, Problem> {
    handlers::lookup_orders(service, query).await
}

async fn get_order_by_invoice_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<OrderDetailDto>, Problem> {
    handlers::get_order_by_invoice(service, path).await
}

async fn get_order_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<OrderDetailDto>, Problem> {
    handlers::get_order(service, path).await
}

async fn update_order_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<UpdateOrderRequest>,
) -> Result<Json<OrderDto>, Problem> {
    handlers::update_order(service, path, json).await
}

async fn save_garments_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<SaveGarmentsRequest>,
) -> Result<Json<Vec<GarmentDto>>, Problem> {
    handlers::save_garments(service, path, json).await
}

async fn save_shelf_items_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<SaveShelfItemsRequest>,
) -> Result<Json<Vec<ShelfItemDto>>, Problem> {
    handlers::save_shelf_items(service, path, json).await
}

async fn confirm_order_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<ConfirmOrderRequest>,
) -> Result<Json<OrderDto>, Problem> {
    handlers::confirm_order(service, path, json).await
}

async fn cancel_order_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<OrderListResponse>, Problem> {
    handlers::cancel_order(service, path).await
}

async fn advance_production_stage_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<ProductionStageRequest>,
) -> Result<Json<OrderDto>, Problem> {
    handlers::advance_production_stage(service, path, json).await
}

async fn unlink_order_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
    json: Json<UnlinkOrderRequest>,
) -> Result<Json<OrderDto>, Problem> {
    handlers::unlink_order(service, path, json).await
}

async fn linked_group_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i32>,
) -> Result<Json<LinkedGroupDto>, Problem> {
    handlers::linked_group(service, path).await
}

async fn list_fabrics_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<Vec<FabricDto>>, Problem> {
    handlers::list_fabrics(service).await
}

async fn list_styles_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<Vec<StyleDto>>, Problem> {
    handlers::list_styles(service).await
}

async fn list_prices_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<Vec<PriceEntryDto>>, Problem> {
    handlers::list_prices(service).await
}

async fn list_campaigns_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<Vec<CampaignDto>>, Problem> {
    handlers::list_campaigns(service).await
}

async fn list_shelf_products_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Result<Json<Vec<ShelfProductDto>>, Problem> {
    handlers::list_shelf_products(service).await
}
