//! REST DTOs with serde derives for HTTP API
//!
//! Enum values travel as their string labels (`"draft"`, `"WORK"`, `"IN"`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Customer DTOs =====

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AddressDto {
    pub city: Option<String>,
    pub area: Option<String>,
    pub block: Option<String>,
    pub street: Option<String>,
    pub house_no: Option<String>,
    pub address_note: Option<String>,
}

/// Customer response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDto {
    pub id: i32,
    #[schema(example = "Ali")]
    pub name: String,
    pub nick_name: Option<String>,
    pub arabic_name: Option<String>,
    #[schema(example = "+965 5555 0001")]
    pub phone: String,
    pub alternate_mobile: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub customer_segment: Option<String>,
    pub address: AddressDto,
    /// `Primary` or `Secondary`; absent when unset
    pub account_type: Option<String>,
    /// Phone of the primary account
    pub relation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer create/update request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerRequest {
    pub name: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub arabic_name: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub alternate_mobile: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub customer_segment: Option<String>,
    #[serde(default)]
    pub address: AddressDto,
    /// Leave empty to derive it from the phone number
    #[serde(default)]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerListResponse {
    pub items: Vec<CustomerDto>,
    pub total: usize,
}

/// Suggested account type for a phone number; both fields absent for an empty phone
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountSuggestionDto {
    pub account_type: Option<String>,
    pub relation: Option<String>,
}

// ===== Measurement DTOs =====

/// Body dimensions in centimetres
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BodyDimensionsDto {
    pub length_front: Option<Decimal>,
    pub length_back: Option<Decimal>,
    pub bottom: Option<Decimal>,
    pub shoulder: Option<Decimal>,
    pub neck: Option<Decimal>,
    pub chest_full: Option<Decimal>,
    pub chest_front: Option<Decimal>,
    pub chest_back: Option<Decimal>,
    pub chest_upper: Option<Decimal>,
    pub waist_full: Option<Decimal>,
    pub waist_front: Option<Decimal>,
    pub waist_back: Option<Decimal>,
    pub sleeve_length: Option<Decimal>,
    pub sleeve_width: Option<Decimal>,
    pub elbow: Option<Decimal>,
    pub armhole: Option<Decimal>,
    pub armhole_front: Option<Decimal>,
    pub top_pocket_length: Option<Decimal>,
    pub top_pocket_width: Option<Decimal>,
    pub side_pocket_length: Option<Decimal>,
    pub side_pocket_width: Option<Decimal>,
    pub jabzour_length: Option<Decimal>,
    pub jabzour_width: Option<Decimal>,
}

/// Derived provisions; read-only
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProvisionsDto {
    pub armhole: Option<Decimal>,
    pub chest: Option<Decimal>,
    pub waist: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeasurementDto {
    pub id: i32,
    pub customer_id: i32,
    #[schema(example = "42-1")]
    pub measurement_code: String,
    /// `Body` or `Dishdasha`
    pub measurement_type: String,
    pub reference: Option<String>,
    pub measurer: Option<String>,
    pub measurement_date: DateTime<Utc>,
    pub dimensions: BodyDimensionsDto,
    pub provisions: ProvisionsDto,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MeasurementRequest {
    #[serde(default = "default_measurement_type")]
    pub measurement_type: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub measurer: Option<String>,
    #[serde(default)]
    pub dimensions: BodyDimensionsDto,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_measurement_type() -> String {
    "Body".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeasurementListResponse {
    pub items: Vec<MeasurementDto>,
    pub total: usize,
}

// ===== Garment DTOs =====

/// Style option codes; each code is a key of the price table
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct StyleOptionsDto {
    pub collar_type: Option<String>,
    pub collar_button: Option<String>,
    pub cuffs_type: Option<String>,
    pub cuffs_thickness: Option<String>,
    pub jabzour_1: Option<String>,
    pub jabzour_2: Option<String>,
    pub jabzour_thickness: Option<String>,
    pub front_pocket_type: Option<String>,
    pub front_pocket_thickness: Option<String>,
    pub wallet_pocket: bool,
    pub pen_holder: bool,
    pub mobile_pocket: bool,
    pub small_tabaggi: bool,
    pub lines: i32,
}

/// One garment row of the fabric selection step
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GarmentRowDto {
    /// Id of a previously saved garment; absent for new rows
    #[serde(default)]
    pub id: Option<i32>,
    pub measurement_id: Option<i32>,
    /// `IN` (from stock) or `OUT` (customer supplied)
    #[schema(example = "IN")]
    pub fabric_source: String,
    #[serde(default)]
    pub fabric_id: Option<i32>,
    #[serde(default)]
    pub fabric_length: Decimal,
    #[serde(default)]
    pub color: Option<String>,
    #[schema(example = "kuwaiti")]
    pub style: String,
    #[serde(default)]
    pub options: StyleOptionsDto,
    #[serde(default)]
    pub express: bool,
    #[serde(default)]
    pub brova: bool,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Replace the garment set of a draft order
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveGarmentsRequest {
    /// Stitching tier for non-design garments
    #[schema(example = "7")]
    pub stitching_price: Decimal,
    pub garments: Vec<GarmentRowDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceSnapshotDto {
    pub fabric: Decimal,
    pub stitching: Decimal,
    pub style: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GarmentDto {
    pub id: i32,
    pub order_id: i32,
    #[schema(example = "100-1")]
    pub garment_code: String,
    pub measurement_id: i32,
    pub fabric_source: String,
    pub fabric_id: Option<i32>,
    pub fabric_length: Decimal,
    pub color: Option<String>,
    pub style: String,
    pub options: StyleOptionsDto,
    pub express: bool,
    pub brova: bool,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub price: PriceSnapshotDto,
}

// ===== Shelf DTOs =====

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShelfLineRequest {
    pub shelf_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaveShelfItemsRequest {
    pub items: Vec<ShelfLineRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShelfItemDto {
    pub id: i32,
    pub order_id: i32,
    pub shelf_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

// ===== Order DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderChargesDto {
    pub fabric: Decimal,
    pub stitching: Decimal,
    pub style: Decimal,
    pub shelf: Decimal,
    pub delivery: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscountDto {
    /// `flat`, `referral`, `loyalty` (percentages) or `by_value` (amount)
    #[schema(example = "flat")]
    pub kind: String,
    pub value: Decimal,
    #[serde(default)]
    pub referral_code: Option<String>,
}

/// Order response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDto {
    pub id: i32,
    pub customer_id: i32,
    pub invoice_number: Option<i32>,
    #[schema(example = "WORK")]
    pub order_type: String,
    #[schema(example = "draft")]
    pub checkout_status: String,
    #[schema(example = "order_at_shop")]
    pub production_stage: String,
    pub payment_type: Option<String>,
    pub payment_ref: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<NaiveDate>,
    pub home_delivery: bool,
    pub campaign_id: Option<i32>,
    pub stitching_price: Decimal,
    pub discount: Option<DiscountDto>,
    pub charges: OrderChargesDto,
    pub advance: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
    pub num_of_fabrics: i32,
    pub linked_order_id: Option<i32>,
    pub linked_date: Option<DateTime<Utc>>,
    pub unlinked_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub items: Vec<OrderDto>,
    pub total: usize,
}

/// Order with its customer and line items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailDto {
    pub order: OrderDto,
    pub customer: CustomerDto,
    pub garments: Vec<GarmentDto>,
    pub shelf_items: Vec<ShelfItemDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: i32,
    #[serde(default = "default_order_type")]
    pub order_type: String,
    #[serde(default)]
    pub campaign_id: Option<i32>,
    /// Defaults to the first configured stitching tier
    #[serde(default)]
    pub stitching_price: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_order_type() -> String {
    "WORK".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateOrderRequest {
    pub delivery_date: Option<NaiveDate>,
    pub home_delivery: Option<bool>,
    pub campaign_id: Option<i32>,
    pub notes: Option<String>,
}

/// Result of starting a work order for a customer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartOrderResponse {
    /// True when no drafts exist and a new order can be started directly
    pub fresh: bool,
    pub pending_drafts: Vec<OrderDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmOrderRequest {
    #[schema(example = "knet")]
    pub payment_type: String,
    #[serde(default)]
    pub payment_ref: Option<String>,
    #[serde(default)]
    pub advance: Decimal,
    /// Defaults to `advance`
    #[serde(default)]
    pub paid: Option<Decimal>,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub home_delivery: bool,
    #[serde(default)]
    pub discount: Option<DiscountDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductionStageRequest {
    #[schema(example = "sent_to_workshop")]
    pub stage: String,
}

// ===== Linking DTOs =====

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LinkOrdersRequest {
    pub order_ids: Vec<i32>,
    pub primary_id: i32,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkOutcomeDto {
    pub primary_id: i32,
    pub children: Vec<i32>,
    /// Children of selected primaries pulled into the group
    pub auto_added: usize,
    pub delivery_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UnlinkOrderRequest {
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkedGroupDto {
    pub primary: OrderDto,
    pub children: Vec<OrderDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerCandidatesDto {
    pub customer: CustomerDto,
    pub orders: Vec<OrderDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupResultDto {
    pub orders: Vec<OrderDto>,
    pub customers: Vec<CustomerCandidatesDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

// ===== Catalog DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FabricDto {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
    pub price_per_meter: Decimal,
    pub real_stock: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StyleDto {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub style_type: String,
    pub rate_per_item: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceEntryDto {
    pub key: String,
    pub value: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignDto {
    pub id: i32,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShelfProductDto {
    pub id: i32,
    pub product_type: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}
