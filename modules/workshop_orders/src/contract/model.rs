//! Contract models for the workshop orders module
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

pub type CustomerId = i32;
pub type MeasurementId = i32;
pub type OrderId = i32;
pub type GarmentId = i32;
pub type FabricId = i32;
pub type ShelfProductId = i32;
pub type CampaignId = i32;

/// Error returned when a stored or transmitted enum label is unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a string-labelled enum with `as_str` and `FromStr`.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled_enum!(
    /// Household billing grouping keyed by a shared phone number
    AccountType, "account type" {
        Primary => "Primary",
        Secondary => "Secondary",
    }
);

labelled_enum!(
    /// What the measurement was taken from
    MeasurementType, "measurement type" {
        Body => "Body",
        Dishdasha => "Dishdasha",
    }
);

labelled_enum!(
    /// Work orders are tailored; sales orders only carry shelf products
    OrderType, "order type" {
        Work => "WORK",
        Sales => "SALES",
    }
);

labelled_enum!(
    /// Checkout lifecycle: `Draft` -> `Confirmed` | `Cancelled`
    CheckoutStatus, "checkout status" {
        Draft => "draft",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
);

labelled_enum!(
    /// Physical workshop progress, independent of the checkout lifecycle.
    /// Variants are declared in production order.
    ProductionStage, "production stage" {
        OrderAtShop => "order_at_shop",
        SentToWorkshop => "sent_to_workshop",
        InProduction => "in_production",
        BrovaAtShop => "brova_at_shop",
        ReadyForPickup => "ready_for_pickup",
        Delivered => "delivered",
    }
);

labelled_enum!(
    PaymentType, "payment type" {
        Knet => "knet",
        Cash => "cash",
        LinkPayment => "link_payment",
        Installments => "installments",
        Others => "others",
    }
);

labelled_enum!(
    DiscountType, "discount type" {
        Flat => "flat",
        Referral => "referral",
        Loyalty => "loyalty",
        ByValue => "by_value",
    }
);

labelled_enum!(
    /// `In` draws from owned stock, `Out` is supplied by the customer
    FabricSource, "fabric source" {
        In => "IN",
        Out => "OUT",
    }
);

impl CheckoutStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckoutStatus::Draft)
    }
}

// ===== Customer =====

/// Postal address as recorded at intake
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub city: Option<String>,
    pub area: Option<String>,
    pub block: Option<String>,
    pub street: Option<String>,
    pub house_no: Option<String>,
    pub address_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub nick_name: Option<String>,
    pub arabic_name: Option<String>,
    pub phone: String,
    pub alternate_mobile: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub customer_segment: Option<String>,
    pub address: Address,
    pub account_type: Option<AccountType>,
    /// Phone number of the primary account this customer belongs to
    pub relation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable customer fields, used for both create and update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub nick_name: Option<String>,
    pub arabic_name: Option<String>,
    pub phone: String,
    pub alternate_mobile: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub customer_segment: Option<String>,
    pub address: Address,
    pub account_type: Option<AccountType>,
    pub relation: Option<String>,
}

/// Result of looking up an account type for a phone number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSuggestion {
    pub account_type: AccountType,
    pub relation: Option<String>,
}

// ===== Measurement =====

/// Directly measured body dimensions, in centimetres
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyDimensions {
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

/// Derived dimensions; always recomputed from [`BodyDimensions`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provisions {
    pub armhole: Option<Decimal>,
    pub chest: Option<Decimal>,
    pub waist: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub id: MeasurementId,
    pub customer_id: CustomerId,
    /// Customer-scoped sequential code, `"<customerId>-<n>"`
    pub measurement_code: String,
    pub measurement_type: MeasurementType,
    pub reference: Option<String>,
    pub measurer: Option<String>,
    pub measurement_date: DateTime<Utc>,
    pub dimensions: BodyDimensions,
    pub provisions: Provisions,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementInput {
    pub measurement_type: MeasurementType,
    pub reference: Option<String>,
    pub measurer: Option<String>,
    pub dimensions: BodyDimensions,
    pub notes: Option<String>,
}

// ===== Order =====

/// Charge breakdown stored on the order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCharges {
    pub fabric: Decimal,
    pub stitching: Decimal,
    pub style: Decimal,
    pub shelf: Decimal,
    pub delivery: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    pub kind: DiscountType,
    pub value: Decimal,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Customer-facing sequential number, assigned on confirmation
    pub invoice_number: Option<i32>,
    pub order_type: OrderType,
    pub checkout_status: CheckoutStatus,
    pub production_stage: ProductionStage,
    pub payment_type: Option<PaymentType>,
    pub payment_ref: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<NaiveDate>,
    pub home_delivery: bool,
    pub campaign_id: Option<CampaignId>,
    /// Stitching tier selected for non-design garments
    pub stitching_price: Decimal,
    pub discount: Option<Discount>,
    pub charges: OrderCharges,
    pub advance: Decimal,
    pub paid: Decimal,
    pub num_of_fabrics: i32,
    pub linked_order_id: Option<OrderId>,
    pub linked_date: Option<DateTime<Utc>>,
    pub unlinked_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_linked(&self) -> bool {
        self.linked_order_id.is_some()
    }

    /// Amount still owed by the customer
    pub fn remaining(&self) -> Decimal {
        (self.charges.total - self.paid).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub order_type: OrderType,
    pub campaign_id: Option<CampaignId>,
    pub stitching_price: Decimal,
    pub notes: Option<String>,
}

/// Order fields editable outside the wizard steps; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub delivery_date: Option<NaiveDate>,
    pub home_delivery: Option<bool>,
    pub campaign_id: Option<CampaignId>,
    pub notes: Option<String>,
}

impl OrderUpdate {
    /// Whether the update touches anything besides notes
    pub fn changes_terms(&self) -> bool {
        self.delivery_date.is_some() || self.home_delivery.is_some() || self.campaign_id.is_some()
    }
}

/// Order with its customer and line items loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithRelations {
    pub order: Order,
    pub customer: Customer,
    pub garments: Vec<Garment>,
    pub shelf_items: Vec<ShelfItem>,
}

// ===== Garment =====

/// Style option codes selected for a garment; each code is a price-table key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOptions {
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

/// Prices captured when the garment is saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceSnapshot {
    pub fabric: Decimal,
    pub stitching: Decimal,
    pub style: Decimal,
}

impl PriceSnapshot {
    pub fn total(&self) -> Decimal {
        self.fabric
            .saturating_add(self.stitching)
            .saturating_add(self.style)
    }
}

/// One garment row as entered in the fabric selection step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarmentInput {
    /// Present when the row was saved before
    pub id: Option<GarmentId>,
    pub measurement_id: Option<MeasurementId>,
    pub fabric_source: FabricSource,
    pub fabric_id: Option<FabricId>,
    pub fabric_length: Decimal,
    pub color: Option<String>,
    pub style: String,
    pub options: StyleOptions,
    pub express: bool,
    pub brova: bool,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Garment {
    pub id: GarmentId,
    pub order_id: OrderId,
    /// `"<orderId>-<n>"`
    pub garment_code: String,
    pub measurement_id: MeasurementId,
    pub fabric_source: FabricSource,
    pub fabric_id: Option<FabricId>,
    pub fabric_length: Decimal,
    pub color: Option<String>,
    pub style: String,
    pub options: StyleOptions,
    pub express: bool,
    pub brova: bool,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub price: PriceSnapshot,
}

// ===== Shelf =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfItemInput {
    pub shelf_id: ShelfProductId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfItem {
    pub id: i32,
    pub order_id: OrderId,
    pub shelf_id: ShelfProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl ShelfItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

// ===== Catalogs =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fabric {
    pub id: FabricId,
    pub name: String,
    pub color: Option<String>,
    pub price_per_meter: Decimal,
    /// Metres physically available in the workshop
    pub real_stock: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub style_type: String,
    pub rate_per_item: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEntry {
    pub key: String,
    pub value: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfProduct {
    pub id: ShelfProductId,
    pub product_type: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}
