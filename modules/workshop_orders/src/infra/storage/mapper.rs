//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{
    campaign, customer, fabric, garment, measurement, order, order_shelf_item, price, shelf, style,
};
use crate::contract::{
    AccountType, Address, BodyDimensions, Campaign, CheckoutStatus, Customer, CustomerInput,
    Discount, DiscountType, Fabric, FabricSource, Garment, Measurement, MeasurementType, NewOrder,
    Order, OrderCharges, OrderType, PaymentType, PriceEntry, PriceSnapshot, ProductionStage,
    Provisions, ShelfItem, ShelfProduct, Style, StyleOptions,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use std::str::FromStr;

fn parse<T>(value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(value.parse::<T>()?)
}

fn parse_opt<T>(value: Option<&str>) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.map(parse).transpose()
}

// ===== Customer Conversions =====

impl TryFrom<customer::Model> for Customer {
    type Error = anyhow::Error;

    fn try_from(entity: customer::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            account_type: parse_opt::<AccountType>(entity.account_type.as_deref())?,
            name: entity.name,
            nick_name: entity.nick_name,
            arabic_name: entity.arabic_name,
            phone: entity.phone,
            alternate_mobile: entity.alternate_mobile,
            whatsapp: entity.whatsapp,
            email: entity.email,
            nationality: entity.nationality,
            customer_segment: entity.customer_segment,
            address: Address {
                city: entity.city,
                area: entity.area,
                block: entity.block,
                street: entity.street,
                house_no: entity.house_no,
                address_note: entity.address_note,
            },
            relation: entity.relation,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

/// Active model carrying every editable customer column
pub fn customer_active(input: &CustomerInput, now: DateTime<Utc>) -> customer::ActiveModel {
    customer::ActiveModel {
        id: NotSet,
        name: Set(input.name.trim().to_string()),
        nick_name: Set(input.nick_name.clone()),
        arabic_name: Set(input.arabic_name.clone()),
        phone: Set(input.phone.trim().to_string()),
        alternate_mobile: Set(input.alternate_mobile.clone()),
        whatsapp: Set(input.whatsapp.clone()),
        email: Set(input.email.clone()),
        nationality: Set(input.nationality.clone()),
        customer_segment: Set(input.customer_segment.clone()),
        city: Set(input.address.city.clone()),
        area: Set(input.address.area.clone()),
        block: Set(input.address.block.clone()),
        street: Set(input.address.street.clone()),
        house_no: Set(input.address.house_no.clone()),
        address_note: Set(input.address.address_note.clone()),
        account_type: Set(input.account_type.map(|a| a.as_str().to_string())),
        relation: Set(input.relation.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

// ===== Measurement Conversions =====

impl TryFrom<measurement::Model> for Measurement {
    type Error = anyhow::Error;

    fn try_from(entity: measurement::Model) -> Result<Self, Self::Error> {
        let dimensions: DimensionsJson = serde_json::from_value(entity.dimensions)?;
        Ok(Self {
            id: entity.id,
            customer_id: entity.customer_id,
            measurement_code: entity.measurement_code,
            measurement_type: parse::<MeasurementType>(&entity.measurement_type)?,
            reference: entity.reference,
            measurer: entity.measurer,
            measurement_date: entity.measurement_date,
            dimensions: dimensions.into(),
            provisions: Provisions {
                armhole: entity.armhole_provision,
                chest: entity.chest_provision,
                waist: entity.waist_provision,
            },
            notes: entity.notes,
        })
    }
}

impl TryFrom<&Measurement> for measurement::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &Measurement) -> Result<Self, Self::Error> {
        let dimensions = serde_json::to_value(DimensionsJson::from(&model.dimensions))?;
        Ok(Self {
            id: if model.id == 0 { NotSet } else { Set(model.id) },
            customer_id: Set(model.customer_id),
            measurement_code: Set(model.measurement_code.clone()),
            measurement_type: Set(model.measurement_type.as_str().to_string()),
            reference: Set(model.reference.clone()),
            measurer: Set(model.measurer.clone()),
            measurement_date: Set(model.measurement_date),
            dimensions: Set(dimensions),
            armhole_provision: Set(model.provisions.armhole),
            chest_provision: Set(model.provisions.chest),
            waist_provision: Set(model.provisions.waist),
            notes: Set(model.notes.clone()),
        })
    }
}

// ===== Order Conversions =====

impl TryFrom<order::Model> for Order {
    type Error = anyhow::Error;

    fn try_from(entity: order::Model) -> Result<Self, Self::Error> {
        let discount = match (entity.discount_type.as_deref(), entity.discount_value) {
            (Some(kind), Some(value)) => Some(Discount {
                kind: parse::<DiscountType>(kind)?,
                value,
                referral_code: entity.referral_code,
            }),
            _ => None,
        };

        Ok(Self {
            id: entity.id,
            customer_id: entity.customer_id,
            invoice_number: entity.invoice_number,
            order_type: parse::<OrderType>(&entity.order_type)?,
            checkout_status: parse::<CheckoutStatus>(&entity.checkout_status)?,
            production_stage: parse::<ProductionStage>(&entity.production_stage)?,
            payment_type: parse_opt::<PaymentType>(entity.payment_type.as_deref())?,
            payment_ref: entity.payment_ref,
            order_date: entity.order_date,
            delivery_date: entity.delivery_date,
            home_delivery: entity.home_delivery,
            campaign_id: entity.campaign_id,
            stitching_price: entity.stitching_price,
            discount,
            charges: OrderCharges {
                fabric: entity.fabric_charge,
                stitching: entity.stitching_charge,
                style: entity.style_charge,
                shelf: entity.shelf_charge,
                delivery: entity.delivery_charge,
                discount: entity.discount_amount,
                total: entity.total,
            },
            advance: entity.advance,
            paid: entity.paid,
            num_of_fabrics: entity.num_of_fabrics,
            linked_order_id: entity.linked_order_id,
            linked_date: entity.linked_date,
            unlinked_date: entity.unlinked_date,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&Order> for order::ActiveModel {
    fn from(model: &Order) -> Self {
        Self {
            id: Set(model.id),
            customer_id: Set(model.customer_id),
            invoice_number: Set(model.invoice_number),
            order_type: Set(model.order_type.as_str().to_string()),
            checkout_status: Set(model.checkout_status.as_str().to_string()),
            production_stage: Set(model.production_stage.as_str().to_string()),
            payment_type: Set(model.payment_type.map(|p| p.as_str().to_string())),
            payment_ref: Set(model.payment_ref.clone()),
            order_date: Set(model.order_date),
            delivery_date: Set(model.delivery_date),
            home_delivery: Set(model.home_delivery),
            campaign_id: Set(model.campaign_id),
            stitching_price: Set(model.stitching_price),
            discount_type: Set(model.discount.as_ref().map(|d| d.kind.as_str().to_string())),
            discount_value: Set(model.discount.as_ref().map(|d| d.value)),
            referral_code: Set(model.discount.as_ref().and_then(|d| d.referral_code.clone())),
            fabric_charge: Set(model.charges.fabric),
            stitching_charge: Set(model.charges.stitching),
            style_charge: Set(model.charges.style),
            shelf_charge: Set(model.charges.shelf),
            delivery_charge: Set(model.charges.delivery),
            discount_amount: Set(model.charges.discount),
            total: Set(model.charges.total),
            advance: Set(model.advance),
            paid: Set(model.paid),
            num_of_fabrics: Set(model.num_of_fabrics),
            linked_order_id: Set(model.linked_order_id),
            linked_date: Set(model.linked_date),
            unlinked_date: Set(model.unlinked_date),
            notes: Set(model.notes.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

/// Active model for a fresh draft order
pub fn new_order_active(new_order: &NewOrder, now: DateTime<Utc>) -> order::ActiveModel {
    order::ActiveModel {
        id: NotSet,
        customer_id: Set(new_order.customer_id),
        invoice_number: Set(None),
        order_type: Set(new_order.order_type.as_str().to_string()),
        checkout_status: Set(CheckoutStatus::Draft.as_str().to_string()),
        production_stage: Set(ProductionStage::OrderAtShop.as_str().to_string()),
        payment_type: Set(None),
        payment_ref: Set(None),
        order_date: Set(None),
        delivery_date: Set(None),
        home_delivery: Set(false),
        campaign_id: Set(new_order.campaign_id),
        stitching_price: Set(new_order.stitching_price),
        discount_type: Set(None),
        discount_value: Set(None),
        referral_code: Set(None),
        fabric_charge: Set(Decimal::ZERO),
        stitching_charge: Set(Decimal::ZERO),
        style_charge: Set(Decimal::ZERO),
        shelf_charge: Set(Decimal::ZERO),
        delivery_charge: Set(Decimal::ZERO),
        discount_amount: Set(Decimal::ZERO),
        total: Set(Decimal::ZERO),
        advance: Set(Decimal::ZERO),
        paid: Set(Decimal::ZERO),
        num_of_fabrics: Set(0),
        linked_order_id: Set(None),
        linked_date: Set(None),
        unlinked_date: Set(None),
        notes: Set(new_order.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

// ===== Garment Conversions =====

impl TryFrom<garment::Model> for Garment {
    type Error = anyhow::Error;

    fn try_from(entity: garment::Model) -> Result<Self, Self::Error> {
        let options: StyleOptionsJson = serde_json::from_value(entity.options)?;
        Ok(Self {
            id: entity.id,
            order_id: entity.order_id,
            garment_code: entity.garment_code,
            measurement_id: entity.measurement_id,
            fabric_source: parse::<FabricSource>(&entity.fabric_source)?,
            fabric_id: entity.fabric_id,
            fabric_length: entity.fabric_length,
            color: entity.color,
            style: entity.style,
            options: options.into(),
            express: entity.express,
            brova: entity.brova,
            delivery_date: entity.delivery_date,
            notes: entity.notes,
            price: PriceSnapshot {
                fabric: entity.fabric_price,
                stitching: entity.stitching_price,
                style: entity.style_price,
            },
        })
    }
}

impl TryFrom<&Garment> for garment::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &Garment) -> Result<Self, Self::Error> {
        let options = serde_json::to_value(StyleOptionsJson::from(&model.options))?;
        Ok(Self {
            id: if model.id == 0 { NotSet } else { Set(model.id) },
            order_id: Set(model.order_id),
            garment_code: Set(model.garment_code.clone()),
            measurement_id: Set(model.measurement_id),
            fabric_source: Set(model.fabric_source.as_str().to_string()),
            fabric_id: Set(model.fabric_id),
            fabric_length: Set(model.fabric_length),
            color: Set(model.color.clone()),
            style: Set(model.style.clone()),
            options: Set(options),
            express: Set(model.express),
            brova: Set(model.brova),
            delivery_date: Set(model.delivery_date),
            notes: Set(model.notes.clone()),
            fabric_price: Set(model.price.fabric),
            stitching_price: Set(model.price.stitching),
            style_price: Set(model.price.style),
        })
    }
}

// ===== Shelf Line Conversions =====

impl From<order_shelf_item::Model> for ShelfItem {
    fn from(entity: order_shelf_item::Model) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            shelf_id: entity.shelf_id,
            quantity: entity.quantity,
            unit_price: entity.unit_price,
        }
    }
}

impl From<&ShelfItem> for order_shelf_item::ActiveModel {
    fn from(model: &ShelfItem) -> Self {
        Self {
            id: NotSet,
            order_id: Set(model.order_id),
            shelf_id: Set(model.shelf_id),
            quantity: Set(model.quantity),
            unit_price: Set(model.unit_price),
        }
    }
}

// ===== Catalog Conversions =====

impl From<fabric::Model> for Fabric {
    fn from(entity: fabric::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            color: entity.color,
            price_per_meter: entity.price_per_meter,
            real_stock: entity.real_stock,
        }
    }
}

impl From<style::Model> for Style {
    fn from(entity: style::Model) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            name: entity.name,
            style_type: entity.style_type,
            rate_per_item: entity.rate_per_item,
        }
    }
}

impl From<price::Model> for PriceEntry {
    fn from(entity: price::Model) -> Self {
        Self {
            key: entity.key,
            value: entity.value,
            description: entity.description,
        }
    }
}

impl From<campaign::Model> for Campaign {
    fn from(entity: campaign::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            active: entity.active,
        }
    }
}

impl From<shelf::Model> for ShelfProduct {
    fn from(entity: shelf::Model) -> Self {
        Self {
            id: entity.id,
            product_type: entity.product_type,
            brand: entity.brand,
            price: entity.price,
            stock: entity.stock,
        }
    }
}

// ===== JSON Serialization Helpers =====

/// JSON representation of body dimensions for database storage
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct DimensionsJson {
    length_front: Option<Decimal>,
    length_back: Option<Decimal>,
    bottom: Option<Decimal>,
    shoulder: Option<Decimal>,
    neck: Option<Decimal>,
    chest_full: Option<Decimal>,
    chest_front: Option<Decimal>,
    chest_back: Option<Decimal>,
    chest_upper: Option<Decimal>,
    waist_full: Option<Decimal>,
    waist_front: Option<Decimal>,
    waist_back: Option<Decimal>,
    sleeve_length: Option<Decimal>,
    sleeve_width: Option<Decimal>,
    elbow: Option<Decimal>,
    armhole: Option<Decimal>,
    armhole_front: Option<Decimal>,
    top_pocket_length: Option<Decimal>,
    top_pocket_width: Option<Decimal>,
    side_pocket_length: Option<Decimal>,
    side_pocket_width: Option<Decimal>,
    jabzour_length: Option<Decimal>,
    jabzour_width: Option<Decimal>,
}

/// Lists every dimension field once so both directions stay in sync
macro_rules! convert_dimensions {
    ($from:expr, $to:ident) => {
        $to {
            length_front: $from.length_front,
            length_back: $from.length_back,
            bottom: $from.bottom,
            shoulder: $from.shoulder,
            neck: $from.neck,
            chest_full: $from.chest_full,
            chest_front: $from.chest_front,
            chest_back: $from.chest_back,
            chest_upper: $from.chest_upper,
            waist_full: $from.waist_full,
            waist_front: $from.waist_front,
            waist_back: $from.waist_back,
            sleeve_length: $from.sleeve_length,
            sleeve_width: $from.sleeve_width,
            elbow: $from.elbow,
            armhole: $from.armhole,
            armhole_front: $from.armhole_front,
            top_pocket_length: $from.top_pocket_length,
            top_pocket_width: $from.top_pocket_width,
            side_pocket_length: $from.side_pocket_length,
            side_pocket_width: $from.side_pocket_width,
            jabzour_length: $from.jabzour_length,
            jabzour_width: $from.jabzour_width,
        }
    };
}

impl From<DimensionsJson> for BodyDimensions {
    fn from(json: DimensionsJson) -> Self {
        convert_dimensions!(json, BodyDimensions)
    }
}

impl From<&BodyDimensions> for DimensionsJson {
    fn from(model: &BodyDimensions) -> Self {
        convert_dimensions!(model, DimensionsJson)
    }
}

/// JSON representation of garment style options
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct StyleOptionsJson {
    collar_type: Option<String>,
    collar_button: Option<String>,
    cuffs_type: Option<String>,
    cuffs_thickness: Option<String>,
    jabzour_1: Option<String>,
    jabzour_2: Option<String>,
    jabzour_thickness: Option<String>,
    front_pocket_type: Option<String>,
    front_pocket_thickness: Option<String>,
    wallet_pocket: bool,
    pen_holder: bool,
    mobile_pocket: bool,
    small_tabaggi: bool,
    lines: i32,
}

impl From<StyleOptionsJson> for StyleOptions {
    fn from(json: StyleOptionsJson) -> Self {
        Self {
            collar_type: json.collar_type,
            collar_button: json.collar_button,
            cuffs_type: json.cuffs_type,
            cuffs_thickness: json.cuffs_thickness,
            jabzour_1: json.jabzour_1,
            jabzour_2: json.jabzour_2,
            jabzour_thickness: json.jabzour_thickness,
            front_pocket_type: json.front_pocket_type,
            front_pocket_thickness: json.front_pocket_thickness,
            wallet_pocket: json.wallet_pocket,
            pen_holder: json.pen_holder,
            mobile_pocket: json.mobile_pocket,
            small_tabaggi: json.small_tabaggi,
            lines: json.lines,
        }
    }
}

impl From<&StyleOptions> for StyleOptionsJson {
    fn from(model: &StyleOptions) -> Self {
        Self {
            collar_type: model.collar_type.clone(),
            collar_button: model.collar_button.clone(),
            cuffs_type: model.cuffs_type.clone(),
            cuffs_thickness: model.cuffs_thickness.clone(),
            jabzour_1: model.jabzour_1.clone(),
            jabzour_2: model.jabzour_2.clone(),
            jabzour_thickness: model.jabzour_thickness.clone(),
            front_pocket_type: model.front_pocket_type.clone(),
            front_pocket_thickness: model.front_pocket_thickness.clone(),
            wallet_pocket: model.wallet_pocket,
            pen_holder: model.pen_holder,
            mobile_pocket: model.mobile_pocket,
            small_tabaggi: model.small_tabaggi,
            lines: model.lines,
        }
    }
}
