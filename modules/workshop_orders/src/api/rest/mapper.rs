//! Mapper implementations for converting between DTOs and contract models
//!
//! Responses convert infallibly; requests carrying enum labels use `TryFrom` and
//! report unknown labels as validation errors.

use super::dto::*;
use crate::contract::{self, FieldError, OrdersError};
use std::str::FromStr;

fn label<T>(field: &str, value: &str) -> Result<T, OrdersError>
where
    T: FromStr<Err = contract::UnknownVariant>,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| OrdersError::Validation {
            errors: vec![FieldError::new(field, e.to_string())],
        })
}

// ===== Customer conversions =====

impl From<contract::Address> for AddressDto {
    fn from(address: contract::Address) -> Self {
        Self {
            city: address.city,
            area: address.area,
            block: address.block,
            street: address.street,
            house_no: address.house_no,
            address_note: address.address_note,
        }
    }
}

impl From<AddressDto> for contract::Address {
    fn from(dto: AddressDto) -> Self {
        Self {
            city: dto.city,
            area: dto.area,
            block: dto.block,
            street: dto.street,
            house_no: dto.house_no,
            address_note: dto.address_note,
        }
    }
}

impl From<contract::Customer> for CustomerDto {
    fn from(customer: contract::Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            nick_name: customer.nick_name,
            arabic_name: customer.arabic_name,
            phone: customer.phone,
            alternate_mobile: customer.alternate_mobile,
            whatsapp: customer.whatsapp,
            email: customer.email,
            nationality: customer.nationality,
            customer_segment: customer.customer_segment,
            address: customer.address.into(),
            account_type: customer.account_type.map(|a| a.to_string()),
            relation: customer.relation,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

impl TryFrom<CustomerRequest> for contract::CustomerInput {
    type Error = OrdersError;

    fn try_from(req: CustomerRequest) -> Result<Self, Self::Error> {
        let account_type = match req.account_type.as_deref().filter(|a| !a.trim().is_empty()) {
            Some(value) => Some(label::<contract::AccountType>("account_type", value)?),
            None => None,
        };
        Ok(Self {
            name: req.name,
            nick_name: req.nick_name,
            arabic_name: req.arabic_name,
            phone: req.phone,
            alternate_mobile: req.alternate_mobile,
            whatsapp: req.whatsapp,
            email: req.email,
            nationality: req.nationality,
            customer_segment: req.customer_segment,
            address: req.address.into(),
            account_type,
            relation: None,
        })
    }
}

impl From<Option<contract::AccountSuggestion>> for AccountSuggestionDto {
    fn from(suggestion: Option<contract::AccountSuggestion>) -> Self {
        match suggestion {
            Some(s) => Self {
                account_type: Some(s.account_type.to_string()),
                relation: s.relation,
            },
            None => Self {
                account_type: None,
                relation: None,
            },
        }
    }
}

// ===== Measurement conversions =====

/// Copies every dimension field between the DTO and the contract model
macro_rules! copy_dimensions {
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

impl From<contract::BodyDimensions> for BodyDimensionsDto {
    fn from(d: contract::BodyDimensions) -> Self {
        copy_dimensions!(d, BodyDimensionsDto)
    }
}

impl From<BodyDimensionsDto> for contract::BodyDimensions {
    fn from(d: BodyDimensionsDto) -> Self {
        use contract::BodyDimensions;
        copy_dimensions!(d, BodyDimensions)
    }
}

impl From<contract::Measurement> for MeasurementDto {
    fn from(m: contract::Measurement) -> Self {
        Self {
            id: m.id,
            customer_id: m.customer_id,
            measurement_code: m.measurement_code,
            measurement_type: m.measurement_type.to_string(),
            reference: m.reference,
            measurer: m.measurer,
            measurement_date: m.measurement_date,
            dimensions: m.dimensions.into(),
            provisions: ProvisionsDto {
                armhole: m.provisions.armhole,
                chest: m.provisions.chest,
                waist: m.provisions.waist,
            },
            notes: m.notes,
        }
    }
}

impl TryFrom<MeasurementRequest> for contract::MeasurementInput {
    type Error = OrdersError;

    fn try_from(req: MeasurementRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            measurement_type: label("measurement_type", &req.measurement_type)?,
            reference: req.reference,
            measurer: req.measurer,
            dimensions: req.dimensions.into(),
            notes: req.notes,
        })
    }
}

// ===== Garment conversions =====

impl From<contract::StyleOptions> for StyleOptionsDto {
    fn from(o: contract::StyleOptions) -> Self {
        Self {
            collar_type: o.collar_type,
            collar_button: o.collar_button,
            cuffs_type: o.cuffs_type,
            cuffs_thickness: o.cuffs_thickness,
            jabzour_1: o.jabzour_1,
            jabzour_2: o.jabzour_2,
            jabzour_thickness: o.jabzour_thickness,
            front_pocket_type: o.front_pocket_type,
            front_pocket_thickness: o.front_pocket_thickness,
            wallet_pocket: o.wallet_pocket,
            pen_holder: o.pen_holder,
            mobile_pocket: o.mobile_pocket,
            small_tabaggi: o.small_tabaggi,
            lines: o.lines,
        }
    }
}

impl From<StyleOptionsDto> for contract::StyleOptions {
    fn from(o: StyleOptionsDto) -> Self {
        Self {
            collar_type: o.collar_type,
            collar_button: o.collar_button,
            cuffs_type: o.cuffs_type,
            cuffs_thickness: o.cuffs_thickness,
            jabzour_1: o.jabzour_1,
            jabzour_2: o.jabzour_2,
            jabzour_thickness: o.jabzour_thickness,
            front_pocket_type: o.front_pocket_type,
            front_pocket_thickness: o.front_pocket_thickness,
            wallet_pocket: o.wallet_pocket,
            pen_holder: o.pen_holder,
            mobile_pocket: o.mobile_pocket,
            small_tabaggi: o.small_tabaggi,
            lines: o.lines,
        }
    }
}

/// Convert garment rows, reporting unknown fabric sources with their row number
pub fn garment_rows(rows: Vec<GarmentRowDto>) -> Result<Vec<contract::GarmentInput>, OrdersError> {
    let mut errors = Vec::new();
    let mut inputs = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let fabric_source = match row.fabric_source.trim().parse::<contract::FabricSource>() {
            Ok(source) => source,
            Err(e) => {
                errors.push(FieldError::in_row(index + 1, "fabric_source", e.to_string()));
                continue;
            }
        };
        inputs.push(contract::GarmentInput {
            id: row.id,
            measurement_id: row.measurement_id,
            fabric_source,
            fabric_id: row.fabric_id,
            fabric_length: row.fabric_length,
            color: row.color,
            style: row.style,
            options: row.options.into(),
            express: row.express,
            brova: row.brova,
            delivery_date: row.delivery_date,
            notes: row.notes,
        });
    }

    if errors.is_empty() {
        Ok(inputs)
    } else {
        Err(OrdersError::Validation { errors })
    }
}

impl From<contract::Garment> for GarmentDto {
    fn from(g: contract::Garment) -> Self {
        Self {
            id: g.id,
            order_id: g.order_id,
            garment_code: g.garment_code,
            measurement_id: g.measurement_id,
            fabric_source: g.fabric_source.to_string(),
            fabric_id: g.fabric_id,
            fabric_length: g.fabric_length,
            color: g.color,
            style: g.style,
            options: g.options.into(),
            express: g.express,
            brova: g.brova,
            delivery_date: g.delivery_date,
            notes: g.notes,
            price: PriceSnapshotDto {
                total: g.price.total(),
                fabric: g.price.fabric,
                stitching: g.price.stitching,
                style: g.price.style,
            },
        }
    }
}

// ===== Shelf conversions =====

impl From<contract::ShelfItem> for ShelfItemDto {
    fn from(item: contract::ShelfItem) -> Self {
        Self {
            line_total: item.line_total(),
            id: item.id,
            order_id: item.order_id,
            shelf_id: item.shelf_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<ShelfLineRequest> for contract::ShelfItemInput {
    fn from(line: ShelfLineRequest) -> Self {
        Self {
            shelf_id: line.shelf_id,
            quantity: line.quantity,
        }
    }
}

// ===== Order conversions =====

impl From<contract::Order> for OrderDto {
    fn from(order: contract::Order) -> Self {
        Self {
            remaining: order.remaining(),
            id: order.id,
            customer_id: order.customer_id,
            invoice_number: order.invoice_number,
            order_type: order.order_type.to_string(),
            checkout_status: order.checkout_status.to_string(),
            production_stage: order.production_stage.to_string(),
            payment_type: order.payment_type.map(|p| p.to_string()),
            payment_ref: order.payment_ref,
            order_date: order.order_date,
            delivery_date: order.delivery_date,
            home_delivery: order.home_delivery,
            campaign_id: order.campaign_id,
            stitching_price: order.stitching_price,
            discount: order.discount.map(|d| DiscountDto {
                kind: d.kind.to_string(),
                value: d.value,
                referral_code: d.referral_code,
            }),
            charges: OrderChargesDto {
                fabric: order.charges.fabric,
                stitching: order.charges.stitching,
                style: order.charges.style,
                shelf: order.charges.shelf,
                delivery: order.charges.delivery,
                discount: order.charges.discount,
                total: order.charges.total,
            },
            advance: order.advance,
            paid: order.paid,
            num_of_fabrics: order.num_of_fabrics,
            linked_order_id: order.linked_order_id,
            linked_date: order.linked_date,
            unlinked_date: order.unlinked_date,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl From<contract::OrderWithRelations> for OrderDetailDto {
    fn from(loaded: contract::OrderWithRelations) -> Self {
        Self {
            order: loaded.order.into(),
            customer: loaded.customer.into(),
            garments: loaded.garments.into_iter().map(Into::into).collect(),
            shelf_items: loaded.shelf_items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<contract::Order>> for OrderListResponse {
    fn from(orders: Vec<contract::Order>) -> Self {
        let items: Vec<OrderDto> = orders.into_iter().map(Into::into).collect();
        let total = items.len();
        Self { items, total }
    }
}

impl From<UpdateOrderRequest> for contract::OrderUpdate {
    fn from(req: UpdateOrderRequest) -> Self {
        Self {
            delivery_date: req.delivery_date,
            home_delivery: req.home_delivery,
            campaign_id: req.campaign_id,
            notes: req.notes,
        }
    }
}

impl TryFrom<DiscountDto> for contract::Discount {
    type Error = OrdersError;

    fn try_from(dto: DiscountDto) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: label("discount.kind", &dto.kind)?,
            value: dto.value,
            referral_code: dto.referral_code,
        })
    }
}

impl TryFrom<ConfirmOrderRequest> for contract::ConfirmPayment {
    type Error = OrdersError;

    fn try_from(req: ConfirmOrderRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            payment_type: label("payment_type", &req.payment_type)?,
            payment_ref: req.payment_ref,
            advance: req.advance,
            paid: req.paid,
            delivery_date: req.delivery_date,
            home_delivery: req.home_delivery,
            discount: req.discount.map(contract::Discount::try_from).transpose()?,
        })
    }
}

impl TryFrom<ProductionStageRequest> for contract::ProductionStage {
    type Error = OrdersError;

    fn try_from(req: ProductionStageRequest) -> Result<Self, Self::Error> {
        label("stage", &req.stage)
    }
}

pub fn order_type(value: &str) -> Result<contract::OrderType, OrdersError> {
    label("order_type", value)
}

// ===== Linking conversions =====

impl From<LinkOrdersRequest> for contract::LinkRequest {
    fn from(req: LinkOrdersRequest) -> Self {
        Self {
            order_ids: req.order_ids,
            primary_id: req.primary_id,
            delivery_date: req.delivery_date,
        }
    }
}

impl From<contract::LinkOutcome> for LinkOutcomeDto {
    fn from(outcome: contract::LinkOutcome) -> Self {
        Self {
            primary_id: outcome.primary_id,
            children: outcome.children,
            auto_added: outcome.auto_added,
            delivery_date: outcome.delivery_date,
        }
    }
}

impl From<contract::LinkedGroup> for LinkedGroupDto {
    fn from(group: contract::LinkedGroup) -> Self {
        Self {
            primary: group.primary.into(),
            children: group.children.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::LookupResult> for LookupResultDto {
    fn from(result: contract::LookupResult) -> Self {
        Self {
            orders: result.orders.into_iter().map(Into::into).collect(),
            customers: result
                .customers
                .into_iter()
                .map(|c| CustomerCandidatesDto {
                    customer: c.customer.into(),
                    orders: c.orders.into_iter().map(Into::into).collect(),
                })
                .collect(),
            notice: result.notice,
        }
    }
}

// ===== Catalog conversions =====

impl From<contract::Fabric> for FabricDto {
    fn from(f: contract::Fabric) -> Self {
        Self {
            id: f.id,
            name: f.name,
            color: f.color,
            price_per_meter: f.price_per_meter,
            real_stock: f.real_stock,
        }
    }
}

impl From<contract::Style> for StyleDto {
    fn from(s: contract::Style) -> Self {
        Self {
            id: s.id,
            code: s.code,
            name: s.name,
            style_type: s.style_type,
            rate_per_item: s.rate_per_item,
        }
    }
}

impl From<contract::PriceEntry> for PriceEntryDto {
    fn from(p: contract::PriceEntry) -> Self {
        Self {
            key: p.key,
            value: p.value,
            description: p.description,
        }
    }
}

impl From<contract::Campaign> for CampaignDto {
    fn from(c: contract::Campaign) -> Self {
        Self {
            id: c.id,
            name: c.name,
            active: c.active,
        }
    }
}

impl From<contract::ShelfProduct> for ShelfProductDto {
    fn from(p: contract::ShelfProduct) -> Self {
        Self {
            id: p.id,
            product_type: p.product_type,
            brand: p.brand,
            price: p.price,
            stock: p.stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_payment_type_is_validation_error() {
        let req = ConfirmOrderRequest {
            payment_type: "bitcoin".into(),
            payment_ref: None,
            advance: Default::default(),
            paid: None,
            delivery_date: None,
            home_delivery: false,
            discount: None,
        };
        let err = contract::ConfirmPayment::try_from(req).unwrap_err();
        match err {
            OrdersError::Validation { errors } => assert_eq!(errors[0].field, "payment_type"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_fabric_source_reports_row() {
        let row = |source: &str| GarmentRowDto {
            id: None,
            measurement_id: Some(1),
            fabric_source: source.into(),
            fabric_id: None,
            fabric_length: Default::default(),
            color: None,
            style: "kuwaiti".into(),
            options: StyleOptionsDto::default(),
            express: false,
            brova: false,
            delivery_date: None,
            notes: None,
        };
        let err = garment_rows(vec![row("OUT"), row("SIDEWAYS")]).unwrap_err();
        match err {
            OrdersError::Validation { errors } => assert_eq!(errors[0].row, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_account_type_is_unset() {
        let req = CustomerRequest {
            name: "Ali".into(),
            nick_name: None,
            arabic_name: None,
            phone: "+965 5555 0001".into(),
            alternate_mobile: None,
            whatsapp: None,
            email: None,
            nationality: None,
            customer_segment: None,
            address: AddressDto::default(),
            account_type: Some(" ".into()),
        };
        let input = contract::CustomerInput::try_from(req).unwrap();
        assert_eq!(input.account_type, None);
    }
}
