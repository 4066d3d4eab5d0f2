//! Garment and order price derivation, and fabric stock sufficiency

use crate::config::PricingConfig;
use crate::contract::{
    Discount, DiscountType, Fabric, FabricId, FabricSource, FieldError, GarmentInput,
    OrderCharges, PriceEntry, PriceSnapshot, ShelfItem, StyleOptions,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Style code of premium designer garments
pub const DESIGN_STYLE: &str = "design";

/// Price-table keys for accessory flags
pub const WALLET_POCKET: &str = "WALLET_POCKET";
pub const PEN_HOLDER: &str = "PEN_HOLDER";
pub const MOBILE_POCKET: &str = "MOBILE_POCKET";
pub const SMALL_TABAGGI: &str = "SMALL_TABAGGI";

/// Catalog prices keyed by option code
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    prices: HashMap<String, Decimal>,
}

impl PriceCatalog {
    pub fn from_entries(entries: &[PriceEntry]) -> Self {
        Self {
            prices: entries
                .iter()
                .map(|e| (e.key.clone(), e.value))
                .collect(),
        }
    }

    /// Unknown codes cost nothing
    pub fn price_of(&self, code: &str) -> Decimal {
        self.prices.get(code).copied().unwrap_or(Decimal::ZERO)
    }
}

pub fn is_design(style: &str) -> bool {
    style.eq_ignore_ascii_case(DESIGN_STYLE)
}

/// Stitching price: the designer rate for `design` garments, the selected tier otherwise
pub fn stitching_price(style: &str, tier: Decimal, config: &PricingConfig) -> Decimal {
    if is_design(style) {
        config.designer_stitching_rate
    } else {
        tier
    }
}

/// `fabric_length × price_per_meter` for owned stock, zero for customer fabric
pub fn fabric_price(garment: &GarmentInput, fabric: Option<&Fabric>) -> Decimal {
    match (garment.fabric_source, fabric) {
        (FabricSource::In, Some(fabric)) => garment.fabric_length.saturating_mul(fabric.price_per_meter),
        _ => Decimal::ZERO,
    }
}

/// Every price-table code selected by a garment's style options
pub fn option_codes(options: &StyleOptions) -> Vec<&str> {
    let selected = [
        &options.collar_type,
        &options.collar_button,
        &options.cuffs_type,
        &options.cuffs_thickness,
        &options.jabzour_1,
        &options.jabzour_2,
        &options.jabzour_thickness,
        &options.front_pocket_type,
        &options.front_pocket_thickness,
    ];

    let mut codes: Vec<&str> = selected
        .iter()
        .filter_map(|code| code.as_deref())
        .filter(|code| !code.is_empty())
        .collect();

    let flags = [
        (options.wallet_pocket, WALLET_POCKET),
        (options.pen_holder, PEN_HOLDER),
        (options.mobile_pocket, MOBILE_POCKET),
        (options.small_tabaggi, SMALL_TABAGGI),
    ];
    codes.extend(flags.iter().filter(|(on, _)| *on).map(|(_, code)| *code));
    codes
}

/// Sum of option prices, or the flat design rate
pub fn style_price(
    style: &str,
    options: &StyleOptions,
    catalog: &PriceCatalog,
    config: &PricingConfig,
) -> Decimal {
    if is_design(style) {
        return config.design_style_rate;
    }
    option_codes(options)
        .into_iter()
        .map(|code| catalog.price_of(code))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Price snapshot for one garment
pub fn price_garment(
    garment: &GarmentInput,
    tier: Decimal,
    fabrics: &HashMap<FabricId, Fabric>,
    catalog: &PriceCatalog,
    config: &PricingConfig,
) -> PriceSnapshot {
    let fabric = garment.fabric_id.and_then(|id| fabrics.get(&id));
    PriceSnapshot {
        fabric: fabric_price(garment, fabric),
        stitching: stitching_price(&garment.style, tier, config),
        style: style_price(&garment.style, &garment.options, catalog, config),
    }
}

/// A tier must be one of the configured values
pub fn validate_tier(tier: Decimal, config: &PricingConfig) -> Result<(), FieldError> {
    if config.stitching_tiers.contains(&tier) {
        Ok(())
    } else {
        let allowed: Vec<String> = config.stitching_tiers.iter().map(|t| t.to_string()).collect();
        Err(FieldError::new(
            "stitching_price",
            format!("must be one of {}", allowed.join(", ")),
        ))
    }
}

/// Discount amount for a subtotal, never more than the subtotal.
///
/// `ByValue` is an absolute amount; the other kinds are percentages.
pub fn discount_amount(discount: Option<&Discount>, subtotal: Decimal) -> Decimal {
    let Some(discount) = discount else {
        return Decimal::ZERO;
    };
    let amount = match discount.kind {
        DiscountType::ByValue => discount.value,
        DiscountType::Flat | DiscountType::Referral | DiscountType::Loyalty => {
            subtotal.saturating_mul(discount.value) / Decimal::ONE_HUNDRED
        }
    };
    amount.max(Decimal::ZERO).min(subtotal.max(Decimal::ZERO))
}

fn sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Order charges: garments + shelf + delivery − discount, floored at zero.
///
/// Sums saturate at `Decimal::MAX` instead of overflowing.
pub fn order_charges(
    garments: &[PriceSnapshot],
    shelf_items: &[ShelfItem],
    delivery: Decimal,
    discount: Option<&Discount>,
) -> OrderCharges {
    let fabric = sum(garments.iter().map(|g| g.fabric));
    let stitching = sum(garments.iter().map(|g| g.stitching));
    let style = sum(garments.iter().map(|g| g.style));
    let shelf = sum(shelf_items.iter().map(|s| s.line_total()));

    let subtotal = sum([fabric, stitching, style, shelf, delivery].into_iter());
    let discount = discount_amount(discount, subtotal);

    OrderCharges {
        fabric,
        stitching,
        style,
        shelf,
        delivery,
        discount,
        total: (subtotal - discount).max(Decimal::ZERO),
    }
}

/// Metres requested per owned fabric across a whole garment set
pub fn fabric_usage(garments: &[GarmentInput]) -> BTreeMap<FabricId, Decimal> {
    let mut usage = BTreeMap::new();
    for garment in garments {
        if garment.fabric_source != FabricSource::In {
            continue;
        }
        if let Some(fabric_id) = garment.fabric_id {
            let total = usage.entry(fabric_id).or_insert(Decimal::ZERO);
            *total = total.saturating_add(garment.fabric_length);
        }
    }
    usage
}

/// Group stock check: the summed request per fabric must fit its real stock.
///
/// Returns one message per short fabric; a fabric missing from the catalog has no stock.
pub fn check_fabric_stock(
    garments: &[GarmentInput],
    fabrics: &HashMap<FabricId, Fabric>,
) -> Result<(), Vec<String>> {
    let shortages: Vec<String> = fabric_usage(garments)
        .into_iter()
        .filter_map(|(fabric_id, requested)| match fabrics.get(&fabric_id) {
            None => Some(format!(
                "Fabric #{}: requested {}m but it is no longer in the catalog",
                fabric_id, requested
            )),
            Some(fabric) => (requested > fabric.real_stock).then(|| {
                format!(
                    "Fabric {} (#{}): requested {}m exceeds available {}m",
                    fabric.name, fabric.id, requested, fabric.real_stock
                )
            }),
        })
        .collect();

    if shortages.is_empty() {
        Ok(())
    } else {
        Err(shortages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn garment(style: &str, source: FabricSource, fabric_id: Option<FabricId>, length: Decimal) -> GarmentInput {
        GarmentInput {
            id: None,
            measurement_id: Some(1),
            fabric_source: source,
            fabric_id,
            fabric_length: length,
            color: None,
            style: style.to_string(),
            options: StyleOptions::default(),
            express: false,
            brova: false,
            delivery_date: None,
            notes: None,
        }
    }

    fn fabric(id: FabricId, price: Decimal, stock: Decimal) -> Fabric {
        Fabric {
            id,
            name: format!("F{}", id),
            color: None,
            price_per_meter: price,
            real_stock: stock,
        }
    }

    #[test]
    fn test_design_style_uses_designer_rate_for_any_tier() {
        let config = PricingConfig::default();
        assert_eq!(stitching_price("design", dec!(7), &config), dec!(9));
        assert_eq!(stitching_price("design", dec!(9), &config), dec!(9));
    }

    #[test]
    fn test_other_styles_use_selected_tier() {
        let config = PricingConfig::default();
        assert_eq!(stitching_price("kuwaiti", dec!(7), &config), dec!(7));
        assert_eq!(stitching_price("kuwaiti", dec!(9), &config), dec!(9));
    }

    #[test]
    fn test_fabric_price_by_source() {
        let f = fabric(1, dec!(2.5), dec!(10));
        let owned = garment("kuwaiti", FabricSource::In, Some(1), dec!(3.2));
        let brought = garment("kuwaiti", FabricSource::Out, Some(1), dec!(3.2));
        assert_eq!(fabric_price(&owned, Some(&f)), dec!(8.00));
        assert_eq!(fabric_price(&brought, Some(&f)), Decimal::ZERO);
    }

    #[test]
    fn test_style_price_sums_option_codes() {
        let config = PricingConfig::default();
        let catalog = PriceCatalog::from_entries(&[
            PriceEntry { key: "COL_JAPANESE".into(), value: dec!(1.5), description: None },
            PriceEntry { key: "CUF_DOUBLE".into(), value: dec!(0.75), description: None },
            PriceEntry { key: PEN_HOLDER.into(), value: dec!(0.25), description: None },
        ]);
        let options = StyleOptions {
            collar_type: Some("COL_JAPANESE".into()),
            cuffs_type: Some("CUF_DOUBLE".into()),
            front_pocket_type: Some("UNPRICED".into()),
            pen_holder: true,
            ..Default::default()
        };

        assert_eq!(style_price("kuwaiti", &options, &catalog, &config), dec!(2.50));

        let design = PricingConfig {
            design_style_rate: dec!(4),
            ..Default::default()
        };
        assert_eq!(style_price("design", &options, &catalog, &design), dec!(4));
    }

    #[test]
    fn test_stock_is_checked_across_rows() {
        let fabrics: HashMap<_, _> = [(1, fabric(1, dec!(2), dec!(5.0)))].into_iter().collect();
        let rows = vec![
            garment("kuwaiti", FabricSource::In, Some(1), dec!(3.0)),
            garment("kuwaiti", FabricSource::In, Some(1), dec!(3.0)),
        ];

        assert!(check_fabric_stock(&rows[..1], &fabrics).is_ok());

        let shortages = check_fabric_stock(&rows, &fabrics).unwrap_err();
        assert_eq!(shortages.len(), 1);
        assert!(shortages[0].contains("requested 6.0m"));
        assert!(shortages[0].contains("available 5.0m"));
    }

    #[test]
    fn test_customer_fabric_ignored_by_stock_check() {
        let fabrics: HashMap<_, _> = [(1, fabric(1, dec!(2), dec!(1)))].into_iter().collect();
        let rows = vec![garment("kuwaiti", FabricSource::Out, Some(1), dec!(3.0))];
        assert!(check_fabric_stock(&rows, &fabrics).is_ok());
    }

    #[test]
    fn test_order_charges_with_discount() {
        let garments = vec![
            PriceSnapshot { fabric: dec!(10), stitching: dec!(7), style: dec!(3) },
            PriceSnapshot { fabric: dec!(0), stitching: dec!(9), style: dec!(1) },
        ];
        let shelf = vec![ShelfItem {
            id: 1,
            order_id: 1,
            shelf_id: 4,
            quantity: 2,
            unit_price: dec!(2.5),
        }];
        let discount = Discount {
            kind: DiscountType::ByValue,
            value: dec!(5),
            referral_code: None,
        };

        let charges = order_charges(&garments, &shelf, dec!(2), Some(&discount));
        assert_eq!(charges.fabric, dec!(10));
        assert_eq!(charges.stitching, dec!(16));
        assert_eq!(charges.style, dec!(4));
        assert_eq!(charges.shelf, dec!(5.0));
        assert_eq!(charges.total, dec!(32.0));
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let discount = Discount {
            kind: DiscountType::ByValue,
            value: dec!(500),
            referral_code: None,
        };
        assert_eq!(discount_amount(Some(&discount), dec!(20)), dec!(20));

        let loyalty = Discount {
            kind: DiscountType::Loyalty,
            value: dec!(10),
            referral_code: None,
        };
        assert_eq!(discount_amount(Some(&loyalty), dec!(50)), dec!(5));
    }

    #[test]
    fn test_validate_tier() {
        let config = PricingConfig::default();
        assert!(validate_tier(dec!(7), &config).is_ok());
        assert!(validate_tier(dec!(8), &config).is_err());
    }

    #[test]
    fn test_fabric_missing_from_catalog_is_a_shortage() {
        let rows = vec![garment("kuwaiti", FabricSource::In, Some(4), dec!(2.0))];
        let shortages = check_fabric_stock(&rows, &HashMap::new()).unwrap_err();
        assert_eq!(shortages.len(), 1);
        assert!(shortages[0].contains("Fabric #4"), "{}", shortages[0]);
    }

    #[test]
    fn test_huge_prices_saturate_instead_of_panicking() {
        let f = fabric(1, Decimal::MAX, dec!(10));
        let owned = garment("kuwaiti", FabricSource::In, Some(1), dec!(3));
        assert_eq!(fabric_price(&owned, Some(&f)), Decimal::MAX);

        let garments = vec![
            PriceSnapshot { fabric: Decimal::MAX, stitching: dec!(7), style: dec!(1) },
            PriceSnapshot { fabric: Decimal::MAX, stitching: dec!(7), style: dec!(1) },
        ];
        let loyalty = Discount {
            kind: DiscountType::Loyalty,
            value: dec!(10),
            referral_code: None,
        };
        let charges = order_charges(&garments, &[], dec!(2), Some(&loyalty));
        assert_eq!(charges.fabric, Decimal::MAX);
        assert!(charges.total > Decimal::ZERO);
    }
}

