//! Configuration for the workshop orders module

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Workshop orders module configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Stitching and style pricing rules
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Maximum number of pending orders returned per customer
    #[serde(default = "default_pending_orders_limit")]
    pub pending_orders_limit: u64,

    /// Maximum number of customers returned by a fuzzy search
    #[serde(default = "default_search_limit")]
    pub search_limit: u64,
}

/// Pricing rules applied when garments are saved
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Stitching tiers the operator can toggle between
    #[serde(default = "default_stitching_tiers")]
    pub stitching_tiers: Vec<Decimal>,

    /// Stitching price of a garment with the `design` style, regardless of tier
    #[serde(default = "default_designer_stitching_rate")]
    pub designer_stitching_rate: Decimal,

    /// Flat style price of a garment with the `design` style
    #[serde(default)]
    pub design_style_rate: Decimal,

    /// Delivery charge applied to home-delivery orders
    #[serde(default)]
    pub default_delivery_charge: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            pending_orders_limit: default_pending_orders_limit(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            stitching_tiers: default_stitching_tiers(),
            designer_stitching_rate: default_designer_stitching_rate(),
            design_style_rate: Decimal::ZERO,
            default_delivery_charge: Decimal::ZERO,
        }
    }
}

fn default_stitching_tiers() -> Vec<Decimal> {
    vec![Decimal::from(7), Decimal::from(9)]
}

fn default_designer_stitching_rate() -> Decimal {
    Decimal::from(9)
}

fn default_pending_orders_limit() -> u64 {
    10
}

fn default_search_limit() -> u64 {
    20
}
