//! Workflow models: the order-assembly draft, step inputs, checkout and linking requests

use super::model::{
    CampaignId, CheckoutStatus, Customer, CustomerId, CustomerInput, Discount, GarmentInput,
    MeasurementId, MeasurementInput, Order, OrderId, PaymentType, ShelfItemInput,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Steps of the new-order wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    Demographics,
    Measurements,
    FabricSelection,
    ShelfProducts,
    ReviewPayment,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Demographics,
        WizardStep::Measurements,
        WizardStep::FabricSelection,
        WizardStep::ShelfProducts,
        WizardStep::ReviewPayment,
    ];

    pub fn index(&self) -> usize {
        match self {
            WizardStep::Demographics => 0,
            WizardStep::Measurements => 1,
            WizardStep::FabricSelection => 2,
            WizardStep::ShelfProducts => 3,
            WizardStep::ReviewPayment => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

/// Client-held state of an order being assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub current_step: WizardStep,
    /// Steps whose data is durably persisted
    pub saved_steps: BTreeSet<WizardStep>,
    pub order_id: Option<OrderId>,
    pub customer_id: Option<CustomerId>,
    pub campaign_id: Option<CampaignId>,
    pub measurement_ids: Vec<MeasurementId>,
    pub stitching_tier: Option<Decimal>,
    pub garments: Vec<GarmentInput>,
    pub shelf_items: Vec<ShelfItemInput>,
    /// Set once the payment decision was submitted
    pub outcome: Option<CheckoutStatus>,
}

/// How the measurement step picks its measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementStep {
    UseExisting(MeasurementId),
    Create(MeasurementInput),
    Update(MeasurementId, MeasurementInput),
}

/// Data submitted when leaving a wizard step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Demographics {
        /// Existing customer being edited, if any
        customer_id: Option<CustomerId>,
        customer: CustomerInput,
        campaign_id: Option<CampaignId>,
    },
    Measurements(MeasurementStep),
    FabricSelection {
        stitching_tier: Decimal,
        garments: Vec<GarmentInput>,
    },
    ShelfProducts {
        items: Vec<ShelfItemInput>,
    },
    ReviewPayment(PaymentDecision),
}

impl StepInput {
    pub fn step(&self) -> WizardStep {
        match self {
            StepInput::Demographics { .. } => WizardStep::Demographics,
            StepInput::Measurements(_) => WizardStep::Measurements,
            StepInput::FabricSelection { .. } => WizardStep::FabricSelection,
            StepInput::ShelfProducts { .. } => WizardStep::ShelfProducts,
            StepInput::ReviewPayment(_) => WizardStep::ReviewPayment,
        }
    }
}

/// Final decision taken on the review & payment step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDecision {
    Confirm(ConfirmPayment),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPayment {
    pub payment_type: PaymentType,
    pub payment_ref: Option<String>,
    pub advance: Decimal,
    /// Defaults to `advance` when absent
    pub paid: Option<Decimal>,
    pub delivery_date: Option<NaiveDate>,
    pub home_delivery: bool,
    pub discount: Option<Discount>,
}

/// Outcome of selecting a customer on the "new work order" path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOrder {
    /// No drafts exist; a fresh wizard state for the customer
    Fresh(OrderDraft),
    /// The customer already has drafts; the operator must continue one or start new
    PendingDrafts(Vec<Order>),
}

// ===== Linking =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub order_ids: Vec<OrderId>,
    pub primary_id: OrderId,
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub primary_id: OrderId,
    pub children: Vec<OrderId>,
    /// Children of selected primaries that were pulled into the group
    pub auto_added: usize,
    pub delivery_date: NaiveDate,
}

/// A primary order together with its linked children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedGroup {
    pub primary: Order,
    pub children: Vec<Order>,
}

/// Ways of locating orders for linking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderLookup {
    Id(OrderId),
    InvoiceNumber(i32),
    Customer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerCandidates {
    pub customer: Customer,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult {
    pub orders: Vec<Order>,
    pub customers: Vec<CustomerCandidates>,
    /// Informational message, e.g. a matched customer with nothing pending
    pub notice: Option<String>,
}
