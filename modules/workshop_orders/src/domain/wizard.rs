//! Order-assembly wizard: pure transitions over [`OrderDraft`]
//!
//! The draft is a value owned by the caller. Every transition consumes the draft and
//! returns the next one; persistence happens in the service between validation and
//! the `record_*` transitions.

use crate::config::PricingConfig;
use crate::contract::{
    CheckoutStatus, CustomerId, Fabric, FabricId, FieldError, Garment, GarmentInput,
    MeasurementId, MeasurementStep, OrderDraft, OrderId, OrdersError, OrderWithRelations,
    PaymentDecision, ShelfItemInput, ShelfProduct, ShelfProductId, StepInput, WizardStep,
};
use crate::domain::{measurements, pricing, validation};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Navigation errors of the wizard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("step {0:?} cannot be entered before the previous steps are saved")]
    StepLocked(WizardStep),

    #[error("step {0:?} needs an order; save the demographics step first")]
    NoOrder(WizardStep),

    #[error("the order was already finalized as {0}")]
    Finalized(CheckoutStatus),
}

impl From<WizardError> for OrdersError {
    fn from(e: WizardError) -> Self {
        OrdersError::invalid_state(e.to_string())
    }
}

/// Catalog data needed to validate step inputs locally
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub fabrics: HashMap<FabricId, Fabric>,
    pub shelf_products: HashMap<ShelfProductId, ShelfProduct>,
    pub pricing: PricingConfig,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderDraft {
    /// Step 0, nothing saved, no order
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Demographics,
            saved_steps: BTreeSet::new(),
            order_id: None,
            customer_id: None,
            campaign_id: None,
            measurement_ids: Vec::new(),
            stitching_tier: None,
            garments: Vec::new(),
            shelf_items: Vec::new(),
            outcome: None,
        }
    }

    /// Fresh draft for a customer picked from search
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::new()
        }
    }

    /// Rebuild a draft from a persisted draft order.
    ///
    /// Steps whose data exists are marked saved and the wizard resumes at the
    /// first unsaved step.
    pub fn resume(loaded: &OrderWithRelations) -> Self {
        let order = &loaded.order;
        let mut draft = Self {
            order_id: Some(order.id),
            customer_id: Some(order.customer_id),
            campaign_id: order.campaign_id,
            ..Self::new()
        };
        draft.saved_steps.insert(WizardStep::Demographics);

        for garment in &loaded.garments {
            if !draft.measurement_ids.contains(&garment.measurement_id) {
                draft.measurement_ids.push(garment.measurement_id);
            }
        }
        draft.garments = loaded.garments.iter().map(garment_to_input).collect();
        draft.shelf_items = loaded
            .shelf_items
            .iter()
            .map(|s| ShelfItemInput {
                shelf_id: s.shelf_id,
                quantity: s.quantity,
            })
            .collect();

        if !draft.garments.is_empty() {
            draft.stitching_tier = Some(order.stitching_price);
            draft.saved_steps.insert(WizardStep::Measurements);
            draft.saved_steps.insert(WizardStep::FabricSelection);
        }
        if !draft.shelf_items.is_empty() {
            draft.saved_steps.insert(WizardStep::ShelfProducts);
        }
        if order.checkout_status.is_terminal() {
            draft.outcome = Some(order.checkout_status);
        }

        draft.current_step = WizardStep::ALL
            .iter()
            .copied()
            .find(|step| !draft.is_saved(*step) && draft.can_enter(*step))
            .unwrap_or(WizardStep::ReviewPayment);
        draft
    }

    pub fn is_saved(&self, step: WizardStep) -> bool {
        self.saved_steps.contains(&step)
    }

    /// A step is enterable once every earlier step is saved
    pub fn can_enter(&self, step: WizardStep) -> bool {
        WizardStep::ALL
            .iter()
            .take(step.index())
            .all(|earlier| self.is_saved(*earlier))
    }

    /// Revisit or jump to a step
    pub fn go_to(mut self, step: WizardStep) -> Result<Self, WizardError> {
        if !self.can_enter(step) {
            return Err(WizardError::StepLocked(step));
        }
        self.current_step = step;
        Ok(self)
    }

    /// The user re-entered edit mode on a step: its data is no longer persisted
    pub fn remove_saved_step(mut self, step: WizardStep) -> Self {
        self.saved_steps.remove(&step);
        self
    }

    /// Mark a step saved and advance past it
    pub fn mark_saved(mut self, step: WizardStep) -> Self {
        self.saved_steps.insert(step);
        self.current_step = step.next().unwrap_or(WizardStep::ReviewPayment);
        self
    }

    /// Navigation checks before a step's input is persisted
    pub fn check_can_submit(&self, step: WizardStep) -> Result<(), WizardError> {
        if let Some(outcome) = self.outcome {
            return Err(WizardError::Finalized(outcome));
        }
        if !self.can_enter(step) {
            return Err(WizardError::StepLocked(step));
        }
        if step != WizardStep::Demographics && self.order_id.is_none() {
            return Err(WizardError::NoOrder(step));
        }
        Ok(())
    }

    /// Per-field and per-row validation of a step input
    pub fn validate_input(&self, input: &StepInput, ctx: &ValidationContext) -> Vec<FieldError> {
        match input {
            StepInput::Demographics { customer, .. } => validation::validate_customer(customer),
            StepInput::Measurements(step) => match step {
                MeasurementStep::UseExisting(_) => Vec::new(),
                MeasurementStep::Create(m) | MeasurementStep::Update(_, m) => {
                    measurements::validate_dimensions(&m.dimensions)
                }
            },
            StepInput::FabricSelection {
                stitching_tier,
                garments,
            } => {
                let mut errors = validation::validate_garment_rows(garments, &ctx.fabrics);
                if let Err(e) = pricing::validate_tier(*stitching_tier, &ctx.pricing) {
                    errors.push(e);
                }
                for (index, garment) in garments.iter().enumerate() {
                    if let Some(m) = garment.measurement_id {
                        if !self.measurement_ids.is_empty() && !self.measurement_ids.contains(&m) {
                            errors.push(FieldError::in_row(
                                index + 1,
                                "measurement_id",
                                format!("measurement #{} was not selected for this order", m),
                            ));
                        }
                    }
                }
                errors
            }
            StepInput::ShelfProducts { items } => {
                match validation::validate_shelf_rows(items, &ctx.shelf_products) {
                    Ok(_) => Vec::new(),
                    Err(errors) => errors,
                }
            }
            StepInput::ReviewPayment(PaymentDecision::Cancel) => Vec::new(),
            StepInput::ReviewPayment(PaymentDecision::Confirm(_)) => {
                if self.garments.is_empty() && self.shelf_items.is_empty() {
                    vec![FieldError::new(
                        "order",
                        "add at least one garment or shelf product before confirming",
                    )]
                } else {
                    Vec::new()
                }
            }
        }
    }

    // ===== Transitions recorded after persistence =====

    pub fn record_demographics(
        mut self,
        customer_id: CustomerId,
        order_id: OrderId,
        campaign_id: Option<i32>,
    ) -> Self {
        self.customer_id = Some(customer_id);
        self.order_id = Some(order_id);
        self.campaign_id = campaign_id;
        self.mark_saved(WizardStep::Demographics)
    }

    pub fn record_measurement(mut self, measurement_id: MeasurementId) -> Self {
        if !self.measurement_ids.contains(&measurement_id) {
            self.measurement_ids.push(measurement_id);
        }
        self.mark_saved(WizardStep::Measurements)
    }

    pub fn record_garments(mut self, tier: Decimal, saved: &[Garment]) -> Self {
        self.stitching_tier = Some(tier);
        self.garments = saved.iter().map(garment_to_input).collect();
        self.mark_saved(WizardStep::FabricSelection)
    }

    pub fn record_shelf_items(mut self, items: Vec<ShelfItemInput>) -> Self {
        self.shelf_items = items;
        self.mark_saved(WizardStep::ShelfProducts)
    }

    pub fn record_outcome(mut self, outcome: CheckoutStatus) -> Self {
        self.outcome = Some(outcome);
        self.mark_saved(WizardStep::ReviewPayment)
    }
}

/// Editable row form of a saved garment
pub(crate) fn garment_to_input(garment: &Garment) -> GarmentInput {
    GarmentInput {
        id: Some(garment.id),
        measurement_id: Some(garment.measurement_id),
        fabric_source: garment.fabric_source,
        fabric_id: garment.fabric_id,
        fabric_length: garment.fabric_length,
        color: garment.color.clone(),
        style: garment.style.clone(),
        options: garment.options.clone(),
        express: garment.express,
        brova: garment.brova,
        delivery_date: garment.delivery_date,
        notes: garment.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let draft = OrderDraft::new();
        assert_eq!(draft.current_step, WizardStep::Demographics);
        assert!(draft.saved_steps.is_empty());
        assert!(draft.order_id.is_none());
    }

    #[test]
    fn test_steps_are_gated_on_previous_saves() {
        let draft = OrderDraft::new();
        assert!(draft.can_enter(WizardStep::Demographics));
        assert!(!draft.can_enter(WizardStep::Measurements));
        assert_eq!(
            draft.clone().go_to(WizardStep::FabricSelection).unwrap_err(),
            WizardError::StepLocked(WizardStep::FabricSelection)
        );

        let draft = draft.record_demographics(1, 100, None);
        assert_eq!(draft.current_step, WizardStep::Measurements);
        assert!(draft.can_enter(WizardStep::Measurements));
        assert!(!draft.can_enter(WizardStep::FabricSelection));
    }

    #[test]
    fn test_remove_saved_step_relocks_later_steps() {
        let draft = OrderDraft::new()
            .record_demographics(1, 100, None)
            .record_measurement(5);
        assert!(draft.can_enter(WizardStep::FabricSelection));

        let draft = draft.remove_saved_step(WizardStep::Measurements);
        assert!(!draft.is_saved(WizardStep::Measurements));
        assert!(!draft.can_enter(WizardStep::FabricSelection));

        let draft = draft.go_to(WizardStep::Measurements).unwrap();
        assert_eq!(draft.current_step, WizardStep::Measurements);
    }

    #[test]
    fn test_submit_requires_order_after_first_step() {
        let mut draft = OrderDraft::new();
        draft.saved_steps.insert(WizardStep::Demographics);
        assert_eq!(
            draft.check_can_submit(WizardStep::Measurements),
            Err(WizardError::NoOrder(WizardStep::Measurements))
        );
    }

    #[test]
    fn test_finalized_draft_refuses_submissions() {
        let draft = OrderDraft::new()
            .record_demographics(1, 100, None)
            .record_outcome(CheckoutStatus::Cancelled);
        assert_eq!(
            draft.check_can_submit(WizardStep::Demographics),
            Err(WizardError::Finalized(CheckoutStatus::Cancelled))
        );
    }

    #[test]
    fn test_confirm_requires_items() {
        let draft = OrderDraft::new().record_demographics(1, 100, None);
        let input = StepInput::ReviewPayment(PaymentDecision::Confirm(crate::contract::ConfirmPayment {
            payment_type: crate::contract::PaymentType::Cash,
            payment_ref: None,
            advance: Decimal::ZERO,
            paid: None,
            delivery_date: None,
            home_delivery: false,
            discount: None,
        }));
        let errors = draft.validate_input(&input, &ValidationContext::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "order");
    }
}
