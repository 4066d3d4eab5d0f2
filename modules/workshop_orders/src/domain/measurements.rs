//! Measurement codes and derived provision fields

use crate::contract::{
    BodyDimensions, CustomerId, FieldError, Measurement, MeasurementInput, Provisions,
};
use rust_decimal::Decimal;

/// `max(0, 2 × front − full)`, or `None` when either input is missing
fn provision(front: Option<Decimal>, full: Option<Decimal>) -> Option<Decimal> {
    let (front, full) = (front?, full?);
    Some(
        Decimal::TWO
            .saturating_mul(front)
            .saturating_sub(full)
            .max(Decimal::ZERO),
    )
}

/// Derive every provision field from its inputs
pub fn derive_provisions(dimensions: &BodyDimensions) -> Provisions {
    Provisions {
        armhole: provision(dimensions.armhole_front, dimensions.armhole),
        chest: provision(dimensions.chest_front, dimensions.chest_full),
        waist: provision(dimensions.waist_front, dimensions.waist_full),
    }
}

impl Measurement {
    /// Overwrite the provision fields from the current dimensions
    pub fn recompute_provisions(&mut self) {
        self.provisions = derive_provisions(&self.dimensions);
    }

    /// Replace the editable fields and recompute provisions
    pub fn apply_input(&mut self, input: MeasurementInput) {
        self.measurement_type = input.measurement_type;
        self.reference = input.reference;
        self.measurer = input.measurer;
        self.dimensions = input.dimensions;
        self.notes = input.notes;
        self.recompute_provisions();
    }
}

/// Next customer-scoped measurement code: `"<customerId>-<n>"`.
///
/// `n` is one past the highest suffix already used by the customer, so codes
/// stay unique even if an earlier measurement was removed.
pub fn next_measurement_code(customer_id: CustomerId, existing: &[Measurement]) -> String {
    let prefix = format!("{}-", customer_id);
    let highest = existing
        .iter()
        .filter_map(|m| m.measurement_code.strip_prefix(&prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{}", prefix, highest + 1)
}

/// Reject negative dimensions
pub fn validate_dimensions(dimensions: &BodyDimensions) -> Vec<FieldError> {
    let fields: [(&str, Option<Decimal>); 23] = [
        ("length_front", dimensions.length_front),
        ("length_back", dimensions.length_back),
        ("bottom", dimensions.bottom),
        ("shoulder", dimensions.shoulder),
        ("neck", dimensions.neck),
        ("chest_full", dimensions.chest_full),
        ("chest_front", dimensions.chest_front),
        ("chest_back", dimensions.chest_back),
        ("chest_upper", dimensions.chest_upper),
        ("waist_full", dimensions.waist_full),
        ("waist_front", dimensions.waist_front),
        ("waist_back", dimensions.waist_back),
        ("sleeve_length", dimensions.sleeve_length),
        ("sleeve_width", dimensions.sleeve_width),
        ("elbow", dimensions.elbow),
        ("armhole", dimensions.armhole),
        ("armhole_front", dimensions.armhole_front),
        ("top_pocket_length", dimensions.top_pocket_length),
        ("top_pocket_width", dimensions.top_pocket_width),
        ("side_pocket_length", dimensions.side_pocket_length),
        ("side_pocket_width", dimensions.side_pocket_width),
        ("jabzour_length", dimensions.jabzour_length),
        ("jabzour_width", dimensions.jabzour_width),
    ];

    fields
        .iter()
        .filter(|(_, value)| value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()))
        .map(|(field, _)| FieldError::new(*field, "must not be negative"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MeasurementType;
    use chrono::Utc;

    fn dec(v: i64) -> Option<Decimal> {
        Some(Decimal::from(v))
    }

    fn measurement(code: &str) -> Measurement {
        Measurement {
            id: 1,
            customer_id: 7,
            measurement_code: code.to_string(),
            measurement_type: MeasurementType::Body,
            reference: None,
            measurer: None,
            measurement_date: Utc::now(),
            dimensions: BodyDimensions::default(),
            provisions: Provisions::default(),
            notes: None,
        }
    }

    #[test]
    fn test_armhole_provision_example() {
        let dims = BodyDimensions {
            armhole: dec(20),
            armhole_front: dec(11),
            ..Default::default()
        };
        assert_eq!(derive_provisions(&dims).armhole, dec(2));
    }

    #[test]
    fn test_provision_clamped_at_zero() {
        let dims = BodyDimensions {
            armhole: dec(30),
            armhole_front: dec(11),
            ..Default::default()
        };
        assert_eq!(derive_provisions(&dims).armhole, Some(Decimal::ZERO));
    }

    #[test]
    fn test_provision_missing_input_is_none() {
        let dims = BodyDimensions {
            armhole: dec(20),
            ..Default::default()
        };
        assert_eq!(derive_provisions(&dims).armhole, None);
    }

    #[test]
    fn test_recompute_is_idempotent_and_overwrites_edits() {
        let mut m = measurement("7-1");
        m.dimensions.armhole = dec(20);
        m.dimensions.armhole_front = dec(11);
        m.provisions.armhole = dec(99);

        m.recompute_provisions();
        let first = m.provisions.clone();
        m.recompute_provisions();

        assert_eq!(first.armhole, dec(2));
        assert_eq!(m.provisions, first);
    }

    #[test]
    fn test_next_measurement_code() {
        assert_eq!(next_measurement_code(7, &[]), "7-1");

        let existing = vec![measurement("7-1"), measurement("7-3"), measurement("8-9")];
        assert_eq!(next_measurement_code(7, &existing), "7-4");
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let dims = BodyDimensions {
            neck: Some(Decimal::from(-1)),
            shoulder: dec(40),
            ..Default::default()
        };
        let errors = validate_dimensions(&dims);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "neck");
    }
}
