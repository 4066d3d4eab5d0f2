//! Field and row validation for step inputs

use crate::contract::{
    ConfirmPayment, CustomerInput, DiscountType, Fabric, FabricId, FabricSource, FieldError,
    GarmentInput, ShelfItemInput, ShelfProduct, ShelfProductId,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Longest fabric cut accepted for one garment, in metres
pub const MAX_FABRIC_LENGTH: Decimal = Decimal::ONE_HUNDRED;

/// Validate a phone number
///
/// Accepts digits with an optional leading `+`, and spaces or dashes as separators.
/// At least 7 digits are required.
pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(FieldError::new("phone", "is required"));
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let valid_chars = body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    if !valid_chars {
        return Err(FieldError::new(
            "phone",
            format!("'{}' may only contain digits, spaces and dashes", phone),
        ));
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 {
        return Err(FieldError::new("phone", "must contain at least 7 digits"));
    }

    Ok(())
}

/// Validate the demographics form
pub fn validate_customer(input: &CustomerInput) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.name.trim().is_empty() {
        errors.push(FieldError::new("name", "is required"));
    }
    if let Err(e) = validate_phone(&input.phone) {
        errors.push(e);
    }
    for (field, value) in [
        ("alternate_mobile", &input.alternate_mobile),
        ("whatsapp", &input.whatsapp),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            if let Err(mut e) = validate_phone(value) {
                e.field = field.to_string();
                errors.push(e);
            }
        }
    }
    if let Some(email) = input.email.as_deref().filter(|e| !e.trim().is_empty()) {
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            errors.push(FieldError::new("email", format!("'{}' is not a valid email", email)));
        }
    }

    errors
}

/// Validate garment rows of the fabric selection step.
///
/// Rows are numbered from 1 in the returned errors.
pub fn validate_garment_rows(
    rows: &[GarmentInput],
    fabrics: &HashMap<FabricId, Fabric>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if rows.is_empty() {
        errors.push(FieldError::new("garments", "at least one garment is required"));
    }

    for (index, row) in rows.iter().enumerate() {
        let n = index + 1;

        if row.measurement_id.is_none() {
            errors.push(FieldError::in_row(n, "measurement_id", "is required"));
        }
        if row.style.trim().is_empty() {
            errors.push(FieldError::in_row(n, "style", "is required"));
        }
        if row.fabric_length < Decimal::ZERO {
            errors.push(FieldError::in_row(n, "fabric_length", "must not be negative"));
        }
        if row.fabric_length > MAX_FABRIC_LENGTH {
            errors.push(FieldError::in_row(
                n,
                "fabric_length",
                format!("must not exceed {}m", MAX_FABRIC_LENGTH),
            ));
        }
        if row.options.lines < 0 {
            errors.push(FieldError::in_row(n, "lines", "must not be negative"));
        }

        if row.fabric_source == FabricSource::In {
            match row.fabric_id {
                None => errors.push(FieldError::in_row(
                    n,
                    "fabric_id",
                    "is required for fabric from stock",
                )),
                Some(id) if !fabrics.contains_key(&id) => errors.push(FieldError::in_row(
                    n,
                    "fabric_id",
                    format!("fabric #{} does not exist", id),
                )),
                Some(_) => {}
            }
            if row.fabric_length <= Decimal::ZERO {
                errors.push(FieldError::in_row(
                    n,
                    "fabric_length",
                    "must be positive for fabric from stock",
                ));
            }
        }
    }

    errors
}

/// Validate shelf lines and sum quantities per product.
///
/// Lines for the same product are merged; the merged quantity must fit the stock.
pub fn validate_shelf_rows(
    rows: &[ShelfItemInput],
    products: &HashMap<ShelfProductId, ShelfProduct>,
) -> Result<BTreeMap<ShelfProductId, i32>, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut merged: BTreeMap<ShelfProductId, i32> = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        let n = index + 1;
        if row.quantity <= 0 {
            errors.push(FieldError::in_row(n, "quantity", "must be positive"));
            continue;
        }
        if !products.contains_key(&row.shelf_id) {
            errors.push(FieldError::in_row(
                n,
                "shelf_id",
                format!("product #{} does not exist", row.shelf_id),
            ));
            continue;
        }
        let total = merged.entry(row.shelf_id).or_insert(0);
        match total.checked_add(row.quantity) {
            Some(sum) => *total = sum,
            None => errors.push(FieldError::in_row(n, "quantity", "is too large")),
        }
    }

    for (shelf_id, quantity) in &merged {
        if let Some(product) = products.get(shelf_id) {
            if *quantity > product.stock {
                errors.push(FieldError::new(
                    "quantity",
                    format!(
                        "product #{} ({}): requested {} exceeds stock {}",
                        shelf_id, product.product_type, quantity, product.stock
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(merged)
    } else {
        Err(errors)
    }
}

/// Validate a confirmation against the order total
pub fn validate_payment(payment: &ConfirmPayment, total: Decimal) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let paid = payment.paid.unwrap_or(payment.advance);

    if payment.advance < Decimal::ZERO {
        errors.push(FieldError::new("advance", "must not be negative"));
    }
    if paid < Decimal::ZERO {
        errors.push(FieldError::new("paid", "must not be negative"));
    }
    if paid > total {
        errors.push(FieldError::new(
            "paid",
            format!("{} exceeds the order total {}", paid, total),
        ));
    }
    if let Some(discount) = &payment.discount {
        if discount.value < Decimal::ZERO {
            errors.push(FieldError::new("discount", "must not be negative"));
        }
        if discount.kind != DiscountType::ByValue && discount.value > Decimal::ONE_HUNDRED {
            errors.push(FieldError::new("discount", "a percentage must not exceed 100"));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::StyleOptions;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+965 5555 0001").is_ok());
        assert!(validate_phone("55550001").is_ok());
        assert!(validate_phone("965-5555-0001").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+965 abc 0001").is_err());
    }

    #[test]
    fn test_validate_customer_reports_each_field() {
        let input = CustomerInput {
            name: " ".into(),
            phone: "12".into(),
            email: Some("nope".into()),
            ..Default::default()
        };
        let fields: Vec<String> = validate_customer(&input).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "phone", "email"]);
    }

    #[test]
    fn test_garment_rows_are_numbered_from_one() {
        let row = GarmentInput {
            id: None,
            measurement_id: None,
            fabric_source: FabricSource::In,
            fabric_id: None,
            fabric_length: Decimal::ZERO,
            color: None,
            style: "kuwaiti".into(),
            options: StyleOptions::default(),
            express: false,
            brova: false,
            delivery_date: None,
            notes: None,
        };
        let errors = validate_garment_rows(&[row], &HashMap::new());
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.row == Some(1)));
        assert_eq!(errors[0].to_string(), "Row 1: measurement_id: is required");
    }

    #[test]
    fn test_shelf_rows_merge_and_check_stock() {
        let products: HashMap<_, _> = [(
            3,
            ShelfProduct {
                id: 3,
                product_type: "Ghutra".into(),
                brand: None,
                price: Decimal::from(5),
                stock: 3,
            },
        )]
        .into_iter()
        .collect();

        let ok = vec![
            ShelfItemInput { shelf_id: 3, quantity: 1 },
            ShelfItemInput { shelf_id: 3, quantity: 2 },
        ];
        assert_eq!(validate_shelf_rows(&ok, &products).unwrap().get(&3), Some(&3));

        let too_many = vec![
            ShelfItemInput { shelf_id: 3, quantity: 2 },
            ShelfItemInput { shelf_id: 3, quantity: 2 },
        ];
        assert!(validate_shelf_rows(&too_many, &products).is_err());
    }

    #[test]
    fn test_huge_shelf_quantities_are_rejected_without_overflow() {
        let products: HashMap<_, _> = [(
            3,
            ShelfProduct {
                id: 3,
                product_type: "Ghutra".into(),
                brand: None,
                price: Decimal::from(5),
                stock: 3,
            },
        )]
        .into_iter()
        .collect();
        let rows = vec![
            ShelfItemInput { shelf_id: 3, quantity: i32::MAX },
            ShelfItemInput { shelf_id: 3, quantity: i32::MAX },
        ];

        let errors = validate_shelf_rows(&rows, &products).unwrap_err();
        assert!(errors.iter().any(|e| e.row == Some(2) && e.message == "is too large"));
        assert!(errors.iter().any(|e| e.message.contains("exceeds stock 3")));
    }

    #[test]
    fn test_fabric_length_and_percentage_discount_are_bounded() {
        let row = GarmentInput {
            id: None,
            measurement_id: Some(1),
            fabric_source: FabricSource::Out,
            fabric_id: None,
            fabric_length: Decimal::MAX,
            color: None,
            style: "kuwaiti".into(),
            options: StyleOptions::default(),
            express: false,
            brova: false,
            delivery_date: None,
            notes: None,
        };
        let errors = validate_garment_rows(&[row], &HashMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fabric_length");

        let payment = ConfirmPayment {
            payment_type: crate::contract::PaymentType::Cash,
            payment_ref: None,
            advance: Decimal::ZERO,
            paid: None,
            delivery_date: None,
            home_delivery: false,
            discount: Some(crate::contract::Discount {
                kind: DiscountType::Loyalty,
                value: Decimal::from(250),
                referral_code: None,
            }),
        };
        let errors = validate_payment(&payment, Decimal::from(20));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "discount");
    }
}
