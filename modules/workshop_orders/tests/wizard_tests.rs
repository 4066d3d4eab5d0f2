//! Order-assembly wizard driven through the service

mod common;

use common::*;
use rust_decimal_macros::dec;
use workshop_orders::contract::*;
use workshop_orders::domain::OrderEvent;

#[tokio::test]
async fn test_full_wizard_confirms_and_consumes_stock() {
    let h = harness();
    h.store.add_fabric(1, "Cotton White", dec!(2.5), dec!(10.0));
    h.store.add_shelf_product(7, "Ghutra", dec!(4), 5);
    h.store.add_price("COL1", dec!(1.5));

    let customer = h
        .service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();
    let draft = h.service.start_new_order(customer.id).await.unwrap();

    let draft = h
        .service
        .proceed(
            draft,
            StepInput::Demographics {
                customer_id: None,
                customer: customer_input("Ali", "+965 5555 0001"),
                campaign_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(draft.current_step, WizardStep::Measurements);
    let order_id = draft.order_id.unwrap();

    let draft = h
        .service
        .proceed(draft, StepInput::Measurements(MeasurementStep::Create(measurement_input())))
        .await
        .unwrap();
    let measurement_id = draft.measurement_ids[0];

    let mut row = garment_row(measurement_id, 1, dec!(3.0));
    row.options.collar_type = Some("COL1".to_string());
    let draft = h
        .service
        .proceed(
            draft,
            StepInput::FabricSelection {
                stitching_tier: dec!(7),
                garments: vec![row],
            },
        )
        .await
        .unwrap();
    assert_eq!(draft.current_step, WizardStep::ShelfProducts);

    let draft = h
        .service
        .proceed(
            draft,
            StepInput::ShelfProducts {
                items: vec![ShelfItemInput {
                    shelf_id: 7,
                    quantity: 2,
                }],
            },
        )
        .await
        .unwrap();

    let draft = h
        .service
        .proceed(draft, StepInput::ReviewPayment(PaymentDecision::Confirm(cash(dec!(10)))))
        .await
        .unwrap();
    assert_eq!(draft.outcome, Some(CheckoutStatus::Confirmed));

    let order = h.store.order(order_id).unwrap();
    assert_eq!(order.checkout_status, CheckoutStatus::Confirmed);
    assert_eq!(order.invoice_number, Some(1));
    assert_eq!(order.charges.fabric, dec!(7.5));
    assert_eq!(order.charges.stitching, dec!(7));
    assert_eq!(order.charges.style, dec!(1.5));
    assert_eq!(order.charges.shelf, dec!(8));
    assert_eq!(order.charges.total, dec!(24));
    assert_eq!(order.remaining(), dec!(14));
    assert!(order.order_date.is_some());

    assert_eq!(h.store.fabric_stock(1), Some(dec!(7.0)));
    assert_eq!(h.store.shelf_stock(7), Some(3));

    let garments = h.store.garments_of(order_id);
    assert_eq!(garments.len(), 1);
    assert_eq!(garments[0].garment_code, format!("{}-1", order_id));

    assert!(h.events.events().iter().any(|e| matches!(
        e,
        OrderEvent::CheckoutCompleted(c) if c.order_id == order_id && c.status == "confirmed"
    )));
}

#[tokio::test]
async fn test_pending_draft_is_offered_instead_of_new_order() {
    let h = harness();
    let customer = h
        .service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();

    let mut draft = confirmed_order(100, customer.id, None);
    draft.checkout_status = CheckoutStatus::Draft;
    draft.invoice_number = None;
    h.store.put_order(draft);

    match h.service.start_order(customer.id).await.unwrap() {
        StartOrder::PendingDrafts(drafts) => {
            assert_eq!(drafts.len(), 1);
            assert_eq!(drafts[0].id, 100);
        }
        StartOrder::Fresh(_) => panic!("expected the pending draft to be offered"),
    }
    assert!(h.store.order(101).is_none());
    assert_eq!(h.store.orders().len(), 1);
}

#[tokio::test]
async fn test_customer_without_drafts_starts_fresh() {
    let h = harness();
    let customer = h
        .service
        .create_customer(customer_input("Fahad", "+965 5555 0002"))
        .await
        .unwrap();

    match h.service.start_order(customer.id).await.unwrap() {
        StartOrder::Fresh(draft) => {
            assert_eq!(draft.customer_id, Some(customer.id));
            assert_eq!(draft.current_step, WizardStep::Demographics);
            assert!(draft.order_id.is_none());
        }
        StartOrder::PendingDrafts(_) => panic!("no drafts exist"),
    }
}

#[tokio::test]
async fn test_group_stock_check_refuses_combined_overdraw() {
    let h = harness();
    h.store.add_fabric(1, "Wool Grey", dec!(3), dec!(5.0));
    let (customer, measurement) = customer_with_measurement(&h.service, "Ali", "+965 5555 0001").await;
    let order = h
        .service
        .create_order(NewOrder {
            customer_id: customer.id,
            order_type: OrderType::Work,
            campaign_id: None,
            stitching_price: dec!(7),
            notes: None,
        })
        .await
        .unwrap();

    let rows = vec![
        garment_row(measurement.id, 1, dec!(3.0)),
        garment_row(measurement.id, 1, dec!(3.0)),
    ];
    let err = h.service.save_garments(order.id, dec!(7), rows).await.unwrap_err();

    match err {
        OrdersError::InsufficientStock { shortages } => {
            assert_eq!(shortages.len(), 1);
            assert!(shortages[0].contains("6.0"), "{}", shortages[0]);
            assert!(shortages[0].contains("5.0"), "{}", shortages[0]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.store.garments_of(order.id).is_empty());
    assert_eq!(h.store.fabric_stock(1), Some(dec!(5.0)));
}

#[tokio::test]
async fn test_resaving_garments_keeps_codes_and_drops_missing_rows() {
    let h = harness();
    h.store.add_fabric(1, "Cotton White", dec!(2), dec!(20));
    let (customer, measurement) = customer_with_measurement(&h.service, "Ali", "+965 5555 0001").await;
    let order = h
        .service
        .create_order(NewOrder {
            customer_id: customer.id,
            order_type: OrderType::Work,
            campaign_id: None,
            stitching_price: dec!(7),
            notes: None,
        })
        .await
        .unwrap();

    let first = h
        .service
        .save_garments(
            order.id,
            dec!(7),
            vec![
                garment_row(measurement.id, 1, dec!(3)),
                garment_row(measurement.id, 1, dec!(3)),
            ],
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let mut kept = garment_row(measurement.id, 1, dec!(4));
    kept.id = Some(first[1].id);
    let second = h
        .service
        .save_garments(
            order.id,
            dec!(9),
            vec![kept, garment_row(measurement.id, 1, dec!(2))],
        )
        .await
        .unwrap();

    assert_eq!(second[0].garment_code, first[1].garment_code);
    assert_eq!(second[1].garment_code, format!("{}-3", order.id));
    assert_eq!(second[0].price.stitching, dec!(9));

    let stored = h.store.garments_of(order.id);
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|g| g.id != first[0].id));

    let order = h.store.order(order.id).unwrap();
    assert_eq!(order.num_of_fabrics, 2);
    assert_eq!(order.stitching_price, dec!(9));
    assert_eq!(order.charges.fabric, dec!(12));
}

#[tokio::test]
async fn test_unknown_tier_and_foreign_measurement_rejected() {
    let h = harness();
    h.store.add_fabric(1, "Cotton White", dec!(2), dec!(20));
    let (customer, _) = customer_with_measurement(&h.service, "Ali", "+965 5555 0001").await;
    let (_, foreign) = customer_with_measurement(&h.service, "Omar", "+965 5555 0009").await;
    let order = h
        .service
        .create_order(NewOrder {
            customer_id: customer.id,
            order_type: OrderType::Work,
            campaign_id: None,
            stitching_price: dec!(7),
            notes: None,
        })
        .await
        .unwrap();

    let err = h
        .service
        .save_garments(order.id, dec!(8), vec![garment_row(foreign.id, 1, dec!(3))])
        .await
        .unwrap_err();

    let OrdersError::Validation { errors } = err else {
        panic!("expected validation errors");
    };
    assert!(errors.iter().any(|e| e.field == "stitching_price"));
    assert!(errors
        .iter()
        .any(|e| e.field == "measurement_id" && e.row == Some(1)));
}

#[tokio::test]
async fn test_steps_cannot_be_skipped() {
    let h = harness();
    let customer = h
        .service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();
    let draft = h.service.start_new_order(customer.id).await.unwrap();

    let err = h
        .service
        .proceed(draft, StepInput::Measurements(MeasurementStep::Create(measurement_input())))
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::InvalidState { .. }));
    assert!(h.store.orders().is_empty());
}

#[tokio::test]
async fn test_continue_draft_resumes_after_saved_steps() {
    let h = harness();
    h.store.add_fabric(1, "Cotton White", dec!(2), dec!(20));
    let (customer, measurement) = customer_with_measurement(&h.service, "Ali", "+965 5555 0001").await;
    let order = h
        .service
        .create_order(NewOrder {
            customer_id: customer.id,
            order_type: OrderType::Work,
            campaign_id: None,
            stitching_price: dec!(7),
            notes: None,
        })
        .await
        .unwrap();
    h.service
        .save_garments(order.id, dec!(7), vec![garment_row(measurement.id, 1, dec!(3))])
        .await
        .unwrap();

    let draft = h.service.continue_draft(order.id).await.unwrap();
    assert_eq!(draft.order_id, Some(order.id));
    assert_eq!(draft.measurement_ids, vec![measurement.id]);
    assert_eq!(draft.stitching_tier, Some(dec!(7)));
    assert_eq!(draft.current_step, WizardStep::ShelfProducts);
}

#[tokio::test]
async fn test_cancel_draft_returns_remaining_drafts() {
    let h = harness();
    let customer = h
        .service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();
    let new_order = || NewOrder {
        customer_id: customer.id,
        order_type: OrderType::Work,
        campaign_id: None,
        stitching_price: dec!(7),
        notes: None,
    };
    let first = h.service.create_order(new_order()).await.unwrap();
    let second = h.service.create_order(new_order()).await.unwrap();

    let remaining = h.service.cancel_draft(first.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
    assert_eq!(
        h.store.order(first.id).unwrap().checkout_status,
        CheckoutStatus::Cancelled
    );

    let err = h.service.continue_draft(first.id).await.unwrap_err();
    assert!(matches!(err, OrdersError::InvalidState { .. }));
}

#[tokio::test]
async fn test_confirm_without_items_rejected() {
    let h = harness();
    let customer = h
        .service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();
    let order = h
        .service
        .create_order(NewOrder {
            customer_id: customer.id,
            order_type: OrderType::Sales,
            campaign_id: None,
            stitching_price: dec!(7),
            notes: None,
        })
        .await
        .unwrap();

    let err = h
        .service
        .submit_payment(order.id, PaymentDecision::Confirm(cash(dec!(0))))
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::Validation { .. }));
    assert_eq!(
        h.store.order(order.id).unwrap().checkout_status,
        CheckoutStatus::Draft
    );
}

/// Draft order for Ali with one garment on 3.0m of fabric #1 (10.0m in stock)
async fn draft_with_garment(h: &Harness) -> OrderId {
    h.store.add_fabric(1, "Cotton White", dec!(2.5), dec!(10.0));
    let (customer, measurement) = customer_with_measurement(&h.service, "Ali", "+965 5555 0001").await;
    let order = h
        .service
        .create_order(NewOrder {
            customer_id: customer.id,
            order_type: OrderType::Work,
            campaign_id: None,
            stitching_price: dec!(7),
            notes: None,
        })
        .await
        .unwrap();
    h.service
        .save_garments(order.id, dec!(7), vec![garment_row(measurement.id, 1, dec!(3.0))])
        .await
        .unwrap();
    order.id
}

#[tokio::test]
async fn test_measurement_of_another_customer_is_never_written() {
    let h = harness();
    let (_, omar_measurement) = customer_with_measurement(&h.service, "Omar", "+965 5555 0009").await;
    let ali = h
        .service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();
    let draft = h
        .service
        .proceed(
            OrderDraft::for_customer(ali.id),
            StepInput::Demographics {
                customer_id: Some(ali.id),
                customer: customer_input("Ali", "+965 5555 0001"),
                campaign_id: None,
            },
        )
        .await
        .unwrap();

    let mut edited = measurement_input();
    edited.notes = Some("taken again".to_string());
    let err = h
        .service
        .proceed(
            draft.clone(),
            StepInput::Measurements(MeasurementStep::Update(omar_measurement.id, edited)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::Validation { .. }), "{err}");

    let stored = h.service.get_measurement(omar_measurement.id).await.unwrap();
    assert_eq!(stored.notes, None);
    assert_eq!(stored.dimensions, omar_measurement.dimensions);

    let err = h
        .service
        .proceed(draft, StepInput::Measurements(MeasurementStep::UseExisting(omar_measurement.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::Validation { .. }), "{err}");
}

#[tokio::test]
async fn test_stock_taken_during_confirmation_refuses_checkout() {
    let h = harness();
    let order_id = draft_with_garment(&h).await;

    // another checkout takes 8m after the service checked the stock
    h.store.withdraw_before_confirm(1, dec!(8.0));
    let err = h
        .service
        .submit_payment(order_id, PaymentDecision::Confirm(cash(dec!(0))))
        .await
        .unwrap_err();

    match err {
        OrdersError::InsufficientStock { shortages } => {
            assert_eq!(shortages.len(), 1);
            assert!(shortages[0].contains("Fabric #1"), "{}", shortages[0]);
        }
        other => panic!("unexpected error: {other}"),
    }
    let order = h.store.order(order_id).unwrap();
    assert_eq!(order.checkout_status, CheckoutStatus::Draft);
    assert_eq!(order.invoice_number, None);
    assert_eq!(h.store.fabric_stock(1), Some(dec!(2.0)));
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_stale_cached_draft_cannot_be_confirmed_twice() {
    let h = harness();
    let order_id = draft_with_garment(&h).await;

    // cache the draft, then confirm it elsewhere
    let cached = h.service.get_order(order_id).await.unwrap();
    assert_eq!(cached.checkout_status, CheckoutStatus::Draft);
    h.store.set_checkout_status(order_id, CheckoutStatus::Confirmed);

    let err = h
        .service
        .submit_payment(order_id, PaymentDecision::Confirm(cash(dec!(0))))
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::InvalidState { .. }), "{err}");
    assert_eq!(h.store.order(order_id).unwrap().invoice_number, None);
    assert_eq!(h.store.fabric_stock(1), Some(dec!(10.0)));

    let err = h.service.cancel_draft(order_id).await.unwrap_err();
    assert!(matches!(err, OrdersError::InvalidState { .. }), "{err}");
    assert_eq!(
        h.store.order(order_id).unwrap().checkout_status,
        CheckoutStatus::Confirmed
    );
}
