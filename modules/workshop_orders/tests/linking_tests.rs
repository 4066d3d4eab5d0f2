//! Linking confirmed orders into delivery groups

mod common;

use chrono::{Duration, NaiveDate, Utc};
use common::*;
use workshop_orders::contract::*;
use workshop_orders::domain::OrderEvent;

fn in_days(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

/// Customer #1 with confirmed orders 10, 11 and 12
async fn three_orders() -> Harness {
    let h = harness();
    h.service
        .create_customer(customer_input("Ali", "+965 5555 0001"))
        .await
        .unwrap();
    for id in [10, 11, 12] {
        h.store.put_order(confirmed_order(id, 1, None));
    }
    h
}

fn link(ids: &[OrderId], primary: OrderId) -> LinkRequest {
    LinkRequest {
        order_ids: ids.to_vec(),
        primary_id: primary,
        delivery_date: Some(in_days(14)),
    }
}

#[tokio::test]
async fn test_link_sets_children_and_shared_delivery_date() {
    let h = three_orders().await;

    let outcome = h.service.link_orders(link(&[10, 11, 12], 10)).await.unwrap();
    assert_eq!(outcome.primary_id, 10);
    assert_eq!(outcome.children, vec![11, 12]);
    assert_eq!(outcome.auto_added, 0);

    let primary = h.store.order(10).unwrap();
    assert_eq!(primary.linked_order_id, None);
    assert_eq!(primary.delivery_date, Some(in_days(14)));
    for id in [11, 12] {
        let child = h.store.order(id).unwrap();
        assert_eq!(child.linked_order_id, Some(10));
        assert!(child.linked_date.is_some());
        assert_eq!(child.delivery_date, Some(in_days(14)));
    }

    assert!(h
        .events
        .events()
        .iter()
        .any(|e| matches!(e, OrderEvent::OrdersLinked(l) if l.primary_id == 10)));
}

#[tokio::test]
async fn test_existing_primary_brings_its_children() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();

    let outcome = h.service.link_orders(link(&[10, 12], 10)).await.unwrap();
    assert_eq!(outcome.auto_added, 1);
    assert!(outcome.children.contains(&11));
    assert!(outcome.children.contains(&12));

    let group = h.service.linked_group(10).await.unwrap();
    assert_eq!(group.children.len(), 2);
}

#[tokio::test]
async fn test_existing_primary_cannot_join_as_child() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();

    let err = h.service.link_orders(link(&[10, 12], 12)).await.unwrap_err();
    match err {
        OrdersError::BusinessRule { reason } => assert!(reason.contains("#10"), "{reason}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.store.order(12).unwrap().linked_order_id, None);
    assert_eq!(h.store.order(11).unwrap().linked_order_id, Some(10));
}

#[tokio::test]
async fn test_link_requires_delivery_date_and_two_orders() {
    let h = three_orders().await;

    let mut request = link(&[10, 11], 10);
    request.delivery_date = None;
    assert!(matches!(
        h.service.link_orders(request).await.unwrap_err(),
        OrdersError::BusinessRule { .. }
    ));

    assert!(matches!(
        h.service.link_orders(link(&[10], 10)).await.unwrap_err(),
        OrdersError::BusinessRule { .. }
    ));
    assert!(h.store.orders().iter().all(|o| o.linked_order_id.is_none()));
}

#[tokio::test]
async fn test_unknown_order_in_selection_is_not_found() {
    let h = three_orders().await;
    let err = h.service.link_orders(link(&[10, 99], 10)).await.unwrap_err();
    assert!(matches!(err, OrdersError::NotFound { .. }));
}

#[tokio::test]
async fn test_unlink_without_date_changes_nothing() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();
    let before = h.store.order(11).unwrap();

    let err = h.service.unlink_order(11, None).await.unwrap_err();
    assert!(matches!(err, OrdersError::BusinessRule { .. }));
    assert_eq!(h.store.order(11).unwrap(), before);
}

#[tokio::test]
async fn test_unlink_detaches_child_with_new_date() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11, 12], 10)).await.unwrap();

    let order = h.service.unlink_order(11, Some(in_days(21))).await.unwrap();
    assert_eq!(order.linked_order_id, None);
    assert!(order.unlinked_date.is_some());
    assert_eq!(order.delivery_date, Some(in_days(21)));

    let group = h.service.linked_group(10).await.unwrap();
    assert_eq!(group.children.len(), 1);
    assert_eq!(group.children[0].id, 12);

    assert!(h.events.events().iter().any(|e| matches!(
        e,
        OrderEvent::OrderUnlinked(u) if u.order_id == 11 && u.former_primary_id == 10
    )));
}

#[tokio::test]
async fn test_unlink_rejects_past_date() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();

    let err = h.service.unlink_order(11, Some(in_days(-1))).await.unwrap_err();
    assert!(matches!(err, OrdersError::BusinessRule { .. }));
    assert_eq!(h.store.order(11).unwrap().linked_order_id, Some(10));
}

#[tokio::test]
async fn test_group_is_opened_from_primary_only() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();

    let err = h.service.linked_group(11).await.unwrap_err();
    assert!(matches!(err, OrdersError::BusinessRule { .. }));
}

#[tokio::test]
async fn test_lookup_by_customer_lists_candidates() {
    let h = three_orders().await;
    h.service
        .create_customer(customer_input("Alia", "+965 5555 0007"))
        .await
        .unwrap();
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();

    let result = h
        .service
        .lookup_orders(OrderLookup::Customer("ali".to_string()))
        .await
        .unwrap();

    let ids: Vec<OrderId> = result.orders.iter().map(|o| o.id).collect();
    assert!(ids.contains(&10));
    assert!(ids.contains(&12));
    assert!(!ids.contains(&11));
    assert_eq!(result.customers.len(), 2);
    assert_eq!(result.notice.as_deref(), Some("No pending orders for Alia"));
}

#[tokio::test]
async fn test_lookup_of_linked_order_carries_notice() {
    let h = three_orders().await;
    h.service.link_orders(link(&[10, 11], 10)).await.unwrap();

    let result = h.service.lookup_orders(OrderLookup::Id(11)).await.unwrap();
    assert_eq!(result.orders.len(), 1);
    assert!(result.notice.is_some());

    let result = h.service.lookup_orders(OrderLookup::InvoiceNumber(1012)).await.unwrap();
    assert_eq!(result.orders[0].id, 12);
    assert!(result.notice.is_none());
}

#[tokio::test]
async fn test_lookup_of_unknown_customer_is_not_found() {
    let h = three_orders().await;
    let err = h
        .service
        .lookup_orders(OrderLookup::Customer("Zaid".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, OrdersError::NotFound { .. }));
}
