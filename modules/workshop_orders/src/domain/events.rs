//! Domain events for workshop orders
//!
//! Events are published after the corresponding write succeeded. Publishing
//! failures are logged and never fail the operation.

use crate::contract::{Order, OrderId, ProductionStage};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// Checkout reached a terminal status
    CheckoutCompleted(CheckoutCompletedEvent),
    /// Orders were grouped under a primary
    OrdersLinked(OrdersLinkedEvent),
    /// An order left its group
    OrderUnlinked(OrderUnlinkedEvent),
    /// Workshop progress moved forward
    ProductionAdvanced(ProductionAdvancedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutCompletedEvent {
    pub order_id: OrderId,
    pub invoice_number: Option<i32>,
    /// `confirmed` or `cancelled`
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersLinkedEvent {
    pub primary_id: OrderId,
    pub children: Vec<OrderId>,
    pub delivery_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUnlinkedEvent {
    pub order_id: OrderId,
    pub former_primary_id: OrderId,
    pub delivery_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionAdvancedEvent {
    pub order_id: OrderId,
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Utc>,
}

/// Event publisher trait for publishing domain events
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an order event
    async fn publish(&self, event: OrderEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: OrderEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes every event to the log as JSON under the `workshop_orders::events` target
pub struct TracingEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: OrderEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(target: "workshop_orders::events", event = %payload, "order event");
        Ok(())
    }
}

impl OrderEvent {
    pub fn checkout_completed(order: &Order) -> Self {
        OrderEvent::CheckoutCompleted(CheckoutCompletedEvent {
            order_id: order.id,
            invoice_number: order.invoice_number,
            status: order.checkout_status.as_str().to_string(),
            timestamp: Utc::now(),
        })
    }

    pub fn orders_linked(primary_id: OrderId, children: Vec<OrderId>, delivery_date: NaiveDate) -> Self {
        OrderEvent::OrdersLinked(OrdersLinkedEvent {
            primary_id,
            children,
            delivery_date,
            timestamp: Utc::now(),
        })
    }

    pub fn order_unlinked(order_id: OrderId, former_primary_id: OrderId, delivery_date: NaiveDate) -> Self {
        OrderEvent::OrderUnlinked(OrderUnlinkedEvent {
            order_id,
            former_primary_id,
            delivery_date,
            timestamp: Utc::now(),
        })
    }

    pub fn production_advanced(order_id: OrderId, from: ProductionStage, to: ProductionStage) -> Self {
        OrderEvent::ProductionAdvanced(ProductionAdvancedEvent {
            order_id,
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = OrderEvent::production_advanced(
            12,
            ProductionStage::OrderAtShop,
            ProductionStage::SentToWorkshop,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "production_advanced");
        assert_eq!(json["from"], "order_at_shop");
        assert_eq!(json["to"], "sent_to_workshop");
    }

    #[tokio::test]
    async fn test_noop_event_publisher() {
        let publisher = NoOpEventPublisher;
        let event = OrderEvent::orders_linked(1, vec![2, 3], NaiveDate::from_ymd_opt(2030, 1, 1).unwrap_or_default());
        assert!(publisher.publish(event).await.is_ok());
    }
}
