//! Order link groups: planning link and unlink operations
//!
//! A group is one primary order plus children whose `linked_order_id` points at it.
//! Groups are one level deep: a child never has children of its own.

use crate::contract::{
    CheckoutStatus, LinkRequest, Order, OrderId, OrderType, OrdersError, ProductionStage,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Business-rule violations of linking and unlinking
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("select at least two orders to link")]
    TooFewOrders,

    #[error("a revised delivery date is required to link orders")]
    MissingDeliveryDate,

    #[error("primary order #{0} is not part of the selection")]
    PrimaryNotSelected(OrderId),

    #[error("order #{id} is {status}; only confirmed orders can be linked")]
    NotConfirmed { id: OrderId, status: CheckoutStatus },

    #[error("order #{0} is not a work order")]
    NotWorkOrder(OrderId),

    #[error("order #{id} is already linked to order #{parent}; unlink it first")]
    AlreadyLinked { id: OrderId, parent: OrderId },

    #[error("order #{0} is the primary of an existing group; it can only join a new group as its primary")]
    PrimaryOfOtherGroup(OrderId),

    #[error("order #{0} is not linked to any order")]
    NotLinked(OrderId),

    #[error("a new delivery date is required to unlink order #{0}")]
    UnlinkNeedsDeliveryDate(OrderId),

    #[error("delivery date {0} is in the past")]
    DeliveryDateInPast(NaiveDate),
}

impl From<LinkError> for OrdersError {
    fn from(e: LinkError) -> Self {
        OrdersError::rule(e.to_string())
    }
}

/// Orders to write for a validated link request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    pub primary_id: OrderId,
    pub children: Vec<OrderId>,
    pub auto_added: usize,
    pub delivery_date: NaiveDate,
    /// Primary first, then children in selection order
    pub updates: Vec<Order>,
}

/// Orders that can be offered in link candidate lists
pub fn is_link_candidate(order: &Order) -> bool {
    order.checkout_status == CheckoutStatus::Confirmed
        && order.order_type == OrderType::Work
        && !order.is_linked()
        && order.production_stage != ProductionStage::Delivered
}

/// Remove duplicate ids, keeping the first occurrence
fn dedup(ids: &[OrderId]) -> Vec<OrderId> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

/// Validate a link request and compute the resulting order states.
///
/// `selected` holds the orders named in the request; `children` maps each selected
/// order to its current children, which are pulled into the group.
pub fn plan_link(
    request: &LinkRequest,
    selected: &[Order],
    children: &HashMap<OrderId, Vec<Order>>,
    now: DateTime<Utc>,
) -> Result<LinkPlan, LinkError> {
    let by_id: HashMap<OrderId, &Order> = selected.iter().map(|o| (o.id, o)).collect();

    let mut members: Vec<&Order> = dedup(&request.order_ids)
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .collect();

    let mut auto_added = 0;
    for id in dedup(&request.order_ids) {
        for child in children.get(&id).into_iter().flatten() {
            if !members.iter().any(|m| m.id == child.id) {
                members.push(child);
                auto_added += 1;
            }
        }
    }

    let delivery_date = request.delivery_date.ok_or(LinkError::MissingDeliveryDate)?;

    if members.len() < 2 {
        return Err(LinkError::TooFewOrders);
    }
    if !members.iter().any(|m| m.id == request.primary_id) {
        return Err(LinkError::PrimaryNotSelected(request.primary_id));
    }

    for member in &members {
        if member.checkout_status != CheckoutStatus::Confirmed {
            return Err(LinkError::NotConfirmed {
                id: member.id,
                status: member.checkout_status,
            });
        }
        if member.order_type != OrderType::Work {
            return Err(LinkError::NotWorkOrder(member.id));
        }

        let has_children = children.get(&member.id).is_some_and(|c| !c.is_empty());
        if member.id == request.primary_id {
            if let Some(parent) = member.linked_order_id {
                return Err(LinkError::AlreadyLinked {
                    id: member.id,
                    parent,
                });
            }
            continue;
        }
        if has_children {
            return Err(LinkError::PrimaryOfOtherGroup(member.id));
        }
        if let Some(parent) = member.linked_order_id {
            if parent != request.primary_id {
                return Err(LinkError::AlreadyLinked {
                    id: member.id,
                    parent,
                });
            }
        }
    }

    let mut updates = Vec::with_capacity(members.len());
    let mut child_ids = Vec::with_capacity(members.len() - 1);

    if let Some(primary) = members.iter().find(|m| m.id == request.primary_id) {
        let mut primary = (*primary).clone();
        primary.linked_order_id = None;
        primary.delivery_date = Some(delivery_date);
        primary.updated_at = now;
        updates.push(primary);
    }
    for member in members.iter().filter(|m| m.id != request.primary_id) {
        let mut child = (*member).clone();
        child.linked_order_id = Some(request.primary_id);
        child.linked_date = Some(now);
        child.delivery_date = Some(delivery_date);
        child.updated_at = now;
        child_ids.push(child.id);
        updates.push(child);
    }

    Ok(LinkPlan {
        primary_id: request.primary_id,
        children: child_ids,
        auto_added,
        delivery_date,
        updates,
    })
}

/// Validate an unlink and compute the resulting order state
pub fn plan_unlink(
    order: &Order,
    new_delivery_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<Order, LinkError> {
    let delivery_date =
        new_delivery_date.ok_or(LinkError::UnlinkNeedsDeliveryDate(order.id))?;
    if delivery_date < now.date_naive() {
        return Err(LinkError::DeliveryDateInPast(delivery_date));
    }
    if order.linked_order_id.is_none() {
        return Err(LinkError::NotLinked(order.id));
    }

    let mut updated = order.clone();
    updated.linked_order_id = None;
    updated.unlinked_date = Some(now);
    updated.delivery_date = Some(delivery_date);
    updated.updated_at = now;
    Ok(updated)
}
