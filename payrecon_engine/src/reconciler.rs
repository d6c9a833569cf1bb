//! The order write guard.
//!
//! [`plan`] decides what a status update may do to the stored order:
//! 1. No stored order: insert one, seeded from the update and the configured defaults.
//! 2. Stored order is terminal and the update is not: skip.
//! 3. Both terminal: authoritative updates and same-status refreshes apply; anything else is skipped.
//! 4. Stored order is not terminal: skip if the update would move it backwards, otherwise apply.
//!
//! Planning is pure. The database backend runs it between reading and writing the order, inside the same
//! transaction that admits the event.
use std::fmt::Display;

use log::*;
use rust_decimal::Decimal;

use crate::db_types::{NewOrder, Order, OrderKey, OrderPatch, StatusUpdate};

/// Values used only when the reconciler has to create an order that the checkout flow never recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDefaults {
    pub price: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WritePlan {
    Insert(NewOrder),
    Update(OrderPatch),
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The order is already paid, failed or canceled and the update is not.
    TerminalState,
    /// A non-authoritative update tried to replace one terminal status with another.
    ConflictingTerminalState,
    /// The update would move the order back to an earlier lifecycle stage.
    StaleUpdate,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TerminalState => write!(f, "order is in a terminal state"),
            Self::ConflictingTerminalState => write!(f, "update conflicts with the recorded terminal state"),
            Self::StaleUpdate => write!(f, "update is older than the recorded state"),
        }
    }
}

pub fn plan(existing: Option<&Order>, key: &OrderKey, update: &StatusUpdate, defaults: &OrderDefaults) -> WritePlan {
    let Some(order) = existing else {
        return WritePlan::Insert(new_order(key, update, defaults));
    };
    let current = order.status;
    let incoming = update.order_status;
    if current.is_terminal() {
        if !incoming.is_terminal() {
            trace!("🔄️ Order {key} is {current}. Ignoring {incoming} update");
            return WritePlan::Skip(SkipReason::TerminalState);
        }
        if incoming != current && !update.authoritative {
            debug!("🔄️ Order {key} is {current}. A non-authoritative {incoming} update cannot replace it");
            return WritePlan::Skip(SkipReason::ConflictingTerminalState);
        }
    } else if incoming.rank() < current.rank() {
        trace!("🔄️ Order {key} is {current}. Ignoring stale {incoming} update");
        return WritePlan::Skip(SkipReason::StaleUpdate);
    }
    WritePlan::Update(patch_for(update))
}

fn new_order(key: &OrderKey, update: &StatusUpdate, defaults: &OrderDefaults) -> NewOrder {
    NewOrder {
        order_key: key.clone(),
        status: update.order_status,
        payment_status: update.payment_status,
        payment_reference: update.payment_reference.clone(),
        amount: update.amount.unwrap_or(defaults.price),
        currency: update.currency.clone().unwrap_or_else(|| defaults.currency.clone()),
        customer: update.customer.clone(),
    }
}

fn patch_for(update: &StatusUpdate) -> OrderPatch {
    OrderPatch {
        status: Some(update.order_status),
        payment_status: Some(update.payment_status),
        payment_reference: update.payment_reference.clone(),
        amount: update.amount,
        currency: update.currency.clone(),
        customer_email: update.customer.email.clone(),
        customer_name: update.customer.name.clone(),
        customer_phone: update.customer.phone.clone(),
    }
}
