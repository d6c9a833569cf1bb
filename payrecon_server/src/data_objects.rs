use payrecon_engine::{
    db_types::{Order, OrderStatus, PaymentStatus},
    EventResult,
};
use serde::{Deserialize, Serialize};

/// The body returned to the gateway for every settled webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookAck {
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self { received: true, order_id: None, status: None, payment_status: None, message: Some(message.into()) }
    }

    pub fn for_order(order: &Order) -> Self {
        Self {
            received: true,
            order_id: Some(order.order_key.as_str().to_string()),
            status: Some(order.status),
            payment_status: Some(order.payment_status),
            message: None,
        }
    }
}

impl From<&EventResult> for WebhookAck {
    fn from(result: &EventResult) -> Self {
        match result {
            EventResult::Duplicate => Self::message("Event already processed"),
            EventResult::Ignored(reason) => Self::message(reason.as_str()),
            EventResult::Reconciled(outcome) => Self::for_order(outcome.order()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmSessionRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmSessionResponse {
    pub success: bool,
    pub order_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl From<&Order> for ConfirmSessionResponse {
    fn from(order: &Order) -> Self {
        Self {
            success: true,
            order_id: order.order_key.as_str().to_string(),
            status: order.status,
            payment_status: order.payment_status,
        }
    }
}
