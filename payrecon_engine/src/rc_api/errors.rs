use thiserror::Error;

use crate::{db_types::OrderKey, GatewayLookupError};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The {0} operation timed out")]
    Timeout(&'static str),
    #[error("{0}")]
    GatewayError(#[from] GatewayLookupError),
    #[error("Checkout session {0} does not carry an order key")]
    MissingOrderKey(String),
    #[error("Checkout session {0} has not been paid")]
    SessionNotPaid(String),
    #[error("Order {0} was not found")]
    OrderNotFound(OrderKey),
}

impl ReconciliationError {
    /// True if the failure is transient and the caller (or the gateway) should try again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DatabaseError(_) | Self::Timeout(_) => true,
            Self::GatewayError(e) => e.transient,
            Self::MissingOrderKey(_) | Self::SessionNotPaid(_) | Self::OrderNotFound(_) => false,
        }
    }
}
