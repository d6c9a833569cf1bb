use std::collections::HashMap;

use payrecon_common::MinorUnits;
use serde::{Deserialize, Serialize};

/// The metadata key under which the checkout flow stores the order correlation key.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

/// Stripe returns related objects either as a bare id, or as the full object when it was requested with `expand[]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T: HasId> Expandable<T> {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id.as_str(),
            Self::Object(o) => o.object_id(),
        }
    }

    pub fn as_object(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

pub trait HasId {
    fn object_id(&self) -> &str;
}

fn order_id_from(metadata: &HashMap<String, String>) -> Option<&str> {
    metadata.get(ORDER_ID_METADATA_KEY).map(|s| s.trim()).filter(|s| !s.is_empty())
}

//--------------------------------------     PaymentIntent     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    /// One of `requires_payment_method`, `requires_confirmation`, `requires_action`, `processing`,
    /// `requires_capture`, `canceled` or `succeeded`.
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub receipt_email: Option<String>,
}

impl PaymentIntent {
    pub fn order_id(&self) -> Option<&str> {
        order_id_from(&self.metadata)
    }
}

impl HasId for PaymentIntent {
    fn object_id(&self) -> &str {
        &self.id
    }
}

//--------------------------------------        Charge         ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub payment_intent: Option<Expandable<PaymentIntent>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub billing_details: Option<BillingDetails>,
}

impl Charge {
    /// The order id, if Stripe copied it onto the charge. Usually it lives on the parent payment intent only.
    pub fn order_id(&self) -> Option<&str> {
        order_id_from(&self.metadata)
            .or_else(|| self.payment_intent.as_ref().and_then(|pi| pi.as_object()).and_then(|pi| pi.order_id()))
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        self.payment_intent.as_ref().map(|pi| pi.id())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

//--------------------------------------    CheckoutSession    ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// One of `paid`, `unpaid` or `no_payment_required`.
    pub payment_status: Option<String>,
    pub amount_total: Option<MinorUnits>,
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub payment_intent: Option<Expandable<PaymentIntent>>,
}

impl CheckoutSession {
    pub fn order_id(&self) -> Option<&str> {
        order_id_from(&self.metadata)
    }

    pub fn payment_intent_id(&self) -> Option<&str> {
        self.payment_intent.as_ref().map(|pi| pi.id())
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }

    /// The best available customer email: the one typed into checkout, or the one the session was created with.
    pub fn email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .or(self.customer_email.as_deref())
            .filter(|s| !s.is_empty())
    }
}

impl HasId for CheckoutSession {
    fn object_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}
