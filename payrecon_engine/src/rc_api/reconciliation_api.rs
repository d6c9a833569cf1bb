use std::{fmt::Debug, future::Future};

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewLedgerEntry, Order, OrderKey},
    events::{EventKind, PaymentEvent},
    status_mapper::{from_checkout_session, map_event},
    Admission,
    EventOutcome,
    GatewayLookup,
    ReconcileOutcome,
    ReconcilerConfig,
    ReconciliationDatabase,
    ReconciliationError,
};

/// What happened to an incoming event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// The event id was already in the ledger.
    Duplicate,
    /// The event was recorded but changes no order, e.g. an unrecognised type or a payload without an order key.
    Ignored(String),
    Reconciled(ReconcileOutcome),
}

/// `ReconciliationApi` is the entry point for gateway events and direct session confirmations.
///
/// Every event goes through the same pipeline: a cheap duplicate check, order key resolution (which may query the
/// gateway), status mapping, and finally atomic admission plus guarded upsert in the backend.
pub struct ReconciliationApi<B, G> {
    db: B,
    gateway: G,
    config: ReconcilerConfig,
}

impl<B, G> Debug for ReconciliationApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B: Clone, G: Clone> Clone for ReconciliationApi<B, G> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), gateway: self.gateway.clone(), config: self.config.clone() }
    }
}

impl<B, G> ReconciliationApi<B, G> {
    pub fn new(db: B, gateway: G, config: ReconcilerConfig) -> Self {
        Self { db, gateway, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

impl<B, G> ReconciliationApi<B, G>
where
    B: ReconciliationDatabase,
    G: GatewayLookup,
{
    /// Processes a single (already authenticated) gateway event.
    ///
    /// Duplicates and events that do not concern an order succeed without touching the order store. Any error
    /// means nothing was committed and the event should be redelivered.
    pub async fn process_event(&self, event: PaymentEvent) -> Result<EventResult, ReconciliationError> {
        let event_id = event.event_id.clone();
        let event_type = event.event_type().to_string();
        trace!("🔄️ Processing event {event_id} ({event_type})");
        if self.timed("ledger check", self.db.is_event_processed(&event_id)).await? {
            debug!("🔄️ Event {event_id} has already been processed");
            return Ok(EventResult::Duplicate);
        }
        let kind = self.resolve(event.kind).await?;
        let entry = NewLedgerEntry::new(event_id.clone(), event_type.as_str());
        let Some(update) = map_event(&kind, self.config.minor_unit_factor) else {
            info!("🔄️ Event {event_id} has unhandled type {event_type}. Acknowledging without changes.");
            return self.admit_only(entry, format!("Unhandled event type {event_type}")).await;
        };
        let Some(key) = kind.order_key().cloned() else {
            warn!("🔄️ Event {event_id} ({event_type}) carries no order key. Acknowledging without changes.");
            return self.admit_only(entry, "No order key".to_string()).await;
        };
        let entry = entry.with_order_key(key.clone());
        let defaults = self.config.order_defaults();
        let outcome = self
            .timed("reconcile", self.db.reconcile_event(entry, &key, &update, &defaults, Utc::now()))
            .await?;
        match outcome {
            EventOutcome::AlreadyProcessed => {
                debug!("🔄️ Event {event_id} was processed by a concurrent delivery");
                Ok(EventResult::Duplicate)
            },
            EventOutcome::Reconciled(outcome) => {
                log_outcome(&event_type, &outcome);
                Ok(EventResult::Reconciled(outcome))
            },
        }
    }

    /// Confirms a checkout session directly, without a gateway event. The session is fetched from the gateway and,
    /// if paid, applied as an authoritative update.
    pub async fn confirm_session(&self, session_id: &str) -> Result<Order, ReconciliationError> {
        let session = self.gateway.checkout_session(session_id).await?;
        if !session.is_paid() {
            info!("🔄️ Checkout session {session_id} is not paid ({:?})", session.payment_status);
            return Err(ReconciliationError::SessionNotPaid(session_id.to_string()));
        }
        let key = session.order_key.clone().ok_or_else(|| ReconciliationError::MissingOrderKey(session_id.into()))?;
        let update = from_checkout_session(&session, self.config.minor_unit_factor);
        let defaults = self.config.order_defaults();
        let outcome =
            self.timed("reconcile", self.db.reconcile_order(&key, &update, &defaults, Utc::now())).await?;
        log_outcome("session confirmation", &outcome);
        Ok(outcome.into_order())
    }

    pub async fn fetch_order(&self, key: &OrderKey) -> Result<Order, ReconciliationError> {
        self.timed("order fetch", self.db.fetch_order(key))
            .await?
            .ok_or_else(|| ReconciliationError::OrderNotFound(key.clone()))
    }

    /// Fills in the order key for events whose payload does not carry it.
    ///
    /// * A charge only references its payment intent, which is fetched to read the key from its metadata.
    /// * A checkout session without metadata is re-fetched in expanded form.
    async fn resolve(&self, kind: EventKind) -> Result<EventKind, ReconciliationError> {
        let resolved = match kind {
            EventKind::ChargeSucceeded(mut charge) if charge.order_key.is_none() => {
                if let Some(pi) = charge.payment_intent_id.as_deref() {
                    debug!("🔄️ Looking up payment intent {pi} for charge {}", charge.id);
                    charge.order_key = self.gateway.order_key_for_payment_intent(pi).await?;
                }
                EventKind::ChargeSucceeded(charge)
            },
            EventKind::CheckoutCompleted(session) if session.order_key.is_none() => {
                debug!("🔄️ Fetching expanded checkout session {}", session.session_id);
                let expanded = self.gateway.checkout_session(&session.session_id).await?;
                EventKind::CheckoutCompleted(expanded)
            },
            other => other,
        };
        Ok(resolved)
    }

    async fn admit_only(&self, entry: NewLedgerEntry, reason: String) -> Result<EventResult, ReconciliationError> {
        match self.timed("ledger admission", self.db.admit_event(entry)).await? {
            Admission::Admitted => Ok(EventResult::Ignored(reason)),
            Admission::AlreadyProcessed => Ok(EventResult::Duplicate),
        }
    }

    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> Result<T, ReconciliationError>
    where F: Future<Output = Result<T, B::Error>> {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => {
                error!("🔄️ The {operation} operation failed. {e}");
                Err(ReconciliationError::DatabaseError(e.to_string()))
            },
            Err(_) => {
                error!("🔄️ The {operation} operation timed out after {:?}", self.config.store_timeout);
                Err(ReconciliationError::Timeout(operation))
            },
        }
    }
}

fn log_outcome(source: &str, outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Inserted(o) => {
            info!("🔄️ {source}: order {} created as {}/{}", o.order_key, o.status, o.payment_status)
        },
        ReconcileOutcome::Updated(o) => {
            info!("🔄️ {source}: order {} is now {}/{}", o.order_key, o.status, o.payment_status)
        },
        ReconcileOutcome::Skipped(o) => {
            info!("🔄️ {source}: order {} left at {}/{}", o.order_key, o.status, o.payment_status)
        },
    }
}
