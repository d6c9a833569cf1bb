use chrono::{DateTime, Utc};

use crate::{
    db::traits::{Admission, EventOutcome, ReconcileOutcome},
    db_types::{EventId, LedgerEntry, NewLedgerEntry, Order, OrderKey, StatusUpdate},
    reconciler::OrderDefaults,
};

/// This trait defines the behaviour of backends supporting the reconciliation engine.
///
/// A backend holds two stores:
/// * the idempotency ledger, an append-only set of processed event ids, and
/// * the order store, keyed by order key.
#[allow(async_fn_in_trait)]
pub trait ReconciliationDatabase: Clone {
    type Error: std::error::Error;

    /// The URL of the database
    fn url(&self) -> &str;

    /// A non-transactional check for whether the event has been admitted. This is an optimisation only; admission
    /// itself is decided atomically by [`Self::admit_event`] or [`Self::reconcile_event`].
    async fn is_event_processed(&self, event_id: &EventId) -> Result<bool, Self::Error>;

    /// Records the event in the ledger without touching any order. Concurrent calls for the same event id yield
    /// exactly one [`Admission::Admitted`].
    async fn admit_event(&self, entry: NewLedgerEntry) -> Result<Admission, Self::Error>;

    /// In a single atomic transaction,
    /// * admits the event into the ledger. If it is already there, nothing further is done and
    ///   [`EventOutcome::AlreadyProcessed`] is returned.
    /// * fetches the order for `key`, runs it through the write guard with `update`, and inserts or patches it.
    ///
    /// If any step fails, nothing is committed, including the ledger entry.
    async fn reconcile_event(
        &self,
        entry: NewLedgerEntry,
        key: &OrderKey,
        update: &StatusUpdate,
        defaults: &OrderDefaults,
        now: DateTime<Utc>,
    ) -> Result<EventOutcome, Self::Error>;

    /// Applies `update` to the order through the write guard, without a ledger entry. Used for direct confirmation
    /// calls that have no gateway event id.
    async fn reconcile_order(
        &self,
        key: &OrderKey,
        update: &StatusUpdate,
        defaults: &OrderDefaults,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, Self::Error>;

    async fn fetch_order(&self, key: &OrderKey) -> Result<Option<Order>, Self::Error>;

    async fn fetch_ledger_entry(&self, event_id: &EventId) -> Result<Option<LedgerEntry>, Self::Error>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
