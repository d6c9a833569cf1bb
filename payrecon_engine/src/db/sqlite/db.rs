use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{SqliteConnection, SqlitePool};

use super::{db_url, ledger, new_pool, orders, SqliteDatabaseError};
use crate::{
    db::traits::{Admission, EventOutcome, ReconcileOutcome, ReconciliationDatabase},
    db_types::{EventId, LedgerEntry, NewLedgerEntry, Order, OrderKey, StatusUpdate},
    reconciler::{plan, OrderDefaults, WritePlan},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `PAYRECON_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ReconciliationDatabase for SqliteDatabase {
    type Error = SqliteDatabaseError;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn is_event_processed(&self, event_id: &EventId) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        ledger::is_processed(event_id, &mut conn).await
    }

    async fn admit_event(&self, entry: NewLedgerEntry) -> Result<Admission, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let admission = ledger::insert_if_absent(&entry, Utc::now(), &mut conn).await?;
        if admission == Admission::Admitted {
            debug!("🗃️ Event {} ({}) recorded without an order mutation", entry.event_id, entry.event_type);
        }
        Ok(admission)
    }

    async fn reconcile_event(
        &self,
        entry: NewLedgerEntry,
        key: &OrderKey,
        update: &StatusUpdate,
        defaults: &OrderDefaults,
        now: DateTime<Utc>,
    ) -> Result<EventOutcome, Self::Error> {
        let mut tx = self.pool.begin().await?;
        // The ledger insert comes first so that this transaction takes the write lock straight away.
        let admission = ledger::insert_if_absent(&entry, now, &mut tx).await?;
        if admission == Admission::AlreadyProcessed {
            debug!("🗃️ Event {} has already been processed. Nothing to do.", entry.event_id);
            tx.rollback().await?;
            return Ok(EventOutcome::AlreadyProcessed);
        }
        let outcome = apply_update(key, update, defaults, now, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Event {} committed for order {key}", entry.event_id);
        Ok(EventOutcome::Reconciled(outcome))
    }

    async fn reconcile_order(
        &self,
        key: &OrderKey,
        update: &StatusUpdate,
        defaults: &OrderDefaults,
        now: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, Self::Error> {
        let mut tx = self.pool.begin().await?;
        // There is no ledger insert here to take the write lock, so take it explicitly before reading the order.
        orders::lock_for_write(key, &mut tx).await?;
        let outcome = apply_update(key, update, defaults, now, &mut tx).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn fetch_order(&self, key: &OrderKey) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(key, &mut conn).await
    }

    async fn fetch_ledger_entry(&self, event_id: &EventId) -> Result<Option<LedgerEntry>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        ledger::fetch_entry(event_id, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.pool.close().await;
        Ok(())
    }
}

/// Reads the order, runs the write guard and writes the result. Must be called inside a transaction.
async fn apply_update(
    key: &OrderKey,
    update: &StatusUpdate,
    defaults: &OrderDefaults,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<ReconcileOutcome, SqliteDatabaseError> {
    let existing = orders::fetch_order(key, conn).await?;
    let outcome = match plan(existing.as_ref(), key, update, defaults) {
        WritePlan::Insert(new_order) => {
            orders::insert_order(&new_order, now, conn).await?;
            ReconcileOutcome::Inserted(refetch(key, conn).await?)
        },
        WritePlan::Update(patch) => {
            orders::update_order(key, &patch, now, conn).await?;
            ReconcileOutcome::Updated(refetch(key, conn).await?)
        },
        WritePlan::Skip(reason) => {
            info!("🗃️ Update for order {key} skipped: {reason}");
            let order = existing.ok_or_else(|| SqliteDatabaseError::OrderVanished(key.to_string()))?;
            ReconcileOutcome::Skipped(order)
        },
    };
    Ok(outcome)
}

async fn refetch(key: &OrderKey, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    orders::fetch_order(key, conn).await?.ok_or_else(|| SqliteDatabaseError::OrderVanished(key.to_string()))
}
