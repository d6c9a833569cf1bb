//! The idempotency ledger. Rows are only ever inserted.
use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::Admission},
    db_types::{EventId, LedgerEntry, NewLedgerEntry},
};

/// Records the event id if it is not already present. The uniqueness constraint on `event_id` makes this safe
/// against concurrent deliveries: exactly one caller sees [`Admission::Admitted`].
pub async fn insert_if_absent(
    entry: &NewLedgerEntry,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Admission, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO processed_events (event_id, event_type, order_key, received_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(event_id) DO NOTHING;
        "#,
    )
    .bind(&entry.event_id)
    .bind(&entry.event_type)
    .bind(&entry.order_key)
    .bind(now)
    .execute(conn)
    .await?;
    let admission = if result.rows_affected() == 0 { Admission::AlreadyProcessed } else { Admission::Admitted };
    trace!("🗃️ Ledger admission for event {}: {admission:?}", entry.event_id);
    Ok(admission)
}

pub async fn is_processed(event_id: &EventId, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM processed_events WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

pub async fn fetch_entry(
    event_id: &EventId,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, SqliteDatabaseError> {
    let entry = sqlx::query_as::<_, LedgerEntry>(
        "SELECT event_id, event_type, order_key, received_at FROM processed_events WHERE event_id = $1",
    )
    .bind(event_id)
    .fetch_optional(conn)
    .await?;
    Ok(entry)
}
