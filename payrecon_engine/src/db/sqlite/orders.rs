use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::{debug, trace};
use rust_decimal::Decimal;
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{CustomerDetails, NewOrder, Order, OrderKey, OrderPatch, OrderStatus, PaymentStatus},
};

const ORDER_COLUMNS: &str = "id, order_key, status, payment_status, payment_reference, amount, currency, \
                             customer_email, customer_name, customer_phone, created_at, updated_at";

// Amounts are stored as decimal strings so that no precision is lost.
#[derive(FromRow)]
struct OrderRow {
    id: i64,
    order_key: OrderKey,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_reference: Option<String>,
    amount: Option<String>,
    currency: Option<String>,
    customer_email: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = SqliteDatabaseError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let amount = row
            .amount
            .as_deref()
            .map(Decimal::from_str)
            .transpose()
            .map_err(|e| SqliteDatabaseError::CorruptOrder(row.order_key.to_string(), e.to_string()))?;
        Ok(Order {
            id: row.id,
            order_key: row.order_key,
            status: row.status,
            payment_status: row.payment_status,
            payment_reference: row.payment_reference,
            amount,
            currency: row.currency,
            customer: CustomerDetails { email: row.customer_email, name: row.customer_name, phone: row.customer_phone },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn fetch_order(key: &OrderKey, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_key = $1");
    let row = sqlx::query_as::<_, OrderRow>(&sql).bind(key).fetch_optional(conn).await?;
    row.map(Order::try_from).transpose()
}

/// Takes the database write lock for the enclosing transaction by touching the order's row, whether or not it exists.
///
/// SQLite transactions begin deferred. A transaction that reads before it writes must later upgrade its read lock,
/// and that upgrade fails immediately with `SQLITE_BUSY` if another writer got in first; the busy timeout does not
/// apply. Writing first means the lock is taken up front, where the busy timeout does apply.
pub async fn lock_for_write(key: &OrderKey, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE orders SET order_key = order_key WHERE order_key = $1").bind(key).execute(conn).await?;
    trace!("🗃️ Write lock taken for order {key}");
    Ok(())
}

/// Inserts a new order using the given connection. This is not atomic. Embed the call in a transaction if you need
/// atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    order: &NewOrder,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                order_key,
                status,
                payment_status,
                payment_reference,
                amount,
                currency,
                customer_email,
                customer_name,
                customer_phone,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id;
        "#,
    )
    .bind(&order.order_key)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(&order.payment_reference)
    .bind(order.amount.to_string())
    .bind(&order.currency)
    .bind(&order.customer.email)
    .bind(&order.customer.name)
    .bind(&order.customer.phone)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order {} inserted with id {id}", order.order_key);
    Ok(id)
}

/// Applies the non-empty fields of `patch` to the order and sets `updated_at` to `now`. Other columns are left as
/// they are. Returns the number of rows changed.
pub async fn update_order(
    key: &OrderKey,
    patch: &OrderPatch,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    if patch.is_empty() {
        debug!("🗃️ No fields to update for order {key}. Update request skipped.");
        return Ok(0);
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = ");
    builder.push_bind(now);
    if let Some(status) = patch.status {
        builder.push(", status = ");
        builder.push_bind(status);
    }
    if let Some(payment_status) = patch.payment_status {
        builder.push(", payment_status = ");
        builder.push_bind(payment_status);
    }
    if let Some(reference) = &patch.payment_reference {
        builder.push(", payment_reference = ");
        builder.push_bind(reference.clone());
    }
    if let Some(amount) = patch.amount {
        builder.push(", amount = ");
        builder.push_bind(amount.to_string());
    }
    if let Some(currency) = &patch.currency {
        builder.push(", currency = ");
        builder.push_bind(currency.clone());
    }
    if let Some(email) = &patch.customer_email {
        builder.push(", customer_email = ");
        builder.push_bind(email.clone());
    }
    if let Some(name) = &patch.customer_name {
        builder.push(", customer_name = ");
        builder.push_bind(name.clone());
    }
    if let Some(phone) = &patch.customer_phone {
        builder.push(", customer_phone = ");
        builder.push_bind(phone.clone());
    }
    builder.push(" WHERE order_key = ");
    builder.push_bind(key.as_str().to_string());
    trace!("🗃️ Executing query: {}", builder.sql());
    let res = builder.build().execute(conn).await?;
    trace!("🗃️ Result of update_order: {res:?}");
    Ok(res.rows_affected())
}
