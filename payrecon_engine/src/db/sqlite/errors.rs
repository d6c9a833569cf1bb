use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Order {0} has an invalid stored value: {1}")]
    CorruptOrder(String, String),
    #[error("Order {0} disappeared during reconciliation")]
    OrderVanished(String),
}
