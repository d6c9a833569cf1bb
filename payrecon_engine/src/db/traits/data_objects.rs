use crate::db_types::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The event id was not in the ledger and has now been recorded.
    Admitted,
    AlreadyProcessed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Inserted(Order),
    Updated(Order),
    /// The write guard refused the update. The stored order is returned unchanged.
    Skipped(Order),
}

impl ReconcileOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Inserted(o) | Self::Updated(o) | Self::Skipped(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            Self::Inserted(o) | Self::Updated(o) | Self::Skipped(o) => o,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Another delivery of this event has already been processed. Nothing was changed.
    AlreadyProcessed,
    Reconciled(ReconcileOutcome),
}
