use thiserror::Error;

/// Outcomes of a registration attempt that the caller is expected to branch
/// on. The first four are business-rule violations, never retried here; the
/// store variants are infrastructure failures the caller may retry.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("volunteer is already registered for this event")]
    AlreadyRegistered,

    #[error("event has reached its volunteer limit")]
    CapacityExceeded,

    #[error("event does not exist")]
    EventNotFound,

    #[error("no registration exists for this volunteer and event")]
    RegistrationNotFound,

    #[error("store unavailable")]
    Store(#[from] sqlx::Error),

    #[error("transaction failed to commit")]
    TransactionAborted(#[source] sqlx::Error),
}
