use sqlx::PgExecutor;
use uuid::Uuid;

use super::error::RegistrationError;

/// Snapshot of an event's limit and current registered count.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct EventCapacity {
    pub volunteer_limit: Option<i32>,
    pub registered_volunteers: i32,
}

impl EventCapacity {
    pub fn has_room(&self) -> bool {
        has_capacity(self.volunteer_limit, self.registered_volunteers)
    }
}

/// Reads the capacity snapshot for an event. Generic over the executor so the
/// same read runs against the pool (fail-fast pre-check) or inside the
/// mutating transaction.
pub async fn check_capacity<'e, E>(
    executor: E,
    event_id: Uuid,
) -> Result<EventCapacity, RegistrationError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, EventCapacity>(
        "SELECT volunteer_limit, registered_volunteers FROM events WHERE id = $1",
    )
    .bind(event_id)
    .fetch_optional(executor)
    .await?
    .ok_or(RegistrationError::EventNotFound)
}

/// A null limit means unlimited, never zero.
pub fn has_capacity(limit: Option<i32>, current: i32) -> bool {
    match limit {
        None => true,
        Some(limit) => current < limit,
    }
}
