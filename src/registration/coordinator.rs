use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::capacity;
use super::error::RegistrationError;
use super::ledger;
use crate::models::registration::Registration;

/// Orchestrates registration and unregistration: duplicate and capacity
/// pre-checks, then the ledger mutation and counter adjustment as one
/// transaction. Owns a pool handle; construct one wherever a pool is
/// available.
#[derive(Clone)]
pub struct RegistrationCoordinator {
    pool: PgPool,
}

impl RegistrationCoordinator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a volunteer for an event.
    ///
    /// The two pre-checks fail fast without opening a transaction. They are
    /// not authoritative: two registrants can both pass them for the last
    /// slot. The conditional increment inside the transaction is what keeps
    /// `registered_volunteers` inside the limit under concurrency; zero
    /// affected rows there aborts the whole attempt.
    pub async fn register(
        &self,
        volunteer_id: Uuid,
        event_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<Registration, RegistrationError> {
        if ledger::exists(&self.pool, volunteer_id, event_id).await? {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let snapshot = capacity::check_capacity(&self.pool, event_id).await?;
        if !snapshot.has_room() {
            return Err(RegistrationError::CapacityExceeded);
        }

        let mut tx = self.pool.begin().await?;

        let registration = ledger::insert(&mut *tx, volunteer_id, event_id, date).await?;

        let updated = sqlx::query(
            "UPDATE events
             SET registered_volunteers = registered_volunteers + 1, updated_at = now()
             WHERE id = $1
               AND (volunteer_limit IS NULL OR registered_volunteers < volunteer_limit)",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Either the last slot went to a concurrent registrant or the
            // event row vanished. Dropping `tx` rolls back the insert.
            let event_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if event_exists {
                RegistrationError::CapacityExceeded
            } else {
                RegistrationError::EventNotFound
            });
        }

        tx.commit()
            .await
            .map_err(RegistrationError::TransactionAborted)?;

        Ok(registration)
    }

    /// Removes a volunteer's registration and decrements the event counter,
    /// both durable together or neither.
    pub async fn unregister(
        &self,
        volunteer_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), RegistrationError> {
        let mut tx = self.pool.begin().await?;

        let removed = ledger::delete(&mut *tx, volunteer_id, event_id).await?;
        if removed == 0 {
            return Err(RegistrationError::RegistrationNotFound);
        }

        // Exactly one row was removed above; the guard keeps the counter
        // from ever going negative.
        sqlx::query(
            "UPDATE events
             SET registered_volunteers = registered_volunteers - 1, updated_at = now()
             WHERE id = $1 AND registered_volunteers > 0",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(RegistrationError::TransactionAborted)?;

        Ok(())
    }
}
