//! Access to the (volunteer, event) membership rows. All functions are
//! generic over the executor so they compose with the coordinator's
//! transaction scope.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::error::RegistrationError;
use crate::models::registration::Registration;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub async fn exists<'e, E>(
    executor: E,
    volunteer_id: Uuid,
    event_id: Uuid,
) -> Result<bool, RegistrationError>
where
    E: PgExecutor<'e>,
{
    let found = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM event_registrations WHERE user_id = $1 AND event_id = $2)",
    )
    .bind(volunteer_id)
    .bind(event_id)
    .fetch_one(executor)
    .await?;

    Ok(found)
}

/// Inserts the membership row. The primary key rejects duplicate pairs even
/// when the pre-check raced another registrant.
pub async fn insert<'e, E>(
    executor: E,
    volunteer_id: Uuid,
    event_id: Uuid,
    date: DateTime<Utc>,
) -> Result<Registration, RegistrationError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Registration>(
        "INSERT INTO event_registrations (user_id, event_id, registration_date)
         VALUES ($1, $2, $3)
         RETURNING user_id, event_id, registration_date",
    )
    .bind(volunteer_id)
    .bind(event_id)
    .bind(date)
    .fetch_one(executor)
    .await
    .map_err(insert_error)
}

fn insert_error(err: sqlx::Error) -> RegistrationError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return RegistrationError::AlreadyRegistered,
            // The volunteer id comes from a verified token, so a foreign-key
            // failure means the event row is gone.
            Some(FOREIGN_KEY_VIOLATION) => return RegistrationError::EventNotFound,
            _ => {}
        }
    }
    RegistrationError::Store(err)
}

/// Removes the membership row, reporting how many rows were affected
/// (0 or 1, never more).
pub async fn delete<'e, E>(
    executor: E,
    volunteer_id: Uuid,
    event_id: Uuid,
) -> Result<u64, RegistrationError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM event_registrations WHERE user_id = $1 AND event_id = $2")
        .bind(volunteer_id)
        .bind(event_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
