use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Join record linking one volunteer to one event. The (user_id, event_id)
/// pair is the identity; rows are inserted and deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub registration_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForEventRequest {
    pub event_id: Uuid,
    /// Defaults to the server clock when omitted.
    pub registration_date: Option<DateTime<Utc>>,
}
