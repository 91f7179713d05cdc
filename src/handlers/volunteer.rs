//! Event browsing and registration for volunteers. Register and unregister
//! delegate to the coordinator, which owns the transaction.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::event::Event;
use crate::models::registration::RegisterForEventRequest;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE event_date >= now() ORDER BY event_date ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(success(events, "Upcoming events fetched successfully").into_response())
}

pub async fn register_for_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RegisterForEventRequest>,
) -> Result<Response, AppError> {
    let date = payload.registration_date.unwrap_or_else(Utc::now);

    let registration = state
        .registrations()
        .register(user.id, payload.event_id, date)
        .await?;

    Ok(created(registration, "Registered for event successfully").into_response())
}

pub async fn unregister_from_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.registrations().unregister(user.id, event_id).await?;

    Ok(empty_success("Registration removed successfully").into_response())
}

pub async fn user_registrations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let event_ids =
        sqlx::query_scalar::<_, Uuid>("SELECT event_id FROM event_registrations WHERE user_id = $1")
            .bind(user.id)
            .fetch_all(&state.pool)
            .await?;

    Ok(success(event_ids, "Registrations fetched successfully").into_response())
}

pub async fn user_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let events = sqlx::query_as::<_, Event>(
        "SELECT e.*
         FROM events e
         INNER JOIN event_registrations er ON e.id = er.event_id
         WHERE er.user_id = $1 AND e.event_date <= now()
         ORDER BY e.event_date DESC",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(success(events, "Past events fetched successfully").into_response())
}
