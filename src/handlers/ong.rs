//! Event CRUD for organizations. Ownership is enforced by scoping every
//! statement to the caller's id; there is no separate permission table.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::event::{CreateEventRequest, Event, UpdateEventRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    validate_event_fields(
        &payload.title,
        &payload.description,
        &payload.location,
        payload.volunteer_limit,
    )?;

    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO events
             (organizer_id, title, description, event_date, location, volunteer_limit, image_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(user.id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.event_date)
    .bind(&payload.location)
    .bind(payload.volunteer_limit)
    .bind(&payload.image_url)
    .fetch_one(&state.pool)
    .await?;

    Ok(created(event, "Event created successfully").into_response())
}

pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let events = sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE organizer_id = $1 ORDER BY event_date DESC",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(success(events, "Events fetched successfully").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = fetch_owned_event(&state, event_id, user.id).await?;

    Ok(success(event, "Event fetched successfully").into_response())
}

pub async fn edit_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    validate_event_fields(
        &payload.title,
        &payload.description,
        &payload.location,
        payload.volunteer_limit,
    )?;

    let current = fetch_owned_event(&state, event_id, user.id).await?;

    if let Some(limit) = payload.volunteer_limit {
        if limit < current.registered_volunteers {
            return Err(AppError::ValidationError(format!(
                "Volunteer limit cannot be below the {} volunteers already registered",
                current.registered_volunteers
            )));
        }
    }

    // No new image keeps the existing one
    let image_url = payload.image_url.or(current.image_url);

    let event = sqlx::query_as::<_, Event>(
        "UPDATE events
         SET title = $1, description = $2, event_date = $3, location = $4,
             volunteer_limit = $5, image_url = $6, updated_at = now()
         WHERE id = $7 AND organizer_id = $8
         RETURNING *",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.event_date)
    .bind(&payload.location)
    .bind(payload.volunteer_limit)
    .bind(&image_url)
    .bind(event_id)
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(not_owned)?;

    Ok(success(event, "Event updated successfully").into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1 AND organizer_id = $2")
        .bind(event_id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_owned());
    }

    Ok(empty_success("Event deleted successfully").into_response())
}

async fn fetch_owned_event(
    state: &AppState,
    event_id: Uuid,
    organizer_id: Uuid,
) -> Result<Event, AppError> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND organizer_id = $2")
        .bind(event_id)
        .bind(organizer_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(not_owned)
}

fn not_owned() -> AppError {
    AppError::NotFound("Event not found or you do not have permission to access it".to_string())
}

fn validate_event_fields(
    title: &str,
    description: &str,
    location: &str,
    volunteer_limit: Option<i32>,
) -> Result<(), AppError> {
    if title.trim().is_empty() || description.trim().is_empty() || location.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Title, description and location are required".to_string(),
        ));
    }

    if matches!(volunteer_limit, Some(limit) if limit < 0) {
        return Err(AppError::ValidationError(
            "Volunteer limit cannot be negative".to_string(),
        ));
    }

    Ok(())
}
