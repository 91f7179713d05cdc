//! Account registration, login, and profile management.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::{self, AuthUser};
use crate::models::user::{
    AuthResponse, LoginRequest, Profile, RegisterAccountRequest, UpdateProfileRequest, User,
    UserSummary,
};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

const UNIQUE_VIOLATION: &str = "23505";

pub async fn register_account(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAccountRequest>,
) -> Result<Response, AppError> {
    if payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.full_name.trim().is_empty()
    {
        return Err(AppError::ValidationError(
            "Username, email, password and full name are required".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users
             (username, email, password_hash, full_name, phone_number, role, organization_description)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.full_name)
    .bind(&payload.phone_number)
    .bind(payload.role)
    .bind(&payload.organization_description)
    .fetch_one(&state.pool)
    .await
    .map_err(map_unique_violation)?;

    let token = auth::mint_token(&state.jwt, user.id, user.role)?;

    Ok(created(
        AuthResponse {
            token,
            user: UserSummary::from(&user),
        },
        "Account created successfully",
    )
    .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let token = auth::mint_token(&state.jwt, user.id, user.role)?;

    Ok(success(
        AuthResponse {
            token,
            user: UserSummary::from(&user),
        },
        "Login successful",
    )
    .into_response())
}

pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT username, email, phone_number, organization_description, role
         FROM users WHERE id = $1",
    )
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(success(profile, "Profile fetched successfully").into_response())
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Response, AppError> {
    if payload.username.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Username and email are required".to_string(),
        ));
    }

    let email_taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id != $2)",
    )
    .bind(&payload.email)
    .bind(user.id)
    .fetch_one(&state.pool)
    .await?;

    if email_taken {
        return Err(AppError::ValidationError(
            "Email is already in use".to_string(),
        ));
    }

    sqlx::query(
        "UPDATE users
         SET username = $1, email = $2, phone_number = $3,
             organization_description = $4, updated_at = now()
         WHERE id = $5",
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&payload.phone_number)
    .bind(&payload.organization_description)
    .bind(user.id)
    .execute(&state.pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(empty_success("Profile updated successfully").into_response())
}

fn invalid_credentials() -> AppError {
    // Same message for unknown email and bad password
    AppError::AuthError("Incorrect email or password".to_string())
}

fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let message = match db.constraint() {
                Some("users_username_key") => "Username is already taken",
                Some("users_email_key") => "Email is already in use",
                _ => "Account already exists",
            };
            return AppError::ValidationError(message.to_string());
        }
    }
    AppError::DatabaseError(err)
}
