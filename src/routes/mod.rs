use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{general, health_check, ong, volunteer};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/general", general_routes())
        .nest("/api/ong", ong_routes())
        .nest("/api/volunteer", volunteer_routes())
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}

fn general_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(general::register_account))
        .route("/login", post(general::login))
        .route("/profile", get(general::profile))
        .route("/update-profile", put(general::update_profile))
}

fn ong_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(ong::create_event))
        .route("/list", get(ong::list_events))
        .route("/event/:event_id", get(ong::get_event))
        .route("/edit/:event_id", put(ong::edit_event))
        .route("/delete/:event_id", delete(ong::delete_event))
}

fn volunteer_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(volunteer::list_events))
        .route("/register", post(volunteer::register_for_event))
        .route("/unregister/:event_id", delete(volunteer::unregister_from_event))
        .route("/user-registrations", get(volunteer::user_registrations))
        .route("/user-events", get(volunteer::user_events))
}
