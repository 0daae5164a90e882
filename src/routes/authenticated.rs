use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Endpoints for a signed-in user acting on their own profile. Every handler takes an
/// `AuthUser`, and the router is additionally wrapped in `auth_middleware` so a missing
/// session is rejected before any handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // Current profile plus resolved landing route.
        .route("/api/me", get(handlers::get_me))
        // GET /api/me/landing
        // Sign-in callback target: 307 to wherever the user belongs.
        .route("/api/me/landing", get(handlers::landing))
        // PUT /api/me/stage
        // Consultant-only onboarding progress.
        .route("/api/me/stage", put(handlers::update_my_stage))
        // PUT /api/me/state
        // Client-only account state.
        .route("/api/me/state", put(handlers::update_my_state))
}
