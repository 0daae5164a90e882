use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Moderation endpoints, nested under `/api/admin`. Handlers resolve the `AuthUser` and
/// return 403 unless the caller's stored role is 'admin'.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/users/{id}/landing
        .route("/users/{id}/landing", get(handlers::get_user_landing))
        // PUT /api/admin/users/{id}/stage
        // Interview outcomes and probation sign-off are recorded here.
        .route("/users/{id}/stage", put(handlers::set_user_stage))
        // PUT /api/admin/users/{id}/state
        // Client verification approval and suspension.
        .route("/users/{id}/state", put(handlers::set_user_state))
}
