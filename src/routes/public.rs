use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated endpoints: liveness and the pure routing queries. These expose the
/// decision engine itself and never read user data.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/routes/resolve?role=...&stage=...
        .route("/api/routes/resolve", get(handlers::resolve_route))
        // GET /api/routes/access?path=...
        .route("/api/routes/access", get(handlers::access_policy))
}
