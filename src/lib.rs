use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routing;

// API routers split by access tier (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::{JwtSessionDecoder, SessionState};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use routing::RouteTable;

/// ApiDoc
///
/// OpenAPI document for the JSON API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::resolve_route, handlers::access_policy, handlers::get_me, handlers::landing,
        handlers::update_my_stage, handlers::update_my_state, handlers::get_user_landing,
        handlers::set_user_stage, handlers::set_user_state
    ),
    components(
        schemas(
            models::RouteTarget, models::RouteResolution, models::AccessPolicy,
            models::UserProfile, models::UpdateStageRequest, models::UpdateStateRequest,
        )
    ),
    tags(
        (name = "marketplace-portal", description = "Marketplace routing and access API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned cheaply into every
/// request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator for roles and onboarding markers.
    pub repo: RepositoryState,
    /// Session collaborator used by both the gate and the `AuthUser` extractor.
    pub sessions: SessionState,
    /// Stage/state route tables, built once at startup.
    pub routes: Arc<RouteTable>,
    pub config: AppConfig,
}

impl AppState {
    /// Assembles the state with the standard route tables and a JWT session decoder
    /// keyed by `config.jwt_secret`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            sessions: Arc::new(JwtSessionDecoder::new(&config.jwt_secret)),
            routes: Arc::new(RouteTable::standard()),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects requests without a resolvable `AuthUser` (401) before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Pages are rendered by the frontend; anything the gate lets through that is not an API
/// route ends here.
async fn page_fallback() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// create_router
///
/// Assembles the routing structure, installs the route gate and the scoped auth layer, and
/// registers the application state.
///
/// The gate wraps every path, including the fallback, so page requests that this service
/// does not render are still checked. The JSON API lives under `/api`, which the gate
/// treats as public; its own access control is the `AuthUser` extractor.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: health check and route-resolution queries.
        .merge(public::public_routes())
        // Authenticated Routes: rejected with 401 by `auth_middleware` before the handler.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin Routes: the admin role is checked inside each handler.
        .nest("/api/admin", admin::admin_routes())
        // Page paths end here once the gate lets them through.
        .fallback(page_fallback)
        // 3. Route Gate: added after the fallback so unrouted page paths are gated too.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::route_gate,
        ))
        .with_state(state);

    // 4. Observability and Correlation Layers (outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: a UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: one span per request, tagged with the request ID,
                // so gate redirects and handler logs correlate.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: echoes x-request-id back on the response.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer (applied last)
        .layer(cors)
}

/// trace_span_logger
///
/// Used by `TraceLayer` to build the per-request span. It reads the `x-request-id` header
/// set by `SetRequestIdLayer` and records it next to the method and URI, so every log line
/// of one request (gate decision, extractor rejection, repository error) shares an ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
