use crate::{
    AppState,
    auth::AuthUser,
    models::{
        AccessPolicy, ClientState, ConsultantStage, Role, RouteResolution, UpdateStageRequest,
        UpdateStateRequest, User, UserProfile,
    },
    routing::{RouteTable, login_route_for, requires_authentication},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// RouteQuery
///
/// Query parameters for `GET /api/routes/resolve`. `stage` carries either a consultant
/// stage or a client state, depending on `role`. An absent role resolves like any other
/// unrecognized role.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct RouteQuery {
    pub role: Option<String>,
    pub stage: Option<String>,
}

/// AccessQuery
///
/// Query parameters for `GET /api/routes/access`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct AccessQuery {
    pub path: String,
}

fn resolution(routes: &RouteTable, role: &Role, marker: Option<&str>) -> RouteResolution {
    let target = routes.resolve(role, marker);
    RouteResolution {
        role: role.as_str().to_string(),
        marker: marker.map(str::to_string),
        target,
        path: target.path().to_string(),
    }
}

fn resolution_for(routes: &RouteTable, user: &AuthUser) -> RouteResolution {
    resolution(routes, &user.role, user.marker())
}

fn require_admin(user: &AuthUser) -> Result<(), StatusCode> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

// --- Public Handlers ---

/// resolve_route
///
/// [Public Route] Resolves a role and optional stage/state to the landing route.
/// Unknown roles and markers are not errors; they resolve to the documented fallbacks.
#[utoipa::path(
    get,
    path = "/api/routes/resolve",
    params(RouteQuery),
    responses((status = 200, description = "Resolved landing route", body = RouteResolution))
)]
pub async fn resolve_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Json<RouteResolution> {
    let role = Role::parse(query.role.as_deref().unwrap_or_default());
    Json(resolution(&state.routes, &role, query.stage.as_deref()))
}

/// access_policy
///
/// [Public Route] Reports whether a page path is gated and which login page applies.
#[utoipa::path(
    get,
    path = "/api/routes/access",
    params(AccessQuery),
    responses((status = 200, description = "Access policy for the path", body = AccessPolicy))
)]
pub async fn access_policy(Query(query): Query<AccessQuery>) -> Json<AccessPolicy> {
    let login_route = login_route_for(&query.path);
    Json(AccessPolicy {
        requires_authentication: requires_authentication(&query.path),
        login_route,
        login_path: login_route.path().to_string(),
        path: query.path,
    })
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The caller's profile with the route they should land on now.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Json<UserProfile> {
    let landing = state.routes.resolve(&user.role, user.marker());
    Json(UserProfile {
        id: user.id,
        role: user.role.as_str().to_string(),
        stage: user.stage.as_ref().map(|s| s.as_str().to_string()),
        state: user.state.as_ref().map(|s| s.as_str().to_string()),
        landing,
        landing_path: landing.path().to_string(),
        email: user.email,
    })
}

/// landing
///
/// [Authenticated Route] Post-sign-in callback. Sends the caller to the page matching
/// their role and current onboarding marker.
#[utoipa::path(
    get,
    path = "/api/me/landing",
    responses(
        (status = 307, description = "Redirect to the landing route"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn landing(user: AuthUser, State(state): State<AppState>) -> Redirect {
    let target = state.routes.resolve(&user.role, user.marker());
    tracing::debug!(user_id = %user.id, location = target.path(), "landing redirect");
    Redirect::temporary(target.path())
}

/// update_my_stage
///
/// [Authenticated Route] A consultant records progress through onboarding.
/// Other roles get 403; unrecognized stages are rejected with 422 rather than stored.
#[utoipa::path(
    put,
    path = "/api/me/stage",
    request_body = UpdateStageRequest,
    responses(
        (status = 200, description = "Stage stored; new landing route", body = RouteResolution),
        (status = 403, description = "Caller is not a consultant"),
        (status = 422, description = "Unknown stage")
    )
)]
pub async fn update_my_stage(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateStageRequest>,
) -> Result<Json<RouteResolution>, StatusCode> {
    if user.role != Role::Consultant {
        return Err(StatusCode::FORBIDDEN);
    }
    store_stage(&state, user.id, &payload.stage).await
}

/// update_my_state
///
/// [Authenticated Route] A client moves their own account between states.
#[utoipa::path(
    put,
    path = "/api/me/state",
    request_body = UpdateStateRequest,
    responses(
        (status = 200, description = "State stored; new landing route", body = RouteResolution),
        (status = 403, description = "Caller is not a client"),
        (status = 422, description = "Unknown state")
    )
)]
pub async fn update_my_state(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateStateRequest>,
) -> Result<Json<RouteResolution>, StatusCode> {
    if user.role != Role::Client {
        return Err(StatusCode::FORBIDDEN);
    }
    store_state(&state, user.id, &payload.state).await
}

// --- Admin Handlers ---

/// get_user_landing
///
/// [Admin Route] Where a given user would land right now.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/landing",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Resolved landing route", body = RouteResolution),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_landing(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteResolution>, StatusCode> {
    require_admin(&caller)?;
    let user = state.repo.get_user(id).await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(resolution_for(&state.routes, &AuthUser::from(user))))
}

/// set_user_stage
///
/// [Admin Route] Moves any consultant to a stage, e.g. accepting or rejecting an interview.
/// 404 when the user does not exist or is not a consultant.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/stage",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateStageRequest,
    responses(
        (status = 200, description = "Stage stored", body = RouteResolution),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Unknown stage")
    )
)]
pub async fn set_user_stage(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStageRequest>,
) -> Result<Json<RouteResolution>, StatusCode> {
    require_admin(&caller)?;
    store_stage(&state, id, &payload.stage).await
}

/// set_user_state
///
/// [Admin Route] Moves any client account to a state, e.g. approving verification.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/state",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateStateRequest,
    responses(
        (status = 200, description = "State stored", body = RouteResolution),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Unknown state")
    )
)]
pub async fn set_user_state(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStateRequest>,
) -> Result<Json<RouteResolution>, StatusCode> {
    require_admin(&caller)?;
    store_state(&state, id, &payload.state).await
}

// --- Shared Writes ---

async fn store_stage(
    state: &AppState,
    id: Uuid,
    raw: &str,
) -> Result<Json<RouteResolution>, StatusCode> {
    let stage = ConsultantStage::parse(raw);
    if !stage.is_known() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let user: User = state
        .repo
        .set_consultant_stage(id, &stage)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(user_id = %id, stage = stage.as_str(), "consultant stage updated");
    Ok(Json(resolution_for(&state.routes, &AuthUser::from(user))))
}

async fn store_state(
    state: &AppState,
    id: Uuid,
    raw: &str,
) -> Result<Json<RouteResolution>, StatusCode> {
    let client_state = ClientState::parse(raw);
    if !client_state.is_known() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let user: User = state
        .repo
        .set_client_state(id, &client_state)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(user_id = %id, state = client_state.as_str(), "client state updated");
    Ok(Json(resolution_for(&state.routes, &AuthUser::from(user))))
}
