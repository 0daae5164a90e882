mod common;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use common::{ADMIN_ID, CLIENT_ID, CONSULTANT_ID, MockRepo, create_app_state};
use marketplace_portal::{
    AppState,
    auth::AuthUser,
    handlers::{self, AccessQuery, RouteQuery},
    models::{RouteTarget, UpdateStageRequest, UpdateStateRequest},
    repository::Repository,
};
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;

// --- TEST UTILITIES ---

fn seeded() -> (Arc<MockRepo>, AppState) {
    let repo = Arc::new(MockRepo::seeded());
    let state = create_app_state(repo.clone());
    (repo, state)
}

async fn auth_user(state: &AppState, id: Uuid) -> AuthUser {
    AuthUser::from(state.repo.get_user(id).await.expect("seeded user"))
}

fn stage(stage: &str) -> Json<UpdateStageRequest> {
    Json(UpdateStageRequest {
        stage: stage.to_string(),
    })
}

fn client_state(state: &str) -> Json<UpdateStateRequest> {
    Json(UpdateStateRequest {
        state: state.to_string(),
    })
}

// --- PUBLIC HANDLERS ---

#[test]
async fn test_resolve_route_for_consultant_stage() {
    let (_, state) = seeded();

    let Json(resolution) = handlers::resolve_route(
        State(state),
        Query(RouteQuery {
            role: Some("consultant".to_string()),
            stage: Some("interview-scheduled".to_string()),
        }),
    )
    .await;

    assert_eq!(resolution.target, RouteTarget::ConsultantInterviewScheduled);
    assert_eq!(resolution.path, "/consultant/onboarding/interview/scheduled");
}

#[test]
async fn test_resolve_route_unknown_role_is_not_an_error() {
    let (_, state) = seeded();

    let Json(resolution) = handlers::resolve_route(
        State(state),
        Query(RouteQuery {
            role: Some("seller".to_string()),
            stage: None,
        }),
    )
    .await;

    assert_eq!(resolution.role, "seller");
    assert_eq!(resolution.target, RouteTarget::ConsultantLogin);
}

#[test]
async fn test_resolve_route_without_role_goes_to_default_entry() {
    let (_, state) = seeded();

    let Json(resolution) = handlers::resolve_route(
        State(state),
        Query(RouteQuery {
            role: None,
            stage: Some("professional".to_string()),
        }),
    )
    .await;

    assert_eq!(resolution.target, RouteTarget::ConsultantLogin);
    assert_eq!(resolution.path, "/auth/consultant/login");
}

#[test]
async fn test_access_policy() {
    let Json(policy) = handlers::access_policy(Query(AccessQuery {
        path: "/client/5/earnings".to_string(),
    }))
    .await;

    assert!(policy.requires_authentication);
    assert_eq!(policy.login_route, RouteTarget::ClientLogin);
    assert_eq!(policy.login_path, "/auth/client/login");

    let Json(policy) = handlers::access_policy(Query(AccessQuery {
        path: "/about".to_string(),
    }))
    .await;

    assert!(!policy.requires_authentication);
    assert_eq!(policy.login_route, RouteTarget::ConsultantLogin);
}

// --- AUTHENTICATED HANDLERS ---

#[test]
async fn test_get_me_includes_landing() {
    let (_, state) = seeded();
    let user = auth_user(&state, CLIENT_ID).await;

    let Json(profile) = handlers::get_me(user, State(state)).await;

    assert_eq!(profile.id, CLIENT_ID);
    assert_eq!(profile.role, "client");
    assert_eq!(profile.state.as_deref(), Some("verification-pending"));
    assert_eq!(profile.landing, RouteTarget::ClientVerification);
    assert_eq!(profile.landing_path, "/client/verification");
}

#[test]
async fn test_landing_redirects_to_stage_route() {
    let (_, state) = seeded();
    let user = auth_user(&state, CONSULTANT_ID).await;

    let response = handlers::landing(user, State(state)).await.into_response();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/consultant/onboarding/bio"
    );
}

#[test]
async fn test_update_my_stage_success() {
    let (repo, state) = seeded();
    let user = auth_user(&state, CONSULTANT_ID).await;

    let Json(resolution) = handlers::update_my_stage(user, State(state), stage("professional"))
        .await
        .expect("stage stored");

    assert_eq!(resolution.target, RouteTarget::ConsultantDashboard);
    assert_eq!(
        repo.stored(CONSULTANT_ID).unwrap().stage.as_deref(),
        Some("professional")
    );
}

#[test]
async fn test_update_my_stage_rejects_unknown_stage() {
    let (repo, state) = seeded();
    let user = auth_user(&state, CONSULTANT_ID).await;

    let result = handlers::update_my_stage(user, State(state), stage("bogus-stage")).await;

    assert_eq!(result.unwrap_err(), StatusCode::UNPROCESSABLE_ENTITY);
    // Nothing was written.
    assert_eq!(
        repo.stored(CONSULTANT_ID).unwrap().stage.as_deref(),
        Some("bio-wip")
    );
}

#[test]
async fn test_update_my_stage_forbidden_for_clients() {
    let (_, state) = seeded();
    let user = auth_user(&state, CLIENT_ID).await;

    let result = handlers::update_my_stage(user, State(state), stage("bio")).await;

    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}

#[test]
async fn test_update_my_state_success() {
    let (_, state) = seeded();
    let user = auth_user(&state, CLIENT_ID).await;

    let Json(resolution) = handlers::update_my_state(user, State(state), client_state("active"))
        .await
        .expect("state stored");

    assert_eq!(resolution.target, RouteTarget::ClientDashboard);
    assert_eq!(resolution.marker.as_deref(), Some("active"));
}

#[test]
async fn test_update_my_state_forbidden_for_consultants() {
    let (_, state) = seeded();
    let user = auth_user(&state, CONSULTANT_ID).await;

    let result = handlers::update_my_state(user, State(state), client_state("active")).await;

    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}

// --- ADMIN HANDLERS ---

#[test]
async fn test_get_user_landing_forbidden_for_non_admin() {
    let (_, state) = seeded();
    let caller = auth_user(&state, CONSULTANT_ID).await;

    let result = handlers::get_user_landing(caller, State(state), Path(CLIENT_ID)).await;

    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}

#[test]
async fn test_get_user_landing_success() {
    let (_, state) = seeded();
    let caller = auth_user(&state, ADMIN_ID).await;

    let Json(resolution) = handlers::get_user_landing(caller, State(state), Path(CLIENT_ID))
        .await
        .expect("admin lookup");

    assert_eq!(resolution.role, "client");
    assert_eq!(resolution.target, RouteTarget::ClientVerification);
}

#[test]
async fn test_get_user_landing_not_found() {
    let (_, state) = seeded();
    let caller = auth_user(&state, ADMIN_ID).await;

    let result = handlers::get_user_landing(caller, State(state), Path(Uuid::new_v4())).await;

    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_admin_accepts_interview() {
    let (repo, state) = seeded();
    let caller = auth_user(&state, ADMIN_ID).await;

    let Json(resolution) = handlers::set_user_stage(
        caller,
        State(state),
        Path(CONSULTANT_ID),
        stage("interview-done-accept"),
    )
    .await
    .expect("stage stored");

    assert_eq!(resolution.target, RouteTarget::ConsultantProbation);
    assert_eq!(
        repo.stored(CONSULTANT_ID).unwrap().stage.as_deref(),
        Some("interview-done-accept")
    );
}

#[test]
async fn test_admin_stage_write_on_client_is_not_found() {
    let (_, state) = seeded();
    let caller = auth_user(&state, ADMIN_ID).await;

    let result =
        handlers::set_user_stage(caller, State(state), Path(CLIENT_ID), stage("professional"))
            .await;

    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_admin_suspends_client() {
    let (_, state) = seeded();
    let caller = auth_user(&state, ADMIN_ID).await;

    let Json(resolution) =
        handlers::set_user_state(caller, State(state), Path(CLIENT_ID), client_state("suspended"))
            .await
            .expect("state stored");

    assert_eq!(resolution.target, RouteTarget::ClientSuspended);
}

#[test]
async fn test_set_user_state_forbidden_for_non_admin() {
    let (_, state) = seeded();
    let caller = auth_user(&state, CLIENT_ID).await;

    let result =
        handlers::set_user_state(caller, State(state), Path(CLIENT_ID), client_state("active"))
            .await;

    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}
