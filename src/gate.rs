use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{SessionClaims, decode_session, session_tokens},
    models::{Role, RouteTarget},
    routing::{Section, login_route_for, requires_authentication},
};

/// GateState
///
/// How the gate classified a request before deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    AuthenticatedRoleMismatch,
    AuthenticatedAuthorized,
}

/// GateDecision
///
/// The gate's only possible effects: let the request through untouched, or redirect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Redirect(RouteTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOutcome {
    pub state: GateState,
    pub decision: GateDecision,
}

impl GateOutcome {
    fn new(state: GateState, decision: GateDecision) -> Self {
        Self { state, decision }
    }
}

/// evaluate
///
/// Decides a single page request. `session` is the decoded session, already `None` when
/// the token was missing, invalid or expired.
///
/// Role requirements per section:
/// - `/admin`: role `admin`; a mismatch is soft-redirected to `/admin` instead of the
///   login page. On `/admin` itself that would loop, so the login page is used there.
/// - `/consultant`: effective role `consultant`, otherwise the consultant login.
/// - `/customer`: effective role `client`, otherwise the client login. The section is not
///   protected, so anonymous visitors pass.
/// - `/client` and everything else: any valid session passes.
pub fn evaluate(path: &str, session: Option<&SessionClaims>) -> GateOutcome {
    let Some(claims) = session else {
        let decision = if requires_authentication(path) {
            GateDecision::Redirect(login_route_for(path))
        } else {
            GateDecision::Proceed
        };
        return GateOutcome::new(GateState::Unauthenticated, decision);
    };

    let role = Role::from_claim(&claims.role);
    let mismatch = match Section::of(path) {
        Section::Admin if role != Role::Admin => Some(admin_soft_redirect(path)),
        Section::Consultant if role != Role::Consultant => Some(RouteTarget::ConsultantLogin),
        Section::Customer if role != Role::Client => Some(RouteTarget::ClientLogin),
        _ => None,
    };

    match mismatch {
        Some(target) => GateOutcome::new(
            GateState::AuthenticatedRoleMismatch,
            GateDecision::Redirect(target),
        ),
        None => GateOutcome::new(GateState::AuthenticatedAuthorized, GateDecision::Proceed),
    }
}

fn admin_soft_redirect(path: &str) -> RouteTarget {
    let home = RouteTarget::AdminHome.path();
    if path.trim_end_matches('/') == home {
        login_route_for(path)
    } else {
        RouteTarget::AdminHome
    }
}

/// route_gate
///
/// Middleware binding of `evaluate`. It runs once per request, never mutates state and
/// turns a redirect decision into `307 Temporary Redirect`. Public paths (the JSON API
/// included) pass without decoding a session.
pub async fn route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if Section::of(&path) == Section::Public {
        return next.run(request).await;
    }

    let tokens = session_tokens(request.headers(), &state.config.session_cookie);
    let claims = decode_session(state.sessions.as_ref(), &tokens).await;

    let outcome = evaluate(&path, claims.as_ref());

    match outcome.decision {
        GateDecision::Proceed => next.run(request).await,
        GateDecision::Redirect(target) => {
            tracing::debug!(
                path = %path,
                state = ?outcome.state,
                location = target.path(),
                "gate redirect"
            );
            Redirect::temporary(target.path()).into_response()
        }
    }
}
