use std::collections::HashMap;

use crate::models::{ClientState, ConsultantStage, Role, RouteTarget};

/// Path prefixes whose pages require a signed-in session.
pub const PROTECTED_PREFIXES: [&str; 3] = ["/consultant", "/client", "/admin"];

/// Section
///
/// The page namespace a request path falls into. Matching is a literal, case-sensitive
/// prefix test against the raw path, so `/consultants` still counts as `/consultant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Consultant,
    Client,
    Customer,
    Admin,
    Public,
}

impl Section {
    pub fn of(path: &str) -> Self {
        if path.starts_with("/consultant") {
            Section::Consultant
        } else if path.starts_with("/client") {
            Section::Client
        } else if path.starts_with("/admin") {
            Section::Admin
        } else if path.starts_with("/customer") {
            Section::Customer
        } else {
            Section::Public
        }
    }
}

/// requires_authentication
///
/// True iff the path begins with one of the `PROTECTED_PREFIXES`.
pub fn requires_authentication(path: &str) -> bool {
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// login_route_for
///
/// Picks the login page for a path. There is no admin login page: admin paths, like
/// every unmatched path, fall back to the consultant login.
pub fn login_route_for(path: &str) -> RouteTarget {
    match Section::of(path) {
        Section::Client => RouteTarget::ClientLogin,
        _ => RouteTarget::ConsultantLogin,
    }
}

/// RouteTable
///
/// The two immutable lookup tables behind landing-route resolution: consultant stage to
/// route, and client state to route. Built once at startup and shared by reference.
///
/// Both tables are total over the known members of their enumeration; the unknown
/// variants are deliberately absent so that lookups fall through to the onboarding
/// fallbacks.
#[derive(Debug, Clone)]
pub struct RouteTable {
    stages: HashMap<ConsultantStage, RouteTarget>,
    states: HashMap<ClientState, RouteTarget>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    /// Where consultants land when their stage is absent or unrecognized.
    pub const CONSULTANT_FALLBACK: RouteTarget = RouteTarget::ConsultantOnboarding;
    /// Where clients land when their state is absent or unrecognized.
    pub const CLIENT_FALLBACK: RouteTarget = RouteTarget::ClientOnboarding;
    /// The generic authentication entry point for unknown roles.
    pub const DEFAULT_ENTRY: RouteTarget = RouteTarget::ConsultantLogin;

    /// standard
    ///
    /// Builds the marketplace's fixed stage and state tables.
    pub fn standard() -> Self {
        let stages = ConsultantStage::known()
            .filter_map(|stage| stage_route(&stage).map(|target| (stage, target)))
            .collect();
        let states = ClientState::known()
            .filter_map(|state| state_route(&state).map(|target| (state, target)))
            .collect();

        Self { stages, states }
    }

    /// resolve_target_route
    ///
    /// String-level entry point: interprets `marker` according to `role` and returns the
    /// route the user should land on. Never fails; every miss resolves to a fallback.
    pub fn resolve_target_route(&self, role: &str, marker: Option<&str>) -> RouteTarget {
        self.resolve(&Role::parse(role), marker)
    }

    pub fn resolve(&self, role: &Role, marker: Option<&str>) -> RouteTarget {
        match role {
            Role::Consultant => match marker {
                Some(raw) => self.consultant_route(&ConsultantStage::parse(raw)),
                None => Self::CONSULTANT_FALLBACK,
            },
            Role::Client => match marker {
                Some(raw) => self.client_route(&ClientState::parse(raw)),
                None => Self::CLIENT_FALLBACK,
            },
            Role::Admin => RouteTarget::AdminDashboard,
            Role::Unknown(_) => Self::DEFAULT_ENTRY,
        }
    }

    pub fn consultant_route(&self, stage: &ConsultantStage) -> RouteTarget {
        self.stages
            .get(stage)
            .copied()
            .unwrap_or(Self::CONSULTANT_FALLBACK)
    }

    pub fn client_route(&self, state: &ClientState) -> RouteTarget {
        self.states
            .get(state)
            .copied()
            .unwrap_or(Self::CLIENT_FALLBACK)
    }
}

fn stage_route(stage: &ConsultantStage) -> Option<RouteTarget> {
    let target = match stage {
        ConsultantStage::Bio | ConsultantStage::BioWip => RouteTarget::ConsultantBio,
        ConsultantStage::BioDone | ConsultantStage::Interview => RouteTarget::ConsultantInterview,
        ConsultantStage::InterviewScheduled => RouteTarget::ConsultantInterviewScheduled,
        ConsultantStage::InterviewDone => RouteTarget::ConsultantInterviewReview,
        ConsultantStage::InterviewDoneAccept
        | ConsultantStage::Probation
        | ConsultantStage::ProbationWip => RouteTarget::ConsultantProbation,
        ConsultantStage::InterviewDoneReject => RouteTarget::ConsultantRejected,
        ConsultantStage::ProbationDone => RouteTarget::ConsultantProbationReview,
        ConsultantStage::Professional => RouteTarget::ConsultantDashboard,
        ConsultantStage::Unknown(_) => return None,
    };
    Some(target)
}

fn state_route(state: &ClientState) -> Option<RouteTarget> {
    let target = match state {
        ClientState::Onboarding => RouteTarget::ClientOnboarding,
        ClientState::VerificationPending => RouteTarget::ClientVerification,
        ClientState::VerificationApproved | ClientState::Active => RouteTarget::ClientDashboard,
        ClientState::Suspended => RouteTarget::ClientSuspended,
        ClientState::Unknown(_) => return None,
    };
    Some(target)
}
