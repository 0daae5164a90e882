use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Role & Onboarding Vocabulary ---

/// Parses a raw marker, keeping the original text when it is not a known member.
fn parse_or_unknown<T: FromStr>(raw: &str, unknown: impl FnOnce(String) -> T) -> T {
    raw.parse().unwrap_or_else(|_| unknown(raw.to_owned()))
}

/// Role
///
/// The functional category of a marketplace user. Parsing never fails: anything outside
/// the three formal roles (including the informal "seller"/"sales" values and the empty
/// string) becomes `Role::Unknown`, carrying the raw text for logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    Consultant,
    Client,
    Admin,
    #[strum(default)]
    Unknown(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        parse_or_unknown(raw, Role::Unknown)
    }

    /// from_claim
    ///
    /// Resolves the role a session claim stands for. Sessions minted by the OAuth sign-in
    /// flow carry the provider tag instead of a role, so a claim that is not a formal role
    /// is read as an `IdentityProvider` and mapped through `IdentityProvider::implied_role`.
    pub fn from_claim(raw: &str) -> Self {
        match Role::parse(raw) {
            Role::Unknown(_) => IdentityProvider::parse(raw).implied_role(),
            role => role,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Unknown(raw) => raw,
            known => known.as_ref(),
        }
    }
}

/// IdentityProvider
///
/// The OAuth provider tag some sessions carry in their role claim. Kept apart from `Role`;
/// the only bridge between the two vocabularies is `implied_role`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum IdentityProvider {
    #[strum(serialize = "linkedin")]
    LinkedIn,
    Google,
    Facebook,
    #[strum(default)]
    Unknown(String),
}

impl IdentityProvider {
    pub fn parse(raw: &str) -> Self {
        parse_or_unknown(raw, IdentityProvider::Unknown)
    }

    /// Consultants sign in through LinkedIn; clients through Google or Facebook.
    pub fn implied_role(&self) -> Role {
        match self {
            IdentityProvider::LinkedIn => Role::Consultant,
            IdentityProvider::Google | IdentityProvider::Facebook => Role::Client,
            IdentityProvider::Unknown(raw) => Role::Unknown(raw.clone()),
        }
    }
}

/// ConsultantStage
///
/// A consultant's position in the onboarding funnel. The variants are listed in funnel
/// order, but nothing here enforces transitions between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ConsultantStage {
    Bio,
    BioWip,
    BioDone,
    Interview,
    InterviewScheduled,
    InterviewDone,
    InterviewDoneAccept,
    InterviewDoneReject,
    Probation,
    ProbationWip,
    ProbationDone,
    Professional,
    #[strum(default)]
    Unknown(String),
}

impl ConsultantStage {
    pub fn parse(raw: &str) -> Self {
        parse_or_unknown(raw, ConsultantStage::Unknown)
    }

    /// Every recognized stage, in funnel order.
    pub fn known() -> impl Iterator<Item = ConsultantStage> {
        ConsultantStage::iter().filter(ConsultantStage::is_known)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ConsultantStage::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConsultantStage::Unknown(raw) => raw,
            known => known.as_ref(),
        }
    }
}

/// ClientState
///
/// Where a client account stands between sign-up and an active engagement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ClientState {
    Onboarding,
    VerificationPending,
    VerificationApproved,
    Active,
    Suspended,
    #[strum(default)]
    Unknown(String),
}

impl ClientState {
    pub fn parse(raw: &str) -> Self {
        parse_or_unknown(raw, ClientState::Unknown)
    }

    pub fn known() -> impl Iterator<Item = ClientState> {
        ClientState::iter().filter(ClientState::is_known)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ClientState::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClientState::Unknown(raw) => raw,
            known => known.as_ref(),
        }
    }
}

/// RouteTarget
///
/// The canonical application pages a user can be sent to. Login pages sit under `/auth`
/// so that they never fall inside a protected prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, TS, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum RouteTarget {
    ConsultantLogin,
    ClientLogin,
    ConsultantOnboarding,
    ConsultantBio,
    ConsultantInterview,
    ConsultantInterviewScheduled,
    ConsultantInterviewReview,
    ConsultantRejected,
    ConsultantProbation,
    ConsultantProbationReview,
    ConsultantDashboard,
    ClientOnboarding,
    ClientVerification,
    ClientDashboard,
    ClientSuspended,
    AdminHome,
    AdminDashboard,
}

impl RouteTarget {
    pub fn path(self) -> &'static str {
        match self {
            RouteTarget::ConsultantLogin => "/auth/consultant/login",
            RouteTarget::ClientLogin => "/auth/client/login",
            RouteTarget::ConsultantOnboarding => "/consultant/onboarding",
            RouteTarget::ConsultantBio => "/consultant/onboarding/bio",
            RouteTarget::ConsultantInterview => "/consultant/onboarding/interview",
            RouteTarget::ConsultantInterviewScheduled => "/consultant/onboarding/interview/scheduled",
            RouteTarget::ConsultantInterviewReview => "/consultant/onboarding/interview/review",
            RouteTarget::ConsultantRejected => "/consultant/onboarding/rejected",
            RouteTarget::ConsultantProbation => "/consultant/onboarding/probation",
            RouteTarget::ConsultantProbationReview => "/consultant/onboarding/probation/review",
            RouteTarget::ConsultantDashboard => "/consultant/dashboard",
            RouteTarget::ClientOnboarding => "/client/onboarding",
            RouteTarget::ClientVerification => "/client/verification",
            RouteTarget::ClientDashboard => "/client/dashboard",
            RouteTarget::ClientSuspended => "/client/suspended",
            RouteTarget::AdminHome => "/admin",
            RouteTarget::AdminDashboard => "/admin/dashboard",
        }
    }
}

// --- Persistence Schemas ---

/// User
///
/// A row of the `profiles` table as owned by the persistence collaborator. Role, stage and
/// state are stored as plain text; they are only interpreted once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    // Consultant onboarding marker, NULL for other roles.
    pub stage: Option<String>,
    // Client account marker, NULL for other roles.
    pub state: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Request Payloads ---

/// UpdateStageRequest
///
/// Input payload for moving a consultant to another onboarding stage.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateStageRequest {
    #[schema(example = "interview-scheduled")]
    pub stage: String,
}

/// UpdateStateRequest
///
/// Input payload for moving a client account to another state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateStateRequest {
    #[schema(example = "verification-pending")]
    pub state: String,
}

// --- Responses ---

/// RouteResolution
///
/// The outcome of resolving a role and marker to a landing route.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteResolution {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    pub target: RouteTarget,
    pub path: String,
}

/// AccessPolicy
///
/// Whether a page path is gated, and where an anonymous visitor would be sent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessPolicy {
    pub path: String,
    pub requires_authentication: bool,
    pub login_route: RouteTarget,
    pub login_path: String,
}

/// UserProfile
///
/// Output schema for `GET /api/me`, including where the user should land right now.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub stage: Option<String>,
    pub state: Option<String>,
    pub landing: RouteTarget,
    pub landing_path: String,
}
