use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::{ClientState, ConsultantStage, Role, User},
    repository::RepositoryState,
};

/// SessionClaims
///
/// The payload of a session token as issued by the sign-in flow. This service only ever
/// reads these claims; issuing and refreshing tokens happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (sub): The UUID of the user's profile.
    pub sub: Uuid,
    /// The role claim. Depending on the sign-in path this is either a marketplace role
    /// ("consultant", "client", "admin") or an OAuth provider tag ("linkedin", "google", ...).
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration Time (exp): always validated.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// SessionDecoder
///
/// The session collaborator contract: turn a raw token into claims, or nothing.
/// Implementations fail closed; an invalid, expired or undecodable token is `None`.
#[async_trait]
pub trait SessionDecoder: Send + Sync {
    async fn decode(&self, token: &str) -> Option<SessionClaims>;
}

pub type SessionState = Arc<dyn SessionDecoder>;

/// JwtSessionDecoder
///
/// HS256 JWT implementation of `SessionDecoder`, keyed by the configured session secret.
/// The key and validation rules are prepared once and reused for every request.
pub struct JwtSessionDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionDecoder {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionDecoder for JwtSessionDecoder {
    async fn decode(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    kind => tracing::debug!(?kind, "session token rejected"),
                }
                None
            }
        }
    }
}

/// session_tokens
///
/// Collects the raw session tokens a request carries, in the order they are tried: the
/// `Authorization: Bearer` header first, then the session cookie named `cookie_name`.
pub fn session_tokens(headers: &HeaderMap, cookie_name: &str) -> Vec<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value);

    [bearer, cookie]
        .into_iter()
        .flatten()
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// decode_session
///
/// The first token that decodes wins. A stale or malformed bearer header therefore does
/// not hide a valid session cookie.
pub async fn decode_session(
    sessions: &dyn SessionDecoder,
    tokens: &[String],
) -> Option<SessionClaims> {
    for token in tokens {
        if let Some(claims) = sessions.decode(token).await {
            return Some(claims);
        }
    }
    None
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated API request, with the user's current role
/// and onboarding markers as loaded from persistence (not from the token, which may be
/// stale by the time a stage changes).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub stage: Option<ConsultantStage>,
    pub state: Option<ClientState>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: Role::parse(&user.role),
            stage: user.stage.as_deref().map(ConsultantStage::parse),
            state: user.state.as_deref().map(ClientState::parse),
        }
    }
}

impl AuthUser {
    /// The onboarding marker relevant to this user's role, if any.
    pub fn marker(&self) -> Option<&str> {
        match self.role {
            Role::Consultant => self.stage.as_ref().map(ConsultantStage::as_str),
            Role::Client => self.state.as_ref().map(ClientState::as_str),
            _ => None,
        }
    }
}

/// AuthUser Extractor Implementation
///
/// The process:
/// 1. Local Bypass: in `Env::Local` an `x-user-id` header naming an existing profile is accepted.
/// 2. Token Extraction: bearer header and session cookie.
/// 3. Session Decoding through the `SessionDecoder`; the first token that decodes is used.
/// 4. Profile Lookup: the user must still exist; role and markers come from the record.
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id| Uuid::parse_str(id).ok());

            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await {
                    return Ok(AuthUser::from(user));
                }
            }
        }

        let tokens = session_tokens(&parts.headers, &config.session_cookie);
        if tokens.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let claims = decode_session(sessions.as_ref(), &tokens)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // A valid token for a deleted profile is not a session.
        let user = repo
            .get_user(claims.sub)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser::from(user))
    }
}
