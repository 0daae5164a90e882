#![allow(dead_code)]

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use marketplace_portal::{
    AppConfig, AppState,
    auth::SessionClaims,
    models::{ClientState, ConsultantStage, User},
    repository::Repository,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

pub const CONSULTANT_ID: Uuid = Uuid::from_u128(1);
pub const CLIENT_ID: Uuid = Uuid::from_u128(2);
pub const ADMIN_ID: Uuid = Uuid::from_u128(3);

// --- Mock Repository ---

/// In-memory profiles table. Stage and state writes honour the same role filter as the
/// Postgres implementation.
#[derive(Default)]
pub struct MockRepo {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MockRepo {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub fn seeded() -> Self {
        Self::with_users(vec![
            user(CONSULTANT_ID, "consultant", Some("bio-wip"), None),
            user(CLIENT_ID, "client", None, Some("verification-pending")),
            user(ADMIN_ID, "admin", None, None),
        ])
    }

    pub fn stored(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.stored(id)
    }

    async fn set_consultant_stage(&self, id: Uuid, stage: &ConsultantStage) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).filter(|u| u.role == "consultant")?;
        user.stage = Some(stage.as_str().to_string());
        Some(user.clone())
    }

    async fn set_client_state(&self, id: Uuid, state: &ClientState) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).filter(|u| u.role == "client")?;
        user.state = Some(state.as_str().to_string());
        Some(user.clone())
    }
}

// --- Helper Functions ---

pub fn user(id: Uuid, role: &str, stage: Option<&str>, state: Option<&str>) -> User {
    User {
        id,
        email: format!("{role}@example.com"),
        role: role.to_string(),
        stage: stage.map(str::to_string),
        state: state.map(str::to_string),
        updated_at: None,
    }
}

pub fn create_token(user_id: Uuid, role: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = SessionClaims {
        sub: user_id,
        role: role.to_string(),
        email: None,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn create_app_state(repo: Arc<MockRepo>) -> AppState {
    AppState::new(repo, test_config())
}
