use crate::models::{ClientState, ConsultantStage, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence collaborator: it supplies a user's current role and onboarding markers
/// and stores marker changes. Routing decisions never touch storage directly; they only
/// see the values read through this trait.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` usable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Option<User>;
    // Returns the updated record, or None if the user does not exist.
    async fn set_consultant_stage(&self, id: Uuid, stage: &ConsultantStage) -> Option<User>;
    async fn set_client_state(&self, id: Uuid, state: &ClientState) -> Option<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the `profiles` table.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, role, stage, state, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user error: {:?}", e);
            None
        })
    }

    /// set_consultant_stage
    ///
    /// Only consultant profiles carry a stage; the role filter keeps a stray write from
    /// tagging a client or admin record.
    async fn set_consultant_stage(&self, id: Uuid, stage: &ConsultantStage) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE profiles
            SET stage = $2, updated_at = NOW()
            WHERE id = $1 AND role = 'consultant'
            RETURNING id, email, role, stage, state, updated_at
            "#,
        )
        .bind(id)
        .bind(stage.as_str())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_consultant_stage error: {:?}", e);
            None
        })
    }

    async fn set_client_state(&self, id: Uuid, state: &ClientState) -> Option<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE profiles
            SET state = $2, updated_at = NOW()
            WHERE id = $1 AND role = 'client'
            RETURNING id, email, role, stage, state, updated_at
            "#,
        )
        .bind(id)
        .bind(state.as_str())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_client_state error: {:?}", e);
            None
        })
    }
}
