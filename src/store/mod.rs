use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

/// Pin record in the database. Coordinates are stored flat; the HTTP layer
/// nests them back into a `coordinates` object.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pin {
    pub id: Uuid,
    pub description: String,
    pub location_name: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub duration_minutes: i64,
    pub user_id: Uuid,
    pub username: String,
}

/// Fields for a pin about to be written. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPin {
    pub description: String,
    pub location_name: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub duration_minutes: i64,
    pub user_id: Uuid,
    pub username: String,
}

/// Partial update for an existing pin. `None` means "leave untouched".
#[derive(Debug, Clone, Default)]
pub struct PinChanges {
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub expires_at: Option<OffsetDateTime>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn insert(&self, username: &str, password_hash: &str, role: Role)
        -> anyhow::Result<User>;
}

#[async_trait]
pub trait PinStore: Send + Sync {
    async fn insert(&self, pin: NewPin) -> anyhow::Result<Pin>;
    async fn list(&self) -> anyhow::Result<Vec<Pin>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Pin>>;
    async fn update(&self, id: Uuid, changes: PinChanges) -> anyhow::Result<Option<Pin>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Remove every pin whose expiry is at or before `cutoff`, returning
    /// how many were deleted. Called by the background sweeper.
    async fn delete_expired(&self, cutoff: OffsetDateTime) -> anyhow::Result<u64>;
}
