use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{NewPin, Pin, PinChanges, PinStore, Role, User, UserStore};

/// Postgres-backed store. The pool is safe to share across requests and
/// with the expiry sweeper.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl PinStore for PgStore {
    async fn insert(&self, pin: NewPin) -> anyhow::Result<Pin> {
        let pin = sqlx::query_as::<_, Pin>(
            r#"
            INSERT INTO pins (description, location_name, lat, lng,
                              created_at, expires_at, duration_minutes,
                              user_id, username)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, description, location_name, lat, lng,
                      created_at, expires_at, duration_minutes,
                      user_id, username
            "#,
        )
        .bind(&pin.description)
        .bind(&pin.location_name)
        .bind(pin.lat)
        .bind(pin.lng)
        .bind(pin.created_at)
        .bind(pin.expires_at)
        .bind(pin.duration_minutes)
        .bind(pin.user_id)
        .bind(&pin.username)
        .fetch_one(&self.pool)
        .await?;
        Ok(pin)
    }

    async fn list(&self) -> anyhow::Result<Vec<Pin>> {
        let pins = sqlx::query_as::<_, Pin>(
            r#"
            SELECT id, description, location_name, lat, lng,
                   created_at, expires_at, duration_minutes,
                   user_id, username
            FROM pins
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pins)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Pin>> {
        let pin = sqlx::query_as::<_, Pin>(
            r#"
            SELECT id, description, location_name, lat, lng,
                   created_at, expires_at, duration_minutes,
                   user_id, username
            FROM pins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pin)
    }

    async fn update(&self, id: Uuid, changes: PinChanges) -> anyhow::Result<Option<Pin>> {
        let pin = sqlx::query_as::<_, Pin>(
            r#"
            UPDATE pins
            SET description   = COALESCE($2, description),
                location_name = COALESCE($3, location_name),
                expires_at    = COALESCE($4, expires_at)
            WHERE id = $1
            RETURNING id, description, location_name, lat, lng,
                      created_at, expires_at, duration_minutes,
                      user_id, username
            "#,
        )
        .bind(id)
        .bind(changes.description)
        .bind(changes.location_name)
        .bind(changes.expires_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pin)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM pins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, cutoff: OffsetDateTime) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM pins WHERE expires_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
