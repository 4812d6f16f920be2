use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewPin, Pin, PinChanges, PinStore, Role, User, UserStore};

/// In-process store used by `AppState::fake()` and the handler tests.
/// Pins keep insertion order, mirroring the unordered-but-stable reads
/// the Postgres store gives.
#[derive(Default)]
pub struct MemStore {
    users: RwLock<Vec<User>>,
    pins: RwLock<Vec<Pin>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            anyhow::bail!("username already exists");
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PinStore for MemStore {
    async fn insert(&self, pin: NewPin) -> anyhow::Result<Pin> {
        let pin = Pin {
            id: Uuid::new_v4(),
            description: pin.description,
            location_name: pin.location_name,
            lat: pin.lat,
            lng: pin.lng,
            created_at: pin.created_at,
            expires_at: pin.expires_at,
            duration_minutes: pin.duration_minutes,
            user_id: pin.user_id,
            username: pin.username,
        };
        self.pins.write().await.push(pin.clone());
        Ok(pin)
    }

    async fn list(&self) -> anyhow::Result<Vec<Pin>> {
        Ok(self.pins.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Pin>> {
        let pins = self.pins.read().await;
        Ok(pins.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: PinChanges) -> anyhow::Result<Option<Pin>> {
        let mut pins = self.pins.write().await;
        let Some(pin) = pins.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(description) = changes.description {
            pin.description = description;
        }
        if let Some(location_name) = changes.location_name {
            pin.location_name = location_name;
        }
        if let Some(expires_at) = changes.expires_at {
            pin.expires_at = expires_at;
        }
        Ok(Some(pin.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut pins = self.pins.write().await;
        let before = pins.len();
        pins.retain(|p| p.id != id);
        Ok(pins.len() < before)
    }

    async fn delete_expired(&self, cutoff: OffsetDateTime) -> anyhow::Result<u64> {
        let mut pins = self.pins.write().await;
        let before = pins.len();
        pins.retain(|p| p.expires_at > cutoff);
        Ok((before - pins.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn new_pin(expires_in: Duration) -> NewPin {
        let now = OffsetDateTime::now_utc();
        NewPin {
            description: "free bagels".into(),
            location_name: "N/A".into(),
            lat: 29.64,
            lng: -82.35,
            created_at: now,
            expires_at: now + expires_in,
            duration_minutes: 60,
            user_id: Uuid::new_v4(),
            username: "alice".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemStore::new();
        UserStore::insert(&store, "alice", "h", Role::User)
            .await
            .unwrap();
        assert!(UserStore::insert(&store, "alice", "h", Role::User)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn update_leaves_omitted_fields_untouched() {
        let store = MemStore::new();
        let pin = PinStore::insert(&store, new_pin(Duration::hours(1)))
            .await
            .unwrap();
        let updated = store
            .update(
                pin.id,
                PinChanges {
                    description: Some("leftover pizza".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.description, "leftover pizza");
        assert_eq!(updated.location_name, pin.location_name);
        assert_eq!(updated.expires_at, pin.expires_at);
    }

    #[tokio::test]
    async fn delete_expired_removes_only_past_pins() {
        let store = MemStore::new();
        PinStore::insert(&store, new_pin(Duration::minutes(-5)))
            .await
            .unwrap();
        let live = PinStore::insert(&store, new_pin(Duration::hours(1)))
            .await
            .unwrap();

        let removed = store
            .delete_expired(OffsetDateTime::now_utc())
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, live.id);
    }
}
