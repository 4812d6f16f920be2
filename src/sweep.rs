//! Background task that periodically deletes expired pins.
//!
//! The store has no native time-to-live support, so expiry is a sweep:
//! every `sweep_interval_secs` the task removes pins whose `expires_at`
//! has passed. Readers may see a pin for at most one interval past its
//! nominal expiry.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::state::AppState;

pub fn spawn_expiry_sweeper(state: AppState) {
    let interval_secs = state.config.sweep_interval_secs;
    tokio::spawn(async move {
        info!(interval_secs, "expiry sweeper started");
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_once(&state).await {
                warn!(error = %e, "expiry sweep failed");
            }
        }
    });
}

pub async fn sweep_once(state: &AppState) -> anyhow::Result<()> {
    let removed = state
        .pins
        .delete_expired(OffsetDateTime::now_utc())
        .await?;
    if removed > 0 {
        info!(removed, "expired pins removed");
    } else {
        debug!("no expired pins");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewPin;
    use time::Duration as TimeDuration;
    use uuid::Uuid;

    fn pin_expiring_in(minutes: i64) -> NewPin {
        let now = OffsetDateTime::now_utc();
        NewPin {
            description: "free bagels".into(),
            location_name: "N/A".into(),
            lat: 29.64,
            lng: -82.35,
            created_at: now - TimeDuration::hours(1),
            expires_at: now + TimeDuration::minutes(minutes),
            duration_minutes: 60,
            user_id: Uuid::new_v4(),
            username: "alice".into(),
        }
    }

    #[tokio::test]
    async fn sweep_removes_expired_and_keeps_live_pins() {
        let state = AppState::fake();
        state.pins.insert(pin_expiring_in(-2)).await.unwrap();
        let live = state.pins.insert(pin_expiring_in(30)).await.unwrap();

        sweep_once(&state).await.unwrap();

        let remaining = state.pins.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, live.id);
    }

    #[tokio::test]
    async fn sweep_on_empty_store_is_fine() {
        let state = AppState::fake();
        sweep_once(&state).await.unwrap();
        assert!(state.pins.list().await.unwrap().is_empty());
    }
}
