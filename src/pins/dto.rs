use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Pin;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePinRequest {
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub duration_minutes: Option<i64>,
}

/// Partial update. Anything omitted (or sent as null) stays as it is;
/// `expiresAt` is the wire name clients send for the new expiry.
#[derive(Debug, Deserialize)]
pub struct UpdatePinRequest {
    pub description: Option<String>,
    pub location_name: Option<String>,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PinResponse {
    pub id: Uuid,
    pub description: String,
    pub location_name: String,
    pub coordinates: Coordinates,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub duration_minutes: i64,
    pub user_id: Uuid,
    pub username: String,
}

impl From<Pin> for PinResponse {
    fn from(p: Pin) -> Self {
        Self {
            id: p.id,
            description: p.description,
            location_name: p.location_name,
            coordinates: Coordinates {
                lat: p.lat,
                lng: p.lng,
            },
            created_at: p.created_at,
            expires_at: p.expires_at,
            duration_minutes: p.duration_minutes,
            user_id: p.user_id,
            username: p.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_response_nests_coordinates_and_formats_timestamps() {
        let now = OffsetDateTime::now_utc();
        let resp = PinResponse::from(Pin {
            id: Uuid::new_v4(),
            description: "free bagels".into(),
            location_name: "library west".into(),
            lat: 29.64,
            lng: -82.35,
            created_at: now,
            expires_at: now + time::Duration::hours(1),
            duration_minutes: 60,
            user_id: Uuid::new_v4(),
            username: "alice".into(),
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["coordinates"]["lat"], 29.64);
        assert_eq!(json["coordinates"]["lng"], -82.35);
        assert!(json["created_at"].as_str().unwrap().contains('T'));
        assert!(json["expires_at"].as_str().unwrap().ends_with('Z'));
    }
}
