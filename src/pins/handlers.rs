use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreatePinRequest, MessageResponse, PinResponse, UpdatePinRequest};
use crate::auth::extractor::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{NewPin, Pin, PinChanges, Role, User};

const DEFAULT_DURATION_MINUTES: i64 = 60;
const DEFAULT_LOCATION_NAME: &str = "N/A";

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/pins", get(list_pins))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/pins", post(create_pin))
        .route("/pins/:id", put(edit_pin).delete(delete_pin))
}

/// Owner-or-admin gate shared by edit and delete.
fn authorize_mutation(caller: &User, pin: &Pin) -> Result<(), ApiError> {
    if caller.role == Role::Admin || pin.user_id == caller.id {
        return Ok(());
    }
    warn!(user_id = %caller.id, pin_id = %pin.id, "mutation denied");
    Err(ApiError::Forbidden)
}

/// Client-supplied expiry: RFC 3339, or a naive timestamp taken as UTC.
fn parse_client_timestamp(raw: &str) -> Result<OffsetDateTime, ApiError> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts.to_offset(time::UtcOffset::UTC));
    }
    let naive_format =
        time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(naive) = PrimitiveDateTime::parse(raw, naive_format) {
        return Ok(naive.assume_utc());
    }
    Err(ApiError::InvalidFormat(raw.to_string()))
}

#[instrument(skip(state))]
pub async fn list_pins(State(state): State<AppState>) -> Result<Json<Vec<PinResponse>>, ApiError> {
    // Expired pins are removed by the background sweeper; no filtering
    // here, so a pin may linger for at most one sweep interval.
    let pins = state.pins.list().await?;
    Ok(Json(pins.into_iter().map(PinResponse::from).collect()))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_pin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreatePinRequest>,
) -> Result<(StatusCode, Json<PinResponse>), ApiError> {
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::Validation("description is required".into()))?;
    let coordinates = body
        .coordinates
        .ok_or_else(|| ApiError::Validation("coordinates are required".into()))?;
    let duration_minutes = body.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    if duration_minutes < 1 {
        return Err(ApiError::Validation(
            "duration_minutes must be at least 1".into(),
        ));
    }

    if !state.config.geofence.contains(coordinates.lat, coordinates.lng) {
        warn!(lat = coordinates.lat, lng = coordinates.lng, "pin outside geofence");
        return Err(ApiError::OutOfBounds);
    }

    let created_at = OffsetDateTime::now_utc();
    let expires_at = created_at + Duration::minutes(duration_minutes);

    let pin = state
        .pins
        .insert(NewPin {
            description: description.to_string(),
            location_name: body
                .location_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION_NAME.to_string()),
            lat: coordinates.lat,
            lng: coordinates.lng,
            created_at,
            expires_at,
            duration_minutes,
            user_id: user.id,
            username: user.username.clone(),
        })
        .await?;

    info!(pin_id = %pin.id, user_id = %user.id, duration_minutes, "pin created");
    Ok((StatusCode::CREATED, Json(pin.into())))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn edit_pin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePinRequest>,
) -> Result<Json<PinResponse>, ApiError> {
    let pin = state
        .pins
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("pin"))?;
    authorize_mutation(&user, &pin)?;

    let expires_at = match body.expires_at.as_deref() {
        Some(raw) => {
            let ts = parse_client_timestamp(raw)?;
            if ts <= OffsetDateTime::now_utc() {
                return Err(ApiError::InvalidExpiry);
            }
            Some(ts)
        }
        None => None,
    };

    let description = match body.description {
        Some(d) => {
            let d = d.trim().to_string();
            if d.is_empty() {
                return Err(ApiError::Validation("description must not be empty".into()));
            }
            Some(d)
        }
        None => None,
    };

    let updated = state
        .pins
        .update(
            id,
            PinChanges {
                description,
                location_name: body.location_name,
                expires_at,
            },
        )
        .await?
        .ok_or(ApiError::NotFound("pin"))?;

    info!(pin_id = %id, user_id = %user.id, "pin updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_pin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let pin = state
        .pins
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("pin"))?;
    authorize_mutation(&user, &pin)?;

    state.pins.delete(id).await?;
    info!(pin_id = %id, user_id = %user.id, "pin deleted");
    Ok(Json(MessageResponse {
        message: "pin deleted".into(),
    }))
}
