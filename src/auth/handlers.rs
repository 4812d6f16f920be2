use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::dto::{LoginRequest, MessageResponse, PublicUser, SignupRequest, TokenResponse};
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::Role;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("username is required".into()))?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("password is required".into()))?;

    // Usernames are case-sensitive; no normalization on purpose.
    if !is_valid_username(username) {
        warn!(username, "invalid username");
        return Err(ApiError::Validation(
            "username must be 3-32 characters (letters, digits, _ . -)".into(),
        ));
    }

    if password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    if state.users.find_by_username(username).await?.is_some() {
        warn!(username, "username already taken");
        return Err(ApiError::Conflict("username already taken".into()));
    }

    let hash = hash_password(password)?;
    let user = state.users.insert(username, &hash, Role::User).await?;

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "account created".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("username is required".into()))?;
    let password = payload
        .password
        .as_deref()
        .ok_or_else(|| ApiError::Validation("password is required".into()))?;

    // Unknown username and wrong password answer identically.
    let user = match state.users.find_by_username(username).await? {
        Some(u) => u,
        None => {
            warn!(username, "login unknown username");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(username, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    }))
}
