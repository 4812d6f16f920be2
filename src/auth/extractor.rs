use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::User;

/// Resolved caller for protected operations. Verifies the bearer token,
/// then loads the full user record so handlers get the current role, not
/// just whatever the token was minted with.
#[derive(Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::AuthMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(ApiError::AuthInvalid)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!("invalid or expired token");
            e
        })?;

        // The account may have been removed since the token was issued.
        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(ApiError::UnknownUser)?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};
    use uuid::Uuid;

    use crate::store::Role;

    fn parts_with_header(value: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/api/pins");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_auth_missing() {
        let state = AppState::fake();
        let mut parts = parts_with_header(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthMissing));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_header(Some("Basic abc123".into()));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthInvalid));
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_rejected() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        // A user that was never inserted into the store.
        let ghost = User {
            id: Uuid::new_v4(),
            username: "ghost".into(),
            password_hash: "unused".into(),
            role: Role::User,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let token = keys.sign(&ghost).unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnknownUser));
    }

    #[tokio::test]
    async fn valid_token_resolves_the_stored_user() {
        let state = AppState::fake();
        let user = state
            .users
            .insert("alice", "hash", Role::User)
            .await
            .unwrap();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign(&user).unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));
        let CurrentUser(resolved) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role, Role::User);
    }
}
