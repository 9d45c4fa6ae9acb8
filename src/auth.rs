use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use model::entities::user;
use sea_orm::EntityTrait;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// Header carrying the principal's user id.
///
/// Session and credential handling live in front of this service (external
/// collaborator); by the time a request arrives the proxy has resolved the
/// session into this trusted header.
pub const PRINCIPAL_HEADER: &str = "x-user-id";

/// The authenticated principal behind the current request.
///
/// Resolved per request against the user table, never cached, so role and
/// membership changes take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub user::Model);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let user_id = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or(ApiError::Unauthorized)?;

        let user = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!("Principal header referenced unknown user {}", user_id);
                ApiError::Unauthorized
            })?;

        debug!("Authenticated user {} ({:?})", user.username, user.role);
        Ok(AuthenticatedUser(user))
    }
}

/// Entry gate for organizer-only operations.
///
/// Rejects with 403 before any row of the target collection is read or
/// written.
#[derive(Debug, Clone)]
pub struct Organizer(pub user::Model);

#[async_trait]
impl<S> FromRequestParts<S> for Organizer
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != user::UserRole::Organizer {
            warn!("User {} denied organizer-only operation", user.username);
            return Err(ApiError::Forbidden);
        }

        Ok(Organizer(user))
    }
}
