use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::{organization, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::identity;
use crate::schemas::{ApiResponse, AppState};

/// Request body for self-service signup
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct SignupRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    /// Routable email address
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    /// Initial password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Name of the organization being founded
    #[validate(length(min = 1, message = "Organization name must not be empty"))]
    pub organization_name: String,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub organization_id: i32,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role.as_str().to_string(),
            organization_id: model.organization_id,
        }
    }
}

/// Self-service signup: founds an organization and creates its organizer.
///
/// A signed-up account always gets the organizer role; agent accounts only
/// come from the invitation workflow.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    tag = "signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<UserResponse>),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(request))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    trace!("Entering signup function");
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    debug!("Signing up organizer '{}'", request.username);

    // Check the username before founding the organization, so an obvious
    // duplicate does not leave an empty organization behind.
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.clone()))
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(ApiError::Validation(format!(
            "Username '{}' already exists",
            request.username
        )));
    }

    let new_organization = organization::ActiveModel {
        name: Set(request.organization_name.clone()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let created = identity::create_user_checked(
        &state.db,
        &request.username,
        &request.email,
        &request.password,
        user::UserRole::Organizer,
        new_organization.id,
    )
    .await?;

    info!(
        "Organizer '{}' signed up, founding organization {} ('{}')",
        created.username, new_organization.id, new_organization.name
    );

    let response = ApiResponse {
        data: UserResponse::from(created),
        message: "Account created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}
