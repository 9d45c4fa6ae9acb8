use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{agent, user};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Organizer;
use crate::error::{map_unique_violation, ApiError};
use crate::identity;
use crate::schemas::{ApiResponse, AppState};
use crate::scope::Scope;

/// Request body for inviting a new agent
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateAgentRequest {
    /// Username for the new account (must be unique)
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    /// Routable email address the invitation is sent to
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// Request body for updating an agent's account details
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAgentRequest {
    pub username: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
}

/// Agent response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentResponse {
    pub id: i32,
    pub user_id: i32,
    pub organization_id: i32,
    pub username: String,
    pub email: String,
}

impl AgentResponse {
    fn build(agent_row: agent::Model, user_row: user::Model) -> Self {
        Self {
            id: agent_row.id,
            user_id: agent_row.user_id,
            organization_id: agent_row.organization_id,
            username: user_row.username,
            email: user_row.email,
        }
    }
}

/// List the organizer's own agents
#[utoipa::path(
    get,
    path = "/api/v1/agents",
    tag = "agents",
    responses(
        (status = 200, description = "Agents retrieved successfully", body = ApiResponse<Vec<AgentResponse>>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_agents(
    organizer: Organizer,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AgentResponse>>>, ApiError> {
    trace!("Entering list_agents function");

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let agents = scope.visible_agents(&state.db).await?;
    debug!("Retrieved {} agents", agents.len());

    let mut responses = Vec::with_capacity(agents.len());
    for agent_row in agents {
        let user_row = agent_row
            .find_related(user::Entity)
            .one(&state.db)
            .await?
            .ok_or(ApiError::NotFound)?;
        responses.push(AgentResponse::build(agent_row, user_row));
    }

    let response = ApiResponse {
        data: responses,
        message: "Agents retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Invite a new agent into the organizer's organization
///
/// Creates the wrapped user account with a random write-once password, the
/// agent row, and dispatches the invitation mail. The mail never contains
/// the password; the agent gains access via password reset.
#[utoipa::path(
    post,
    path = "/api/v1/agents",
    tag = "agents",
    request_body = CreateAgentRequest,
    responses(
        (status = 201, description = "Agent invited successfully", body = ApiResponse<AgentResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_agent(
    organizer: Organizer,
    State(state): State<AppState>,
    Json(request): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AgentResponse>>), ApiError> {
    trace!("Entering create_agent function");
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    debug!(
        "Inviting agent '{}' into organization {}",
        request.username, organizer.0.organization_id
    );

    let throwaway = identity::random_password();
    let created_user = identity::create_user_checked(
        &state.db,
        &request.username,
        &request.email,
        &throwaway,
        user::UserRole::Agent,
        organizer.0.organization_id,
    )
    .await?;

    let created_agent = agent::ActiveModel {
        user_id: Set(created_user.id),
        organization_id: Set(organizer.0.organization_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "Agent {} created for user '{}' in organization {}",
        created_agent.id, created_user.username, organizer.0.organization_id
    );

    // Record creation and notification are independent best-effort steps;
    // a lost mail leaves the rows in place.
    state.mailer.send_detached(
        "You are invited to be an Agent",
        "Your account has been created in the CRM system as an agent.\n\
         Please reset your password to login and start working.\n\n\
         Thank you,\nCRM Admin Team",
        &created_user.email,
    );

    let response = ApiResponse {
        data: AgentResponse::build(created_agent, created_user),
        message: "Agent invited successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get one of the organizer's own agents
#[utoipa::path(
    get,
    path = "/api/v1/agents/{agent_id}",
    tag = "agents",
    params(
        ("agent_id" = i32, Path, description = "Agent ID"),
    ),
    responses(
        (status = 200, description = "Agent retrieved successfully", body = ApiResponse<AgentResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_agent(
    organizer: Organizer,
    Path(agent_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AgentResponse>>, ApiError> {
    trace!("Entering get_agent function for agent_id: {}", agent_id);

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let agent_row = scope
        .visible_agent(&state.db, agent_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let user_row = agent_row
        .find_related(user::Entity)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let response = ApiResponse {
        data: AgentResponse::build(agent_row, user_row),
        message: "Agent retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update the account details of one of the organizer's own agents
#[utoipa::path(
    put,
    path = "/api/v1/agents/{agent_id}",
    tag = "agents",
    params(
        ("agent_id" = i32, Path, description = "Agent ID"),
    ),
    request_body = UpdateAgentRequest,
    responses(
        (status = 200, description = "Agent updated successfully", body = ApiResponse<AgentResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_agent(
    organizer: Organizer,
    Path(agent_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateAgentRequest>,
) -> Result<Json<ApiResponse<AgentResponse>>, ApiError> {
    trace!("Entering update_agent function for agent_id: {}", agent_id);
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let agent_row = scope
        .visible_agent(&state.db, agent_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let user_row = agent_row
        .find_related(user::Entity)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut user_active: user::ActiveModel = user_row.into();
    if let Some(username) = request.username {
        user_active.username = Set(username);
    }
    if let Some(email) = request.email {
        user_active.email = Set(email);
    }
    // A rename onto a taken username is a validation failure, same as on
    // the create paths
    let updated_user = user_active
        .update(&state.db)
        .await
        .map_err(|e| map_unique_violation(e, "Username"))?;

    info!("Agent {} account details updated", agent_id);

    let response = ApiResponse {
        data: AgentResponse::build(agent_row, updated_user),
        message: "Agent updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Remove one of the organizer's own agents
///
/// Deletes the agent row only; its leads become unassigned and the wrapped
/// user account remains.
#[utoipa::path(
    delete,
    path = "/api/v1/agents/{agent_id}",
    tag = "agents",
    params(
        ("agent_id" = i32, Path, description = "Agent ID"),
    ),
    responses(
        (status = 200, description = "Agent deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_agent(
    organizer: Organizer,
    Path(agent_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_agent function for agent_id: {}", agent_id);

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let agent_row = scope
        .visible_agent(&state.db, agent_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    agent_row.delete(&state.db).await?;
    info!("Agent {} deleted successfully", agent_id);

    let response = ApiResponse {
        data: format!("Agent {} deleted", agent_id),
        message: "Agent deleted successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
