use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{agent, category, lead};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::auth::{AuthenticatedUser, Organizer};
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};
use crate::scope::Scope;

/// Request body for creating a new lead
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLeadRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    /// Optional classification; must belong to the caller's organization
    pub category_id: Option<i32>,
}

/// Distinguishes an absent field (leave unchanged) from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Request body for updating a lead
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateLeadRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    /// New classification; must belong to the caller's organization.
    /// An explicit `null` clears it, omitting the field leaves it unchanged.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
}

/// Request body for assigning an agent to a lead
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AssignAgentRequest {
    /// Must be one of the caller's own agents
    pub agent_id: i32,
}

/// Lead response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub organization_id: i32,
    pub agent_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl From<lead::Model> for LeadResponse {
    fn from(model: lead::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            age: model.age,
            organization_id: model.organization_id,
            agent_id: model.agent_id,
            category_id: model.category_id,
        }
    }
}

/// Scoped lead listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    /// Every lead visible to the caller
    pub leads: Vec<LeadResponse>,
    /// Organizer-only partition: visible leads not yet assigned to an agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unassigned_leads: Option<Vec<LeadResponse>>,
}

/// Reject a category id that does not belong to the given organization.
async fn check_category(
    state: &AppState,
    category_id: i32,
    organization_id: i32,
) -> Result<(), ApiError> {
    let found = category::Entity::find_by_id(category_id)
        .filter(category::Column::OrganizationId.eq(organization_id))
        .one(&state.db)
        .await?;
    if found.is_none() {
        return Err(ApiError::Validation(
            "Category does not belong to your organization".to_string(),
        ));
    }
    Ok(())
}

/// List leads visible to the caller
///
/// Organizers get every lead of their organization plus the unassigned
/// partition; agents get exactly the leads assigned to them.
#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "leads",
    responses(
        (status = 200, description = "Leads retrieved successfully", body = ApiResponse<LeadListResponse>),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_leads(
    auth: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LeadListResponse>>, ApiError> {
    trace!("Entering list_leads function");

    let scope = Scope::resolve(&state.db, &auth.0).await?;
    let visible = scope.visible_leads(&state.db).await?;
    debug!("Retrieved {} visible leads", visible.len());

    let unassigned_leads = if scope.is_organizer() {
        Some(
            visible
                .iter()
                .filter(|l| l.agent_id.is_none())
                .cloned()
                .map(LeadResponse::from)
                .collect(),
        )
    } else {
        None
    };

    let response = ApiResponse {
        data: LeadListResponse {
            leads: visible.into_iter().map(LeadResponse::from).collect(),
            unassigned_leads,
        },
        message: "Leads retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a single lead within the caller's scope
#[utoipa::path(
    get,
    path = "/api/v1/leads/{lead_id}",
    tag = "leads",
    params(
        ("lead_id" = i32, Path, description = "Lead ID"),
    ),
    responses(
        (status = 200, description = "Lead retrieved successfully", body = ApiResponse<LeadResponse>),
        (status = 404, description = "Lead not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_lead(
    auth: AuthenticatedUser,
    Path(lead_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LeadResponse>>, ApiError> {
    trace!("Entering get_lead function for lead_id: {}", lead_id);

    let scope = Scope::resolve(&state.db, &auth.0).await?;
    let found = scope
        .visible_lead(&state.db, lead_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let response = ApiResponse {
        data: LeadResponse::from(found),
        message: "Lead retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Create a lead under the organizer's own organization
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created successfully", body = ApiResponse<LeadResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_lead(
    organizer: Organizer,
    State(state): State<AppState>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LeadResponse>>), ApiError> {
    trace!("Entering create_lead function");
    debug!(
        "Creating lead '{} {}' for organization {}",
        request.first_name, request.last_name, organizer.0.organization_id
    );

    if let Some(category_id) = request.category_id {
        check_category(&state, category_id, organizer.0.organization_id).await?;
    }

    let created = lead::ActiveModel {
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        age: Set(request.age),
        organization_id: Set(organizer.0.organization_id),
        agent_id: Set(None),
        category_id: Set(request.category_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Lead created successfully with ID: {}", created.id);

    // Fire-and-forget; delivery failure never affects the mutation
    state.mailer.send_detached(
        "New Lead has been created",
        "Go to the site to see the newly created lead.\n\nThank You,\nCRM Admin",
        &organizer.0.email,
    );

    let response = ApiResponse {
        data: LeadResponse::from(created),
        message: "Lead created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a lead within the organizer's own organization
#[utoipa::path(
    put,
    path = "/api/v1/leads/{lead_id}",
    tag = "leads",
    params(
        ("lead_id" = i32, Path, description = "Lead ID"),
    ),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated successfully", body = ApiResponse<LeadResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Lead not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_lead(
    organizer: Organizer,
    Path(lead_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateLeadRequest>,
) -> Result<Json<ApiResponse<LeadResponse>>, ApiError> {
    trace!("Entering update_lead function for lead_id: {}", lead_id);

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let existing = scope
        .visible_lead(&state.db, lead_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(Some(category_id)) = request.category_id {
        check_category(&state, category_id, organizer.0.organization_id).await?;
    }

    let mut lead_active: lead::ActiveModel = existing.into();
    if let Some(first_name) = request.first_name {
        lead_active.first_name = Set(first_name);
    }
    if let Some(last_name) = request.last_name {
        lead_active.last_name = Set(last_name);
    }
    if let Some(age) = request.age {
        lead_active.age = Set(age);
    }
    if let Some(category_change) = request.category_id {
        lead_active.category_id = Set(category_change);
    }

    let updated = lead_active.update(&state.db).await?;
    info!("Lead {} updated successfully", updated.id);

    let response = ApiResponse {
        data: LeadResponse::from(updated),
        message: "Lead updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a lead within the organizer's own organization
#[utoipa::path(
    delete,
    path = "/api/v1/leads/{lead_id}",
    tag = "leads",
    params(
        ("lead_id" = i32, Path, description = "Lead ID"),
    ),
    responses(
        (status = 200, description = "Lead deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Lead not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_lead(
    organizer: Organizer,
    Path(lead_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_lead function for lead_id: {}", lead_id);

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let existing = scope
        .visible_lead(&state.db, lead_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    existing.delete(&state.db).await?;
    info!("Lead {} deleted successfully", lead_id);

    let response = ApiResponse {
        data: format!("Lead {} deleted", lead_id),
        message: "Lead deleted successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Assign one of the organizer's own agents to a lead
///
/// The agent id is re-validated server-side against the organizer's own
/// agent set; a crafted foreign agent id is rejected without touching the
/// lead. Reassigning an already-assigned lead is allowed.
#[utoipa::path(
    post,
    path = "/api/v1/leads/{lead_id}/assign",
    tag = "leads",
    params(
        ("lead_id" = i32, Path, description = "Lead ID"),
    ),
    request_body = AssignAgentRequest,
    responses(
        (status = 200, description = "Agent assigned successfully", body = ApiResponse<LeadResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Lead not found", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Agent outside your organization", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn assign_agent(
    organizer: Organizer,
    Path(lead_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<AssignAgentRequest>,
) -> Result<Json<ApiResponse<LeadResponse>>, ApiError> {
    trace!("Entering assign_agent function for lead_id: {}", lead_id);

    let scope = Scope::for_organizer(organizer.0.organization_id);
    let existing = scope
        .visible_lead(&state.db, lead_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // The offered choice set is "agents of my organization"; anything else
    // is a validation failure, and the lead keeps its prior agent.
    let chosen = agent::Entity::find_by_id(request.agent_id)
        .filter(agent::Column::OrganizationId.eq(organizer.0.organization_id))
        .one(&state.db)
        .await?;
    let Some(chosen) = chosen else {
        warn!(
            "Rejected assignment of agent {} to lead {}: not in organization {}",
            request.agent_id, lead_id, organizer.0.organization_id
        );
        return Err(ApiError::Validation(
            "Agent does not belong to your organization".to_string(),
        ));
    };

    let mut lead_active: lead::ActiveModel = existing.into();
    lead_active.agent_id = Set(Some(chosen.id));
    let updated = lead_active.update(&state.db).await?;

    info!("Lead {} assigned to agent {}", updated.id, chosen.id);

    let response = ApiResponse {
        data: LeadResponse::from(updated),
        message: "Agent assigned successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
