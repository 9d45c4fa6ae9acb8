use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::notify::Mailer;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Outbound notification sender (fire-and-forget)
    pub mailer: Mailer,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::signup::signup,
        crate::handlers::leads::list_leads,
        crate::handlers::leads::get_lead,
        crate::handlers::leads::create_lead,
        crate::handlers::leads::update_lead,
        crate::handlers::leads::delete_lead,
        crate::handlers::leads::assign_agent,
        crate::handlers::agents::list_agents,
        crate::handlers::agents::create_agent,
        crate::handlers::agents::get_agent,
        crate::handlers::agents::update_agent,
        crate::handlers::agents::delete_agent,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::create_category,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::signup::UserResponse>,
            ApiResponse<crate::handlers::leads::LeadResponse>,
            ApiResponse<crate::handlers::leads::LeadListResponse>,
            ApiResponse<Vec<crate::handlers::agents::AgentResponse>>,
            ApiResponse<crate::handlers::agents::AgentResponse>,
            ApiResponse<Vec<crate::handlers::categories::CategoryResponse>>,
            ApiResponse<crate::handlers::categories::CategoryResponse>,
            ApiResponse<String>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::signup::SignupRequest,
            crate::handlers::signup::UserResponse,
            crate::handlers::leads::CreateLeadRequest,
            crate::handlers::leads::UpdateLeadRequest,
            crate::handlers::leads::AssignAgentRequest,
            crate::handlers::leads::LeadResponse,
            crate::handlers::leads::LeadListResponse,
            crate::handlers::agents::CreateAgentRequest,
            crate::handlers::agents::UpdateAgentRequest,
            crate::handlers::agents::AgentResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::CategoryResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "signup", description = "Self-service organizer signup"),
        (name = "leads", description = "Lead CRUD and assignment endpoints"),
        (name = "agents", description = "Agent CRUD and invitation endpoints"),
        (name = "categories", description = "Lead category endpoints"),
    ),
    info(
        title = "CrmRust API",
        description = "CRM API - organizations manage leads and the agents who work them",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
