use axum::{extract::State, http::StatusCode, response::Json};
use model::entities::category;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::auth::{AuthenticatedUser, Organizer};
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};

/// Request body for creating a new category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Classification name, e.g. "new", "contacted", "converted"
    pub name: String,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub organization_id: i32,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            organization_id: model.organization_id,
        }
    }
}

/// List the categories of the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_categories(
    auth: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiError> {
    trace!("Entering list_categories function");

    let categories = category::Entity::find()
        .filter(category::Column::OrganizationId.eq(auth.0.organization_id))
        .all(&state.db)
        .await?;
    debug!("Retrieved {} categories", categories.len());

    let response = ApiResponse {
        data: categories.into_iter().map(CategoryResponse::from).collect(),
        message: "Categories retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Create a category under the organizer's own organization
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 403, description = "Organizer role required", body = crate::schemas::ErrorResponse),
        (status = 422, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    organizer: Organizer,
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ApiError> {
    trace!("Entering create_category function");

    if request.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Category name must not be empty".to_string(),
        ));
    }

    let created = category::ActiveModel {
        name: Set(request.name),
        organization_id: Set(organizer.0.organization_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Category created successfully with ID: {}", created.id);

    let response = ApiResponse {
        data: CategoryResponse::from(created),
        message: "Category created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}
