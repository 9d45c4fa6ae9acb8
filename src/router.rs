use crate::handlers::{
    agents::{create_agent, delete_agent, get_agent, list_agents, update_agent},
    categories::{create_category, list_categories},
    health::health_check,
    leads::{assign_agent, create_lead, delete_lead, get_lead, list_leads, update_lead},
    signup::signup,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Self-service signup
        .route("/api/v1/signup", post(signup))
        // Lead CRUD and assignment routes
        .route("/api/v1/leads", post(create_lead))
        .route("/api/v1/leads", get(list_leads))
        .route("/api/v1/leads/:lead_id", get(get_lead))
        .route("/api/v1/leads/:lead_id", put(update_lead))
        .route("/api/v1/leads/:lead_id", delete(delete_lead))
        .route("/api/v1/leads/:lead_id/assign", post(assign_agent))
        // Agent CRUD and invitation routes
        .route("/api/v1/agents", post(create_agent))
        .route("/api/v1/agents", get(list_agents))
        .route("/api/v1/agents/:agent_id", get(get_agent))
        .route("/api/v1/agents/:agent_id", put(update_agent))
        .route("/api/v1/agents/:agent_id", delete(delete_agent))
        // Category routes
        .route("/api/v1/categories", post(create_category))
        .route("/api/v1/categories", get(list_categories))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
