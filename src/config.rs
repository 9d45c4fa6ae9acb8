use anyhow::Result;
use sea_orm::Database;

use crate::notify::Mailer;
use crate::schemas::AppState;

/// Initialize application state for a given database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // Mailer configuration comes from the SMTP_* environment variables
    let mailer = Mailer::from_env();

    Ok(AppState { db, mailer })
}
