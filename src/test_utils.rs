#[cfg(test)]
pub mod test_utils {
    use crate::identity;
    use crate::notify::Mailer;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::http::{HeaderName, HeaderValue};
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::UserRole;
    use model::entities::{agent, lead, organization, user};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // SQLite needs this for the SetNull/Cascade actions to fire
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing (log-only mailer, no SMTP)
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState {
            db,
            mailer: Mailer::disabled(),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing, returning the state for direct DB access
    pub async fn setup_test_app_with_state() -> (Router, AppState) {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let (router, _) = setup_test_app_with_state().await;
        router
    }

    /// Principal header pair for the given user id
    pub fn principal(user_id: i32) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static(crate::auth::PRINCIPAL_HEADER),
            HeaderValue::from(user_id),
        )
    }

    /// Seed an organization together with its organizer
    pub async fn seed_organizer(
        db: &DatabaseConnection,
        username: &str,
        org_name: &str,
    ) -> (user::Model, organization::Model) {
        let org = organization::ActiveModel {
            name: Set(org_name.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create organization");

        let organizer = identity::create_user(
            db,
            username,
            &format!("{username}@example.com"),
            "password123",
            UserRole::Organizer,
            org.id,
        )
        .await
        .expect("Failed to create organizer");

        (organizer, org)
    }

    /// Seed a provisioned agent (user + agent row) in an organization
    pub async fn seed_agent(
        db: &DatabaseConnection,
        organization_id: i32,
        username: &str,
    ) -> (agent::Model, user::Model) {
        let agent_user = identity::create_user(
            db,
            username,
            &format!("{username}@example.com"),
            "password123",
            UserRole::Agent,
            organization_id,
        )
        .await
        .expect("Failed to create agent user");

        let agent_row = agent::ActiveModel {
            user_id: Set(agent_user.id),
            organization_id: Set(organization_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create agent row");

        (agent_row, agent_user)
    }

    /// Seed a lead, optionally assigned
    pub async fn seed_lead(
        db: &DatabaseConnection,
        organization_id: i32,
        first_name: &str,
        agent_id: Option<i32>,
    ) -> lead::Model {
        lead::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set("Prospect".to_string()),
            age: Set(30),
            organization_id: Set(organization_id),
            agent_id: Set(agent_id),
            category_id: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create lead")
    }
}
