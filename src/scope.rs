use model::entities::{agent, lead, user};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::debug;

/// Per-request visibility resolver.
///
/// One polymorphic scope instead of role branches repeated in every
/// handler. Organizers see everything their organization owns; agents see
/// only the leads assigned to them. The scope holds no query results, so it
/// must be re-resolved on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Organizer {
        organization_id: i32,
    },
    Agent {
        organization_id: i32,
        agent_id: i32,
    },
    /// An agent-role user without a provisioned agent row. Fails closed:
    /// every visible set is empty, nothing errors.
    Unprovisioned,
}

impl Scope {
    /// Resolve the scope for an authenticated principal.
    pub async fn resolve(db: &DatabaseConnection, principal: &user::Model) -> Result<Self, DbErr> {
        match principal.role {
            user::UserRole::Organizer => Ok(Scope::Organizer {
                organization_id: principal.organization_id,
            }),
            user::UserRole::Agent => {
                let agent_row = agent::Entity::find()
                    .filter(agent::Column::UserId.eq(principal.id))
                    .one(db)
                    .await?;

                match agent_row {
                    Some(agent_row) => Ok(Scope::Agent {
                        organization_id: agent_row.organization_id,
                        agent_id: agent_row.id,
                    }),
                    None => {
                        debug!(
                            "Agent-role user {} has no agent row, scope is empty",
                            principal.id
                        );
                        Ok(Scope::Unprovisioned)
                    }
                }
            }
        }
    }

    /// Shortcut for handlers that already hold the organizer guard.
    pub fn for_organizer(organization_id: i32) -> Self {
        Scope::Organizer { organization_id }
    }

    pub fn is_organizer(&self) -> bool {
        matches!(self, Scope::Organizer { .. })
    }

    /// All leads visible to this principal.
    ///
    /// The agent arm filters by organization and by assignment even though
    /// the assignment predicate already implies the organization one; a lead
    /// must satisfy both to be visible.
    pub async fn visible_leads(&self, db: &DatabaseConnection) -> Result<Vec<lead::Model>, DbErr> {
        match *self {
            Scope::Organizer { organization_id } => {
                lead::Entity::find()
                    .filter(lead::Column::OrganizationId.eq(organization_id))
                    .all(db)
                    .await
            }
            Scope::Agent {
                organization_id,
                agent_id,
            } => {
                lead::Entity::find()
                    .filter(lead::Column::OrganizationId.eq(organization_id))
                    .filter(lead::Column::AgentId.eq(agent_id))
                    .all(db)
                    .await
            }
            Scope::Unprovisioned => Ok(Vec::new()),
        }
    }

    /// A single lead, or `None` when the id is absent or out of scope.
    pub async fn visible_lead(
        &self,
        db: &DatabaseConnection,
        lead_id: i32,
    ) -> Result<Option<lead::Model>, DbErr> {
        match *self {
            Scope::Organizer { organization_id } => {
                lead::Entity::find_by_id(lead_id)
                    .filter(lead::Column::OrganizationId.eq(organization_id))
                    .one(db)
                    .await
            }
            Scope::Agent {
                organization_id,
                agent_id,
            } => {
                lead::Entity::find_by_id(lead_id)
                    .filter(lead::Column::OrganizationId.eq(organization_id))
                    .filter(lead::Column::AgentId.eq(agent_id))
                    .one(db)
                    .await
            }
            Scope::Unprovisioned => Ok(None),
        }
    }

    /// All agents visible to this principal. Only organizers see agents.
    pub async fn visible_agents(&self, db: &DatabaseConnection) -> Result<Vec<agent::Model>, DbErr> {
        match *self {
            Scope::Organizer { organization_id } => {
                agent::Entity::find()
                    .filter(agent::Column::OrganizationId.eq(organization_id))
                    .all(db)
                    .await
            }
            _ => Ok(Vec::new()),
        }
    }

    /// A single agent within scope, or `None`.
    pub async fn visible_agent(
        &self,
        db: &DatabaseConnection,
        agent_id: i32,
    ) -> Result<Option<agent::Model>, DbErr> {
        match *self {
            Scope::Organizer { organization_id } => {
                agent::Entity::find_by_id(agent_id)
                    .filter(agent::Column::OrganizationId.eq(organization_id))
                    .one(db)
                    .await
            }
            _ => Ok(None),
        }
    }
}
