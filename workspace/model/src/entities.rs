//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the CRM application here: organizations
//! own users, agents, categories and leads; agents optionally work leads.

pub mod agent;
pub mod category;
pub mod lead;
pub mod organization;
pub mod profile;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::agent::Entity as Agent;
    pub use super::category::Entity as Category;
    pub use super::lead::Entity as Lead;
    pub use super::organization::Entity as Organization;
    pub use super::profile::Entity as Profile;
    pub use super::user::Entity as User;
}
