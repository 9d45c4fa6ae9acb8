pub mod agents;
pub mod categories;
pub mod health;
pub mod leads;
pub mod signup;
