use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use model::entities::{profile, user};
use rand::distr::Alphanumeric;
use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set, TransactionTrait};
use tracing::debug;

use crate::error::ApiError;

/// Hash a password into an Argon2id PHC-format string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Credential(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Generate a random, non-memorable throwaway password for invited agents.
///
/// The value is hashed, stored and then discarded. It is never communicated;
/// invited agents gain access through the out-of-band password reset flow.
pub fn random_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Create a user together with its profile.
///
/// This is the single place user rows come from, which keeps the "exactly
/// one profile per user" invariant explicit instead of hiding it behind a
/// save listener. Both rows are written in one transaction.
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
    role: user::UserRole,
    organization_id: i32,
) -> Result<user::Model, ApiError> {
    let password_hash = hash_password(password)?;

    let txn = db.begin().await?;

    let created = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        organization_id: Set(organization_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    profile::ActiveModel {
        user_id: Set(created.id),
        bio: Set(None),
        phone_number: Set(None),
        birth_date: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    debug!(
        "Created user {} ({}) with role {:?} in organization {}",
        created.id, created.username, created.role, organization_id
    );
    Ok(created)
}

/// Variant of [`create_user`] that keeps unique-violation errors readable
/// for the caller-facing surface.
pub async fn create_user_checked(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
    role: user::UserRole,
    organization_id: i32,
) -> Result<user::Model, ApiError> {
    match create_user(db, username, email, password, role, organization_id).await {
        Err(ApiError::Database(db_error)) => {
            Err(crate::error::map_unique_violation(db_error, "Username"))
        }
        other => other,
    }
}
