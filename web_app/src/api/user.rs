//! # User API Module
//!
//! Registration, password and Google logins, and role management. Every role
//! read from a request or from storage goes through the classifier in
//! [`models::user_app::AccountRole`].

use crate::{
    api::{self, DomainError},
    metric, models, repo,
};
use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use models::user_app::AccountRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Payload to create an account with email and password.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Free-form, classified. Missing means customer.
    pub role: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl RegisterRequest {
    /// Checks every field and returns the classified role.
    ///
    /// # Errors
    /// - [`DomainError::Validation`] for a blank name, malformed email, weak
    ///   password or mismatched confirmation.
    /// - [`DomainError::Forbidden`] when the payload asks for an admin account.
    pub fn validate(&self) -> anyhow::Result<AccountRole> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }

        if !is_valid_email(&self.email) {
            return Err(DomainError::validation("email format is not valid"));
        }

        check_password_strength(&self.password).map_err(DomainError::validation)?;

        if self.password != self.confirm_password {
            return Err(DomainError::validation("passwords do not match"));
        }

        let role = AccountRole::classify_opt(self.role.as_deref());
        if role.is_admin() {
            return Err(DomainError::forbidden(
                "admin accounts can only be granted by an administrator",
            ));
        }

        Ok(role)
    }
}

/// Minimal shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}

/// Password needs at least [`MIN_PASSWORD_LEN`] chars with an uppercase
/// letter, a lowercase letter and a digit.
pub fn check_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("password must contain a digit".to_string());
    }

    Ok(())
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| anyhow!("password salt couldn't be created: {e}"))?;

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password couldn't be hashed: {e}"))?
        .to_string())
}

pub fn verify_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Creates a password account.
///
/// Nothing is written unless the request passes [`RegisterRequest::validate`].
/// A registered email (compared case-insensitively) yields
/// [`DomainError::Conflict`].
pub async fn register_user(
    repo: &repo::ImplAppRepo,
    request: &RegisterRequest,
) -> anyhow::Result<models::user_app::User> {
    let role = request.validate()?;

    let mut user = models::user_app::User::new(&request.name, &request.email, role);
    user.password_hash = Some(hash_password(&request.password)?);
    user.phone = api::sanitize_opt(request.phone.clone());
    user.address = api::sanitize_opt(request.address.clone());

    let Some(user_id) = repo.insert_user(&user).await? else {
        return Err(DomainError::conflict("email is already registered"));
    };
    user.id = user_id;

    metric::incr_user_action_statds("register");
    tracing::info!(user_id, role = %user.account_role, "user registered");
    Ok(user)
}

/// Password login. Unknown email and wrong password are indistinguishable.
pub async fn login(
    repo: &repo::ImplAppRepo,
    email: &str,
    password: &str,
) -> anyhow::Result<models::user_app::User> {
    let user = repo
        .get_user_by_email(&email.trim().to_lowercase())
        .await?
        .filter(|user| {
            user.password_hash
                .as_deref()
                .is_some_and(|hash| verify_password(hash, password))
        })
        .ok_or(DomainError::Unauthenticated)?;

    if !user.is_enabled {
        return Err(DomainError::forbidden("account is disabled"));
    }

    metric::incr_user_action_statds("login");
    Ok(user)
}

/// Gets an existing user by email or creates a passwordless customer.
///
/// Used by the Google login, where the identity provider already verified
/// the email.
pub async fn get_or_create_user_by_email(
    repo: &repo::ImplAppRepo,
    email: &str,
    name: Option<&str>,
) -> anyhow::Result<models::user_app::User> {
    let email = email.trim().to_lowercase();
    if let Some(user) = repo.get_user_by_email(&email).await? {
        return Ok(user);
    }

    let display_name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let mut user = models::user_app::User::new(&display_name, &email, AccountRole::Customer);
    user.id = match repo.insert_user(&user).await? {
        Some(id) => id,
        // lost a race against a concurrent first login
        None => {
            return repo
                .get_user_by_email(&email)
                .await?
                .ok_or_else(|| anyhow!("user {email} vanished after insert conflict"));
        }
    };

    metric::incr_user_action_statds("create_user");
    Ok(user)
}

/// Loads the caller from storage. Session snapshots may be stale, so every
/// privileged check goes through here.
pub async fn resolve_user(
    repo: &repo::ImplAppRepo,
    user_id: i64,
) -> anyhow::Result<models::user_app::User> {
    let user = repo
        .get_user_by_id(user_id)
        .await?
        .ok_or(DomainError::Unauthenticated)?;

    if !user.is_enabled {
        return Err(DomainError::forbidden("account is disabled"));
    }

    Ok(user)
}

/// Resolves the caller and checks its current role.
pub async fn require_role(
    repo: &repo::ImplAppRepo,
    user_id: i64,
    role: AccountRole,
) -> anyhow::Result<models::user_app::User> {
    let user = resolve_user(repo, user_id).await?;
    if user.account_role != role {
        return Err(DomainError::forbidden(format!("{role} role required")));
    }

    Ok(user)
}

/// Passes when the caller owns the resource or is currently an admin.
pub async fn ensure_owner_or_admin(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    owner_id: i64,
) -> anyhow::Result<()> {
    if caller_id == owner_id {
        return Ok(());
    }

    if resolve_user(repo, caller_id).await?.account_role.is_admin() {
        return Ok(());
    }

    Err(DomainError::forbidden("resource belongs to another user"))
}

pub async fn list_users(repo: &repo::ImplAppRepo) -> anyhow::Result<Vec<models::user_app::User>> {
    repo.get_all_users().await
}

/// Admin operation. The requested role must be a known synonym.
pub async fn change_user_role(
    repo: &repo::ImplAppRepo,
    user_id: i64,
    raw_role: &str,
) -> anyhow::Result<models::user_app::User> {
    let role: AccountRole = raw_role
        .parse()
        .map_err(|e: models::user_app::UnknownRoleError| DomainError::validation(e.to_string()))?;

    let mut user = repo
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))?;

    if !repo.update_user_role(user_id, role).await? {
        return Err(DomainError::not_found(format!("user {user_id}")));
    }

    user.account_role = role;
    metric::incr_user_action_statds("change_role");
    Ok(user)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleChange {
    pub user_id: i64,
    pub stored_role: String,
    pub canonical_role: AccountRole,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StandardizeRolesReport {
    pub dry_run: bool,
    pub scanned: usize,
    pub changes: Vec<RoleChange>,
}

/// Rewrites every stored role that is not already spelled canonically.
///
/// With `dry_run` the changes are only reported.
pub async fn standardize_roles(
    repo: &repo::ImplAppRepo,
    dry_run: bool,
) -> anyhow::Result<StandardizeRolesReport> {
    let stored_roles = repo.get_stored_roles().await?;
    let mut report = StandardizeRolesReport {
        dry_run,
        scanned: stored_roles.len(),
        changes: Vec::new(),
    };

    for stored in stored_roles {
        let canonical_role = AccountRole::classify(&stored.raw_role);
        if canonical_role.to_string() == stored.raw_role {
            continue;
        }

        if !dry_run {
            repo.update_user_role(stored.user_id, canonical_role).await?;
        }

        report.changes.push(RoleChange {
            user_id: stored.user_id,
            stored_role: stored.raw_role,
            canonical_role,
        });
    }

    tracing::info!(
        scanned = report.scanned,
        changed = report.changes.len(),
        dry_run,
        "roles standardized"
    );
    Ok(report)
}
