//! User management service
//!
//! Registration, credential checks and profile updates. Organizations get a
//! default `OrganizationSettings` at registration so their slots are
//! immediately browsable.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::errors::{FieldError, Result, SlotbookError};
use crate::scheduling::OrganizationSettings;
use crate::storage::{MemoryStore, Role, User};
use crate::utils::password::{check_password_strength, hash_password, verify_password};
use crate::utils::{is_valid_email, normalize_email};

const MAX_NAME_LENGTH: usize = 100;

// ============ Request DTOs ============

/// Request to register a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial profile update (None = keep existing)
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// ============ UserService Implementation ============

pub struct UserService {
    store: Arc<MemoryStore>,
    booking: BookingConfig,
}

impl UserService {
    pub fn new(store: Arc<MemoryStore>, booking: BookingConfig) -> Self {
        Self { store, booking }
    }

    fn check_name(name: &str, errors: &mut Vec<FieldError>) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if trimmed.chars().count() > MAX_NAME_LENGTH {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {} characters", MAX_NAME_LENGTH),
            ));
        }
    }

    fn check_email(email: &str, errors: &mut Vec<FieldError>) {
        if !is_valid_email(&normalize_email(email)) {
            errors.push(FieldError::new("email", "A valid email address is required"));
        }
    }

    fn check_password(password: &str, errors: &mut Vec<FieldError>) {
        if let Some(msg) = check_password_strength(password) {
            errors.push(FieldError::new("password", msg));
        }
    }

    fn hash(password: &str) -> Result<String> {
        hash_password(password).map_err(|e| {
            error!("Failed to hash password: {}", e);
            SlotbookError::password_hash(e.to_string())
        })
    }

    /// Register a new account
    pub fn register(&self, req: RegisterRequest) -> Result<User> {
        let mut errors = Vec::new();
        Self::check_name(&req.name, &mut errors);
        Self::check_email(&req.email, &mut errors);
        Self::check_password(&req.password, &mut errors);
        if !errors.is_empty() {
            return Err(SlotbookError::validation_fields(
                "Invalid registration data",
                errors,
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash: Self::hash(&req.password)?,
            role: req.role,
            created_at: Utc::now(),
        };

        let user = self.store.insert_user(user)?;
        if user.role == Role::Organization {
            self.store
                .put_settings(user.id, OrganizationSettings::from_defaults(&self.booking));
        }

        info!("Registered {} account {}", user.role, user.id);
        Ok(user)
    }

    /// Check credentials; unknown email and wrong password look the same
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || SlotbookError::unauthorized("Invalid email or password");

        let Some(user) = self.store.find_user_by_email(&normalize_email(email)) else {
            warn!("Login failed: unknown email");
            return Err(invalid());
        };

        let valid = verify_password(password, &user.password_hash).map_err(|e| {
            error!("Password verification error for user {}: {}", user.id, e);
            SlotbookError::password_hash(e.to_string())
        })?;

        if !valid {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(invalid());
        }

        info!("User {} logged in", user.id);
        Ok(user)
    }

    pub fn get_profile(&self, user_id: Uuid) -> Result<User> {
        self.store
            .get_user(user_id)
            .ok_or_else(|| SlotbookError::not_found("User not found"))
    }

    /// Update name, email and/or password
    pub fn update_profile(&self, user_id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        let mut user = self.get_profile(user_id)?;

        let mut errors = Vec::new();
        if let Some(ref name) = req.name {
            Self::check_name(name, &mut errors);
        }
        if let Some(ref email) = req.email {
            Self::check_email(email, &mut errors);
        }
        if let Some(ref password) = req.password {
            Self::check_password(password, &mut errors);
        }
        if !errors.is_empty() {
            return Err(SlotbookError::validation_fields(
                "Invalid profile data",
                errors,
            ));
        }

        if let Some(name) = req.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = req.email {
            user.email = normalize_email(&email);
        }
        if let Some(password) = req.password {
            user.password_hash = Self::hash(&password)?;
        }

        let user = self.store.update_user(user)?;
        info!("Updated profile of user {}", user.id);
        Ok(user)
    }

    /// All organizations, sorted by name
    pub fn list_organizations(&self) -> Vec<User> {
        let mut orgs = self.store.users_with_role(Role::Organization);
        orgs.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        orgs
    }

    pub fn get_organization(&self, organization_id: Uuid) -> Result<User> {
        self.store
            .get_user(organization_id)
            .filter(|u| u.role == Role::Organization)
            .ok_or_else(|| SlotbookError::not_found("Organization not found"))
    }
}
