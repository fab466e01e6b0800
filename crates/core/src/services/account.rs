//! Account service: registration, login and the bootstrap administrator.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use aduan_common::{AppError, AppResult, IdGenerator, config::BootstrapAdminConfig};
use aduan_db::{
    entities::user::{self, UserRole},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::audit::{AuditAction, AuditService};

/// Input for registering an account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    pub role: UserRole,

    /// Required for students.
    #[validate(length(min = 1, max = 32))]
    pub student_number: Option<String>,
}

/// Account service.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    audit: AuditService,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, audit: AuditService) -> Self {
        Self {
            user_repo,
            audit,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// Emails are compared case-insensitively; a taken email is a conflict.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let student_number = input
            .student_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        if input.role == UserRole::Student && student_number.is_none() {
            return Err(AppError::Validation(
                "Student number is required for students".to_string(),
            ));
        }

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!("Email already registered: {email}")));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(input.role),
            student_number: Set(student_number),
            registered_at: Set(chrono::Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;

        info!(user_id = %user.id, role = %user.role, "Registered account");
        self.audit
            .record(AuditAction::UserRegistered, &user.id, user.role.as_str())
            .await;

        Ok(user)
    }

    /// Authenticate by email and password.
    ///
    /// When `role` is given the account must hold it. Every failure is
    /// reported as `Unauthorized` so callers cannot tell which emails exist.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        role: Option<UserRole>,
    ) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if role.is_some_and(|r| r != user.role) {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_email(email).await
    }

    /// Create the configured administrator if the email is not yet taken.
    ///
    /// Returns the administrator account, or `None` when nothing is configured.
    pub async fn ensure_bootstrap_admin(
        &self,
        config: Option<&BootstrapAdminConfig>,
    ) -> AppResult<Option<user::Model>> {
        let Some(config) = config else {
            return Ok(None);
        };

        if let Some(existing) = self.user_repo.find_by_email(&config.email).await? {
            if existing.role != UserRole::Admin {
                return Err(AppError::Conflict(format!(
                    "Bootstrap admin email belongs to a {} account",
                    existing.role
                )));
            }
            return Ok(Some(existing));
        }

        let admin = self
            .register(RegisterInput {
                name: config.name.clone(),
                email: config.email.clone(),
                password: config.password.clone(),
                role: UserRole::Admin,
                student_number: None,
            })
            .await?;

        info!(user_id = %admin.id, "Created bootstrap administrator");
        Ok(Some(admin))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
