// ABOUTME: Access-code-gated signup: validation, registration, and consent capture
// ABOUTME: Registers the user and consumes the access code in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::config::environment::SignupConfig;
use crate::constants::signup::{ACCESS_CODE_LENGTH, MIN_PASSWORD_LENGTH};
use crate::database_plugins::{factory::Database, DatabaseProvider};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{AccessCode, User};
use crate::terms::{AcceptanceMethod, AcceptanceRecorder, ConsentForm, ConsentSubject};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for a registration attempt
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub display_name: Option<String>,
    pub access_code: Option<String>,
    /// Consent form state as the user left it, including the version shown
    pub consent: ConsentForm,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Signup business logic
///
/// Constructed once at startup and handed to callers; holds no mutable state.
#[derive(Clone)]
pub struct SignupService {
    database: Arc<Database>,
    recorder: AcceptanceRecorder,
    require_access_code: bool,
}

impl SignupService {
    #[must_use]
    pub fn new(database: Arc<Database>, recorder: AcceptanceRecorder, config: &SignupConfig) -> Self {
        Self {
            database,
            recorder,
            require_access_code: config.require_access_code,
        }
    }

    /// Register a new user
    ///
    /// Validates the request, consumes the access code when one is required,
    /// creates the account, and records the signup consent. A failed consent
    /// write does not undo the account; the terms gate re-prompts at sign-in.
    ///
    /// # Errors
    ///
    /// Returns validation errors for malformed input, access code errors for
    /// unknown or reused codes, and a conflict error for duplicate emails
    pub async fn register(&self, request: SignupRequest) -> AppResult<User> {
        let email = request.email.trim().to_lowercase();
        info!("Signup attempt for email: {email}");

        self.validate(&email, &request)?;

        if self
            .database
            .get_user_by_email(&email)
            .await
            .map_err(|e| AppError::database(format!("Failed to check existing email: {e}")))?
            .is_some()
        {
            AppLogger::log_signup_event(&email, "signup_rejected", false, Some("email in use"));
            return Err(AppError::already_exists(format!("Account for {email}")));
        }

        let access_code = if self.require_access_code {
            Some(self.precheck_access_code(&email, request.access_code.as_deref()).await?)
        } else {
            None
        };

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = User::new(email.clone(), password_hash, request.display_name.clone());

        if let Some(code) = &access_code {
            let registered = self
                .database
                .register_user_with_code(&user, code)
                .await
                .map_err(|e| AppError::database(format!("Failed to register user: {e}")))?;
            if !registered {
                // Another signup consumed the code between precheck and commit.
                AppLogger::log_signup_event(&email, "signup_rejected", false, Some("code raced"));
                return Err(AppError::access_code_consumed(code.clone()));
            }
        } else {
            self.database
                .create_user(&user)
                .await
                .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;
        }

        let subject = ConsentSubject::for_user(&user)
            .with_origin(request.ip_address.clone(), request.user_agent.clone());
        if let Err(e) = self
            .recorder
            .record_acceptance(&subject, AcceptanceMethod::Signup, request.consent.version_shown())
            .await
        {
            // The account already exists; the gate stays closed until a
            // consent record lands, so the user re-accepts at sign-in.
            warn!("Consent record failed during signup for {email}: {e}");
        }

        AppLogger::log_signup_event(&email, "signup_completed", true, access_code.as_deref());
        info!("User registered successfully: {email} ({})", user.id);
        Ok(user)
    }

    fn validate(&self, email: &str, request: &SignupRequest) -> AppResult<()> {
        if !Self::is_valid_email(email) {
            return Err(AppError::invalid_input("Invalid email address"));
        }

        if !Self::is_valid_password(&request.password) {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if request.password != request.password_confirmation {
            return Err(AppError::invalid_input("Password confirmation does not match"));
        }

        if !request.consent.can_accept() {
            return Err(AppError::invalid_input(
                "Terms must be scrolled to the end and the consent checkbox confirmed",
            ));
        }

        // Reject a stale consent form before any account state is written.
        let registry = self.recorder.registry();
        if !registry.is_current(request.consent.version_shown()) {
            return Err(AppError::terms_version_stale(
                request.consent.version_shown(),
                registry.current_version(),
            ));
        }

        Ok(())
    }

    async fn precheck_access_code(&self, email: &str, code: Option<&str>) -> AppResult<String> {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            AppLogger::log_signup_event(email, "signup_rejected", false, Some("code missing"));
            return Err(AppError::access_code_invalid());
        };

        match self
            .database
            .get_access_code(code)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up access code: {e}")))?
        {
            None => {
                AppLogger::log_signup_event(email, "signup_rejected", false, Some("code unknown"));
                Err(AppError::access_code_invalid())
            }
            Some(found) if found.is_consumed() => {
                AppLogger::log_signup_event(email, "signup_rejected", false, Some("code used"));
                Err(AppError::access_code_consumed(code))
            }
            Some(_) => Ok(code.to_string()),
        }
    }

    /// Basic structural email check: local part, `@`, dotted domain
    #[must_use]
    pub fn is_valid_email(email: &str) -> bool {
        if email.len() <= 5 {
            return false;
        }
        let Some(at_pos) = email.find('@') else {
            return false;
        };
        if at_pos == 0 || at_pos == email.len() - 1 {
            return false;
        }
        let domain_part = &email[at_pos + 1..];
        domain_part.contains('.')
    }

    /// Minimum-length password check
    #[must_use]
    pub const fn is_valid_password(password: &str) -> bool {
        password.len() >= MIN_PASSWORD_LENGTH
    }
}

/// Generate a fresh access code string
#[must_use]
pub fn generate_access_code() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCESS_CODE_LENGTH)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

/// Mint and persist a new signup access code
///
/// # Errors
///
/// Returns a database error if the code cannot be stored
pub async fn mint_access_code(database: &Database) -> AppResult<AccessCode> {
    let access_code = AccessCode::new(generate_access_code());
    database
        .create_access_code(&access_code)
        .await
        .map_err(|e| AppError::database(format!("Failed to store access code: {e}")))?;
    info!("Minted access code {}", access_code.code);
    Ok(access_code)
}
