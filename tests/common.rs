// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, user, and consent form helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 NutriFit.app
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `nutrifit_core`
//!
//! Common setup functions to reduce duplication across integration tests.

use anyhow::Result;
use nutrifit_core::{
    config::environment::{FailurePosture, TermsConfig},
    database_plugins::{factory::Database, DatabaseProvider},
    models::User,
    terms::{ConsentForm, ConsentSubject, TermsRegistry},
};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG environment variable controls test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Create a standard test user
pub async fn create_test_user(database: &Database) -> Result<(Uuid, User)> {
    create_test_user_with_email(database, "test@example.com").await
}

/// Create a test user with custom email
pub async fn create_test_user_with_email(database: &Database, email: &str) -> Result<(Uuid, User)> {
    let user = User::new(
        email.to_string(),
        "test_hash".to_string(),
        Some("Test User".to_string()),
    );
    let user_id = user.id;

    database.create_user(&user).await?;
    Ok((user_id, user))
}

/// Consent form with scroll and checkbox both satisfied
pub fn completed_consent_form(version: &str) -> ConsentForm {
    let mut form = ConsentForm::new(version.to_string());
    form.mark_scrolled_to_end();
    form.set_checkbox(true);
    form
}

/// Consent subject for a stored user, without origin metadata
pub fn subject_for(user: &User) -> ConsentSubject {
    ConsentSubject::for_user(user)
}

/// Registry pinned to an arbitrary version
pub fn registry_with_version(version: &str) -> TermsRegistry {
    TermsRegistry::new(&TermsConfig {
        current_version: version.to_string(),
        document_url: "https://nutrifit.app/legal/terms".to_string(),
        failure_posture: FailurePosture::FailClosed,
    })
}
