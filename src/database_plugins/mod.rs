// ABOUTME: Database abstraction layer for NutriFit core services
// ABOUTME: Plugin architecture with a SQLite backend behind a provider trait

use crate::models::{AccessCode, User};
use crate::terms::models::{AcceptanceMethod, AcceptanceRecord, UserAcceptanceState};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub mod factory;
pub mod sqlite;

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the application layer.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection
    async fn new(database_url: &str) -> Result<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> Result<()>;

    // ================================
    // User Management
    // ================================

    /// Create a new user account
    async fn create_user(&self, user: &User) -> Result<Uuid>;

    /// Create a user and consume an access code in one transaction
    ///
    /// Returns `false` without creating the user when the code was already
    /// consumed, so a lost signup race leaves no orphan account.
    async fn register_user_with_code(&self, user: &User, code: &str) -> Result<bool>;

    /// Get user by ID
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Get user by email address
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get user by email (required - fails if not found)
    async fn get_user_by_email_required(&self, email: &str) -> Result<User>;

    /// Get total number of users
    async fn get_user_count(&self) -> Result<i64>;

    // ================================
    // Access Codes
    // ================================

    /// Store a newly minted access code
    async fn create_access_code(&self, access_code: &AccessCode) -> Result<()>;

    /// Look up an access code by its literal value
    async fn get_access_code(&self, code: &str) -> Result<Option<AccessCode>>;

    /// Atomically consume an access code for the given user
    ///
    /// Returns `true` when this call consumed the code, `false` when the
    /// code was already consumed by an earlier call.
    async fn consume_access_code(&self, code: &str, user_id: Uuid) -> Result<bool>;

    /// List access codes, optionally including consumed ones
    async fn list_access_codes(&self, include_consumed: bool) -> Result<Vec<AccessCode>>;

    // ================================
    // Terms Acceptance
    // ================================

    /// Get the current terms state for a user
    async fn get_terms_state(&self, user_id: Uuid) -> Result<Option<UserAcceptanceState>>;

    /// Record a terms acceptance
    ///
    /// Appends the audit record and updates the user's current state in a
    /// single transaction so the two can never diverge.
    async fn record_acceptance(&self, record: &AcceptanceRecord) -> Result<()>;

    /// Re-apply an existing audit record to the user's current state
    ///
    /// Used by the reconciliation sweep to repair states that drifted from
    /// the audit log. Does not append a new audit record.
    async fn apply_acceptance_to_state(&self, record: &AcceptanceRecord) -> Result<()>;

    /// Flag a single user as requiring re-acceptance
    async fn require_reacceptance(&self, user_id: Uuid) -> Result<()>;

    /// Flag every known user state as requiring re-acceptance
    ///
    /// Returns the number of states updated.
    async fn require_reacceptance_all(&self) -> Result<u64>;

    /// Get acceptance history for a user, newest first
    async fn get_acceptance_history(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<AcceptanceRecord>>;

    /// Count audit records for a specific terms version
    async fn count_acceptances_for_version(&self, version: &str) -> Result<i64>;

    /// Count audit records per acceptance method
    ///
    /// Returns one entry for each method present in the audit log, for
    /// reporting on how users actually consent.
    async fn count_acceptances_by_method(&self) -> Result<Vec<(AcceptanceMethod, i64)>>;

    /// Get each user's most recent acceptance record
    async fn get_latest_acceptances(&self) -> Result<Vec<AcceptanceRecord>>;

    /// List all current terms states
    async fn list_terms_states(&self) -> Result<Vec<UserAcceptanceState>>;
}
