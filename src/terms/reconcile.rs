// ABOUTME: Reconciliation sweep re-deriving consent state from the audit log
// ABOUTME: Repairs states that are missing or behind each user's newest acceptance record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::terms::models::{AcceptanceRecord, UserAcceptanceState};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Outcome of one reconciliation sweep
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Users with at least one audit record
    pub examined: usize,
    /// States rewritten from their newest audit record
    pub repaired: usize,
    /// The users whose state was repaired
    pub repaired_users: Vec<Uuid>,
}

impl ReconcileReport {
    /// Whether the sweep found every state consistent
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.repaired == 0
    }
}

/// Re-derives `UserAcceptanceState` from the newest audit record per user
///
/// The recorder writes both halves transactionally, so under normal operation
/// the sweep finds nothing. It exists for operator assurance and for data
/// imported from systems without that guarantee.
#[derive(Clone)]
pub struct StateReconciler {
    database: Arc<Database>,
}

impl StateReconciler {
    /// Create a reconciler over the given store
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Compare every user's state against their newest audit record and
    /// repair the ones that lag behind
    ///
    /// A forced re-acceptance flag set after the newest record is an
    /// operator decision, not drift, and is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit log or a state row cannot be read, or
    /// if a repair write fails.
    pub async fn sweep(&self) -> AppResult<ReconcileReport> {
        let latest = self
            .database
            .get_latest_acceptances()
            .await
            .map_err(|e| AppError::database(format!("Failed to load audit log: {e}")))?;

        let mut report = ReconcileReport {
            examined: latest.len(),
            repaired: 0,
            repaired_users: Vec::new(),
        };

        for record in &latest {
            let state = self
                .database
                .get_terms_state(record.user_id)
                .await
                .map_err(|e| AppError::database(format!("Failed to load terms state: {e}")))?;

            if Self::state_lags_record(state.as_ref(), record) {
                AppLogger::log_compliance_anomaly(
                    &record.user_id.to_string(),
                    &format!(
                        "consent state lags newest audit record for version {}",
                        record.version
                    ),
                );

                self.database
                    .apply_acceptance_to_state(record)
                    .await
                    .map_err(|e| {
                        AppError::database(format!("Failed to repair terms state: {e}"))
                    })?;

                info!(
                    user_id = %record.user_id,
                    version = %record.version,
                    "Repaired consent state from audit record"
                );
                report.repaired += 1;
                report.repaired_users.push(record.user_id);
            }
        }

        info!(
            examined = report.examined,
            repaired = report.repaired,
            "Consent reconciliation sweep finished"
        );

        Ok(report)
    }

    fn state_lags_record(state: Option<&UserAcceptanceState>, record: &AcceptanceRecord) -> bool {
        let Some(state) = state else {
            return true;
        };

        match state.accepted_at {
            None => !state.needs_reacceptance,
            Some(at) if at < record.accepted_at => true,
            Some(at) => {
                at == record.accepted_at && state.version.as_deref() != Some(record.version.as_str())
            }
        }
    }
}
