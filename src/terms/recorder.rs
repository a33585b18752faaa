// ABOUTME: Acceptance recorder writing audit records and the per-user consent state
// ABOUTME: Rejects stale versions and enriches records with best-effort network origin
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::external::origin::OriginResolver;
use crate::logging::AppLogger;
use crate::terms::models::{AcceptanceMethod, AcceptanceRecord, ConsentSubject};
use crate::terms::registry::TermsRegistry;
use std::sync::Arc;
use tracing::debug;

/// Writes consent events to the audit log and current-state view
///
/// The audit append and state update happen in one storage transaction, so a
/// recorded acceptance is always visible to the evaluator and the audit trail
/// can never run ahead of the state (or vice versa).
#[derive(Clone)]
pub struct AcceptanceRecorder {
    database: Arc<Database>,
    registry: TermsRegistry,
    origin_resolver: Option<Arc<dyn OriginResolver>>,
}

impl AcceptanceRecorder {
    /// Create a recorder without origin enrichment
    pub fn new(database: Arc<Database>, registry: TermsRegistry) -> Self {
        Self {
            database,
            registry,
            origin_resolver: None,
        }
    }

    /// Enable network origin enrichment through the given resolver
    #[must_use]
    pub fn with_origin_resolver(mut self, resolver: Arc<dyn OriginResolver>) -> Self {
        self.origin_resolver = Some(resolver);
        self
    }

    /// The registry this recorder stamps versions from
    #[must_use]
    pub const fn registry(&self) -> &TermsRegistry {
        &self.registry
    }

    /// Record that the subject accepted the terms version they were shown
    ///
    /// `consented_version` is the version the subject actually saw. If the
    /// published version changed between render and click, the consent is
    /// rejected rather than silently recorded against a text the user never
    /// read.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::TermsVersionStale`] when
    /// `consented_version` is not current, or a database error when the
    /// write fails. Origin lookup failures never fail the recording.
    pub async fn record_acceptance(
        &self,
        subject: &ConsentSubject,
        method: AcceptanceMethod,
        consented_version: &str,
    ) -> AppResult<AcceptanceRecord> {
        if !self.registry.is_current(consented_version) {
            AppLogger::log_consent_event(
                &subject.user_id.to_string(),
                "acceptance_rejected_stale_version",
                consented_version,
                false,
            );
            return Err(AppError::terms_version_stale(
                consented_version,
                self.registry.current_version(),
            ));
        }

        let subject = self.enrich_with_origin(subject).await;

        let record = AcceptanceRecord::new(
            &subject,
            self.registry.current_version().to_string(),
            method,
        );

        if let Err(e) = self.database.record_acceptance(&record).await {
            AppLogger::log_consent_event(
                &subject.user_id.to_string(),
                "acceptance_write_failed",
                &record.version,
                false,
            );
            return Err(AppError::database(format!(
                "Failed to record terms acceptance: {e}"
            )));
        }

        AppLogger::log_consent_event(
            &subject.user_id.to_string(),
            method.as_str(),
            &record.version,
            true,
        );

        Ok(record)
    }

    /// Fill in the subject's network origin when it is missing
    ///
    /// Lookup failures are logged and swallowed; provenance is enrichment,
    /// not a required input.
    async fn enrich_with_origin(&self, subject: &ConsentSubject) -> ConsentSubject {
        let Some(resolver) = &self.origin_resolver else {
            return subject.clone();
        };

        if subject.ip_address.is_some() {
            return subject.clone();
        }

        match resolver.lookup_self().await {
            Ok(origin) => {
                debug!(origin = %origin.descriptor(), "Resolved network origin for consent record");
                subject
                    .clone()
                    .with_origin(Some(origin.ip), subject.user_agent.clone())
            }
            Err(e) => {
                debug!(error = %e, "Origin lookup failed, recording acceptance without origin");
                subject.clone()
            }
        }
    }
}
