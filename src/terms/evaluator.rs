// ABOUTME: Acceptance evaluator deciding whether a user must (re)accept the terms
// ABOUTME: Read-only; storage failures resolve through the configured failure posture
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::config::FailurePosture;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::terms::registry::TermsRegistry;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Why acceptance is being demanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementReason {
    /// No consent state exists for the user
    NeverAccepted,
    /// An operator forced the user back through the gate
    ReacceptanceForced,
    /// Consent on file is for a different terms version
    VersionStale {
        /// The version the user last consented to, if any
        consented: Option<String>,
    },
}

/// Outcome of evaluating a user's consent standing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptanceRequirement {
    /// Consent on file satisfies the current terms version
    UpToDate,
    /// The user must accept before proceeding
    AcceptanceRequired {
        /// Why acceptance is required
        reason: RequirementReason,
    },
}

impl AcceptanceRequirement {
    /// Whether the user is blocked until they accept
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::AcceptanceRequired { .. })
    }
}

/// Decides whether a user must (re)accept the current terms
///
/// Evaluation is strictly read-only. The check order is fixed: missing state,
/// then the forced flag, then version comparison. The forced flag wins over a
/// matching version so operators can demand re-consent without publishing a
/// new version.
#[derive(Clone)]
pub struct AcceptanceEvaluator {
    database: Arc<Database>,
    registry: TermsRegistry,
    posture: FailurePosture,
}

impl AcceptanceEvaluator {
    /// Create an evaluator over the given store and registry
    pub fn new(database: Arc<Database>, registry: TermsRegistry, posture: FailurePosture) -> Self {
        Self {
            database,
            registry,
            posture,
        }
    }

    /// The registry this evaluator compares against
    #[must_use]
    pub const fn registry(&self) -> &TermsRegistry {
        &self.registry
    }

    /// Evaluate the user's standing, propagating storage errors
    ///
    /// # Errors
    ///
    /// Returns an error if the consent state cannot be loaded. Callers that
    /// want posture-resolved behavior use [`Self::needs_reacceptance`].
    pub async fn evaluate(&self, user_id: Uuid) -> AppResult<AcceptanceRequirement> {
        let state = self
            .database
            .get_terms_state(user_id)
            .await
            .map_err(|e| AppError::database(format!("Failed to load terms state: {e}")))?;

        let Some(state) = state else {
            return Ok(AcceptanceRequirement::AcceptanceRequired {
                reason: RequirementReason::NeverAccepted,
            });
        };

        if state.needs_reacceptance {
            return Ok(AcceptanceRequirement::AcceptanceRequired {
                reason: RequirementReason::ReacceptanceForced,
            });
        }

        if state.version.as_deref() != Some(self.registry.current_version()) {
            return Ok(AcceptanceRequirement::AcceptanceRequired {
                reason: RequirementReason::VersionStale {
                    consented: state.version,
                },
            });
        }

        Ok(AcceptanceRequirement::UpToDate)
    }

    /// Whether the user must accept before using the app
    ///
    /// Storage failures never surface here; they resolve through the
    /// configured failure posture. The default posture treats an unreadable
    /// store as "acceptance required".
    pub async fn needs_reacceptance(&self, user_id: Uuid) -> bool {
        match self.evaluate(user_id).await {
            Ok(requirement) => requirement.is_required(),
            Err(e) => {
                let require = self.posture.requires_acceptance_on_error();
                warn!(
                    user_id = %user_id,
                    error = %e,
                    require_acceptance = require,
                    "Terms evaluation failed, applying failure posture"
                );
                require
            }
        }
    }
}
