// ABOUTME: Terms gate state machine blocking app usage until consent is current
// ABOUTME: Enforces the scroll-to-end plus checkbox contract before accepting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::errors::{AppError, AppResult};
use crate::terms::evaluator::AcceptanceEvaluator;
use crate::terms::models::{AcceptanceMethod, ConsentSubject};
use crate::terms::recorder::AcceptanceRecorder;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::debug;

/// Gate position with respect to the current subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Consent standing has not been evaluated yet
    Checking,
    /// Consent is required; nothing behind the gate is reachable
    Blocked,
    /// Consent is current; the app proceeds normally
    Passed,
}

impl Display for GateState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Checking => write!(f, "checking"),
            Self::Blocked => write!(f, "blocked"),
            Self::Passed => write!(f, "passed"),
        }
    }
}

/// Progress through the consent surface for one displayed terms version
///
/// Both conditions are independently necessary before the accept action
/// unlocks: the subject must scroll the terms text to its end AND tick the
/// affirmative checkbox. Neither alone is sufficient.
#[derive(Debug, Clone)]
pub struct ConsentForm {
    version_shown: String,
    scrolled_to_end: bool,
    checkbox_confirmed: bool,
}

impl ConsentForm {
    /// Start a fresh form for the terms version being displayed
    #[must_use]
    pub const fn new(version_shown: String) -> Self {
        Self {
            version_shown,
            scrolled_to_end: false,
            checkbox_confirmed: false,
        }
    }

    /// The terms version this form was rendered against
    #[must_use]
    pub fn version_shown(&self) -> &str {
        &self.version_shown
    }

    /// The subject reached the end of the terms text
    pub fn mark_scrolled_to_end(&mut self) {
        self.scrolled_to_end = true;
    }

    /// The subject ticked or unticked the affirmative checkbox
    pub fn set_checkbox(&mut self, confirmed: bool) {
        self.checkbox_confirmed = confirmed;
    }

    /// Whether the accept action is unlocked
    #[must_use]
    pub const fn can_accept(&self) -> bool {
        self.scrolled_to_end && self.checkbox_confirmed
    }
}

/// Blocks authenticated usage until the evaluator clears the subject
///
/// State machine: `Checking` resolves to `Blocked` or `Passed`; `Blocked`
/// moves to `Passed` only through a successfully recorded acceptance.
/// Dismissing the gate while blocked is deliberately inert.
pub struct TermsGate {
    evaluator: AcceptanceEvaluator,
    recorder: AcceptanceRecorder,
    state: GateState,
}

impl TermsGate {
    /// Create a gate in the unresolved state
    pub const fn new(evaluator: AcceptanceEvaluator, recorder: AcceptanceRecorder) -> Self {
        Self {
            evaluator,
            recorder,
            state: GateState::Checking,
        }
    }

    /// Current gate position
    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// Evaluate the subject and settle the gate
    ///
    /// Unauthenticated subjects (`None`) bypass the gate entirely; the terms
    /// only bind authenticated usage. Storage failures during evaluation
    /// resolve through the evaluator's failure posture and land here as
    /// `Blocked` or `Passed`, never as an error.
    pub async fn resolve(&mut self, subject: Option<&ConsentSubject>) -> GateState {
        self.state = match subject {
            None => GateState::Passed,
            Some(subject) => {
                if self.evaluator.needs_reacceptance(subject.user_id).await {
                    GateState::Blocked
                } else {
                    GateState::Passed
                }
            }
        };

        debug!(state = %self.state, "Terms gate resolved");
        self.state
    }

    /// Require a passed gate before a protected action proceeds
    ///
    /// Callers behind the gate check this before serving anything to an
    /// authenticated subject.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ErrorCode::TermsNotAccepted`] while the gate
    /// is unresolved or blocked.
    pub fn ensure_passed(&self, subject: &ConsentSubject) -> AppResult<()> {
        if self.state == GateState::Passed {
            return Ok(());
        }
        Err(AppError::terms_not_accepted(
            subject.user_id,
            self.recorder.registry().current_version(),
        ))
    }

    /// Dismiss attempt from the consent surface
    ///
    /// Blocking is mandatory, not dismissible; the gate stays exactly where
    /// it is.
    pub fn dismiss(&mut self) -> GateState {
        if self.state == GateState::Blocked {
            debug!("Dismiss ignored while consent is required");
        }
        self.state
    }

    /// Explicit consent action from the subject
    ///
    /// Only meaningful while `Blocked`. The form must be complete (scrolled
    /// to end, checkbox ticked) and is recorded with the `required_update`
    /// method. On success the gate opens; on failure it stays blocked and
    /// the error is retryable.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the gate is unresolved or the form is
    /// incomplete, and propagates recorder errors (stale version, storage
    /// failure) unchanged.
    pub async fn accept(
        &mut self,
        subject: &ConsentSubject,
        form: &ConsentForm,
    ) -> AppResult<GateState> {
        match self.state {
            GateState::Passed => Ok(GateState::Passed),
            GateState::Checking => Err(AppError::invalid_input(
                "Terms gate has not been resolved for this subject yet",
            )),
            GateState::Blocked => {
                if !form.can_accept() {
                    return Err(AppError::invalid_input(
                        "Terms must be scrolled to the end and the consent checkbox confirmed",
                    ));
                }

                self.recorder
                    .record_acceptance(
                        subject,
                        AcceptanceMethod::RequiredUpdate,
                        form.version_shown(),
                    )
                    .await?;

                self.state = GateState::Passed;
                Ok(self.state)
            }
        }
    }
}
