// ABOUTME: Terms-of-use acceptance and compliance engine
// ABOUTME: Registry, evaluator, recorder, blocking gate, and reconciliation sweep
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Terms-of-use acceptance and compliance engine
//!
//! One terms version is current at any time ([`registry::TermsRegistry`]).
//! The [`evaluator::AcceptanceEvaluator`] decides whether a user must
//! (re)accept, the [`recorder::AcceptanceRecorder`] writes consent events,
//! and the [`gate::TermsGate`] blocks authenticated usage until consent is
//! current. The [`reconcile::StateReconciler`] re-derives state from the
//! audit log for operator assurance.

pub mod evaluator;
pub mod gate;
pub mod models;
pub mod reconcile;
pub mod recorder;
pub mod registry;

pub use evaluator::{AcceptanceEvaluator, AcceptanceRequirement, RequirementReason};
pub use gate::{ConsentForm, GateState, TermsGate};
pub use models::{AcceptanceMethod, AcceptanceRecord, ConsentSubject, UserAcceptanceState};
pub use reconcile::{ReconcileReport, StateReconciler};
pub use recorder::AcceptanceRecorder;
pub use registry::TermsRegistry;
