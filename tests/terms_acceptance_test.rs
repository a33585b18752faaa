// ABOUTME: Integration tests for the terms acceptance subsystem
// ABOUTME: Covers evaluator decisions, recorder writes, audit queries, and reconciliation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use nutrifit_core::{
    config::environment::FailurePosture,
    database_plugins::{factory::Database, DatabaseProvider},
    errors::ErrorCode,
    external::MockOriginClient,
    terms::{
        AcceptanceEvaluator, AcceptanceMethod, AcceptanceRecord, AcceptanceRecorder,
        AcceptanceRequirement, RequirementReason, StateReconciler, TermsRegistry,
    },
};
use std::sync::Arc;
use uuid::Uuid;

const V_OLD: &str = "2025-01-01";
const V_NEW: &str = "2025-06-01";

fn evaluator(database: &std::sync::Arc<Database>, version: &str) -> AcceptanceEvaluator {
    AcceptanceEvaluator::new(
        database.clone(),
        common::registry_with_version(version),
        FailurePosture::FailClosed,
    )
}

fn recorder(database: &std::sync::Arc<Database>, version: &str) -> AcceptanceRecorder {
    AcceptanceRecorder::new(database.clone(), common::registry_with_version(version))
}

#[tokio::test]
async fn test_new_user_requires_acceptance() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, _) = common::create_test_user(&database).await.unwrap();

    let evaluator = evaluator(&database, V_NEW);
    let requirement = evaluator.evaluate(user_id).await.unwrap();
    assert!(matches!(
        requirement,
        AcceptanceRequirement::AcceptanceRequired {
            reason: RequirementReason::NeverAccepted
        }
    ));
    assert!(evaluator.needs_reacceptance(user_id).await);
}

#[tokio::test]
async fn test_acceptance_satisfies_current_version() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    recorder(&database, V_NEW)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();

    let evaluator = evaluator(&database, V_NEW);
    assert!(matches!(
        evaluator.evaluate(user_id).await.unwrap(),
        AcceptanceRequirement::UpToDate
    ));
    assert!(!evaluator.needs_reacceptance(user_id).await);

    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert_eq!(state.version.as_deref(), Some(V_NEW));
    assert!(!state.needs_reacceptance);
    assert!(state.accepted_at.is_some());
}

#[tokio::test]
async fn test_double_record_is_idempotent_on_state() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();
    let recorder = recorder(&database, V_NEW);

    for _ in 0..2 {
        recorder
            .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
            .await
            .unwrap();
    }

    // Both audit rows land; the state document converges on the version.
    let history = database.get_acceptance_history(user_id, None).await.unwrap();
    assert_eq!(history.len(), 2);
    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert_eq!(state.version.as_deref(), Some(V_NEW));
    assert!(!state.needs_reacceptance);
}

#[tokio::test]
async fn test_version_bump_invalidates_prior_acceptance() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    recorder(&database, V_OLD)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Signup, V_OLD)
        .await
        .unwrap();

    let requirement = evaluator(&database, V_NEW).evaluate(user_id).await.unwrap();
    match requirement {
        AcceptanceRequirement::AcceptanceRequired {
            reason: RequirementReason::VersionStale { consented },
        } => assert_eq!(consented.as_deref(), Some(V_OLD)),
        other => panic!("Expected stale-version requirement, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forced_flag_overrides_matching_version() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    recorder(&database, V_NEW)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();
    database.require_reacceptance(user_id).await.unwrap();

    let evaluator = evaluator(&database, V_NEW);
    assert!(matches!(
        evaluator.evaluate(user_id).await.unwrap(),
        AcceptanceRequirement::AcceptanceRequired {
            reason: RequirementReason::ReacceptanceForced
        }
    ));

    // Accepting again clears the flag.
    recorder(&database, V_NEW)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::RequiredUpdate, V_NEW)
        .await
        .unwrap();
    assert!(matches!(
        evaluator.evaluate(user_id).await.unwrap(),
        AcceptanceRequirement::UpToDate
    ));
}

#[tokio::test]
async fn test_force_stamps_prompt_time_but_acceptance_never_does() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();
    let recorder = recorder(&database, V_NEW);

    recorder
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Signup, V_NEW)
        .await
        .unwrap();
    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert!(state.last_prompted_at.is_none());

    database.require_reacceptance(user_id).await.unwrap();
    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    let prompted_at = state.last_prompted_at;
    assert!(prompted_at.is_some());

    recorder
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::RequiredUpdate, V_NEW)
        .await
        .unwrap();
    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert_eq!(state.last_prompted_at, prompted_at);
    assert!(!state.needs_reacceptance);
}

#[tokio::test]
async fn test_recorder_rejects_stale_consented_version() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    let err = recorder(&database, V_NEW)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_OLD)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TermsVersionStale);

    // Nothing was written.
    assert!(database.get_terms_state(user_id).await.unwrap().is_none());
    assert!(database
        .get_acceptance_history(user_id, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_audit_record_denormalizes_subject_identity() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user_with_email(&database, "audit@example.com")
        .await
        .unwrap();

    let subject = common::subject_for(&user)
        .with_origin(Some("203.0.113.9".to_string()), Some("nutrifit-ios/2.1".to_string()));
    recorder(&database, V_NEW)
        .record_acceptance(&subject, AcceptanceMethod::Signup, V_NEW)
        .await
        .unwrap();

    let history = database.get_acceptance_history(user_id, None).await.unwrap();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(record.user_id, user_id);
    assert_eq!(record.email, "audit@example.com");
    assert_eq!(record.display_name.as_deref(), Some("Test User"));
    assert_eq!(record.version, V_NEW);
    assert_eq!(record.method, AcceptanceMethod::Signup);
    assert_eq!(record.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(record.user_agent.as_deref(), Some("nutrifit-ios/2.1"));
}

fn audit_record(
    user_id: Uuid,
    email: &str,
    version: &str,
    minutes_ago: i64,
) -> AcceptanceRecord {
    AcceptanceRecord {
        id: Uuid::new_v4(),
        user_id,
        email: email.to_string(),
        display_name: None,
        version: version.to_string(),
        method: AcceptanceMethod::Modal,
        accepted_at: Utc::now() - Duration::minutes(minutes_ago),
        ip_address: None,
        user_agent: None,
    }
}

#[tokio::test]
async fn test_history_is_newest_first_and_limited() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, _) = common::create_test_user(&database).await.unwrap();

    for (version, minutes_ago) in [("v1", 30), ("v2", 20), ("v3", 10)] {
        database
            .record_acceptance(&audit_record(user_id, "test@example.com", version, minutes_ago))
            .await
            .unwrap();
    }

    let history = database
        .get_acceptance_history(user_id, Some(2))
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, "v3");
    assert_eq!(history[1].version, "v2");
}

#[tokio::test]
async fn test_count_acceptances_for_version() {
    let database = common::create_test_database().await.unwrap();
    let (first, _) = common::create_test_user_with_email(&database, "first@example.com")
        .await
        .unwrap();
    let (second, _) = common::create_test_user_with_email(&database, "second@example.com")
        .await
        .unwrap();

    database
        .record_acceptance(&audit_record(first, "first@example.com", V_OLD, 60))
        .await
        .unwrap();
    database
        .record_acceptance(&audit_record(first, "first@example.com", V_NEW, 30))
        .await
        .unwrap();
    database
        .record_acceptance(&audit_record(second, "second@example.com", V_OLD, 45))
        .await
        .unwrap();

    assert_eq!(database.count_acceptances_for_version(V_OLD).await.unwrap(), 2);
    assert_eq!(database.count_acceptances_for_version(V_NEW).await.unwrap(), 1);
    assert_eq!(database.count_acceptances_for_version("never").await.unwrap(), 0);
}

#[tokio::test]
async fn test_audit_counts_group_by_acceptance_method() {
    let database = common::create_test_database().await.unwrap();
    let (_, first) = common::create_test_user_with_email(&database, "first@example.com")
        .await
        .unwrap();
    let (_, second) = common::create_test_user_with_email(&database, "second@example.com")
        .await
        .unwrap();
    let recorder = recorder(&database, V_NEW);

    recorder
        .record_acceptance(&common::subject_for(&first), AcceptanceMethod::Signup, V_NEW)
        .await
        .unwrap();
    recorder
        .record_acceptance(&common::subject_for(&first), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();
    recorder
        .record_acceptance(&common::subject_for(&second), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();

    let counts = database.count_acceptances_by_method().await.unwrap();
    assert_eq!(
        counts,
        vec![(AcceptanceMethod::Modal, 2), (AcceptanceMethod::Signup, 1)]
    );
}

#[tokio::test]
async fn test_origin_lookup_failure_never_blocks_recording() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    let recorder =
        recorder(&database, V_NEW).with_origin_resolver(Arc::new(MockOriginClient::failing()));

    let record = recorder
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();
    assert!(record.ip_address.is_none());

    // The acceptance still landed in both halves of the store.
    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert_eq!(state.version.as_deref(), Some(V_NEW));
    let history = database.get_acceptance_history(user_id, None).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_resolved_origin_is_stamped_onto_the_record() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    let recorder = recorder(&database, V_NEW).with_origin_resolver(Arc::new(
        MockOriginClient::with_origin("198.51.100.7", "Porto", "Portugal"),
    ));

    let record = recorder
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();
    assert_eq!(record.ip_address.as_deref(), Some("198.51.100.7"));

    let history = database.get_acceptance_history(user_id, None).await.unwrap();
    assert_eq!(history[0].ip_address.as_deref(), Some("198.51.100.7"));
}

#[tokio::test]
async fn test_caller_supplied_origin_wins_over_lookup() {
    let database = common::create_test_database().await.unwrap();
    let (_, user) = common::create_test_user(&database).await.unwrap();

    let recorder = recorder(&database, V_NEW).with_origin_resolver(Arc::new(
        MockOriginClient::with_origin("198.51.100.7", "Porto", "Portugal"),
    ));

    let subject = common::subject_for(&user).with_origin(
        Some("203.0.113.7".to_string()),
        Some("NutriFit-iOS/2.1".to_string()),
    );
    let record = recorder
        .record_acceptance(&subject, AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();

    assert_eq!(record.ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(record.user_agent.as_deref(), Some("NutriFit-iOS/2.1"));
}

#[tokio::test]
async fn test_latest_acceptances_keep_one_row_per_user() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, _) = common::create_test_user(&database).await.unwrap();

    database
        .record_acceptance(&audit_record(user_id, "test@example.com", V_OLD, 60))
        .await
        .unwrap();
    database
        .record_acceptance(&audit_record(user_id, "test@example.com", V_NEW, 5))
        .await
        .unwrap();

    let latest = database.get_latest_acceptances().await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].version, V_NEW);
}

#[tokio::test]
async fn test_unreachable_store_fails_closed() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, _) = common::create_test_user(&database).await.unwrap();

    let evaluator = AcceptanceEvaluator::new(
        database.clone(),
        common::registry_with_version(V_NEW),
        FailurePosture::FailClosed,
    );

    let Database::SQLite(sqlite) = &*database;
    sqlite.pool().close().await;

    assert!(evaluator.evaluate(user_id).await.is_err());
    assert!(evaluator.needs_reacceptance(user_id).await);
}

#[tokio::test]
async fn test_unreachable_store_fail_open_grants_access() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, _) = common::create_test_user(&database).await.unwrap();

    let evaluator = AcceptanceEvaluator::new(
        database.clone(),
        common::registry_with_version(V_NEW),
        FailurePosture::FailOpen,
    );

    let Database::SQLite(sqlite) = &*database;
    sqlite.pool().close().await;

    assert!(!evaluator.needs_reacceptance(user_id).await);
}

#[tokio::test]
async fn test_reconcile_repairs_missing_state() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    recorder(&database, V_NEW)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();

    // Simulate a crash between the audit append and the state upsert.
    let Database::SQLite(sqlite) = &*database;
    sqlx::query("DELETE FROM user_terms_state WHERE user_id = ?1")
        .bind(user_id.to_string())
        .execute(sqlite.pool())
        .await
        .unwrap();

    let evaluator = evaluator(&database, V_NEW);
    assert!(evaluator.needs_reacceptance(user_id).await);

    let report = StateReconciler::new(database.clone()).sweep().await.unwrap();
    assert_eq!(report.examined, 1);
    assert_eq!(report.repaired, 1);
    assert_eq!(report.repaired_users, vec![user_id]);

    assert!(!evaluator.needs_reacceptance(user_id).await);
}

#[tokio::test]
async fn test_reconcile_preserves_forced_flag() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, user) = common::create_test_user(&database).await.unwrap();

    recorder(&database, V_NEW)
        .record_acceptance(&common::subject_for(&user), AcceptanceMethod::Modal, V_NEW)
        .await
        .unwrap();
    database.require_reacceptance(user_id).await.unwrap();

    let report = StateReconciler::new(database.clone()).sweep().await.unwrap();
    assert!(report.is_clean());

    // The operator's flag survives the sweep.
    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert!(state.needs_reacceptance);
}

#[tokio::test]
async fn test_reconcile_repairs_state_behind_audit() {
    let database = common::create_test_database().await.unwrap();
    let (user_id, _) = common::create_test_user(&database).await.unwrap();

    let old = audit_record(user_id, "test@example.com", V_OLD, 60);
    let new = audit_record(user_id, "test@example.com", V_NEW, 5);
    database.record_acceptance(&old).await.unwrap();
    database.record_acceptance(&new).await.unwrap();

    // Roll the state document back behind the audit log.
    database.apply_acceptance_to_state(&old).await.unwrap();

    let report = StateReconciler::new(database.clone()).sweep().await.unwrap();
    assert_eq!(report.repaired, 1);

    let state = database.get_terms_state(user_id).await.unwrap().unwrap();
    assert_eq!(state.version.as_deref(), Some(V_NEW));
}

#[tokio::test]
async fn test_registry_compares_versions_by_equality_only() {
    let registry = TermsRegistry::from_defaults();
    assert!(registry.is_current(registry.current_version()));
    assert!(!registry.is_current("1999-01-01"));
    assert!(!registry.is_current(""));
}
