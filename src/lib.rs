// ABOUTME: Main library entry point for the NutriFit core platform
// ABOUTME: Provides terms-of-use compliance, gated signup, and the recipe pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

#![deny(unsafe_code)]

//! # NutriFit Core
//!
//! Backend core for the NutriFit nutrition platform: terms-of-use consent
//! tracking with an append-only audit trail, access-code-gated signup, and a
//! recipe ingestion pipeline that normalizes heterogeneous catalog records
//! into one canonical shape.
//!
//! ## Features
//!
//! - **Terms compliance**: versioned terms registry, per-user acceptance
//!   state, audit records, and a blocking consent gate
//! - **Gated signup**: single-use access codes consumed atomically with
//!   account creation
//! - **Recipe pipeline**: total normalization of third-party records with
//!   category, tag, macro, and difficulty inference
//! - **Source routing**: remote catalog with an optional bundled fallback
//!   dataset, strictly either/or per request
//!
//! ## Architecture
//!
//! - **Terms**: registry, evaluator, recorder, gate, and reconciliation sweep
//! - **Recipes**: raw record parsing, classifier, normalizer, and sources
//! - **Database plugins**: `SQLite` behind a provider trait
//! - **Context**: every service wired once at startup and injected
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutrifit_core::config::environment::ServerConfig;
//! use nutrifit_core::context::AppContext;
//! use nutrifit_core::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     // Load configuration and wire the service graph
//!     let config = ServerConfig::from_env()?;
//!     let context = AppContext::from_config(config).await?;
//!
//!     println!("Database backend: {}", context.database().backend_info());
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the admin binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access them.

/// Configuration management and environment parsing
pub mod config;

/// Application constants and default values
pub mod constants;

/// Application context wiring every service from configuration
pub mod context;

/// Database abstraction layer with plugin support
pub mod database_plugins;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// External API clients (network origin lookup)
pub mod external;

/// Production logging and structured output
pub mod logging;

/// User and access code data models
pub mod models;

/// Recipe ingestion pipeline: parsing, classification, normalization, sources
pub mod recipes;

/// Domain service layer for business logic shared across entry points
pub mod services;

/// Terms-of-use compliance: registry, evaluator, recorder, gate, and audit
pub mod terms;
