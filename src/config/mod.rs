// ABOUTME: Configuration management module for centralized service settings
// ABOUTME: Handles environment-driven configuration for database, terms, recipes, and signup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app
//! Configuration module for the NutriFit backend core
//!
//! Centralized configuration management for all components:
//!
//! - **Environment**: Service configuration from environment variables
//! - **Terms**: Published terms version and evaluator failure posture
//! - **Recipes**: Remote catalog endpoint and bundled-fallback gating
//! - **Signup**: Access-code requirements for registration

/// Environment and service configuration
pub mod environment;

// Re-export main configuration types from environment
pub use environment::{
    DatabaseUrl, Environment, FailurePosture, LogLevel, ServerConfig, TermsConfig,
};
