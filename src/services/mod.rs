// ABOUTME: Domain service layer for business logic shared across entry points
// ABOUTME: Services are constructed at startup and injected, no global singletons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Domain service layer
//!
//! Business rules live here rather than in transport handlers so the admin
//! CLI and any future HTTP surface apply the same logic.

/// Access-code-gated signup: validation, registration, consent capture
pub mod signup;

pub use signup::{generate_access_code, mint_access_code, SignupRequest, SignupService};
