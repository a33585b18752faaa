// ABOUTME: External API client modules (network origin lookup)
// ABOUTME: Best-effort enrichment services that never gate core operations

// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 NutriFit.app

//! External API Clients
//!
//! This module contains clients for external APIs used by the NutriFit core.

pub mod origin;

// Re-export commonly used types
pub use origin::{MockOriginClient, NetworkOrigin, OriginClientConfig, OriginLookupClient, OriginResolver};
