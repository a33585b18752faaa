// ABOUTME: Network origin lookup client for consent audit provenance
// ABOUTME: Queries an ipapi-compatible endpoint; failures degrade to absent origin data

// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 NutriFit.app

//! Network Origin Lookup Client
//!
//! Resolves the caller's public network origin through an ipapi-compatible
//! HTTP endpoint. The result is attached to terms acceptance audit records
//! as best-effort provenance; every failure mode here is survivable and the
//! caller records the acceptance without origin data.

use crate::constants::timeouts;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Origin lookup client configuration
#[derive(Debug, Clone)]
pub struct OriginClientConfig {
    /// Base URL of the ipapi-compatible service (default: <https://ipapi.co>)
    pub base_url: String,
    /// Request timeout in seconds, kept short because callers treat the
    /// lookup as optional enrichment
    pub timeout_secs: u64,
}

impl Default for OriginClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ipapi.co".to_string(),
            timeout_secs: timeouts::ORIGIN_LOOKUP_TIMEOUT_SECS,
        }
    }
}

/// Resolved network origin for a consent event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkOrigin {
    /// Public IP address
    pub ip: String,
    /// City, when the service can resolve it
    pub city: Option<String>,
    /// Country name, when the service can resolve it
    pub country: Option<String>,
}

impl NetworkOrigin {
    /// Compact single-line form stored on audit records
    #[must_use]
    pub fn descriptor(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{} ({city}, {country})", self.ip),
            (None, Some(country)) => format!("{} ({country})", self.ip),
            _ => self.ip.clone(),
        }
    }
}

/// ipapi.co response shape
///
/// The service reports failures in-band as `{"error": true, "reason": ...}`
/// with a 200 status, so both shapes are parsed here.
#[derive(Debug, Deserialize)]
struct OriginResponse {
    ip: Option<String>,
    city: Option<String>,
    country_name: Option<String>,
    error: Option<bool>,
    reason: Option<String>,
}

/// Sources that can resolve a network origin
///
/// Abstracted so consent recording can run against a fake in tests without
/// touching the network.
#[async_trait]
pub trait OriginResolver: Send + Sync {
    /// Resolve the origin of the current process's outbound address
    async fn lookup_self(&self) -> AppResult<NetworkOrigin>;
}

/// HTTP client for an ipapi-compatible origin service
pub struct OriginLookupClient {
    config: OriginClientConfig,
    http_client: reqwest::Client,
}

impl OriginLookupClient {
    /// Create a new origin lookup client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    pub fn new(config: OriginClientConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn fetch_json(&self, url: &str) -> AppResult<NetworkOrigin> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::external_service("origin lookup", e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "origin lookup",
                format!("HTTP {}", response.status()),
            ));
        }

        let body: OriginResponse = response.json().await.map_err(|e| {
            AppError::external_service("origin lookup", format!("JSON parse error: {e}"))
        })?;

        if body.error == Some(true) {
            return Err(AppError::external_service(
                "origin lookup",
                body.reason.unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }

        let ip = body.ip.ok_or_else(|| {
            AppError::external_service("origin lookup", "response missing ip field")
        })?;

        Ok(NetworkOrigin {
            ip,
            city: body.city,
            country: body.country_name,
        })
    }
}

#[async_trait]
impl OriginResolver for OriginLookupClient {
    async fn lookup_self(&self) -> AppResult<NetworkOrigin> {
        let url = format!("{}/json/", self.config.base_url);
        self.fetch_json(&url).await
    }
}

/// Mock origin resolver for testing (no network calls)
pub struct MockOriginClient {
    origin: Option<NetworkOrigin>,
}

impl MockOriginClient {
    /// Resolver that always succeeds with a fixed origin
    #[must_use]
    pub fn with_origin(ip: &str, city: &str, country: &str) -> Self {
        Self {
            origin: Some(NetworkOrigin {
                ip: ip.to_string(),
                city: Some(city.to_string()),
                country: Some(country.to_string()),
            }),
        }
    }

    /// Resolver that always fails, for exercising the degraded path
    #[must_use]
    pub const fn failing() -> Self {
        Self { origin: None }
    }
}

#[async_trait]
impl OriginResolver for MockOriginClient {
    async fn lookup_self(&self) -> AppResult<NetworkOrigin> {
        self.origin.clone().ok_or_else(|| {
            AppError::external_service("origin lookup", "mock configured to fail")
        })
    }
}
