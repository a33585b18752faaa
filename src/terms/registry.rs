// ABOUTME: Versioned terms registry holding the single current terms version
// ABOUTME: Version changes are deploy-time configuration, never runtime mutation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::config::TermsConfig;
use crate::constants::terms;

/// Read-only registry of the currently published terms version
///
/// Exactly one version is current for the lifetime of the process. Publishing
/// a new version (a config change plus redeploy) is the only mechanism that
/// invalidates previously recorded acceptances; nothing in this type mutates.
#[derive(Debug, Clone)]
pub struct TermsRegistry {
    current_version: String,
    document_url: String,
}

impl TermsRegistry {
    /// Build the registry from server configuration
    #[must_use]
    pub fn new(config: &TermsConfig) -> Self {
        Self {
            current_version: config.current_version.clone(),
            document_url: config.document_url.clone(),
        }
    }

    /// Registry backed by the compiled-in defaults
    #[must_use]
    pub fn from_defaults() -> Self {
        Self {
            current_version: terms::CURRENT_VERSION.to_string(),
            document_url: terms::DOCUMENT_URL.to_string(),
        }
    }

    /// The version every new acceptance is recorded against
    #[must_use]
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Where the full terms document lives
    #[must_use]
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Whether the given version is the current one
    ///
    /// Versions are opaque identifiers compared by equality only; there is
    /// no ordering between versions.
    #[must_use]
    pub fn is_current(&self, version: &str) -> bool {
        self.current_version == version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_compare_by_equality_only() {
        let registry = TermsRegistry::from_defaults();
        assert!(registry.is_current(terms::CURRENT_VERSION));
        assert!(!registry.is_current("2019-01-01"));
        assert!(!registry.is_current(""));
    }

    #[test]
    fn test_registry_reflects_config() {
        let config = TermsConfig {
            current_version: "2025-09-15".to_string(),
            document_url: "https://terms.example.com/v3".to_string(),
            failure_posture: crate::config::FailurePosture::FailClosed,
        };
        let registry = TermsRegistry::new(&config);
        assert_eq!(registry.current_version(), "2025-09-15");
        assert_eq!(registry.document_url(), "https://terms.example.com/v3");
    }
}
