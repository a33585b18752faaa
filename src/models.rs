// ABOUTME: Core account models shared across compliance, signup, and recipe modules
// ABOUTME: Defines User, UserStatus, and AccessCode structures persisted by the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! # Data Models
//!
//! Core account structures used throughout the NutriFit backend. Consent and
//! recipe domain types live next to their modules (`terms::models`,
//! `recipes::models`); this module holds what everything else shares.

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account created and usable
    #[default]
    Active,
    /// Account suspended by an operator
    Suspended,
}

impl UserStatus {
    /// Check if the account can use the app
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Active => write!(f, "active"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

/// Represents a registered user
///
/// Accounts are created through the access-code gated signup flow. Consent
/// state is tracked separately per user by the terms compliance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address (used for identification)
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Hashed password for authentication
    pub password_hash: String,
    /// Account status
    pub status: UserStatus,
    /// When the user account was created
    pub created_at: DateTime<Utc>,
    /// Last time user accessed the system
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given email and password hash
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            status: UserStatus::default(),
            created_at: now,
            last_active: now,
        }
    }
}

/// Single-use access code gating the signup flow
///
/// Codes are minted by operators and consumed exactly once; a consumed code
/// records which registration used it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCode {
    /// The code itself (unique, case-sensitive)
    pub code: String,
    /// When the code was minted
    pub created_at: DateTime<Utc>,
    /// User who consumed the code, if any
    pub consumed_by: Option<Uuid>,
    /// When the code was consumed, if consumed
    pub consumed_at: Option<DateTime<Utc>>,
}

impl AccessCode {
    /// Create a fresh, unconsumed access code
    #[must_use]
    pub fn new(code: String) -> Self {
        Self {
            code,
            created_at: Utc::now(),
            consumed_by: None,
            consumed_at: None,
        }
    }

    /// Whether this code has already been used by a registration
    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed_by.is_some()
    }
}
