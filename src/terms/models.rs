// ABOUTME: Data models for the terms-of-use compliance engine
// ABOUTME: Consent subjects, per-user acceptance state, and append-only audit records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// How a user expressed consent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceMethod {
    /// Accepted as part of account creation
    Signup,
    /// Accepted through the in-app consent modal
    Modal,
    /// Accepted after being forced back through the gate by a terms update
    RequiredUpdate,
}

impl AcceptanceMethod {
    /// Stable string form used in storage and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Modal => "modal",
            Self::RequiredUpdate => "required_update",
        }
    }

    /// Parse the stored string form back into a method
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "signup" => Some(Self::Signup),
            "modal" => Some(Self::Modal),
            "required_update" => Some(Self::RequiredUpdate),
            _ => None,
        }
    }
}

impl Display for AcceptanceMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// The party whose consent is being evaluated or recorded
///
/// Identity fields are denormalized onto every audit record so the record
/// stays meaningful even if the user entity later changes or disappears.
/// Origin metadata is optional; it is captured when the caller has it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentSubject {
    /// User the consent belongs to
    pub user_id: Uuid,
    /// Email at the time of the consent action
    pub email: String,
    /// Display name at the time of the consent action, if set
    pub display_name: Option<String>,
    /// Client IP at the time of the consent action, if known
    pub ip_address: Option<String>,
    /// Client user agent at the time of the consent action, if known
    pub user_agent: Option<String>,
}

impl ConsentSubject {
    /// Create a subject with no origin metadata
    #[must_use]
    pub const fn new(user_id: Uuid, email: String) -> Self {
        Self {
            user_id,
            email,
            display_name: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Build a subject from a user entity
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach origin metadata captured from the client connection
    #[must_use]
    pub fn with_origin(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// Current consent state for one user
///
/// This is the mutable "what do we believe right now" row. The immutable
/// history lives in [`AcceptanceRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAcceptanceState {
    /// User this state belongs to
    pub user_id: Uuid,
    /// Terms version the user last accepted, `None` if they never accepted
    pub version: Option<String>,
    /// When the user last accepted, `None` if they never accepted
    pub accepted_at: Option<DateTime<Utc>>,
    /// Set when an operator forces the user back through the gate
    pub needs_reacceptance: bool,
    /// When the user was last shown the consent gate
    pub last_prompted_at: Option<DateTime<Utc>>,
}

impl UserAcceptanceState {
    /// State for a user with no consent on file
    #[must_use]
    pub const fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            version: None,
            accepted_at: None,
            needs_reacceptance: false,
            last_prompted_at: None,
        }
    }

    /// Whether the state satisfies the given terms version
    ///
    /// A forced re-acceptance flag overrides a matching version.
    #[must_use]
    pub fn satisfies(&self, current_version: &str) -> bool {
        !self.needs_reacceptance && self.version.as_deref() == Some(current_version)
    }
}

/// One immutable consent event
///
/// Records are append-only; corrections are expressed as new records, never
/// as updates to old ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptanceRecord {
    /// Unique record ID
    pub id: Uuid,
    /// User who consented
    pub user_id: Uuid,
    /// Email denormalized from the subject at consent time
    pub email: String,
    /// Display name denormalized from the subject at consent time
    pub display_name: Option<String>,
    /// Terms version that was consented to
    pub version: String,
    /// How the consent was expressed
    pub method: AcceptanceMethod,
    /// When the consent was recorded
    pub accepted_at: DateTime<Utc>,
    /// Client IP captured at consent time, if known
    pub ip_address: Option<String>,
    /// Client user agent captured at consent time, if known
    pub user_agent: Option<String>,
}

impl AcceptanceRecord {
    /// Build a record for a consent event happening now
    #[must_use]
    pub fn new(subject: &ConsentSubject, version: String, method: AcceptanceMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: subject.user_id,
            email: subject.email.clone(),
            display_name: subject.display_name.clone(),
            version,
            method,
            accepted_at: Utc::now(),
            ip_address: subject.ip_address.clone(),
            user_agent: subject.user_agent.clone(),
        }
    }
}
