// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response payloads exchanged with the Schedule Planner backend.
//! Field names follow the backend's wire format (mostly camelCase; the meeting
//! and schedule routes use snake_case).
//!
//! ## Entity Identifiers
//!
//! The backend is inconsistent about identifier types: organizations are
//! sometimes numeric (`1`) and sometimes strings (`"org1"`). [`EntityId`]
//! accepts both and normalizes to a string.
//!
//! ## Model Categories
//!
//! - **Auth**: login/registration/binding requests and the session payload
//! - **Schedule**: calendar events and recurring events
//! - **Organizations**: summaries, details, members, invitations
//! - **Meetings**: availability heatmaps and meeting creation
//! - **LLM**: assistant backend configuration

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Entity Identifier
// =============================================================================

/// Identifier that may arrive as a JSON number or string.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub String);

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => EntityId(n.to_string()),
            RawId::Str(s) => EntityId(s),
        })
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId(value)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId(value.to_string())
    }
}

// =============================================================================
// Auth Models
// =============================================================================

/// Profile of the logged-in user. Held in memory only; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub nickname: String,
    pub avatar: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub orgs: Vec<OrgSummary>,
}

/// Payload returned by login, register and bind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthPayload {
    pub token: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Login with either phone or email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// Build a login request from a single account string: anything with an
    /// `@` is treated as an email, everything else as a phone number.
    pub fn from_account(account: &str, password: impl Into<String>) -> Self {
        let account = account.trim();
        let (phone, email) = if account.contains('@') {
            (None, Some(account.to_string()))
        } else {
            (Some(account.to_string()), None)
        };
        Self {
            phone,
            email,
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterRequest {
    pub nickname: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindPhoneRequest {
    pub nickname: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateUserRequest {
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// =============================================================================
// Schedule Models
// =============================================================================

/// A single calendar entry. Times are `HH:MM` strings as the backend sends them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(alias = "date")]
    pub day: NaiveDate,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

/// A repeating calendar entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u32>,
    #[serde(default)]
    pub force_create: bool,
}

/// Identifier assigned to a newly created event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatedEvent {
    pub id: EntityId,
}

// =============================================================================
// Organization Models
// =============================================================================

/// Entry in the current user's organization list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrgSummary {
    pub id: EntityId,
    pub name: String,
    /// Member count.
    #[serde(default)]
    pub members: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Creator,
    Admin,
    /// The backend sends an empty string for plain members.
    #[default]
    #[serde(other)]
    Member,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgMember {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrgDetail {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<OrgMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Member as listed for meeting planning (`uid` rather than `id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingCandidate {
    pub uid: EntityId,
    pub name: String,
}

// =============================================================================
// Meeting Models
// =============================================================================

/// Busy-count grid: one row per time slot, one column per day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Heatmap {
    pub heatmap: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub members: Vec<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMeeting {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub participants: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// LLM Models
// =============================================================================

/// Assistant backend configuration. Unknown fields are preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
