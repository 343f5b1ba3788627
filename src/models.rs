// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive `ToSchema`
//! for the OpenAPI document.
//!
//! ## Timestamps
//!
//! Punch timestamps are wall-clock times as read at the card reader. They
//! are kept as [`NaiveDateTime`] and rendered as `YYYY-MM-DDTHH:MM:SS[.fff]Z`.
//! Incoming timestamps that carry an offset keep their local wall-clock
//! value; the offset is dropped, not applied.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::UserId;

/// Serde helpers for punch timestamps.
pub mod iso_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format("%Y-%m-%dT%H:%M:%S%.fZ"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid timestamp {raw:?}"))
        })
    }
}

/// Parse an ISO-8601 timestamp with or without offset or trailing `Z`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Body of `POST /v1/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordPunchRequest {
    /// User whose card was read.
    pub user_id: UserId,
    /// When the card was read; defaults to the server's current time (UTC).
    #[serde(default)]
    #[schema(example = "2024-01-01T09:00:00")]
    pub timestamp: Option<String>,
}

/// Query of `GET /v1/attendance`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    /// User to report on (required, positive integer).
    #[param(value_type = Option<i64>)]
    pub user_id: Option<String>,
    /// First day included (`YYYY-MM-DD`).
    #[param(value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    /// Last day included (`YYYY-MM-DD`).
    #[param(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
}

impl AttendanceQuery {
    /// The requested user, if `user_id` is a positive integer.
    pub fn requested_user(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .filter(|id| *id > 0)
    }
}

/// Inclusive range of calendar days; open on either side when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let day = ts.date();
        self.start.is_none_or(|start| day >= start) && self.end.is_none_or(|end| day <= end)
    }
}

/// Response of `GET /v1/check-auth`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckAuthResponse {
    pub success: bool,
    pub message: String,
    /// Subject of the verified token.
    pub subject: String,
}

/// Query of `GET /v1/request-login`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RequestLoginQuery {
    /// Page to return to after login; echoed back as `state`.
    #[serde(rename = "nextUrl", default)]
    pub next_url: String,
}

/// Query of `GET /v1/login-callback`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LoginCallbackQuery {
    #[serde(default)]
    pub state: String,
}

/// Response of `GET /v1/request-login`: either a confirmation or a link.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
}
