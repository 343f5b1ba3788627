// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Daily Session Reconstruction
//!
//! Turns raw card punches into one work session per user per calendar day.
//!
//! - Punches are grouped by `(user, date)` using the date the timestamp
//!   already carries; no timezone conversion happens here.
//! - Within a day the earliest punch is the check-in and the latest the
//!   check-out. Punches in between are ignored, so a day with a lunch break
//!   reports the span from first to last punch.
//! - A day with a single punch yields a zero-length session (clocked in,
//!   not yet out).
//! - Duration is in hours, rounded half-up to two decimals.
//! - Output is most recent day first; sessions on the same day are ordered
//!   by user id.
//!
//! The result depends only on the multiset of punches, not on their order.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::iso_timestamp;

pub type UserId = i64;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// One raw card swipe as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PunchEvent {
    /// Server-assigned identifier.
    pub id: i64,
    /// User who swiped.
    pub user_id: UserId,
    /// When the card was read.
    #[serde(with = "iso_timestamp")]
    #[schema(value_type = String, example = "2024-01-01T09:00:00Z")]
    pub timestamp: NaiveDateTime,
}

/// Derived check-in/check-out pair for one user on one day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySession {
    #[serde(skip)]
    pub user_id: UserId,
    /// Calendar day (`YYYY-MM-DD`).
    #[schema(value_type = String, example = "2024-01-01")]
    pub date: NaiveDate,
    /// Earliest punch of the day.
    #[serde(rename = "checkInTime", serialize_with = "iso_timestamp::serialize")]
    #[schema(value_type = String, example = "2024-01-01T09:00:00Z")]
    pub check_in: NaiveDateTime,
    /// Latest punch of the day.
    #[serde(rename = "checkOutTime", serialize_with = "iso_timestamp::serialize")]
    #[schema(value_type = String, example = "2024-01-01T17:30:00Z")]
    pub check_out: NaiveDateTime,
    /// Hours between check-in and check-out, two decimals.
    #[serde(rename = "workDuration")]
    #[schema(example = 8.5)]
    pub duration_hours: f64,
}

/// Rebuild daily sessions from punches in any order.
pub fn reconstruct(events: &[PunchEvent]) -> Vec<DailySession> {
    let mut days: BTreeMap<(Reverse<NaiveDate>, UserId), Vec<&PunchEvent>> = BTreeMap::new();
    for event in events {
        days.entry((Reverse(event.timestamp.date()), event.user_id))
            .or_default()
            .push(event);
    }

    let mut sessions = Vec::with_capacity(days.len());
    for ((Reverse(date), user_id), mut punches) in days {
        // Stable: equal timestamps keep insertion order.
        punches.sort_by_key(|punch| punch.timestamp);

        let (Some(first), Some(last)) = (punches.first(), punches.last()) else {
            continue;
        };

        sessions.push(DailySession {
            user_id,
            date,
            check_in: first.timestamp,
            check_out: last.timestamp,
            duration_hours: hours_rounded(last.timestamp - first.timestamp),
        });
    }
    sessions
}

/// Hours to two decimals, rounding half up on exact milliseconds.
fn hours_rounded(span: chrono::TimeDelta) -> f64 {
    let millis = span.num_milliseconds().max(0);
    let centi_hours = (millis * 100 + MILLIS_PER_HOUR / 2) / MILLIS_PER_HOUR;
    centi_hours as f64 / 100.0
}
