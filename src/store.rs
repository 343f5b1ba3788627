// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process punch store.
//!
//! Stands in for the relational table the deployment uses. Punches are
//! immutable once recorded; ids increase monotonically and queries return
//! punches in insertion order.

use chrono::NaiveDateTime;

use crate::attendance::{PunchEvent, UserId};
use crate::models::DateRange;

#[derive(Debug, Default)]
pub struct PunchStore {
    punches: Vec<PunchEvent>,
    next_id: i64,
}

impl PunchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a punch and return it with its assigned id.
    pub fn record(&mut self, user_id: UserId, timestamp: NaiveDateTime) -> PunchEvent {
        self.next_id += 1;
        let punch = PunchEvent {
            id: self.next_id,
            user_id,
            timestamp,
        };
        self.punches.push(punch.clone());
        punch
    }

    /// Punches of one user whose day falls inside `range`.
    pub fn punches_for_user(&self, user_id: UserId, range: &DateRange) -> Vec<PunchEvent> {
        self.punches
            .iter()
            .filter(|punch| punch.user_id == user_id && range.contains(&punch.timestamp))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.punches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.punches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn record_assigns_increasing_ids() {
        let mut store = PunchStore::new();
        assert!(store.is_empty());

        let first = store.record(1, at("2024-01-01 09:00:00"));
        let second = store.record(1, at("2024-01-01 09:00:00"));
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn query_filters_by_user_and_days() {
        let mut store = PunchStore::new();
        store.record(1, at("2024-01-01 09:00:00"));
        store.record(2, at("2024-01-02 09:00:00"));
        let kept = store.record(1, at("2024-01-02 17:00:00"));
        store.record(1, at("2024-01-03 08:00:00"));

        let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 2), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(store.punches_for_user(1, &range), vec![kept]);
        assert_eq!(store.punches_for_user(1, &DateRange::default()).len(), 3);
        assert!(store.punches_for_user(3, &DateRange::default()).is_empty());
    }

    #[test]
    fn query_keeps_insertion_order() {
        let mut store = PunchStore::new();
        store.record(1, at("2024-01-01 17:00:00"));
        store.record(1, at("2024-01-01 09:00:00"));

        let ids: Vec<i64> = store
            .punches_for_user(1, &DateRange::default())
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
