// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attendance Server - Card Punch Tracking Behind Bearer Token Access Control
//!
//! Card readers post punches; managers query daily check-in/check-out
//! sessions reconstructed from them. Every data route is guarded by access
//! tokens from an external identity provider, verified against its
//! published signing keys.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `attendance` - Daily session reconstruction
//! - `auth` - Token verification and permission checks
//! - `store` - In-process punch storage

pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
