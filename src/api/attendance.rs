// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attendance endpoints.
//!
//! Both routes sit behind the permission middleware; by the time a handler
//! runs the caller's claims are already verified.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    attendance::{reconstruct, DailySession, PunchEvent},
    auth::Auth,
    error::ApiError,
    models::{parse_timestamp, AttendanceQuery, DateRange, RecordPunchRequest},
    state::AppState,
};

/// Daily sessions for one user, most recent day first.
#[utoipa::path(
    get,
    path = "/v1/attendance",
    params(AttendanceQuery),
    tag = "Attendance",
    security(("bearer" = ["get:attendance"])),
    responses(
        (status = 200, description = "Daily sessions", body = [DailySession]),
        (status = 400, description = "Missing or invalid user id, or bad date"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Missing get:attendance permission"),
    )
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> Result<Json<Vec<DailySession>>, ApiError> {
    let Query(query) = query?;
    let user_id = query
        .requested_user()
        .ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    let range = DateRange::new(query.start_date, query.end_date);

    let punches = state.store.read().await.punches_for_user(user_id, &range);
    Ok(Json(reconstruct(&punches)))
}

/// Record one card punch.
#[utoipa::path(
    post,
    path = "/v1/attendance",
    request_body = RecordPunchRequest,
    tag = "Attendance",
    security(("bearer" = ["post:attendance"])),
    responses(
        (status = 201, description = "Punch recorded", body = PunchEvent),
        (status = 400, description = "Invalid user id or timestamp"),
        (status = 422, description = "Body is not a punch request"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Missing post:attendance permission"),
    )
)]
pub async fn record_punch(
    State(state): State<AppState>,
    Auth(claims): Auth,
    request: Result<Json<RecordPunchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PunchEvent>), ApiError> {
    let Json(request) = request?;
    if request.user_id <= 0 {
        return Err(ApiError::bad_request("user_id must be a positive integer"));
    }

    let timestamp = match request.timestamp.as_deref() {
        Some(raw) => parse_timestamp(raw)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid timestamp format: {raw}")))?,
        None => Utc::now().naive_utc(),
    };

    let punch = state.store.write().await.record(request.user_id, timestamp);
    tracing::info!(
        punch_id = punch.id,
        user_id = punch.user_id,
        recorded_by = %claims.sub,
        "Recorded punch"
    );

    Ok((StatusCode::CREATED, Json(punch)))
}
