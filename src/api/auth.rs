// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::auth::{gateway::authorization_header, Auth, LoginFlow, LoginOutcome};
use crate::error::ApiError;
use crate::models::{CheckAuthResponse, LoginCallbackQuery, LoginResponse, RequestLoginQuery};
use crate::state::AppState;

/// Confirm the bearer token is valid. No permission is required.
#[utoipa::path(
    get,
    path = "/v1/check-auth",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token accepted", body = CheckAuthResponse),
        (status = 401, description = "Authentication failed"),
        (status = 503, description = "Signing keys could not be fetched"),
    )
)]
pub async fn check_auth(Auth(claims): Auth) -> Json<CheckAuthResponse> {
    Json(CheckAuthResponse {
        success: true,
        message: "Authenticated".to_string(),
        subject: claims.sub,
    })
}

fn login_flow(state: &AppState) -> Result<Arc<LoginFlow>, ApiError> {
    state
        .login
        .clone()
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Login is not configured"))
}

/// Start a browser login unless the request already carries a valid token.
#[utoipa::path(
    get,
    path = "/v1/request-login",
    params(RequestLoginQuery),
    tag = "Auth",
    responses(
        (status = 200, description = "Already logged in, or the login link", body = LoginResponse),
        (status = 404, description = "Login is not configured"),
        (status = 503, description = "Signing keys could not be fetched"),
    )
)]
pub async fn request_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<RequestLoginQuery>, QueryRejection>,
) -> Result<Json<LoginResponse>, Response> {
    let Query(query) = query.map_err(|e| ApiError::from(e).into_response())?;
    let flow = login_flow(&state).map_err(IntoResponse::into_response)?;

    // An unreadable header is just another reason to log in.
    let authorization = authorization_header(&headers).ok().flatten();
    let outcome = flow
        .request_login(&state.gateway, authorization, &query.next_url)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(match outcome {
        LoginOutcome::AlreadyLoggedIn(claims) => LoginResponse {
            success: true,
            message: Some("Already logged in".to_string()),
            subject: Some(claims.sub),
            login_url: None,
        },
        LoginOutcome::LoginRequired(link) => LoginResponse {
            success: true,
            message: None,
            subject: None,
            login_url: Some(link.into()),
        },
    }))
}

/// Provider callback; forwards the browser to the web app.
#[utoipa::path(
    get,
    path = "/v1/login-callback",
    params(LoginCallbackQuery),
    tag = "Auth",
    responses(
        (status = 303, description = "Redirect to the web app's callback page"),
        (status = 404, description = "Login is not configured"),
    )
)]
pub async fn login_callback(
    State(state): State<AppState>,
    query: Result<Query<LoginCallbackQuery>, QueryRejection>,
) -> Result<Redirect, ApiError> {
    let Query(query) = query?;
    let target = login_flow(&state)?.callback_target(&query.state);
    tracing::debug!(%target, "Login callback");
    Ok(Redirect::to(target.as_str()))
}
