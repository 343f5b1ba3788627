// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    attendance::{DailySession, PunchEvent},
    auth::{
        policy::{GET_ATTENDANCE, POST_ATTENDANCE},
        require_permission, PermissionGuard,
    },
    models::{CheckAuthResponse, LoginResponse, RecordPunchRequest},
    state::AppState,
};

pub mod attendance;
pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let read_guard = PermissionGuard::new(state.gateway.clone(), GET_ATTENDANCE);
    let write_guard = PermissionGuard::new(state.gateway.clone(), POST_ATTENDANCE);

    let v1_routes = Router::new()
        .route("/check-auth", get(auth::check_auth))
        .route("/request-login", get(auth::request_login))
        .route("/login-callback", get(auth::login_callback))
        .route(
            "/attendance",
            get(attendance::list_attendance)
                .route_layer(middleware::from_fn_with_state(read_guard, require_permission))
                .merge(
                    post(attendance::record_punch).route_layer(middleware::from_fn_with_state(
                        write_guard,
                        require_permission,
                    )),
                ),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Registers the `bearer` scheme the protected paths refer to.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::check_auth,
        auth::request_login,
        auth::login_callback,
        attendance::list_attendance,
        attendance::record_punch
    ),
    components(
        schemas(
            PunchEvent,
            DailySession,
            RecordPunchRequest,
            CheckAuthResponse,
            LoginResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Token verification and browser login"),
        (name = "Attendance", description = "Card punches and daily sessions")
    )
)]
struct ApiDoc;
