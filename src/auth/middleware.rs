// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission middleware for Axum.
//!
//! Each protected route is wrapped with a [`PermissionGuard`] naming the
//! permission it needs. The guard runs the gateway before the handler and
//! stores the verified [`Claims`] in request extensions.
//!
//! ```rust,ignore
//! let list = get(list_attendance).route_layer(middleware::from_fn_with_state(
//!     PermissionGuard::new(gateway.clone(), GET_ATTENDANCE),
//!     require_permission,
//! ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::gateway::{authorization_header, AccessGateway};
use super::Claims;

/// Gateway plus the permission a route requires.
#[derive(Clone)]
pub struct PermissionGuard {
    gateway: AccessGateway,
    permission: &'static str,
}

impl PermissionGuard {
    /// `permission` may be empty for authentication-only routes.
    pub fn new(gateway: AccessGateway, permission: &'static str) -> Self {
        Self {
            gateway,
            permission,
        }
    }

    pub fn permission(&self) -> &'static str {
        self.permission
    }
}

/// Authenticate and authorize the request, then hand it to the handler.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match authorization_header(request.headers()) {
        Ok(header) => header,
        Err(e) => return e.into_response(),
    };

    match guard.gateway.guard(header, guard.permission).await {
        Ok(claims) => {
            request.extensions_mut().insert::<Claims>(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
