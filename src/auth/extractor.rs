// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated identity.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.sub is the caller
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::gateway::authorization_header;
use super::{AuthError, Claims};
use crate::state::AppState;

/// Verified claims of the caller.
///
/// Uses the claims placed in extensions by the permission middleware when
/// present; otherwise authenticates the request itself without requiring
/// any permission.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Auth(claims));
        }

        let header = authorization_header(&parts.headers)?;
        let claims = state.gateway.guard(header, "").await?;
        Ok(Auth(claims))
    }
}
