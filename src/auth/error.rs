// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every failure on the access control path is one of these variants. Each
//! carries a stable machine-readable code and maps to a fixed HTTP status:
//! 401 for authentication failures, 403 for authorization failures and 503
//! when the identity provider's key set could not be fetched.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Access control failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Authorization header is expected.")]
    HeaderMissing,
    /// Header does not use the `Bearer` scheme
    #[error("Authorization header must start with \"Bearer\".")]
    InvalidScheme,
    /// `Bearer` with nothing after it
    #[error("Token not found.")]
    TokenMissing,
    /// Header or token structure could not be parsed
    #[error("{0}")]
    HeaderMalformed(&'static str),
    /// Token `kid` is not in the identity provider's key set
    #[error("Unable to find the appropriate key.")]
    NoMatchingKey,
    /// Signature does not verify against the located key
    #[error("Token signature is invalid.")]
    InvalidSignature,
    /// `exp` is at or before the current instant
    #[error("Token expired.")]
    TokenExpired,
    /// Audience, issuer or expiry claim is wrong or absent
    #[error("Incorrect claims: {0}")]
    InvalidClaims(&'static str),
    /// Token carries no `permissions` claim at all
    #[error("Permissions not included in JWT.")]
    PermissionsClaimMissing,
    /// Token has a `permissions` claim without the required entry
    #[error("Permission not found: {0}")]
    PermissionDenied(String),
    /// Key set could not be retrieved from the identity provider
    #[error("Failed to fetch signing keys: {0}")]
    KeyFetchFailed(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "header_missing",
            AuthError::InvalidScheme => "invalid_scheme",
            AuthError::TokenMissing => "token_missing",
            AuthError::HeaderMalformed(_) => "header_malformed",
            AuthError::NoMatchingKey => "no_matching_key",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::PermissionDenied(_) => "permission_denied",
            AuthError::KeyFetchFailed(_) => "key_fetch_failed",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::HeaderMissing
            | AuthError::InvalidScheme
            | AuthError::TokenMissing
            | AuthError::HeaderMalformed(_)
            | AuthError::NoMatchingKey
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InvalidClaims(_) => StatusCode::UNAUTHORIZED,
            AuthError::PermissionsClaimMissing | AuthError::PermissionDenied(_) => {
                StatusCode::FORBIDDEN
            }
            AuthError::KeyFetchFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::KeyFetchFailed(_))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code(),
        });
        (status, body).into_response()
    }
}
