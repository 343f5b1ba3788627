// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The access control gateway: extract token, verify, authorize.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::claims::Claims;
use super::error::AuthError;
use super::jwks::KeySetCache;
use super::policy::authorize;
use super::verifier::TokenVerifier;
use crate::config::AuthSettings;

const NOT_BEARER_TOKEN: &str = "Authorization header must be bearer token.";

/// Single entry point protected operations call before touching data.
#[derive(Clone)]
pub struct AccessGateway {
    verifier: TokenVerifier,
}

impl AccessGateway {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Build a gateway that fetches keys from `settings.jwks_url`.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, reqwest::Error> {
        let keys = KeySetCache::from_url(settings.jwks_url.clone())?
            .with_cache_ttl(settings.cache_ttl);
        Ok(Self::new(TokenVerifier::new(keys, settings)))
    }

    pub fn keys(&self) -> &KeySetCache {
        self.verifier.keys()
    }

    /// Authenticate the raw `Authorization` header value and, when
    /// `required_permission` is non-empty, authorize it.
    pub async fn guard(
        &self,
        authorization: Option<&str>,
        required_permission: &str,
    ) -> Result<Claims, AuthError> {
        self.check(authorization, required_permission)
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    error_code = e.error_code(),
                    permission = required_permission,
                    "Access denied"
                );
            })
    }

    async fn check(
        &self,
        authorization: Option<&str>,
        required_permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.verifier.verify(token).await?;
        authorize(&claims, required_permission)?;
        Ok(claims)
    }
}

/// Read the `Authorization` header as text, if present.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AuthError::HeaderMalformed(NOT_BEARER_TOKEN))
        })
        .transpose()
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively and exactly two
/// whitespace-separated parts are required.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let mut parts = authorization
        .ok_or(AuthError::HeaderMissing)?
        .split_whitespace();

    let scheme = parts.next().ok_or(AuthError::HeaderMissing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = parts.next().ok_or(AuthError::TokenMissing)?;
    if parts.next().is_some() {
        return Err(AuthError::HeaderMalformed(NOT_BEARER_TOKEN));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::{GET_ATTENDANCE, POST_ATTENDANCE};
    use crate::auth::testing::{sign, sign_a, valid_claims, verifier, KEY_A_PEM};
    use axum::http::HeaderValue;
    use chrono::Utc;
    use serde_json::json;

    fn gateway() -> AccessGateway {
        AccessGateway::new(verifier())
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn missing_or_blank_header() {
        assert_eq!(bearer_token(None), Err(AuthError::HeaderMissing));
        assert_eq!(bearer_token(Some("")), Err(AuthError::HeaderMissing));
        assert_eq!(bearer_token(Some("   ")), Err(AuthError::HeaderMissing));
    }

    #[test]
    fn scheme_must_be_bearer_in_any_case() {
        assert_eq!(bearer_token(Some("Basic dXNlcjpwdw==")), Err(AuthError::InvalidScheme));
        assert_eq!(bearer_token(Some("Bearer-abc")), Err(AuthError::InvalidScheme));
        assert_eq!(bearer_token(Some("token abc")), Err(AuthError::InvalidScheme));
        assert_eq!(bearer_token(Some("bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(Some("BEARER abc")), Ok("abc"));
    }

    #[test]
    fn bearer_without_token() {
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::TokenMissing));
        assert_eq!(bearer_token(Some("Bearer   ")), Err(AuthError::TokenMissing));
    }

    #[test]
    fn extra_parts_are_malformed() {
        assert_eq!(
            bearer_token(Some("Bearer abc def")),
            Err(AuthError::HeaderMalformed(NOT_BEARER_TOKEN))
        );
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(bearer_token(Some("  Bearer \t abc  ")), Ok("abc"));
    }

    #[test]
    fn non_text_header_is_malformed() {
        let mut headers = HeaderMap::new();
        assert_eq!(authorization_header(&headers), Ok(None));

        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());
        assert!(matches!(
            authorization_header(&headers),
            Err(AuthError::HeaderMalformed(_))
        ));
    }

    #[tokio::test]
    async fn valid_token_with_permission_yields_claims() {
        let now = Utc::now().timestamp();
        let token = sign_a(&valid_claims(now));

        let claims = gateway()
            .guard(Some(&bearer(&token)), GET_ATTENDANCE)
            .await
            .unwrap();
        assert_eq!(claims.sub, "auth0|user-1");
    }

    #[tokio::test]
    async fn empty_permission_only_authenticates() {
        let now = Utc::now().timestamp();
        let mut claims = valid_claims(now);
        claims.as_object_mut().unwrap().remove("permissions");
        let token = sign_a(&claims);

        assert!(gateway().guard(Some(&bearer(&token)), "").await.is_ok());
        assert_eq!(
            gateway()
                .guard(Some(&bearer(&token)), POST_ATTENDANCE)
                .await
                .unwrap_err(),
            AuthError::PermissionsClaimMissing
        );
    }

    #[tokio::test]
    async fn permission_not_granted() {
        let now = Utc::now().timestamp();
        let mut claims = valid_claims(now);
        claims["permissions"] = json!(["get:attendance"]);
        let token = sign_a(&claims);

        assert_eq!(
            gateway()
                .guard(Some(&bearer(&token)), POST_ATTENDANCE)
                .await
                .unwrap_err(),
            AuthError::PermissionDenied(POST_ATTENDANCE.to_string())
        );
    }

    #[tokio::test]
    async fn unknown_kid_fails_without_crashing() {
        let now = Utc::now().timestamp();
        let token = sign(&valid_claims(now), Some("not-published"), KEY_A_PEM);

        assert_eq!(
            gateway().guard(Some(&bearer(&token)), "").await.unwrap_err(),
            AuthError::NoMatchingKey
        );
    }

    #[tokio::test]
    async fn header_checks_run_before_verification() {
        // A perfectly valid token behind the wrong scheme is still rejected
        // on the scheme.
        let now = Utc::now().timestamp();
        let token = sign_a(&valid_claims(now));

        assert_eq!(
            gateway()
                .guard(Some(&format!("Token {token}")), "")
                .await
                .unwrap_err(),
            AuthError::InvalidScheme
        );
    }

    #[tokio::test]
    async fn authentication_failure_wins_over_authorization() {
        let now = Utc::now().timestamp();
        let mut claims = valid_claims(now);
        claims["exp"] = json!(now - 5);
        claims.as_object_mut().unwrap().remove("permissions");
        let token = sign_a(&claims);

        assert_eq!(
            gateway()
                .guard(Some(&bearer(&token)), GET_ATTENDANCE)
                .await
                .unwrap_err(),
            AuthError::TokenExpired
        );
    }
}
