// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the identity provider's key set.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. three dot-separated segments
//! 2. header decodes and carries a `kid`
//! 3. `kid` resolves in the key set cache
//! 4. signature verifies (header `alg` must be one of the configured ones)
//! 5. `exp`, then audience, then issuer

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::Claims;
use super::error::AuthError;
use super::jwks::{KeySetCache, SigningKey};
use crate::config::AuthSettings;

const UNPARSEABLE: &str = "Unable to parse authentication token.";

/// Verifies access tokens and yields their claim set.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: KeySetCache,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
    leeway: i64,
}

impl TokenVerifier {
    pub fn new(keys: KeySetCache, settings: &AuthSettings) -> Self {
        Self {
            keys,
            audience: settings.audience.clone(),
            issuer: settings.issuer.clone(),
            algorithms: settings.algorithms.clone(),
            leeway: i64::try_from(settings.leeway.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// The key set cache backing this verifier.
    pub fn keys(&self) -> &KeySetCache {
        &self.keys
    }

    /// Verify `token` against the current time.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp()).await
    }

    /// Verify `token` as of `now` (seconds since the epoch).
    pub async fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        if token.split('.').count() != 3 {
            return Err(AuthError::HeaderMalformed(UNPARSEABLE));
        }

        let header = decode_header(token).map_err(|_| AuthError::HeaderMalformed(UNPARSEABLE))?;
        let kid = header
            .kid
            .ok_or(AuthError::HeaderMalformed("Authorization malformed."))?;

        let key = self.keys.get_key(&kid).await?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::HeaderMalformed(UNPARSEABLE));
        }

        let claims = self.decode_verified(token, header.alg, &key)?;
        self.validate_claims(&claims, now)?;
        Ok(claims)
    }

    /// Check the signature and decode the payload. Registered claims are
    /// validated separately so their order is under our control.
    fn decode_verified(
        &self,
        token: &str,
        algorithm: Algorithm,
        key: &SigningKey,
    ) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &key.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::HeaderMalformed(UNPARSEABLE),
            })
    }

    fn validate_claims(&self, claims: &Claims, now: i64) -> Result<(), AuthError> {
        let exp = claims
            .exp
            .ok_or(AuthError::InvalidClaims("token has no expiry"))?;
        if now >= exp.saturating_add(self.leeway) {
            return Err(AuthError::TokenExpired);
        }

        if !claims.has_audience(&self.audience) {
            return Err(AuthError::InvalidClaims("audience does not match"));
        }

        if claims.iss.as_deref() != Some(self.issuer.as_str()) {
            return Err(AuthError::InvalidClaims("issuer does not match"));
        }

        Ok(())
    }
}
