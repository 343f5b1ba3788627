// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Cache Behavior
//!
//! - The key set is held as one immutable snapshot behind an `Arc`. A refresh
//!   builds a new snapshot and swaps the pointer, so readers see either the
//!   old complete set or the new complete set.
//! - On a `kid` miss (or an expired snapshot) the full set is fetched once.
//!   A miss against the freshly fetched set is `NoMatchingKey`; the fetch is
//!   not retried within the same lookup.
//! - Fetch failures (network, timeout, non-2xx, bad JSON) surface as
//!   `KeyFetchFailed`. They are never treated as an empty key set.
//! - A fetch started by a request that is later abandoned still populates
//!   the cache for subsequent callers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Timeout for the JWKS HTTP fetch (connect + response).
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Family of a published signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Rsa,
    EllipticCurve,
}

/// One public signing key from the identity provider.
///
/// Immutable once built; a refresh replaces the whole set.
#[derive(Clone)]
pub struct SigningKey {
    pub kid: String,
    pub key_type: KeyType,
    pub algorithm: Algorithm,
    pub decoding_key: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("key_type", &self.key_type)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Convert a JWK into a signing key.
    ///
    /// Keys without a `kid` cannot be looked up and are rejected, as are
    /// key types other than RSA and EC.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, String> {
        let kid = jwk
            .common
            .key_id
            .clone()
            .ok_or_else(|| "key has no kid".to_string())?;

        match &jwk.algorithm {
            AlgorithmParameters::RSA(rsa) => {
                let decoding_key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                    .map_err(|e| format!("invalid RSA components for {kid}: {e}"))?;
                let algorithm = match jwk.common.key_algorithm {
                    Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                    Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                    Some(KeyAlgorithm::PS256) => Algorithm::PS256,
                    Some(KeyAlgorithm::PS384) => Algorithm::PS384,
                    Some(KeyAlgorithm::PS512) => Algorithm::PS512,
                    _ => Algorithm::RS256,
                };
                Ok(Self {
                    kid,
                    key_type: KeyType::Rsa,
                    algorithm,
                    decoding_key,
                })
            }
            AlgorithmParameters::EllipticCurve(ec) => {
                let decoding_key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                    .map_err(|e| format!("invalid EC components for {kid}: {e}"))?;
                let algorithm = match jwk.common.key_algorithm {
                    Some(KeyAlgorithm::ES384) => Algorithm::ES384,
                    _ => Algorithm::ES256,
                };
                Ok(Self {
                    kid,
                    key_type: KeyType::EllipticCurve,
                    algorithm,
                    decoding_key,
                })
            }
            _ => Err(format!("unsupported key type for {kid}")),
        }
    }
}

/// Where the key set comes from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the complete, current key set.
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the key set from the identity provider's well-known endpoint.
pub struct HttpKeySetSource {
    url: String,
    client: reqwest::Client,
}

impl HttpKeySetSource {
    /// Create a source for the given JWKS URL
    /// (e.g. `https://tenant.example.com/.well-known/jwks.json`).
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyFetchFailed(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetchFailed(e.to_string()))
    }
}

/// Immutable view of the key set at one point in time.
struct KeySnapshot {
    keys: HashMap<String, SigningKey>,
    fetched_at: Instant,
}

impl KeySnapshot {
    fn from_jwks(jwks: &JwkSet) -> Self {
        let mut keys = HashMap::with_capacity(jwks.keys.len());
        for jwk in &jwks.keys {
            match SigningKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(key.kid.clone(), key);
                }
                Err(reason) => tracing::debug!(%reason, "Skipping JWKS entry"),
            }
        }
        Self {
            keys,
            fetched_at: Instant::now(),
        }
    }
}

/// Shared cache of the identity provider's signing keys.
#[derive(Clone)]
pub struct KeySetCache {
    source: Arc<dyn KeySetSource>,
    cache_ttl: Duration,
    current: Arc<RwLock<Option<Arc<KeySnapshot>>>>,
}

impl KeySetCache {
    /// Create a cache over an arbitrary key source.
    pub fn new(source: Arc<dyn KeySetSource>) -> Self {
        Self {
            source,
            cache_ttl: DEFAULT_CACHE_TTL,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a cache that fetches from a JWKS URL over HTTPS.
    pub fn from_url(jwks_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self::new(Arc::new(HttpKeySetSource::new(jwks_url)?)))
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Look up a signing key by `kid`, refreshing the set once on a miss.
    pub async fn get_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        if let Some(snapshot) = self.fresh_snapshot().await {
            if let Some(key) = snapshot.keys.get(kid) {
                return Ok(key.clone());
            }
        }

        let snapshot = self.refresh_snapshot().await?;
        snapshot
            .keys
            .get(kid)
            .cloned()
            .ok_or(AuthError::NoMatchingKey)
    }

    /// Force refresh the key set.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.refresh_snapshot().await.map(|_| ())
    }

    /// Check if a key set is currently cached and within its TTL.
    pub async fn is_cached(&self) -> bool {
        self.fresh_snapshot().await.is_some()
    }

    /// Number of usable keys in the current snapshot.
    pub async fn key_count(&self) -> usize {
        self.current
            .read()
            .await
            .as_ref()
            .map(|snapshot| snapshot.keys.len())
            .unwrap_or(0)
    }

    async fn fresh_snapshot(&self) -> Option<Arc<KeySnapshot>> {
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|snapshot| snapshot.fetched_at.elapsed() < self.cache_ttl)
            .cloned()
    }

    async fn refresh_snapshot(&self) -> Result<Arc<KeySnapshot>, AuthError> {
        let jwks = self.source.fetch().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Signing key set fetch failed");
        })?;

        let snapshot = Arc::new(KeySnapshot::from_jwks(&jwks));
        tracing::info!(keys = snapshot.keys.len(), "Refreshed signing key set");

        *self.current.write().await = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
