// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and passed
//! down as plain values; nothing below `main` reads the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_DOMAIN` | Identity provider domain (`tenant.example.com`) | Required |
//! | `AUTH_AUDIENCE` | Expected `aud` claim (API identifier) | Required |
//! | `AUTH_ISSUER` | Expected `iss` claim, compared exactly | `https://{AUTH_DOMAIN}/` |
//! | `AUTH_ALGORITHMS` | Comma-separated accepted signing algorithms | `RS256` |
//! | `AUTH_JWKS_URL` | Key set endpoint | `https://{AUTH_DOMAIN}/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECS` | Key set cache lifetime | `300` |
//! | `AUTH_LEEWAY_SECS` | Clock skew allowance on `exp` | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; serve HTTPS when both set | unset |
//! | `AUTH_CLIENT_ID` | Public client id used in the login link | unset |
//! | `CALLBACK_URL` | Where the provider sends the browser after login | unset |
//! | `FRONTEND_URL` | Web app the login callback redirects to | unset |
//!
//! The three login variables enable the login endpoints and must be set
//! together.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::auth::jwks::DEFAULT_CACHE_TTL;

pub const AUTH_DOMAIN_ENV: &str = "AUTH_DOMAIN";
pub const AUTH_AUDIENCE_ENV: &str = "AUTH_AUDIENCE";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUTH_ALGORITHMS_ENV: &str = "AUTH_ALGORITHMS";
pub const AUTH_JWKS_URL_ENV: &str = "AUTH_JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const AUTH_LEEWAY_ENV: &str = "AUTH_LEEWAY_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const AUTH_CLIENT_ID_ENV: &str = "AUTH_CLIENT_ID";
pub const CALLBACK_URL_ENV: &str = "CALLBACK_URL";
pub const FRONTEND_URL_ENV: &str = "FRONTEND_URL";

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Everything the access control gateway needs to know about the
/// identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSettings {
    pub domain: String,
    pub audience: String,
    pub issuer: String,
    pub algorithms: Vec<Algorithm>,
    pub jwks_url: String,
    pub cache_ttl: Duration,
    pub leeway: Duration,
}

impl AuthSettings {
    /// Settings with the provider's conventional issuer and JWKS locations.
    pub fn for_domain(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            issuer: format!("https://{domain}/"),
            jwks_url: format!("https://{domain}/.well-known/jwks.json"),
            domain,
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            cache_ttl: DEFAULT_CACHE_TTL,
            leeway: Duration::ZERO,
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let domain = required(lookup, AUTH_DOMAIN_ENV)?;
        let base = Url::parse(&format!("https://{domain}/"))
            .map_err(|e| ConfigError::invalid(AUTH_DOMAIN_ENV, e.to_string()))?;
        if base.host_str() != Some(domain.as_str()) {
            return Err(ConfigError::invalid(
                AUTH_DOMAIN_ENV,
                "expected a bare host name such as tenant.example.com",
            ));
        }

        let mut settings = Self::for_domain(domain, required(lookup, AUTH_AUDIENCE_ENV)?);

        if let Some(issuer) = lookup(AUTH_ISSUER_ENV) {
            settings.issuer = issuer;
        }
        if let Some(jwks_url) = lookup(AUTH_JWKS_URL_ENV) {
            Url::parse(&jwks_url)
                .map_err(|e| ConfigError::invalid(AUTH_JWKS_URL_ENV, e.to_string()))?;
            settings.jwks_url = jwks_url;
        }
        if let Some(algorithms) = lookup(AUTH_ALGORITHMS_ENV) {
            settings.algorithms = parse_algorithms(&algorithms)?;
        }
        if let Some(ttl) = parse_optional::<u64>(lookup, JWKS_CACHE_TTL_ENV)? {
            settings.cache_ttl = Duration::from_secs(ttl);
        }
        if let Some(leeway) = parse_optional::<u64>(lookup, AUTH_LEEWAY_ENV)? {
            settings.leeway = Duration::from_secs(leeway);
        }

        Ok(settings)
    }
}

/// Accept only asymmetric algorithms; the key set holds public keys.
fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let algorithm = Algorithm::from_str(name)
            .map_err(|_| ConfigError::invalid(AUTH_ALGORITHMS_ENV, format!("unknown algorithm {name}")))?;
        if matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::invalid(
                AUTH_ALGORITHMS_ENV,
                format!("{name} is symmetric and cannot be verified with a public key set"),
            ));
        }
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }
    if algorithms.is_empty() {
        return Err(ConfigError::invalid(AUTH_ALGORITHMS_ENV, "no algorithms given"));
    }
    Ok(algorithms)
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other}")),
        }
    }
}

/// Certificate and key for serving HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub tls: Option<TlsPaths>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_format: LogFormat::default(),
            tls: None,
        }
    }
}

impl ServerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup(HOST_ENV) {
            config.host = host;
        }
        if let Some(port) = parse_optional::<u16>(lookup, PORT_ENV)? {
            config.port = port;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.log_format = format
                .parse()
                .map_err(|e: String| ConfigError::invalid(LOG_FORMAT_ENV, e))?;
        }
        config.tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };
        Ok(config)
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Browser login through the identity provider's hosted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    pub client_id: String,
    pub callback_url: Url,
    pub frontend_url: Url,
}

impl LoginSettings {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let client_id = lookup(AUTH_CLIENT_ID_ENV);
        let callback_url = lookup(CALLBACK_URL_ENV);
        let frontend_url = lookup(FRONTEND_URL_ENV);
        if client_id.is_none() && callback_url.is_none() && frontend_url.is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            client_id: client_id.ok_or(ConfigError::Missing(AUTH_CLIENT_ID_ENV))?,
            callback_url: parse_url(callback_url, CALLBACK_URL_ENV)?,
            frontend_url: parse_url(frontend_url, FRONTEND_URL_ENV)?,
        }))
    }
}

fn parse_url(value: Option<String>, name: &'static str) -> Result<Url, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;
    Url::parse(&value).map_err(|e| ConfigError::invalid(name, e.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub auth: AuthSettings,
    pub server: ServerConfig,
    pub login: Option<LoginSettings>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any name → value lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Ok(Self {
            auth: AuthSettings::from_lookup(&lookup)?,
            server: ServerConfig::from_lookup(&lookup)?,
            login: LoginSettings::from_lookup(&lookup)?,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or(ConfigError::Missing(name))
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::invalid(name, e.to_string()))
        })
        .transpose()
}
