// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Browser login through the identity provider's hosted login page.
//!
//! The service never sees credentials. It hands out the provider's
//! `/authorize` link (implicit flow, `response_type=token`) and, once the
//! provider calls back, forwards the browser to the web app with the
//! original `state` so the app can resume where the user started.

use url::Url;

use super::claims::Claims;
use super::error::AuthError;
use super::gateway::AccessGateway;
use crate::config::{AuthSettings, LoginSettings};

/// Result of a login request.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The request already carries a valid token.
    AlreadyLoggedIn(Claims),
    /// The browser should be sent to this link.
    LoginRequired(Url),
}

#[derive(Debug, Clone)]
pub struct LoginFlow {
    authorize_url: Url,
    audience: String,
    client_id: String,
    callback_url: Url,
    frontend_url: Url,
}

impl LoginFlow {
    pub fn new(auth: &AuthSettings, login: &LoginSettings) -> Result<Self, url::ParseError> {
        Ok(Self {
            authorize_url: Url::parse(&format!("https://{}/authorize", auth.domain))?,
            audience: auth.audience.clone(),
            client_id: login.client_id.clone(),
            callback_url: login.callback_url.clone(),
            frontend_url: login.frontend_url.clone(),
        })
    }

    /// Provider login link; `next_url` comes back as `state`.
    pub fn login_link(&self, next_url: &str) -> Url {
        let mut link = self.authorize_url.clone();
        link.query_pairs_mut()
            .append_pair("audience", &self.audience)
            .append_pair("response_type", "token")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.callback_url.as_str())
            .append_pair("state", next_url);
        link
    }

    /// `{frontend}/auth/callback?state=...`
    pub fn callback_target(&self, state: &str) -> Url {
        let mut target = self.frontend_url.clone();
        if let Ok(mut segments) = target.path_segments_mut() {
            segments.pop_if_empty().extend(["auth", "callback"]);
        }
        target.set_query(None);
        target.set_fragment(None);
        target.query_pairs_mut().append_pair("state", state);
        target
    }

    /// A valid token short-circuits the login. Any rejection other than an
    /// unreachable key set means the user has to log in.
    pub async fn request_login(
        &self,
        gateway: &AccessGateway,
        authorization: Option<&str>,
        next_url: &str,
    ) -> Result<LoginOutcome, AuthError> {
        match gateway.guard(authorization, "").await {
            Ok(claims) => Ok(LoginOutcome::AlreadyLoggedIn(claims)),
            Err(e) if e.is_transient() => Err(e),
            Err(_) => Ok(LoginOutcome::LoginRequired(self.login_link(next_url))),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_flow() -> LoginFlow {
    let login = LoginSettings {
        client_id: "spa-client".to_string(),
        callback_url: Url::parse("https://api.example.com/v1/login-callback").unwrap(),
        frontend_url: Url::parse("https://app.example.com").unwrap(),
    };
    LoginFlow::new(&super::testing::settings(), &login).unwrap()
}
