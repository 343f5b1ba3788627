// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AccessGateway, LoginFlow};
use crate::store::PunchStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<PunchStore>>,
    pub gateway: AccessGateway,
    /// Present when the login endpoints are configured.
    pub login: Option<Arc<LoginFlow>>,
}

impl AppState {
    pub fn new(store: PunchStore, gateway: AccessGateway) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            gateway,
            login: None,
        }
    }

    pub fn with_login(mut self, login: LoginFlow) -> Self {
        self.login = Some(Arc::new(login));
        self
    }

    /// State whose gateway trusts the test signing key `key-a`.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(
            PunchStore::new(),
            AccessGateway::new(crate::auth::testing::verifier()),
        )
    }
}
