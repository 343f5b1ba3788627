// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Control
//!
//! Bearer tokens are issued by an external identity provider and only
//! verified here.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>`
//! 2. The gateway:
//!    - checks the header shape (`Bearer` scheme, exactly one token)
//!    - looks up the token's `kid` in the cached JWKS (refetching on a miss)
//!    - verifies signature, expiry, audience, issuer
//!    - checks the route's required permission against `permissions`
//! 3. The handler receives the verified [`Claims`]
//!
//! Authentication failures are 401, authorization failures 403, and an
//! unreachable key endpoint 503.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod jwks;
pub mod login;
pub mod middleware;
pub mod policy;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::Auth;
pub use gateway::AccessGateway;
pub use jwks::{KeySetCache, SigningKey};
pub use login::{LoginFlow, LoginOutcome};
pub use middleware::{require_permission, PermissionGuard};
pub use policy::authorize;
pub use verifier::TokenVerifier;
