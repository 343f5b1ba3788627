// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission checks on a verified claim set.

use super::claims::Claims;
use super::error::AuthError;

/// Permission to read attendance summaries.
pub const GET_ATTENDANCE: &str = "get:attendance";
/// Permission to record punches.
pub const POST_ATTENDANCE: &str = "post:attendance";

/// Decide whether `claims` grant `required_permission`.
///
/// An empty `required_permission` only requires authentication. Otherwise
/// a token without a `permissions` claim fails differently from a token
/// whose permissions lack the required entry.
pub fn authorize(claims: &Claims, required_permission: &str) -> Result<(), AuthError> {
    if required_permission.is_empty() {
        return Ok(());
    }

    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if granted.contains(required_permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(required_permission.to_string()))
    }
}
