//! Cached bearer token representation and expiry logic.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Safety margin subtracted from the upstream-declared token lifetime.
///
/// A token whose remaining lifetime is inside this window is treated as
/// already expired, so it is never presented to an upstream that might
/// reject it mid-request.
pub const EXPIRY_MARGIN_SECS: u64 = 300;

/// A bearer token cached for one tenant, with margin-adjusted expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    pub tenant_id: String,
    pub bearer_token: String,
    /// Unix timestamp (seconds) after which the token must not be used.
    pub expires_at: u64,
}

impl CachedToken {
    /// Create a token that upstream declared valid for `expires_in_secs`,
    /// recording the expiry with [`EXPIRY_MARGIN_SECS`] already subtracted.
    ///
    /// A declared lifetime at or below the margin yields a token that is
    /// expired immediately, forcing a refetch on next use.
    pub fn with_lifetime(
        tenant_id: impl Into<String>,
        bearer_token: impl Into<String>,
        expires_in_secs: u64,
    ) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        Self {
            tenant_id: tenant_id.into(),
            bearer_token: bearer_token.into(),
            expires_at: now + expires_in_secs.saturating_sub(EXPIRY_MARGIN_SECS),
        }
    }

    /// Return `true` once the margin-adjusted expiry has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        now >= self.expires_at
    }

    /// Seconds of usable lifetime left (zero once expired).
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        self.expires_at.saturating_sub(now)
    }
}
