//! Resolved user identity.

use serde::{Deserialize, Serialize};

/// A user resolved by the identity provider.
///
/// Only trusted when `email_verified` is true; the broker never hands out
/// an unverified identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub email_verified: bool,
    pub display_name: String,
}
