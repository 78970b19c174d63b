//! Account profile as returned by `GET /profile`.

use serde::{Deserialize, Serialize};

use super::status::Role;

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl Profile {
    /// Whether this account may use the admin surface.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
