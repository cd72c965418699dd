//! Profile model returned by the current-user endpoint.

use serde::Deserialize;

/// Represents the authenticated user as reported by `GET /rest/api/2/myself`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: Option<String>,
    pub key: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

impl UserProfile {
    /// Returns best available human-readable identity.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.email_address.as_deref())
            .or(self.key.as_deref())
    }
}
