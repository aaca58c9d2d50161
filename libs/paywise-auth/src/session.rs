use paywise_utils::SecretString;
use serde::{Deserialize, Serialize};

/// Cached profile of the signed-in user, as returned by the login, register
/// and profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_email_verified: Option<bool>,
}

impl UserProfile {
    /// First name if set, `"User"` otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "User",
        }
    }

    /// Avatar letter: first letter of the first name as typed, or the
    /// upper-cased first letter of the email.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        match self.first_name.as_deref().and_then(|n| n.chars().next()) {
            Some(c) => Some(c),
            None => self.email.chars().next().map(|c| c.to_ascii_uppercase()),
        }
    }
}

/// Everything a successful login or registration hands back.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub user: UserProfile,
}
