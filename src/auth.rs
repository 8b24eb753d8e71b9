//! Authenticated user context handed to a chat session.

use std::fmt;

/// Identity and credentials of the signed-in user.
///
/// The session reads this when building outbound events and never modifies it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Bearer token attached to every outbound event.
    pub token: String,
    /// The user's id on the chat server.
    pub user_id: String,
    /// Display name shown to the partner.
    pub first_name: String,
}

impl AuthContext {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            first_name: first_name.into(),
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("first_name", &self.first_name)
            .finish()
    }
}
