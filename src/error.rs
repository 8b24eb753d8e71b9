//! Error taxonomy for the chat core.

use thiserror::Error;

/// Failures the chat core can produce.
///
/// Connection loss, partner departure and translation failures are recovered inside
/// the session (a transition back to idle or a fallback value). The remaining variants
/// are precondition violations reported to the caller of an intent.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A send was attempted while no connection is open.
    #[error("no open connection to the chat server")]
    TransportUnavailable,

    /// The connection closed without a recognized reason.
    #[error("lost connection to the chat server")]
    ConnectionLost,

    /// The partner left the chat.
    #[error("the partner disconnected from the chat")]
    PartnerLeft,

    /// The translation gateway rejected the request or timed out.
    #[error("translation failed: {0}")]
    TranslationFailed(String),

    /// The language catalog could not be fetched.
    #[error("failed to fetch supported languages: {0}")]
    LanguageCatalogFailed(String),

    /// `begin` or a language change was requested while a session is active.
    #[error("a chat session is already active")]
    SessionActive,

    /// A chat message was sent without a partner.
    #[error("not paired with a partner")]
    NotPaired,

    /// The outgoing message was rejected before sending.
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),

    /// An event could not be encoded for the wire.
    #[error("protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl ChatError {
    /// Returns `true` for errors that indicate a bug in the caller rather than a
    /// runtime condition.
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::TransportUnavailable | Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(ChatError::TransportUnavailable.is_precondition());
        assert!(!ChatError::ConnectionLost.is_precondition());
        assert!(!ChatError::TranslationFailed("timeout".to_string()).is_precondition());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ChatError::InvalidMessage("message is blank");
        assert_eq!(err.to_string(), "invalid message: message is blank");
    }
}
