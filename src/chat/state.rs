//! Session state as seen by the presentation layer.

use std::fmt;

use super::protocol::PartnerInfo;

/// Coarse connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No connection.
    #[default]
    Idle,
    /// Connected and waiting for a partner.
    Queued,
    /// Chatting with a partner.
    Paired,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Queued => f.write_str("queued"),
            Self::Paired => f.write_str("paired"),
        }
    }
}

/// The user we are paired with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partner {
    pub id: String,
    pub display_name: String,
    pub language: String,
}

impl From<PartnerInfo> for Partner {
    fn from(info: PartnerInfo) -> Self {
        Self {
            id: info.id,
            display_name: info.name,
            language: info.language,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    SelfUser,
    Partner,
}

/// One entry of the message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Author,
    /// Text shown to the user, translated when a translation succeeded.
    pub displayed_text: String,
    /// Text as it was written.
    pub original_text: String,
}

impl ChatMessage {
    pub fn from_self(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            author: Author::SelfUser,
            displayed_text: text.clone(),
            original_text: text,
        }
    }

    pub fn from_partner(displayed: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            author: Author::Partner,
            displayed_text: displayed.into(),
            original_text: original.into(),
        }
    }

    /// Returns `true` if the displayed text differs from what was written.
    pub fn is_translated(&self) -> bool {
        self.displayed_text != self.original_text
    }
}

/// Transient user-facing notices raised when a chat ends unexpectedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PartnerDisconnected,
    ConnectionLost,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartnerDisconnected => f.write_str("The other person disconnected from the chat."),
            Self::ConnectionLost => f.write_str("Lost connection to server"),
        }
    }
}

/// Changes published to subscribers, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    PhaseChanged(Phase),
    Paired(Partner),
    MessageAppended(ChatMessage),
    /// The message log was emptied.
    Cleared,
    Notice(Notice),
    /// An intent could not be applied; carries the reason.
    Rejected(String),
}
