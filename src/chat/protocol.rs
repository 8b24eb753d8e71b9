//! Wire events exchanged with the pairing server.
//!
//! Every event is a JSON object whose `action` field names the event.

use serde::{Deserialize, Serialize};

use crate::auth::AuthContext;

/// Events sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Joins the pairing queue with the given language.
    Connect {
        token: String,
        id: String,
        #[serde(rename = "firstName")]
        first_name: String,
        language: String,
    },
    /// A chat message for the current partner.
    Message {
        message: String,
        #[serde(rename = "partnerId")]
        partner_id: String,
        token: String,
    },
    /// Ends an active chat.
    CloseChat {
        #[serde(rename = "partnerId")]
        partner_id: String,
        id: String,
        token: String,
    },
    /// Leaves the pairing queue.
    Dequeue { id: String, token: String },
}

impl OutboundEvent {
    pub fn connect(auth: &AuthContext, language: &str) -> Self {
        Self::Connect {
            token: auth.token.clone(),
            id: auth.user_id.clone(),
            first_name: auth.first_name.clone(),
            language: language.to_string(),
        }
    }

    pub fn message(auth: &AuthContext, partner_id: &str, text: &str) -> Self {
        Self::Message {
            message: text.to_string(),
            partner_id: partner_id.to_string(),
            token: auth.token.clone(),
        }
    }

    pub fn close_chat(auth: &AuthContext, partner_id: &str) -> Self {
        Self::CloseChat {
            partner_id: partner_id.to_string(),
            id: auth.user_id.clone(),
            token: auth.token.clone(),
        }
    }

    pub fn dequeue(auth: &AuthContext) -> Self {
        Self::Dequeue {
            id: auth.user_id.clone(),
            token: auth.token.clone(),
        }
    }

    /// The action name carried on the wire.
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Message { .. } => "message",
            Self::CloseChat { .. } => "close_chat",
            Self::Dequeue { .. } => "dequeue",
        }
    }
}

/// The partner description carried by `initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartnerInfo {
    pub name: String,
    pub id: String,
    pub language: String,
}

/// Events received from the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A partner was found.
    Initiate { user: PartnerInfo },
    /// A chat message from the partner.
    Message { message: String },
    /// The server placed us in the pairing queue.
    Enqueue {},
}

/// Why a connection closed.
///
/// Only three reason strings carry meaning; anything else, including an absent or
/// empty reason, is an unexpected loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The server reports that the partner left.
    PartnerLeft,
    /// We ended the chat ourselves.
    CloseChat,
    /// We left the queue ourselves.
    Dequeue,
    /// Any other reason.
    Unrecognized(Option<String>),
}

impl CloseReason {
    pub fn parse(reason: Option<&str>) -> Self {
        match reason {
            Some("partner_left") => Self::PartnerLeft,
            Some("close_chat") => Self::CloseChat,
            Some("dequeue") => Self::Dequeue,
            Some("") | None => Self::Unrecognized(None),
            Some(other) => Self::Unrecognized(Some(other.to_string())),
        }
    }

    /// The reason string signalled to the remote side.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PartnerLeft => "partner_left",
            Self::CloseChat => "close_chat",
            Self::Dequeue => "dequeue",
            Self::Unrecognized(reason) => reason.as_deref().unwrap_or(""),
        }
    }

    /// Returns `true` if this client initiated the closure.
    pub const fn is_self_initiated(&self) -> bool {
        matches!(self, Self::CloseChat | Self::Dequeue)
    }
}
