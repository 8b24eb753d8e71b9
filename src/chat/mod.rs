//! The chat session controller and its terminal front end.
//!
//! The session owns one connection to the pairing server, moves through the
//! idle/queued/paired phases, and translates partner messages before logging them.

/// Slash command parsing.
pub mod command;
pub mod protocol;
mod session;
pub mod state;
pub mod transport;
mod ui;

pub use session::{ChatSession, Intent, MAX_MESSAGE_CHARS, SessionConfig};
pub use state::{Author, ChatMessage, Notice, Partner, Phase, SessionUpdate};
pub use transport::{Connection, Connector, TransportEvent, WebSocketConnection, WebSocketConnector};
pub use ui::run_terminal;
