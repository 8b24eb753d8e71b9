//! # polychat - Translated chat with strangers
//!
//! `polychat` pairs anonymous users through a chat server and translates each
//! partner message into the language you read, so two people without a common
//! language can talk.
//!
//! ## Quick Start
//!
//! ```bash
//! # Pick a language and wait for a partner
//! polychat chat
//!
//! # Skip the language picker
//! polychat chat --to fr
//!
//! # See which languages are available
//! polychat languages
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/polychat/config.toml`:
//!
//! ```toml
//! [polychat]
//! server = "wss://chat.example.com"
//! language = "en"
//!
//! [translation]
//! api = "https://api.example.com"
//!
//! [auth]
//! user_id = "u1"
//! first_name = "Sam"
//! token_env = "POLYCHAT_TOKEN"
//! ```
//!
//! ## Architecture
//!
//! The [`chat::ChatSession`] state machine owns one connection from a
//! [`chat::Connector`] and one [`translation::Translator`]. Both are traits, so the
//! session runs unchanged against the WebSocket transport and the HTTP gateway or
//! against in-memory fakes.

/// Authenticated user context.
pub mod auth;

/// The chat session controller, wire protocol and transport.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management.
pub mod config;

/// Error taxonomy for the chat core.
pub mod error;

/// Global output configuration (quiet mode, colors).
pub mod output;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Translation gateway client and language catalog.
pub mod translation;

/// Terminal UI components (spinner, colors).
pub mod ui;
