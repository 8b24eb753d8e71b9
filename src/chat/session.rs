use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use futures_util::stream::FuturesOrdered;
use futures_util::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::protocol::{CloseReason, InboundEvent, OutboundEvent};
use super::state::{ChatMessage, Notice, Partner, Phase, SessionUpdate};
use super::transport::{Connection, Connector, TransportEvent, TransportEvents};
use crate::auth::AuthContext;
use crate::error::ChatError;
use crate::translation::Translator;

/// Longest message, in characters, the server accepts.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Join the pairing queue, receiving translations in the given language.
    Begin(String),
    /// Send a chat message to the partner.
    Send(String),
    /// Leave the queue or the chat.
    Leave,
    /// Change the preferred language while idle.
    SetLanguage(String),
}

/// A log entry waiting for its turn to be appended.
#[derive(Debug)]
struct Arrival {
    generation: u64,
    message: ChatMessage,
    failure: Option<ChatError>,
}

enum Input {
    User(Intent),
    Transport(TransportEvent),
    Arrival(Arrival),
}

/// Connection settings for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket URL of the pairing server.
    pub endpoint: String,
    /// Initial preferred language.
    pub language: String,
}

impl SessionConfig {
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            language: language.into(),
        }
    }
}

/// The chat session controller.
///
/// Owns at most one connection and moves through [`Phase::Idle`],
/// [`Phase::Queued`] and [`Phase::Paired`] in response to intents and server events.
/// Inbound messages in a foreign language are translated before they are appended;
/// entries are appended in arrival order even when translations finish out of order.
pub struct ChatSession<C: Connector, T: Translator> {
    auth: AuthContext,
    endpoint: String,
    connector: C,
    translator: Arc<T>,
    phase: Phase,
    preferred_language: String,
    partner: Option<Partner>,
    messages: Vec<ChatMessage>,
    connection: Option<C::Connection>,
    events: Option<TransportEvents>,
    pending: FuturesOrdered<BoxFuture<'static, Arrival>>,
    // Bumped on every return to idle; arrivals from an older generation are stale.
    generation: u64,
    diagnostics: Vec<ChatError>,
    subscribers: Vec<mpsc::UnboundedSender<SessionUpdate>>,
}

impl<C: Connector, T: Translator> ChatSession<C, T> {
    pub fn new(config: SessionConfig, auth: AuthContext, connector: C, translator: T) -> Self {
        Self {
            auth,
            endpoint: config.endpoint,
            connector,
            translator: Arc::new(translator),
            phase: Phase::Idle,
            preferred_language: config.language,
            partner: None,
            messages: Vec::new(),
            connection: None,
            events: None,
            pending: FuturesOrdered::new(),
            generation: 0,
            diagnostics: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn partner(&self) -> Option<&Partner> {
        self.partner.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn preferred_language(&self) -> &str {
        &self.preferred_language
    }

    /// Translation failures recorded during this session's lifetime.
    pub fn diagnostics(&self) -> &[ChatError] {
        &self.diagnostics
    }

    /// Returns `true` while log entries are waiting on a translation.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Registers a subscriber for every subsequent [`SessionUpdate`].
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Changes the language translations are delivered in.
    pub fn set_preferred_language(&mut self, language: &str) -> Result<(), ChatError> {
        if self.phase != Phase::Idle {
            return Err(ChatError::SessionActive);
        }
        language.clone_into(&mut self.preferred_language);
        Ok(())
    }

    /// Opens a connection and joins the pairing queue.
    ///
    /// Rejected with [`ChatError::SessionActive`] unless the session is idle.
    pub fn begin(&mut self, language: &str) -> Result<(), ChatError> {
        if self.phase != Phase::Idle {
            debug!(phase = %self.phase, "Ignoring begin while a session is active");
            return Err(ChatError::SessionActive);
        }
        debug_assert!(self.connection.is_none(), "idle session still owns a connection");

        let (connection, events) = self.connector.connect(&self.endpoint);
        if let Err(e) = connection.send(&OutboundEvent::connect(&self.auth, language)) {
            error!(error = %e, "Failed to send connect event");
            connection.close(CloseReason::Unrecognized(None));
            return Err(e);
        }

        language.clone_into(&mut self.preferred_language);
        self.connection = Some(connection);
        self.events = Some(events);
        info!(language, "Waiting for a partner");
        self.set_phase(Phase::Queued);
        Ok(())
    }

    /// Sends a chat message to the partner and appends it to the log.
    pub fn send(&mut self, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::InvalidMessage("message is blank"));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::InvalidMessage("message exceeds 500 characters"));
        }
        let Some(partner) = &self.partner else {
            return Err(ChatError::NotPaired);
        };

        let event = OutboundEvent::message(&self.auth, &partner.id, text);
        self.transmit(&event)?;
        self.enqueue_ready(ChatMessage::from_self(text));
        Ok(())
    }

    /// Leaves the queue or the chat, telling the server why, and returns to idle.
    ///
    /// Does nothing when already idle.
    pub fn leave(&mut self) {
        let reason = match (self.phase, &self.partner) {
            (Phase::Idle, _) => return,
            (Phase::Paired, Some(partner)) => {
                let event = OutboundEvent::close_chat(&self.auth, &partner.id);
                if let Err(e) = self.transmit(&event) {
                    error!(error = %e, "Failed to send close_chat");
                }
                CloseReason::CloseChat
            }
            _ => {
                if let Err(e) = self.transmit(&OutboundEvent::dequeue(&self.auth)) {
                    error!(error = %e, "Failed to send dequeue");
                }
                CloseReason::Dequeue
            }
        };

        if let Some(connection) = &self.connection {
            connection.close(reason.clone());
        }
        info!(reason = reason.as_str(), "Left chat");
        self.reset();
    }

    /// Applies one event reported by the transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Message(InboundEvent::Enqueue {}) => {
                debug!(phase = %self.phase, "Server confirmed queue position");
            }
            TransportEvent::Message(InboundEvent::Initiate { user }) => {
                if self.phase != Phase::Queued {
                    debug!(phase = %self.phase, "Ignoring initiate outside the queue");
                    return;
                }
                let partner = Partner::from(user);
                info!(partner = %partner.display_name, language = %partner.language, "Paired");
                self.clear_messages();
                self.partner = Some(partner.clone());
                self.set_phase(Phase::Paired);
                self.publish(SessionUpdate::Paired(partner));
            }
            TransportEvent::Message(InboundEvent::Message { message }) => {
                if self.phase != Phase::Paired {
                    debug!(phase = %self.phase, "Ignoring message without a partner");
                    return;
                }
                self.receive(message);
            }
            TransportEvent::Closed(reason) => self.handle_closed(&reason),
        }
    }

    /// Feeds user intents and transport events to the state machine until `intents`
    /// closes, then leaves any active chat and waits for the connection to close.
    pub async fn run(&mut self, mut intents: mpsc::Receiver<Intent>) {
        loop {
            match self.next_input(&mut intents).await {
                Some(Input::User(intent)) => {
                    if let Err(e) = self.apply_intent(intent) {
                        if e.is_precondition() {
                            error!(error = %e, "Intent failed");
                        } else {
                            debug!(error = %e, "Intent rejected");
                        }
                        self.publish(SessionUpdate::Rejected(e.to_string()));
                    }
                }
                Some(Input::Transport(event)) => self.handle_transport_event(event),
                Some(Input::Arrival(arrival)) => self.apply_arrival(arrival),
                None => break,
            }
        }

        self.leave();
        self.connector.drain().await;
    }

    /// Waits until every pending entry has been appended or discarded.
    pub async fn settle(&mut self) {
        while let Some(arrival) = self.pending.next().await {
            self.apply_arrival(arrival);
        }
    }

    fn apply_intent(&mut self, intent: Intent) -> Result<(), ChatError> {
        match intent {
            Intent::Begin(language) => self.begin(&language),
            Intent::Send(text) => self.send(&text),
            Intent::Leave => {
                self.leave();
                Ok(())
            }
            Intent::SetLanguage(language) => self.set_preferred_language(&language),
        }
    }

    async fn next_input(&mut self, intents: &mut mpsc::Receiver<Intent>) -> Option<Input> {
        let pending = &mut self.pending;
        let events = &mut self.events;

        tokio::select! {
            biased;
            Some(arrival) = pending.next(), if !pending.is_empty() => Some(Input::Arrival(arrival)),
            event = next_transport_event(events) => Some(Input::Transport(event)),
            intent = intents.recv() => intent.map(Input::User),
        }
    }

    fn handle_closed(&mut self, reason: &CloseReason) {
        if self.phase == Phase::Idle {
            return;
        }

        let notice = match reason {
            CloseReason::PartnerLeft => Some(Notice::PartnerDisconnected),
            r if r.is_self_initiated() => None,
            _ => Some(Notice::ConnectionLost),
        };

        match notice {
            Some(Notice::ConnectionLost) => {
                warn!(reason = reason.as_str(), error = %ChatError::ConnectionLost, "Connection closed unexpectedly");
            }
            Some(Notice::PartnerDisconnected) => info!(error = %ChatError::PartnerLeft, "Chat ended"),
            None => debug!(reason = reason.as_str(), "Connection closed"),
        }

        self.reset();
        if let Some(notice) = notice {
            self.publish(SessionUpdate::Notice(notice));
        }
    }

    fn receive(&mut self, text: String) {
        let Some(partner) = &self.partner else {
            return;
        };

        if partner.language == self.preferred_language {
            self.enqueue_ready(ChatMessage::from_partner(text.clone(), text));
            return;
        }

        let translator = Arc::clone(&self.translator);
        let from = partner.language.clone();
        let to = self.preferred_language.clone();
        let generation = self.generation;

        self.pending.push_back(
            async move {
                match translator.translate(&text, &from, &to).await {
                    Ok(translated) => Arrival {
                        generation,
                        message: ChatMessage::from_partner(translated, text),
                        failure: None,
                    },
                    Err(e) => Arrival {
                        generation,
                        message: ChatMessage::from_partner(text.clone(), text),
                        failure: Some(e),
                    },
                }
            }
            .boxed(),
        );
    }

    // Appends now unless earlier entries are still waiting on a translation.
    fn enqueue_ready(&mut self, message: ChatMessage) {
        if self.pending.is_empty() {
            self.append(message);
        } else {
            self.pending.push_back(
                future::ready(Arrival {
                    generation: self.generation,
                    message,
                    failure: None,
                })
                .boxed(),
            );
        }
    }

    fn apply_arrival(&mut self, arrival: Arrival) {
        if arrival.generation != self.generation || self.phase != Phase::Paired {
            debug!("Discarding entry from a finished chat");
            return;
        }

        if let Some(failure) = arrival.failure {
            warn!(error = %failure, "Showing untranslated message");
            self.diagnostics.push(failure);
        }
        self.append(arrival.message);
    }

    fn append(&mut self, message: ChatMessage) {
        self.messages.push(message.clone());
        self.publish(SessionUpdate::MessageAppended(message));
    }

    fn transmit(&self, event: &OutboundEvent) -> Result<(), ChatError> {
        let Some(connection) = &self.connection else {
            error!(action = event.action(), "Send attempted without a connection");
            return Err(ChatError::TransportUnavailable);
        };
        connection.send(event).inspect_err(|e| {
            error!(action = event.action(), error = %e, "Send failed");
        })
    }

    fn clear_messages(&mut self) {
        if !self.messages.is_empty() {
            self.messages.clear();
            self.publish(SessionUpdate::Cleared);
        }
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.pending = FuturesOrdered::new();
        self.connection = None;
        self.events = None;
        self.partner = None;
        self.clear_messages();
        self.set_phase(Phase::Idle);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.publish(SessionUpdate::PhaseChanged(phase));
        }
    }

    fn publish(&mut self, update: SessionUpdate) {
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }
}

// A connection that drops its sender without reporting closure counts as lost.
async fn next_transport_event(events: &mut Option<TransportEvents>) -> TransportEvent {
    match events {
        Some(rx) => rx
            .recv()
            .await
            .unwrap_or(TransportEvent::Closed(CloseReason::Unrecognized(None))),
        None => future::pending().await,
    }
}
