//! Chat connection state machine.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::model::{ChatMessage, ConnectionStatus, InboundEvent, OutboundEvent};
use crate::{FolioError, FolioResult};

/// The push transport a session talks through.
pub trait Transport {
    /// Opens a connection authenticated by `credential`.
    fn open(&mut self, credential: &str) -> FolioResult<()>;

    /// Sends one outbound event.
    fn emit(&mut self, event: &OutboundEvent) -> FolioResult<()>;

    /// Closes the connection. Closing an idle transport is a no-op.
    fn close(&mut self);
}

/// One chat session: status, message log, and the error banner.
///
/// Only one connection is open at a time. There is no retry; after an
/// error the user reconnects explicitly.
#[derive(Debug)]
pub struct ChatSession<T: Transport> {
    transport: T,
    status: ConnectionStatus,
    user: Option<String>,
    messages: Vec<ChatMessage>,
    acked: HashSet<String>,
    error: Option<String>,
}

impl<T: Transport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            status: ConnectionStatus::Disconnected,
            user: None,
            messages: Vec::new(),
            acked: HashSet::new(),
            error: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// The authenticated user, once welcomed.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_acked(&self, id: &str) -> bool {
        self.acked.contains(id)
    }

    /// Text of the error banner, if one is showing.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Opens a connection, tearing down any previous one first.
    pub fn connect(&mut self, credential: &str) -> FolioResult<()> {
        debug!(status = ?self.status, "resetting transport before connect");
        self.transport.close();
        self.user = None;
        self.status = ConnectionStatus::Connecting;
        match self.transport.open(credential) {
            Ok(()) => {
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Feeds one transport event into the state machine.
    pub fn handle(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connected => {
                if self.status != ConnectionStatus::Connected {
                    self.status = ConnectionStatus::Connecting;
                }
            }
            InboundEvent::Welcome { user, history } => {
                info!(%user, history = history.len(), "chat session authenticated");
                self.status = ConnectionStatus::Connected;
                self.user = Some(user);
                self.messages = history;
                self.error = None;
            }
            InboundEvent::NewMessage(message) => self.messages.push(message),
            InboundEvent::MessageAck { id } => {
                self.acked.insert(id);
            }
            InboundEvent::Disconnected { reason } => {
                debug!(?reason, "chat disconnected");
                self.status = ConnectionStatus::Disconnected;
            }
            InboundEvent::ConnectError { message } => {
                warn!(%message, "chat connection failed");
                self.status = ConnectionStatus::Error;
                self.error = Some(message);
            }
        }
    }

    /// Sends a message. Empty bodies are refused.
    pub fn send(&mut self, body: &str) -> FolioResult<()> {
        if body.trim().is_empty() {
            return Err(FolioError::transport("message body is empty"));
        }
        self.emit(OutboundEvent::SendMessage {
            body: body.to_string(),
        })
    }

    /// Asks the server for the last `limit` messages.
    pub fn request_history(&mut self, limit: usize) -> FolioResult<()> {
        self.emit(OutboundEvent::RequestHistory { limit })
    }

    /// Closes the connection.
    pub fn disconnect(&mut self) {
        self.transport.close();
        self.status = ConnectionStatus::Disconnected;
    }

    fn emit(&mut self, event: OutboundEvent) -> FolioResult<()> {
        if !self.status.is_connected() {
            return Err(FolioError::transport(format!(
                "not connected ({:?})",
                self.status
            )));
        }
        match self.transport.emit(&event) {
            Ok(()) => {
                self.error = None;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "chat emit failed");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: FolioError) -> FolioError {
        warn!(%err, "chat transport error");
        self.status = ConnectionStatus::Error;
        self.error = Some(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MemoryTransport {
        open: bool,
        opened: usize,
        closed: usize,
        sent: Vec<OutboundEvent>,
        refuse_open: bool,
        refuse_emit: bool,
    }

    impl Transport for MemoryTransport {
        fn open(&mut self, credential: &str) -> FolioResult<()> {
            if self.refuse_open || credential.is_empty() {
                return Err(FolioError::transport("credential rejected"));
            }
            self.open = true;
            self.opened += 1;
            Ok(())
        }

        fn emit(&mut self, event: &OutboundEvent) -> FolioResult<()> {
            if self.refuse_emit {
                return Err(FolioError::transport("socket closed"));
            }
            self.sent.push(event.clone());
            Ok(())
        }

        fn close(&mut self) {
            if self.open {
                self.closed += 1;
            }
            self.open = false;
        }
    }

    fn message(id: &str, body: &str) -> ChatMessage {
        ChatMessage {
            id: id.into(),
            author: "bo".into(),
            body: body.into(),
            timestamp: 0,
        }
    }

    fn connected() -> ChatSession<MemoryTransport> {
        let mut session = ChatSession::new(MemoryTransport::default());
        session.connect("tok").unwrap();
        session.handle(InboundEvent::Connected);
        session.handle(InboundEvent::Welcome {
            user: "ana".into(),
            history: vec![message("1", "old")],
        });
        session
    }

    #[test]
    fn test_connect_lifecycle() {
        let mut session = ChatSession::new(MemoryTransport::default());
        assert_eq!(session.status(), ConnectionStatus::Disconnected);

        session.connect("tok").unwrap();
        assert_eq!(session.status(), ConnectionStatus::Connecting);
        session.handle(InboundEvent::Connected);
        assert_eq!(session.status(), ConnectionStatus::Connecting);

        session.handle(InboundEvent::Welcome {
            user: "ana".into(),
            history: vec![message("1", "old")],
        });
        assert_eq!(session.status(), ConnectionStatus::Connected);
        assert_eq!(session.user(), Some("ana"));
        assert_eq!(session.messages().len(), 1);

        session.handle(InboundEvent::Disconnected {
            reason: Some("server restart".into()),
        });
        assert_eq!(session.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_reconnect_closes_previous() {
        let mut session = connected();
        session.connect("tok").unwrap();
        assert_eq!(session.transport().closed, 1);
        assert_eq!(session.transport().opened, 2);
        assert_eq!(session.status(), ConnectionStatus::Connecting);
    }

    #[test]
    fn test_reconnect_after_remote_disconnect_tears_down() {
        let mut session = connected();
        session.handle(InboundEvent::Disconnected { reason: None });
        assert!(session.transport().open);

        session.connect("tok").unwrap();
        assert_eq!(session.transport().closed, 1);
        assert_eq!(session.transport().opened, 2);
    }

    #[test]
    fn test_first_connect_close_is_noop() {
        let mut session = ChatSession::new(MemoryTransport::default());
        session.connect("tok").unwrap();
        assert_eq!(session.transport().closed, 0);
        assert_eq!(session.transport().opened, 1);
    }

    #[test]
    fn test_messages_in_arrival_order() {
        let mut session = connected();
        session.handle(InboundEvent::NewMessage(message("2", "a")));
        session.handle(InboundEvent::NewMessage(message("3", "b")));
        let ids: Vec<_> = session.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        session.handle(InboundEvent::MessageAck { id: "3".into() });
        assert!(session.is_acked("3"));
        assert!(!session.is_acked("2"));
    }

    #[test]
    fn test_send_requires_connection_and_body() {
        let mut session = ChatSession::new(MemoryTransport::default());
        assert!(session.send("hello").is_err());

        let mut session = connected();
        assert!(session.send("   ").is_err());
        session.send("hello").unwrap();
        session.request_history(20).unwrap();
        assert_eq!(
            session.transport().sent,
            vec![
                OutboundEvent::SendMessage {
                    body: "hello".into()
                },
                OutboundEvent::RequestHistory { limit: 20 },
            ]
        );
    }

    #[test]
    fn test_error_banner() {
        let mut session = ChatSession::new(MemoryTransport::default());
        assert!(session.connect("").is_err());
        assert_eq!(session.status(), ConnectionStatus::Error);
        assert_eq!(session.error(), Some("Transport error: credential rejected"));
        session.dismiss_error();
        assert_eq!(session.error(), None);

        session.handle(InboundEvent::ConnectError {
            message: "timeout".into(),
        });
        assert_eq!(session.status(), ConnectionStatus::Error);
        assert_eq!(session.error(), Some("timeout"));

        session.connect("tok").unwrap();
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_emit_failure_sets_banner() {
        let mut session = connected();
        session.transport_mut().refuse_emit = true;
        assert!(session.send("hi").is_err());
        assert!(session.error().is_some());

        session.transport_mut().refuse_emit = false;
        session.send("hi").unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_disconnect() {
        let mut session = connected();
        session.disconnect();
        assert_eq!(session.status(), ConnectionStatus::Disconnected);
        assert!(!session.transport().open);
    }
}
