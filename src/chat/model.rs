//! Chat data types and the event vocabulary shared with the transport.

use serde::{Deserialize, Serialize};

/// Connection lifecycle. `Error` is terminal until the user reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    /// Connected and authenticated.
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// One chat message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub author: String,
    pub body: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Events pushed by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    /// The socket is open; authentication is still pending.
    Connected,
    /// Authenticated. Carries the recent history, oldest first.
    Welcome {
        user: String,
        #[serde(default)]
        history: Vec<ChatMessage>,
    },
    NewMessage(ChatMessage),
    MessageAck { id: String },
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    ConnectError { message: String },
}

/// Requests sent to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    RequestHistory { limit: usize },
    SendMessage { body: String },
}

/// The two values the client keeps between visits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIdentity {
    pub credential: Option<String>,
    pub display_name: Option<String>,
}

impl StoredIdentity {
    pub fn new(credential: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
            display_name: Some(display_name.into()),
        }
    }

    pub fn from_json(json: &str) -> crate::FolioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::FolioResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_events_parse() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"event":"welcome","user":"ana","history":[{"id":"1","author":"bo","body":"hey","timestamp":5}]}"#,
        )
        .unwrap();
        let InboundEvent::Welcome { user, history } = event else {
            panic!("expected welcome");
        };
        assert_eq!(user, "ana");
        assert_eq!(history[0].body, "hey");

        let event: InboundEvent =
            serde_json::from_str(r#"{"event":"new_message","id":"2","author":"bo","body":"yo","timestamp":6}"#)
                .unwrap();
        assert!(matches!(event, InboundEvent::NewMessage(ref m) if m.id == "2"));

        let event: InboundEvent = serde_json::from_str(r#"{"event":"disconnected"}"#).unwrap();
        assert_eq!(event, InboundEvent::Disconnected { reason: None });
    }

    #[test]
    fn test_outbound_shape() {
        let json = serde_json::to_string(&OutboundEvent::RequestHistory { limit: 50 }).unwrap();
        assert_eq!(json, r#"{"event":"request_history","limit":50}"#);
    }

    #[test]
    fn test_identity_json() {
        let identity = StoredIdentity::new("tok", "Ana");
        let back = StoredIdentity::from_json(&identity.to_json().unwrap()).unwrap();
        assert_eq!(back, identity);
        assert_eq!(StoredIdentity::from_json("{}").unwrap(), StoredIdentity::default());
    }
}
