//! Chat client core.
//!
//! This module provides:
//! - `model`: connection status, messages, and the inbound/outbound events
//! - `session`: ChatSession, the connection state machine over a `Transport`
//!
//! The network transport and the credential exchange live outside this
//! crate. Hosts implement [`Transport`] and feed events into
//! [`ChatSession::handle`].

pub mod model;
pub mod session;

pub use model::{ChatMessage, ConnectionStatus, InboundEvent, OutboundEvent, StoredIdentity};
pub use session::{ChatSession, Transport};
