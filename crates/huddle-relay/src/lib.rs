//! huddle-relay: room coordination and signaling relay for multi-party calls.
//!
//! Tracks which connections are in which room, relays opaque peer-connection
//! negotiation payloads between them, buffers and fans out room chat, and
//! announces joins and departures. Media never passes through the relay.

pub mod connection;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod protocol;
pub mod registry;
pub mod rooms;
pub mod server;

pub use coordinator::{Coordinator, Departure, Stats};
pub use dispatch::{ChannelDispatcher, Dispatch, OutboundSender};
pub use error::{DispatchError, RelayError};
pub use handle::CoordinatorHandle;
pub use protocol::{ClientEvent, ServerEvent};
pub use server::Server;
