//! Error taxonomy for the coordination core.
//!
//! None of these are fatal: the event loop logs them and moves on, and a bad
//! event from one connection never touches another connection's state.

use huddle_common::ConnectionId;

/// Failure of a single coordinator operation.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Malformed or out-of-limits event. Discarded without a state change.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Relay target is not connected. Dropped silently.
    #[error("unknown target: {0}")]
    UnknownTarget(ConnectionId),

    /// Chat from a connection that has not joined a room. Dropped silently.
    #[error("connection {0} is not in a room")]
    NotInRoom(ConnectionId),

    /// The coordinator loop has stopped; no further commands are accepted.
    #[error("coordinator stopped")]
    Stopped,
}

/// Failure to hand a frame to a connection's outbound queue.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no outbound channel for {0}")]
    UnknownTarget(ConnectionId),

    #[error("outbound queue full for {0}")]
    QueueFull(ConnectionId),

    #[error("outbound channel closed for {0}")]
    Closed(ConnectionId),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_error_display() {
        let err = RelayError::Protocol("missing field `room_id`".into());
        assert_eq!(err.to_string(), "protocol error: missing field `room_id`");

        let err = RelayError::NotInRoom(ConnectionId::from("c1"));
        assert_eq!(err.to_string(), "connection c1 is not in a room");

        let err = RelayError::UnknownTarget(ConnectionId::from("ghost"));
        assert_eq!(err.to_string(), "unknown target: ghost");
    }

    #[test]
    fn dispatch_error_display() {
        let err = DispatchError::QueueFull(ConnectionId::from("slow"));
        assert_eq!(err.to_string(), "outbound queue full for slow");
    }
}
