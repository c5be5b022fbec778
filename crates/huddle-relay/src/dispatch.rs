//! Relay dispatcher: hands events to a connection's outbound queue.
//!
//! Delivery is best-effort. A target without an outbound channel, or whose
//! queue is full, loses the frame; shared state is never affected.

use std::collections::HashMap;

use huddle_common::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::DispatchError;
use crate::protocol::ServerEvent;

/// Sender half of a connection's outbound queue. Frames are encoded JSON.
pub type OutboundSender = mpsc::Sender<String>;

/// Capability to deliver events to connections by id.
pub trait Dispatch {
    /// Transport-side handle used to reach one connection.
    type Sink;

    fn attach(&mut self, id: ConnectionId, sink: Self::Sink);

    /// Forget a connection. Returns false if it was not attached.
    fn detach(&mut self, id: &ConnectionId) -> bool;

    fn send(&self, target: &ConnectionId, event: &ServerEvent) -> Result<(), DispatchError>;

    /// Number of attached connections.
    fn connected(&self) -> usize;

    /// Send to each target in order, returning how many accepted the frame.
    fn broadcast(&self, targets: &[ConnectionId], event: &ServerEvent) -> usize {
        targets
            .iter()
            .filter(|t| log_failure(self.send(t, event)))
            .count()
    }
}

/// Dispatcher backed by bounded per-connection tokio channels.
///
/// `try_send` keeps one stalled client from holding up fan-out to the rest;
/// when its queue is full the new frame is dropped.
#[derive(Debug, Default)]
pub struct ChannelDispatcher {
    outbound: HashMap<ConnectionId, OutboundSender>,
}

impl ChannelDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, target: &ConnectionId, frame: String) -> Result<(), DispatchError> {
        let tx = self
            .outbound
            .get(target)
            .ok_or_else(|| DispatchError::UnknownTarget(target.clone()))?;

        tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DispatchError::QueueFull(target.clone()),
            TrySendError::Closed(_) => DispatchError::Closed(target.clone()),
        })
    }
}

impl Dispatch for ChannelDispatcher {
    type Sink = OutboundSender;

    fn attach(&mut self, id: ConnectionId, sink: OutboundSender) {
        self.outbound.insert(id, sink);
    }

    fn detach(&mut self, id: &ConnectionId) -> bool {
        self.outbound.remove(id).is_some()
    }

    fn send(&self, target: &ConnectionId, event: &ServerEvent) -> Result<(), DispatchError> {
        let frame = serde_json::to_string(event)?;
        self.push(target, frame)
    }

    fn connected(&self) -> usize {
        self.outbound.len()
    }

    fn broadcast(&self, targets: &[ConnectionId], event: &ServerEvent) -> usize {
        // Encode once for the whole fan-out.
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode broadcast");
                return 0;
            }
        };

        targets
            .iter()
            .filter(|t| log_failure(self.push(t, frame.clone())))
            .count()
    }
}

/// Log a failed delivery at a level matching its cause. Returns true on success.
pub(crate) fn log_failure(result: Result<(), DispatchError>) -> bool {
    match result {
        Ok(()) => true,
        Err(DispatchError::QueueFull(id)) => {
            tracing::warn!(conn = %id, "Outbound queue full, dropping frame");
            false
        }
        Err(e @ DispatchError::Encode(_)) => {
            tracing::error!(error = %e, "Dropping frame");
            false
        }
        Err(e) => {
            tracing::debug!(error = %e, "Dropping frame");
            false
        }
    }
}
