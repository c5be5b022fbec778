//! Single-task event loop around the [`Coordinator`].
//!
//! Connection tasks submit commands through a cloneable [`CoordinatorHandle`].
//! The loop applies them one at a time, so no two operations ever interleave
//! on the registry or room store. Commands from one connection keep their
//! submission order.

use std::time::Duration;

use huddle_common::ConnectionId;
use huddle_config::{ChatConfig, RelayConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval};

use crate::coordinator::{Coordinator, Stats};
use crate::dispatch::{ChannelDispatcher, Dispatch, OutboundSender};
use crate::error::RelayError;
use crate::protocol::ClientEvent;

enum Command {
    Connect {
        id: ConnectionId,
        sink: OutboundSender,
    },
    Event {
        from: ConnectionId,
        event: ClientEvent,
    },
    Reject {
        from: ConnectionId,
        error: RelayError,
    },
    Disconnect {
        id: ConnectionId,
    },
    Stats {
        reply: oneshot::Sender<Stats>,
    },
    Shutdown,
}

/// Cloneable entry point to the coordinator loop.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    pub async fn connect(&self, id: ConnectionId, sink: OutboundSender) -> Result<(), RelayError> {
        self.submit(Command::Connect { id, sink }).await
    }

    pub async fn event(&self, from: ConnectionId, event: ClientEvent) -> Result<(), RelayError> {
        self.submit(Command::Event { from, event }).await
    }

    /// Report a frame that could not be parsed. The error notice is queued
    /// behind the replies to that connection's earlier events.
    pub async fn reject(&self, from: ConnectionId, error: RelayError) -> Result<(), RelayError> {
        self.submit(Command::Reject { from, error }).await
    }

    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), RelayError> {
        self.submit(Command::Disconnect { id }).await
    }

    pub async fn stats(&self) -> Result<Stats, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Stats { reply }).await?;
        rx.await.map_err(|_| RelayError::Stopped)
    }

    /// Ask the loop to stop after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), RelayError> {
        self.submit(Command::Shutdown).await
    }

    async fn submit(&self, command: Command) -> Result<(), RelayError> {
        self.tx.send(command).await.map_err(|_| RelayError::Stopped)
    }
}

/// Start the coordinator loop on the current runtime.
///
/// The loop ends on [`CoordinatorHandle::shutdown`] or when every handle has
/// been dropped.
pub fn spawn(relay: &RelayConfig, chat: &ChatConfig) -> (CoordinatorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(relay.command_queue.max(1));
    let coordinator =
        Coordinator::new(ChannelDispatcher::new()).with_max_message_chars(chat.max_message_chars);

    let stats_every = match relay.stats_interval_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let task = tokio::spawn(run(coordinator, rx, stats_every));
    (CoordinatorHandle { tx }, task)
}

async fn run(
    mut coordinator: Coordinator<ChannelDispatcher>,
    mut rx: mpsc::Receiver<Command>,
    stats_every: Option<Duration>,
) {
    let mut ticker = stats_every.map(|period| interval_at(Instant::now() + period, period));

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut coordinator, command),
            },
            _ = tick(&mut ticker) => {
                let stats = coordinator.stats();
                tracing::debug!(
                    connections = stats.connections,
                    joined = stats.joined,
                    rooms = stats.rooms,
                    "Stats tick"
                );
            }
        }
    }

    let stats = coordinator.stats();
    tracing::info!(
        connections = stats.connections,
        rooms = stats.rooms,
        "Coordinator stopped"
    );
}

fn apply<D: Dispatch<Sink = OutboundSender>>(coordinator: &mut Coordinator<D>, command: Command) {
    match command {
        Command::Connect { id, sink } => coordinator.connect(id, sink),
        Command::Event { from, event } => {
            let result = match event {
                ClientEvent::JoinCall {
                    room_id,
                    display_name,
                } => coordinator.join(&from, &room_id, display_name).map(|_| ()),
                ClientEvent::Signal { target, payload } => {
                    coordinator.relay_signal(&from, &target, payload)
                }
                ClientEvent::ChatMessage { text, display_name } => coordinator
                    .chat_message(&from, text, display_name)
                    .map(|_| ()),
            };

            match result {
                Ok(()) => {}
                Err(e @ RelayError::Protocol(_)) => {
                    tracing::debug!(conn = %from, error = %e, "Rejected event");
                    coordinator.reject(&from, &e);
                }
                Err(e) => tracing::debug!(conn = %from, error = %e, "Event dropped"),
            }
        }
        Command::Reject { from, error } => {
            tracing::debug!(conn = %from, error = %error, "Discarding malformed frame");
            coordinator.reject(&from, &error);
        }
        Command::Disconnect { id } => {
            coordinator.disconnect(&id);
        }
        Command::Stats { reply } => {
            let _ = reply.send(coordinator.stats());
        }
        Command::Shutdown => {}
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
