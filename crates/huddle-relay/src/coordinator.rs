//! Presence and chat coordinator.
//!
//! The sole writer of the registry and room store. Every method runs to
//! completion against in-memory state, then fans results out through the
//! dispatcher; a lost frame never leaves the maps inconsistent.

use std::time::Duration;

use huddle_common::ConnectionId;
use serde_json::value::RawValue;

use crate::dispatch::{log_failure, Dispatch};
use crate::error::{DispatchError, RelayError};
use crate::protocol::ServerEvent;
use crate::registry::ConnectionRegistry;
use crate::rooms::{ChatMessage, RoomStore};

/// Result of a connection leaving its room.
#[derive(Debug, Clone)]
pub struct Departure {
    pub room_id: String,
    /// Members still in the room; empty when the room was deleted.
    pub remaining: Vec<ConnectionId>,
    /// Time since the connection joined the room.
    pub connected_for: Duration,
}

/// Snapshot of live state sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub connections: usize,
    pub joined: usize,
    pub rooms: usize,
}

pub struct Coordinator<D> {
    registry: ConnectionRegistry,
    rooms: RoomStore,
    dispatcher: D,
    max_message_chars: usize,
}

impl<D: Dispatch> Coordinator<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            rooms: RoomStore::new(),
            dispatcher,
            max_message_chars: 0,
        }
    }

    /// Reject chat text longer than `chars` characters. 0 means unlimited.
    pub fn with_max_message_chars(mut self, chars: usize) -> Self {
        self.max_message_chars = chars;
        self
    }

    /// A transport connection opened: attach its sink and tell it its id.
    pub fn connect(&mut self, id: ConnectionId, sink: D::Sink) {
        self.dispatcher.attach(id.clone(), sink);
        self.deliver(
            &id,
            &ServerEvent::Welcome {
                connection_id: id.clone(),
            },
        );
        tracing::debug!(conn = %id, "Connection attached");
    }

    /// Join `room_id`. Returns the members present before the join.
    ///
    /// A connection already in another room leaves it first, so it is never
    /// listed in two rooms. Re-joining the current room changes nothing and
    /// only repeats the acknowledgement.
    pub fn join(
        &mut self,
        id: &ConnectionId,
        room_id: &str,
        display_name: Option<String>,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        if room_id.is_empty() {
            return Err(RelayError::Protocol("room_id must not be empty".into()));
        }

        if self.registry.room_of(id) == Some(room_id) {
            let others: Vec<ConnectionId> = self
                .rooms
                .members(room_id)
                .iter()
                .filter(|m| *m != id)
                .cloned()
                .collect();
            self.deliver(
                id,
                &ServerEvent::Joined {
                    room_id: room_id.to_string(),
                    members: others.clone(),
                },
            );
            return Ok(others);
        }

        let display_name = self
            .registry
            .get(id)
            .and_then(|m| m.display_name.clone())
            .or(display_name);
        if let Some(previous) = self.leave(id) {
            tracing::info!(
                conn = %id,
                from = %previous.room_id,
                to = %room_id,
                "Switching rooms"
            );
        }

        self.registry.record_join(id, room_id, display_name);
        let existing = self.rooms.add_member(room_id, id);
        let members = self.rooms.members(room_id).to_vec();

        self.dispatcher.broadcast(
            &existing,
            &ServerEvent::PeerJoined {
                connection_id: id.clone(),
                members,
            },
        );
        self.deliver(
            id,
            &ServerEvent::Joined {
                room_id: room_id.to_string(),
                members: existing.clone(),
            },
        );
        for message in self.rooms.replay(room_id) {
            self.deliver(
                id,
                &ServerEvent::ChatMessage {
                    text: message.text.clone(),
                    display_name: message.display_name.clone(),
                    sender: message.sender.clone(),
                },
            );
        }

        tracing::info!(
            conn = %id,
            room = %room_id,
            members = existing.len() + 1,
            replayed = self.rooms.replay(room_id).len(),
            "Joined room"
        );
        Ok(existing)
    }

    /// Forward an opaque negotiation payload to `target`, tagged with the sender.
    pub fn relay_signal(
        &self,
        from: &ConnectionId,
        target: &ConnectionId,
        payload: Box<RawValue>,
    ) -> Result<(), RelayError> {
        let event = ServerEvent::Signal {
            from: from.clone(),
            payload,
        };
        match self.dispatcher.send(target, &event) {
            Err(DispatchError::UnknownTarget(_)) => Err(RelayError::UnknownTarget(target.clone())),
            other => {
                log_failure(other);
                Ok(())
            }
        }
    }

    /// Buffer a chat message in the sender's room and deliver it to every
    /// member, sender included. Returns the number of members reached.
    ///
    /// Without a `display_name` the name recorded at join is used.
    pub fn chat_message(
        &mut self,
        from: &ConnectionId,
        text: String,
        display_name: Option<String>,
    ) -> Result<usize, RelayError> {
        if self.max_message_chars > 0 && text.chars().count() > self.max_message_chars {
            return Err(RelayError::Protocol(format!(
                "chat message longer than {} characters",
                self.max_message_chars
            )));
        }

        let membership = self
            .registry
            .get(from)
            .ok_or_else(|| RelayError::NotInRoom(from.clone()))?;
        let room_id = membership.room_id.clone();
        let display_name = display_name
            .or_else(|| membership.display_name.clone())
            .unwrap_or_default();

        tracing::debug!(conn = %from, room = %room_id, sender = %display_name, "Chat message");

        let message = ChatMessage {
            text,
            display_name,
            sender: from.clone(),
        };
        let event = ServerEvent::ChatMessage {
            text: message.text.clone(),
            display_name: message.display_name.clone(),
            sender: from.clone(),
        };
        if !self.rooms.append_message(&room_id, message) {
            tracing::error!(conn = %from, room = %room_id, "Registry points at a missing room");
            return Err(RelayError::NotInRoom(from.clone()));
        }

        Ok(self
            .dispatcher
            .broadcast(self.rooms.members(&room_id), &event))
    }

    /// The transport connection closed. Detaches its sink, removes it from
    /// its room and tells the remaining members.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Option<Departure> {
        self.dispatcher.detach(id);
        let departure = self.leave(id);

        match &departure {
            Some(d) => tracing::info!(
                conn = %id,
                room = %d.room_id,
                remaining = d.remaining.len(),
                online_ms = d.connected_for.as_millis() as u64,
                "Connection left"
            ),
            None => tracing::debug!(conn = %id, "Connection closed before joining"),
        }
        departure
    }

    /// Reply to `id` with a protocol error notice. State is untouched.
    pub fn reject(&self, id: &ConnectionId, error: &RelayError) {
        self.deliver(
            id,
            &ServerEvent::Error {
                message: error.to_string(),
            },
        );
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<&str> {
        self.registry.room_of(id)
    }

    pub fn members(&self, room_id: &str) -> &[ConnectionId] {
        self.rooms.members(room_id)
    }

    pub fn replay(&self, room_id: &str) -> &[ChatMessage] {
        self.rooms.replay(room_id)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            connections: self.dispatcher.connected(),
            joined: self.registry.len(),
            rooms: self.rooms.len(),
        }
    }

    fn leave(&mut self, id: &ConnectionId) -> Option<Departure> {
        let membership = self.registry.remove(id)?;
        let remaining = self.rooms.remove_member(&membership.room_id, id);

        self.dispatcher.broadcast(
            &remaining,
            &ServerEvent::PeerLeft {
                connection_id: id.clone(),
            },
        );
        if remaining.is_empty() {
            tracing::debug!(room = %membership.room_id, "Room closed");
        }

        Some(Departure {
            room_id: membership.room_id,
            remaining,
            connected_for: membership.joined_at.elapsed(),
        })
    }

    fn deliver(&self, target: &ConnectionId, event: &ServerEvent) {
        log_failure(self.dispatcher.send(target, event));
    }
}
