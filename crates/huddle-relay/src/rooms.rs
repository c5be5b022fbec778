//! Room store: ordered membership and chat replay buffer per room.
//!
//! A room exists only while it has members. Removing the last member drops
//! the room together with its chat history.

use std::collections::HashMap;

use huddle_common::ConnectionId;

/// A chat message as buffered for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub display_name: String,
    pub sender: ConnectionId,
}

#[derive(Debug, Default)]
pub struct Room {
    /// Join order.
    members: Vec<ConnectionId>,
    /// Send order. Retained for the life of the room.
    chat: Vec<ChatMessage>,
}

impl Room {
    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }
}

#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<String, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing room, or a fresh empty one. Callers must add a member in the
    /// same step so no empty room outlives the operation.
    pub fn ensure(&mut self, room_id: &str) -> &mut Room {
        self.rooms.entry(room_id.to_string()).or_default()
    }

    /// Append `id` to the room, creating it if needed. Returns the members
    /// present before the append, in join order.
    pub fn add_member(&mut self, room_id: &str, id: &ConnectionId) -> Vec<ConnectionId> {
        let room = self.ensure(room_id);
        let existing = room.members.clone();
        room.members.push(id.clone());
        existing
    }

    /// Remove `id` from the room and return who is left. Deletes the room and
    /// its chat buffer when nobody is.
    pub fn remove_member(&mut self, room_id: &str, id: &ConnectionId) -> Vec<ConnectionId> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };

        room.members.retain(|m| m != id);
        if room.members.is_empty() {
            self.rooms.remove(room_id);
            return Vec::new();
        }
        room.members.clone()
    }

    /// Buffer a message. Returns false (and drops it) if the room is gone.
    pub fn append_message(&mut self, room_id: &str, message: ChatMessage) -> bool {
        match self.rooms.get_mut(room_id) {
            Some(room) => {
                room.chat.push(message);
                true
            }
            None => false,
        }
    }

    /// Buffered messages in send order; empty for unknown rooms.
    pub fn replay(&self, room_id: &str) -> &[ChatMessage] {
        self.rooms.get(room_id).map(Room::chat).unwrap_or(&[])
    }

    pub fn members(&self, room_id: &str) -> &[ConnectionId] {
        self.rooms.get(room_id).map(Room::members).unwrap_or(&[])
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
