//! Connection registry: the direct connection → room index.

use std::collections::HashMap;
use std::time::Instant;

use huddle_common::ConnectionId;

/// Where a joined connection currently lives.
#[derive(Debug, Clone)]
pub struct Membership {
    pub room_id: String,
    pub display_name: Option<String>,
    pub joined_at: Instant,
}

/// Maps each joined connection to its room. Connections that never joined
/// have no entry.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, Membership>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `id` with `room_id`, overwriting any prior association.
    ///
    /// A display name, once recorded, is kept; later joins cannot rename the
    /// connection. Returns the prior room, if any.
    pub fn record_join(
        &mut self,
        id: &ConnectionId,
        room_id: &str,
        display_name: Option<String>,
    ) -> Option<String> {
        let prior = self.entries.remove(id);
        let display_name = prior
            .as_ref()
            .and_then(|m| m.display_name.clone())
            .or(display_name);

        self.entries.insert(
            id.clone(),
            Membership {
                room_id: room_id.to_string(),
                display_name,
                joined_at: Instant::now(),
            },
        );
        prior.map(|m| m.room_id)
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<&str> {
        self.entries.get(id).map(|m| m.room_id.as_str())
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Membership> {
        self.entries.get(id)
    }

    /// Drop the association, handing back what was recorded.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Membership> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
