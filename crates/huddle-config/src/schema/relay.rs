use serde::{Deserialize, Serialize};

/// Coordinator and per-connection queue sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Outbound frames buffered per connection before new frames are dropped.
    pub outbound_queue: usize,
    /// Inbound commands buffered ahead of the coordinator loop.
    pub command_queue: usize,
    /// Seconds between stats log lines. 0 disables the tick.
    pub stats_interval_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            outbound_queue: 256,
            command_queue: 1024,
            stats_interval_secs: 60,
        }
    }
}

/// Chat limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Longest accepted chat text, in characters. 0 means unlimited.
    pub max_message_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4096,
        }
    }
}
