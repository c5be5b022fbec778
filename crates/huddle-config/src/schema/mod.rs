//! Configuration schema types for huddle.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod relay;
mod server;
mod system;

pub use relay::*;
pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for the relay server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: HuddleConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.relay.command_queue, 1024);
        assert_eq!(config.relay.stats_interval_secs, 60);
        assert_eq!(config.chat.max_message_chars, 4096);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: HuddleConfig = toml::from_str(
            r#"
[relay]
outbound_queue = 32
"#,
        )
        .unwrap();
        assert_eq!(config.relay.outbound_queue, 32);
        assert_eq!(config.relay.command_queue, 1024);
        assert_eq!(config.server.port, 3000);
    }
}
