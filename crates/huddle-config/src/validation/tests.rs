//! Tests for the validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = HuddleConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_zero_outbound_queue() {
    let mut config = HuddleConfig::default();
    config.relay.outbound_queue = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.outbound_queue"));
}

#[test]
fn catches_oversized_command_queue() {
    let mut config = HuddleConfig::default();
    config.relay.command_queue = 2_000_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.command_queue"));
}

#[test]
fn catches_blank_bind_address() {
    let mut config = HuddleConfig::default();
    config.server.bind = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.bind"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = HuddleConfig::default();
    config.relay.outbound_queue = 0;
    config.relay.command_queue = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.outbound_queue"));
    assert!(err.contains("relay.command_queue"));
    assert!(err.contains("; "));
}

#[test]
fn zero_chat_limit_is_allowed() {
    let mut config = HuddleConfig::default();
    config.chat.max_message_chars = 0;
    assert!(validate(&config).is_ok());
}
