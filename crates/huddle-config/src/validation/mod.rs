//! Configuration validation.
//!
//! Checks numeric ranges and collects every failure into a single
//! `ConfigError` so the operator sees all problems at once.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::HuddleConfig;
use huddle_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &HuddleConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_relay(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &HuddleConfig) {
    if config.server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }
}

fn validate_relay(errors: &mut Vec<String>, config: &HuddleConfig) {
    validate_range(
        errors,
        "relay.outbound_queue",
        config.relay.outbound_queue,
        1,
        65_536,
    );
    validate_range(
        errors,
        "relay.command_queue",
        config.relay.command_queue,
        1,
        1_048_576,
    );
}
