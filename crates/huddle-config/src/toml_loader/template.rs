//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# huddle relay configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind = "0.0.0.0"
# port = 3000

[relay]
# outbound_queue = 256        # frames buffered per connection, 1-65536
# command_queue = 1024        # commands buffered ahead of the coordinator, 1-1048576
# stats_interval_secs = 60    # 0 disables the stats log line

[chat]
# max_message_chars = 4096    # 0 = unlimited

[logging]
level = "info"                # trace, debug, info, warn, error
"##
}
