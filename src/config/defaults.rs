//! The default configuration template written on first run.

/// Commented template placed next to the binary when no config file exists.
/// The daemon exits after writing it so the operator can fill in the
/// credentials before the first real start.
pub const DEFAULT_CONFIG: &str = r#"# wardend configuration
#
# Connection to the voice server's query interface.
server.host = 127.0.0.1
# Voice port of the virtual server to moderate.
server.port = 9987
# Query port of the server instance.
query.port = 10011
# Query login credentials.
query.username = serveradmin
query.password = changeme

# Nickname the daemon uses on the server.
bot.username = Warden
# Channel the daemon returns to after acting (its home channel).
bot.channel = 1
# Respect the server's command rate limit: poll every 5 seconds instead
# of every second. Enable this unless the daemon's IP is whitelisted.
bot.slowmode = true
# Plugins to enable: welcome, afk, badname, recording, support,
# advertisement. Comma-separated.
bot.plugins = afk, badname, recording, support

# --- welcome ---------------------------------------------------------
# Placeholders: %clientName%, %clientIP%, %clientCountry%,
# %totalConnections%, %lastConnection%.
welcome.message = Welcome back, %clientName%! Connection no. %totalConnections%.
# Only greet clients with at most this many total connections; -1 greets
# everyone.
welcome.connections = -1
# Server groups that never receive the greeting; -1 disables the filter.
welcome.groups = -1

# --- afk -------------------------------------------------------------
# Seconds of inactivity before a client counts as idle.
afk.idle-time = 600
# Channel idle clients are moved to.
afk.channel = 2
# Whether to tell the client about the move, and how: poke or chat.
afk.notify = true
afk.notify-type = chat
afk.notify-message = You have been moved: too long idle.
# Remove clients that stay idle. afk.kick-time counts from the last
# activity, not from the move.
afk.kick = false
afk.kick-time = 3600
afk.kick-reason = Idle for too long.
# Server groups / channels exempt from idle handling; -1 disables.
afk.bypass-groups = -1
afk.bypass-channel = -1

# --- badname ---------------------------------------------------------
# Patterns (anchored, case-insensitive) a name must not match.
badname.pattern = .*admin.*, .*server.*
# What to do with a matching client: warn or kick.
badname.client-action = warn
badname.client-warn-message = Please change your nickname.
badname.client-kick-message = Forbidden nickname.
# What to do with a matching channel: rename or delete. On a rejected
# rename the channel is deleted instead. %date% expands to a timestamp.
badname.channel-action = rename
badname.channel-rename = Renamed %date%
# Exemptions; -1 disables.
badname.bypass-groups = -1
badname.bypass-channel = -1

# --- recording -------------------------------------------------------
# What to do with a recording client: kick or move.
recording.action = move
recording.move-message = Recording is not allowed here.
recording.kick-message = Recording is not allowed on this server.
# Channels where recording is fine / groups allowed to record; -1 disables.
recording.bypass-channel = -1
recording.bypass-groups = -1

# --- support ---------------------------------------------------------
# Clients moving into this channel are treated as support requests.
support.channel = 3
# Server groups to notify about a request; members of these groups are
# never treated as requesters themselves.
support.notify-groups = 6
# Poke sent to the notified groups. %clientName% expands to a clickable
# reference to the requester.
support.notify-message = %clientName% requests support.
# Sent to the requester when nobody from the notify groups is online.
support.message-fail = No supporter is available right now, please try again later.
# Sent to the requester once the supporters have been notified.
support.message = A supporter has been notified and will be with you shortly.
# Create a private sub-channel per request and move the requester into
# it. %clientName% and %date% expand in the channel name.
support.channel-create = false
support.channel-name = Support %clientName% (%date%)

# --- advertisement ---------------------------------------------------
# Broadcast sent to the whole server every advertisement.delay minutes.
advertisement.message = This server is moderated by wardend.
advertisement.delay = 30
"#;

#[cfg(test)]
mod tests {
    use super::DEFAULT_CONFIG;
    use crate::config::{validate, Config};

    #[test]
    fn template_parses_and_validates() {
        let config = Config::parse_str(DEFAULT_CONFIG);
        validate(&config).expect("default template must validate");
    }
}
