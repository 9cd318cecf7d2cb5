//! Name filtering for clients and channels.
//!
//! Client nicknames are re-checked by a recurring probe (names change
//! without producing an event); channels are checked once whenever they
//! are created or edited, plus one sweep at startup.

use crate::config::{Config, ConfigError, Key};
use crate::link::{ChannelId, ClientId, ClientKind, ControlLink, Event, LinkResult};
use crate::policy::{ActionKind, BypassRule, Enforcer, HysteresisState};
use crate::sched::{Probe, WorkerRegistry, SEED_SPACING};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use regex::{Regex, RegexBuilder};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Plugin;

/// Compile one configured pattern: case-insensitive, anchored so the
/// whole name must match.
pub(crate) fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()
}

/// The compiled pattern list, shared by every probe and channel check.
#[derive(Debug)]
pub struct NamePatterns(Vec<Regex>);

impl NamePatterns {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut patterns = Vec::new();
        for raw in config.list(Key::BadnamePattern)? {
            patterns.push(anchored(&raw).map_err(|error| ConfigError::Invalid {
                key: Key::BadnamePattern.name(),
                value: raw,
                reason: error.to_string(),
            })?);
        }
        Ok(Self(patterns))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|pattern| pattern.is_match(name))
    }
}

/// What to do with a client whose name matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientNameAction {
    /// Notify once per uninterrupted violation.
    Warn,
    /// Remove from the server, re-issued every cycle the name matches.
    Kick,
}

impl FromStr for ClientNameAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("warn") {
            Ok(Self::Warn)
        } else if s.eq_ignore_ascii_case("kick") {
            Ok(Self::Kick)
        } else {
            Err(ConfigError::Invalid {
                key: Key::BadnameClientAction.name(),
                value: s.to_string(),
                reason: "expected warn or kick".into(),
            })
        }
    }
}

/// What to do with a channel whose name matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelNameAction {
    /// Rename from the configured template; a rejected rename deletes.
    Rename,
    Delete,
}

impl FromStr for ChannelNameAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("rename") {
            Ok(Self::Rename)
        } else if s.eq_ignore_ascii_case("delete") {
            Ok(Self::Delete)
        } else {
            Err(ConfigError::Invalid {
                key: Key::BadnameChannelAction.name(),
                value: s.to_string(),
                reason: "expected rename or delete".into(),
            })
        }
    }
}

/// Client-side settings snapshot.
#[derive(Debug, Clone)]
pub struct ClientNameSettings {
    action: ClientNameAction,
    warn_message: String,
    kick_message: String,
}

impl ClientNameSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            action: config.str(Key::BadnameClientAction)?.parse()?,
            warn_message: config.str(Key::BadnameClientWarnMessage)?.to_string(),
            kick_message: config.str(Key::BadnameClientKickMessage)?.to_string(),
        })
    }
}

/// Substitute the timestamp token and normalize runs of whitespace in a
/// rename template. The timestamp keeps renamed channels unique.
fn rename_target(template: &str, now: DateTime<Local>) -> String {
    let stamp = now.format("%a, %d. %B %Y %H:%M").to_string();
    let renamed = template.replace("%date%", &stamp);
    renamed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Recurring nickname check for one client.
pub struct NameProbe {
    link: Arc<dyn ControlLink>,
    enforcer: Enforcer,
    id: ClientId,
    rule: BypassRule,
    patterns: Arc<NamePatterns>,
    settings: ClientNameSettings,
    state: HysteresisState,
}

impl NameProbe {
    pub fn new(
        link: Arc<dyn ControlLink>,
        id: ClientId,
        rule: BypassRule,
        patterns: Arc<NamePatterns>,
        settings: ClientNameSettings,
    ) -> Self {
        Self {
            enforcer: Enforcer::new(Arc::clone(&link)),
            link,
            id,
            rule,
            patterns,
            settings,
            state: HysteresisState::default(),
        }
    }

    pub fn is_warned(&self) -> bool {
        self.state.is_warned
    }
}

#[async_trait]
impl Probe for NameProbe {
    async fn tick(&mut self) {
        let client = match self.link.client_info(self.id).await {
            Ok(client) => client,
            Err(error) if error.is_rejected() => return,
            Err(error) => {
                warn!(clid = self.id, error = %error, "name poll failed");
                return;
            }
        };
        if self.rule.exempts_client(&client) {
            return;
        }

        if !self.patterns.matches(&client.nickname) {
            // Renamed to something acceptable: re-arm the warning.
            self.state.is_warned = false;
            return;
        }

        match self.settings.action {
            ClientNameAction::Warn => {
                if self.state.is_warned {
                    return;
                }
                let warning = ActionKind::NotifyPoke(self.settings.warn_message.clone());
                match self.enforcer.apply(self.id, warning).await {
                    Ok(()) => {
                        debug!(clid = self.id, nickname = %client.nickname, "warned client about name");
                        self.state.is_warned = true;
                    }
                    Err(error) => warn!(clid = self.id, error = %error, "name warning failed"),
                }
            }
            ClientNameAction::Kick => {
                let kick = ActionKind::KickServer(self.settings.kick_message.clone());
                match self.enforcer.apply(self.id, kick).await {
                    Ok(()) => info!(clid = self.id, nickname = %client.nickname, "kicked client for name"),
                    Err(error) => warn!(clid = self.id, error = %error, "name kick failed"),
                }
            }
        }
    }
}

/// The badname plugin: client probes plus event-triggered channel checks.
pub struct NameWatch {
    config: Arc<Config>,
    link: Arc<dyn ControlLink>,
    enforcer: Enforcer,
    registry: WorkerRegistry,
    patterns: Arc<NamePatterns>,
    client_rule: BypassRule,
    channel_rule: BypassRule,
    client_settings: ClientNameSettings,
    channel_action: ChannelNameAction,
    rename_template: String,
}

impl NameWatch {
    pub fn new(config: &Arc<Config>, link: &Arc<dyn ControlLink>) -> Result<Self, ConfigError> {
        Ok(Self {
            patterns: Arc::new(NamePatterns::from_config(config)?),
            client_rule: BypassRule::new(config.ids(Key::BadnameBypassGroups)?, Vec::new()),
            channel_rule: BypassRule::new(Vec::new(), config.ids(Key::BadnameBypassChannel)?),
            client_settings: ClientNameSettings::from_config(config)?,
            channel_action: config.str(Key::BadnameChannelAction)?.parse()?,
            rename_template: config.str(Key::BadnameChannelRename)?.to_string(),
            enforcer: Enforcer::new(Arc::clone(link)),
            config: Arc::clone(config),
            link: Arc::clone(link),
            registry: WorkerRegistry::new(),
        })
    }

    fn watch(&self, id: ClientId) {
        let probe = NameProbe::new(
            Arc::clone(&self.link),
            id,
            self.client_rule.clone(),
            Arc::clone(&self.patterns),
            self.client_settings.clone(),
        );
        self.registry.watch(&self.config, id, probe);
    }

    /// Check one channel, once. Multiple matching patterns still trigger
    /// only one action.
    async fn check_channel(&self, id: ChannelId) {
        if self.channel_rule.exempts_channel(id) {
            return;
        }
        let channel = match self.link.channel_info(id).await {
            Ok(channel) => channel,
            Err(error) if error.is_rejected() => return, // already gone
            Err(error) => {
                warn!(cid = id, error = %error, "channel lookup failed");
                return;
            }
        };
        if !self.patterns.matches(&channel.name) {
            return;
        }

        let action = match self.channel_action {
            ChannelNameAction::Rename => {
                ActionKind::Rename(rename_target(&self.rename_template, Local::now()))
            }
            ChannelNameAction::Delete => ActionKind::Delete,
        };
        match self.enforcer.apply(id, action).await {
            Ok(()) => info!(cid = id, name = %channel.name, "censored channel name"),
            Err(error) => warn!(cid = id, error = %error, "channel name action failed"),
        }
    }
}

#[async_trait]
impl Plugin for NameWatch {
    fn name(&self) -> &'static str {
        "badname"
    }

    async fn start(&self) -> LinkResult<()> {
        // Existing channels are checked once up front.
        for channel in self.link.channels().await? {
            self.check_channel(channel.id).await;
        }
        for client in self.link.clients().await? {
            if client.kind == ClientKind::Query
                || self.client_rule.exempts_groups(&client.groups)
            {
                continue;
            }
            self.watch(client.id);
            tokio::time::sleep(SEED_SPACING).await;
        }
        Ok(())
    }

    async fn handle(&self, event: &Event) {
        match *event {
            Event::ClientJoin { id } => {
                let client = match self.link.client_info(id).await {
                    Ok(client) => client,
                    Err(error) if error.is_rejected() => return,
                    Err(error) => {
                        warn!(clid = id, error = %error, "join lookup failed");
                        return;
                    }
                };
                if client.kind == ClientKind::Query
                    || self.client_rule.exempts_groups(&client.groups)
                {
                    return;
                }
                self.watch(id);
            }
            Event::ClientLeave { id } => self.registry.release(id),
            Event::ChannelCreated { id } | Event::ChannelEdited { id } => {
                self.check_channel(id).await;
            }
            _ => {}
        }
    }
}
